//! This module provides the solved state of a cell model and its table exports
use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

/// The solution of a growth rate optimization
///
/// Produced fresh by every [`crate::cell_model::model::RbaModel::solve`] call;
/// all mappings follow the model's definition order.
#[derive(Clone, Debug)]
pub struct RbaResult {
    /// The optimal growth rate (1/h)
    pub growth_rate: f64,
    /// Map of reaction ids to flux values (mmol per gram biomass per hour)
    pub reaction_fluxes: IndexMap<String, f64>,
    /// Map of enzyme ids to concentrations
    pub enzyme_concentrations: IndexMap<String, f64>,
    /// Map of process machinery ids to concentrations
    pub process_machinery_concentrations: IndexMap<String, f64>,
    /// Ids of the reactions crossing the cell boundary
    pub transport_reactions: Vec<String>,
}

/// Output format of an exported table
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TableFormat {
    /// Tab separated values
    Tsv,
    /// Comma separated values
    Csv,
}

impl TableFormat {
    /// Field delimiter of the format
    pub fn delimiter(&self) -> u8 {
        match self {
            TableFormat::Tsv => b'\t',
            TableFormat::Csv => b',',
        }
    }

    /// Conventional file extension of the format
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Tsv => "tsv",
            TableFormat::Csv => "csv",
        }
    }
}

/// Options controlling the flux table export
#[derive(Clone, Copy, Debug, Default)]
pub struct FluxExportOptions {
    /// Sum the fluxes of isozyme copies (`<id>_duplicate_<n>`) into one row
    pub merge_isozyme_reactions: bool,
    /// Drop reactions carrying no flux
    pub only_nonzero: bool,
    /// Strip the `R_` prefix from reaction ids
    pub remove_prefix: bool,
}

impl RbaResult {
    /// Flux table after applying the export options
    pub fn merged_fluxes(&self, options: &FluxExportOptions) -> IndexMap<String, f64> {
        let mut fluxes: IndexMap<String, f64> = IndexMap::new();
        for (reaction_id, &flux) in &self.reaction_fluxes {
            let mut key = if options.merge_isozyme_reactions {
                base_reaction_id(reaction_id).to_string()
            } else {
                reaction_id.clone()
            };
            if options.remove_prefix {
                if let Some(stripped) = key.strip_prefix("R_") {
                    key = stripped.to_string();
                }
            }
            *fluxes.entry(key).or_insert(0.0) += flux;
        }
        if options.only_nonzero {
            fluxes.retain(|_, flux| *flux != 0.0);
        }
        fluxes
    }

    /// Export the reaction fluxes as a two column table
    pub fn write_fluxes<P: AsRef<Path>>(
        &self,
        path: P,
        format: TableFormat,
        options: &FluxExportOptions,
    ) -> Result<(), ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(format.delimiter())
            .from_path(path)?;
        writer.write_record(["reaction", "flux"])?;
        for (reaction_id, flux) in self.merged_fluxes(options) {
            writer.write_record([reaction_id.as_str(), flux.to_string().as_str()])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Export the enzyme concentrations as a two column table
    pub fn write_proteins<P: AsRef<Path>>(
        &self,
        path: P,
        format: TableFormat,
    ) -> Result<(), ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(format.delimiter())
            .from_path(path)?;
        writer.write_record(["protein", "concentration"])?;
        for (enzyme_id, concentration) in &self.enzyme_concentrations {
            writer.write_record([enzyme_id.as_str(), concentration.to_string().as_str()])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// The `count` transport reactions carrying the largest absolute flux
    pub fn main_transport_fluxes(&self, count: usize) -> Vec<(String, f64)> {
        let mut fluxes: Vec<(String, f64)> = self
            .transport_reactions
            .iter()
            .filter_map(|reaction_id| {
                self.reaction_fluxes
                    .get(reaction_id)
                    .map(|&flux| (reaction_id.clone(), flux))
            })
            .collect();
        fluxes.sort_by(|(_, a), (_, b)| b.abs().total_cmp(&a.abs()));
        fluxes.truncate(count);
        fluxes
    }

    /// Human readable block listing the main transport fluxes
    pub fn transport_summary(&self, count: usize) -> String {
        let mut summary = String::from("Top transport fluxes:\n");
        for (reaction_id, flux) in self.main_transport_fluxes(count) {
            summary.push_str(&format!("  {}\t{}\n", reaction_id, flux));
        }
        summary
    }
}

/// Strip the isozyme copy suffix from a reaction id
fn base_reaction_id(reaction_id: &str) -> &str {
    match reaction_id.find("_duplicate") {
        Some(position) => &reaction_id[..position],
        None => reaction_id,
    }
}

/// Errors raised while exporting result tables
#[derive(Error, Debug)]
pub enum ExportError {
    /// The table could not be written
    #[error("unable to write table")]
    Csv(#[from] csv::Error),
    /// Underlying file IO failed
    #[error("unable to write file")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sample_result() -> RbaResult {
        RbaResult {
            growth_rate: 0.5,
            reaction_fluxes: IndexMap::from([
                ("R_pgi".to_string(), 1.5),
                ("R_pgi_duplicate_2".to_string(), 0.5),
                ("R_idle".to_string(), 0.0),
                ("R_FRUpts2".to_string(), 10.0),
                ("R_EX_o2".to_string(), -3.0),
            ]),
            enzyme_concentrations: IndexMap::from([("E_pgi".to_string(), 0.01)]),
            process_machinery_concentrations: IndexMap::from([("P_rib".to_string(), 0.2)]),
            transport_reactions: vec!["R_FRUpts2".to_string(), "R_EX_o2".to_string()],
        }
    }

    #[test]
    fn merged_fluxes_applies_all_options() {
        let result = sample_result();
        let fluxes = result.merged_fluxes(&FluxExportOptions {
            merge_isozyme_reactions: true,
            only_nonzero: true,
            remove_prefix: true,
        });
        // Isozyme copies summed, prefix stripped, zero flux dropped
        assert_eq!(fluxes["pgi"], 2.0);
        assert!(!fluxes.contains_key("idle"));
        assert_eq!(fluxes["FRUpts2"], 10.0);
        assert_eq!(fluxes.len(), 3);
    }

    #[test]
    fn merged_fluxes_defaults_change_nothing() {
        let result = sample_result();
        let fluxes = result.merged_fluxes(&FluxExportOptions::default());
        assert_eq!(fluxes.len(), result.reaction_fluxes.len());
        assert_eq!(fluxes["R_pgi_duplicate_2"], 0.5);
    }

    #[test]
    fn write_fluxes_tsv() {
        let result = sample_result();
        let dir = tempdir().unwrap();
        let path = dir.path().join("fluxes.tsv");
        result
            .write_fluxes(
                &path,
                TableFormat::Tsv,
                &FluxExportOptions {
                    merge_isozyme_reactions: true,
                    only_nonzero: true,
                    remove_prefix: true,
                },
            )
            .unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "reaction\tflux");
        assert!(lines.contains(&"pgi\t2"));
        assert!(lines.contains(&"FRUpts2\t10"));
    }

    #[test]
    fn write_proteins_csv() {
        let result = sample_result();
        let dir = tempdir().unwrap();
        let path = dir.path().join("proteins.csv");
        result.write_proteins(&path, TableFormat::Csv).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("protein,concentration\n"));
        assert!(content.contains("E_pgi,0.01"));
    }

    #[test]
    fn main_transport_fluxes_sorted_by_magnitude() {
        let result = sample_result();
        let fluxes = result.main_transport_fluxes(5);
        assert_eq!(fluxes[0].0, "R_FRUpts2");
        assert_eq!(fluxes[1].0, "R_EX_o2");

        let truncated = result.main_transport_fluxes(1);
        assert_eq!(truncated.len(), 1);
    }
}
