//! Reporting of solved growth states.
//!
//! Writes the flux, protein and macroprocess tables for a single solved
//! state into an output directory and builds the console summary block.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::cell_model::result::{ExportError, FluxExportOptions, RbaResult, TableFormat};

/// Number of transport fluxes listed in the console summary
const SUMMARY_TRANSPORT_COUNT: usize = 5;

/// The limiting substrate used for yield calculations
#[derive(Clone, Debug, PartialEq)]
pub struct Substrate {
    /// Id of the uptake reaction carrying the substrate into the cell
    pub reaction: String,
    /// Molar mass of the substrate in g/mmol
    pub molar_mass: f64,
}

/// Write the result tables for a solved state and print its summary
///
/// Three tables are written into `output_dir`, each named with the given
/// `suffix` before its extension: `fluxes{suffix}.tsv`,
/// `proteins{suffix}.csv` and `macroprocesses{suffix}.tsv`. When a
/// `substrate` is supplied the biomass yield on that substrate is
/// included in the macroprocess table and the summary.
///
/// # Parameters
/// - `result`: Solved growth state to report
/// - `output_dir`: Directory receiving the tables
/// - `suffix`: Label inserted into each file name, e.g. `_fru_0.1`
/// - `substrate`: Optional substrate used for the yield calculation
pub fn report_results(
    result: &RbaResult,
    output_dir: &Path,
    suffix: &str,
    substrate: Option<&Substrate>,
) -> Result<(), ReportError> {
    let yield_value = match substrate {
        Some(substrate) => Some(compute_yield(result, substrate)?),
        None => None,
    };

    let flux_options = FluxExportOptions {
        merge_isozyme_reactions: true,
        only_nonzero: true,
        remove_prefix: true,
    };
    result.write_fluxes(
        output_dir.join(format!("fluxes{}.{}", suffix, TableFormat::Tsv.extension())),
        TableFormat::Tsv,
        &flux_options,
    )?;
    result.write_proteins(
        output_dir.join(format!("proteins{}.{}", suffix, TableFormat::Csv.extension())),
        TableFormat::Csv,
    )?;
    write_macroprocesses(
        result,
        &output_dir.join(format!(
            "macroprocesses{}.{}",
            suffix,
            TableFormat::Tsv.extension()
        )),
        yield_value,
    )?;

    print!("{}", summary_block(result, yield_value));
    Ok(())
}

/// Biomass yield on the substrate, in gram dry weight per gram substrate
///
/// The yield is the growth rate divided by the substrate mass uptake
/// flux, i.e. the uptake reaction flux times the substrate molar mass.
pub fn compute_yield(result: &RbaResult, substrate: &Substrate) -> Result<f64, ReportError> {
    let flux = result
        .reaction_fluxes
        .get(&substrate.reaction)
        .copied()
        .ok_or_else(|| ReportError::UnknownSubstrateReaction(substrate.reaction.clone()))?;
    if flux == 0.0 {
        return Err(ReportError::ZeroSubstrateFlux(substrate.reaction.clone()));
    }
    Ok(result.growth_rate / (flux * substrate.molar_mass))
}

/// Console summary for a solved state
pub fn summary_block(result: &RbaResult, yield_value: Option<f64>) -> String {
    let mut block = String::from("\n----- SUMMARY -----\n\n");
    block.push_str(&format!(
        "Optimal growth rate is {}.\n",
        result.growth_rate
    ));
    if let Some(yield_value) = yield_value {
        block.push_str(&format!("Yield on substrate is {}.\n", yield_value));
    }
    block.push_str(&result.transport_summary(SUMMARY_TRANSPORT_COUNT));
    block
}

/// Write the process machinery table, with growth rate and optional yield
fn write_macroprocesses(
    result: &RbaResult,
    path: &Path,
    yield_value: Option<f64>,
) -> Result<(), ReportError> {
    let mut lines: Vec<String> = result
        .process_machinery_concentrations
        .iter()
        .map(|(process_id, concentration)| format!("{}\t{}", process_id, concentration))
        .collect();
    lines.push(format!("mu\t{}", result.growth_rate));
    if let Some(yield_value) = yield_value {
        lines.push(format!("yield\t{}", yield_value));
    }
    fs::write(path, lines.join("\n") + "\n")?;
    Ok(())
}

/// Errors raised while reporting a solved state
#[derive(Error, Debug)]
pub enum ReportError {
    /// The substrate uptake reaction is not part of the result
    #[error("unknown substrate reaction {0}")]
    UnknownSubstrateReaction(String),
    /// The substrate uptake reaction carries no flux, so no yield exists
    #[error("substrate reaction {0} carries no flux")]
    ZeroSubstrateFlux(String),
    /// A result table could not be exported
    #[error("unable to export result table")]
    Export(#[from] ExportError),
    /// The macroprocess table could not be written
    #[error("unable to write macroprocess table")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use indexmap::IndexMap;

    fn example_result() -> RbaResult {
        let mut reaction_fluxes = IndexMap::new();
        reaction_fluxes.insert("R_FRUpts2".to_string(), 10.0);
        reaction_fluxes.insert("R_PGI".to_string(), 4.0);
        reaction_fluxes.insert("R_idle".to_string(), 0.0);
        let mut enzyme_concentrations = IndexMap::new();
        enzyme_concentrations.insert("E_FRUpts2".to_string(), 0.2);
        let mut process_machinery_concentrations = IndexMap::new();
        process_machinery_concentrations.insert("P_rib".to_string(), 0.05);
        RbaResult {
            growth_rate: 0.5,
            reaction_fluxes,
            enzyme_concentrations,
            process_machinery_concentrations,
            transport_reactions: vec!["R_FRUpts2".to_string()],
        }
    }

    fn fructose() -> Substrate {
        Substrate {
            reaction: "R_FRUpts2".to_string(),
            molar_mass: 0.18,
        }
    }

    #[test]
    fn yield_is_growth_over_mass_uptake() {
        let result = example_result();
        let yield_value = compute_yield(&result, &fructose()).unwrap();
        assert_relative_eq!(yield_value, 0.5 / (10.0 * 0.18), epsilon = 1e-12);
    }

    #[test]
    fn yield_requires_a_known_reaction() {
        let result = example_result();
        let substrate = Substrate {
            reaction: "R_missing".to_string(),
            molar_mass: 0.18,
        };
        assert!(matches!(
            compute_yield(&result, &substrate),
            Err(ReportError::UnknownSubstrateReaction(_))
        ));
    }

    #[test]
    fn yield_requires_nonzero_uptake() {
        let result = example_result();
        let substrate = Substrate {
            reaction: "R_idle".to_string(),
            molar_mass: 0.18,
        };
        assert!(matches!(
            compute_yield(&result, &substrate),
            Err(ReportError::ZeroSubstrateFlux(_))
        ));
    }

    #[test]
    fn report_writes_all_three_tables() {
        let result = example_result();
        let dir = tempfile::tempdir().unwrap();
        report_results(&result, dir.path(), "_fru_0.1", Some(&fructose())).unwrap();

        assert!(dir.path().join("fluxes_fru_0.1.tsv").exists());
        assert!(dir.path().join("proteins_fru_0.1.csv").exists());
        let macroprocesses =
            fs::read_to_string(dir.path().join("macroprocesses_fru_0.1.tsv")).unwrap();
        assert!(macroprocesses.contains("P_rib\t0.05"));
        assert!(macroprocesses.contains("mu\t0.5"));
        let yield_line = macroprocesses
            .lines()
            .find(|line| line.starts_with("yield\t"))
            .unwrap();
        let yield_value: f64 = yield_line.split('\t').nth(1).unwrap().parse().unwrap();
        assert_relative_eq!(yield_value, 0.2777777, epsilon = 1e-4);
    }

    #[test]
    fn report_without_substrate_omits_yield() {
        let result = example_result();
        let dir = tempfile::tempdir().unwrap();
        report_results(&result, dir.path(), "", None).unwrap();
        let macroprocesses =
            fs::read_to_string(dir.path().join("macroprocesses.tsv")).unwrap();
        assert!(!macroprocesses.contains("yield"));
        assert!(macroprocesses.contains("mu\t0.5"));
    }

    #[test]
    fn summary_names_growth_rate_and_yield() {
        let result = example_result();
        let block = summary_block(&result, Some(0.25));
        assert!(block.contains("----- SUMMARY -----"));
        assert!(block.contains("Optimal growth rate is 0.5."));
        assert!(block.contains("Yield on substrate is 0.25."));
        assert!(block.contains("R_FRUpts2"));
    }
}
