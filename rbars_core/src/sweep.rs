//! Substrate concentration sweeps.
//!
//! Solves a model repeatedly over a logarithmic series of substrate
//! concentrations, reporting each solved state into an output directory.

use std::path::PathBuf;

use derive_builder::Builder;
use thiserror::Error;

use crate::cell_model::model::{RbaModel, SolveError};
use crate::io::json::JsonError;
use crate::report::{report_results, ReportError, Substrate};

/// Concentrations 10^x for exponents from `start_exponent` up to but not
/// including `stop_exponent`, in increments of `step`
///
/// An empty series is returned when `step` is not positive.
pub fn concentration_series(start_exponent: f64, stop_exponent: f64, step: f64) -> Vec<f64> {
    let mut series = Vec::new();
    if step <= 0.0 {
        return series;
    }
    let mut index = 0;
    loop {
        let exponent = start_exponent + (index as f64) * step;
        // Tolerance keeps the endpoint stable under accumulated rounding
        if exponent >= stop_exponent - 1e-9 {
            break;
        }
        series.push(10_f64.powf(exponent));
        index += 1;
    }
    series
}

/// Settings for a substrate concentration sweep
#[derive(Builder, Clone, Debug)]
#[builder(setter(into))]
pub struct SweepConfig {
    /// Directory holding the model definition files
    pub model_dir: PathBuf,
    /// Directory receiving the result tables
    pub output_dir: PathBuf,
    /// Medium key whose concentration is varied
    pub substrate_nutrient: String,
    /// Label inserted into result file names
    pub substrate_label: String,
    /// First exponent of the concentration series
    #[builder(default = "-4.0")]
    pub start_exponent: f64,
    /// Exclusive final exponent of the concentration series
    #[builder(default = "0.25")]
    pub stop_exponent: f64,
    /// Increment between consecutive exponents
    #[builder(default = "0.25")]
    pub step: f64,
    /// Substrate used for the yield calculation, if any
    #[builder(default)]
    pub substrate: Option<Substrate>,
}

/// Read the model from `config.model_dir` and sweep it
pub fn run(config: &SweepConfig) -> Result<(), SweepError> {
    let mut model = RbaModel::from_dir(&config.model_dir)?;
    run_sweep(&mut model, config)
}

/// Solve `model` at each concentration in the configured series
///
/// For every concentration the substrate entry of the medium is
/// replaced, the model is solved, and the result tables are written
/// with a `_{label}_{concentration}` suffix.
pub fn run_sweep(model: &mut RbaModel, config: &SweepConfig) -> Result<(), SweepError> {
    for concentration in
        concentration_series(config.start_exponent, config.stop_exponent, config.step)
    {
        let mut medium = model.medium().clone();
        medium.insert(config.substrate_nutrient.clone(), concentration);
        model.set_medium(medium);

        println!(
            "Solving with {} = {} mM",
            config.substrate_nutrient, concentration
        );
        let result = model.solve()?;

        let suffix = format!("_{}_{}", config.substrate_label, concentration);
        report_results(
            &result,
            &config.output_dir,
            &suffix,
            config.substrate.as_ref(),
        )?;
    }
    Ok(())
}

/// Errors raised while running a sweep
#[derive(Error, Debug)]
pub enum SweepError {
    /// The model definition could not be read
    #[error("unable to read model")]
    Json(#[from] JsonError),
    /// The model could not be solved at some concentration
    #[error("unable to solve model")]
    Solve(#[from] SolveError),
    /// A solved state could not be reported
    #[error("unable to report results")]
    Report(#[from] ReportError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_model::enzyme::EnzymeBuilder;
    use crate::cell_model::metabolite::MetaboliteBuilder;
    use crate::cell_model::process::ProcessBuilder;
    use crate::cell_model::reaction::{ReactionBuilder, Transport};
    use approx::assert_relative_eq;
    use indexmap::IndexMap;

    #[test]
    fn series_covers_the_default_range() {
        let series = concentration_series(-4.0, 0.25, 0.25);
        assert_eq!(series.len(), 17);
        assert_relative_eq!(series[0], 1e-4, epsilon = 1e-12);
        assert_relative_eq!(series[16], 1.0, epsilon = 1e-9);
        assert!(series.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(series
            .iter()
            .any(|&concentration| (concentration - 0.1).abs() < 1e-9));
    }

    #[test]
    fn series_is_empty_for_nonpositive_step() {
        assert!(concentration_series(-4.0, 0.25, 0.0).is_empty());
        assert!(concentration_series(-4.0, 0.25, -0.25).is_empty());
    }

    /// Model whose growth is limited by saturable substrate uptake
    fn uptake_limited_model() -> RbaModel {
        let mut model = RbaModel::new_empty();
        model.add_metabolite(
            MetaboliteBuilder::default()
                .id("M_prec")
                .biomass_demand(1.0)
                .build()
                .unwrap(),
        );
        model.add_reaction(
            ReactionBuilder::default()
                .id("R_upt")
                .stoichiometry(IndexMap::from([("M_prec".to_string(), 1.0)]))
                .lower_bound(0.0)
                .enzyme(Some("E_upt".to_string()))
                .transport(Some(Transport {
                    nutrient: "M_fru".to_string(),
                    saturation_constant: 0.1,
                }))
                .build()
                .unwrap(),
        );
        model.add_enzyme(
            EnzymeBuilder::default()
                .id("E_upt")
                .reaction("R_upt")
                .forward_efficiency(10.0)
                .composition(IndexMap::from([("P_rib".to_string(), 500.0)]))
                .build()
                .unwrap(),
        );
        model.add_process(
            ProcessBuilder::default()
                .id("P_rib")
                .capacity_rate(36000.0)
                .composition(IndexMap::from([("P_rib".to_string(), 7459.0)]))
                .build()
                .unwrap(),
        );
        model
    }

    #[test]
    fn sweep_overwrites_only_the_substrate_entry() {
        let mut model = uptake_limited_model();
        model.set_medium(IndexMap::from([
            ("M_fru".to_string(), 1.0),
            ("M_o2".to_string(), 0.21),
        ]));
        let output_dir = tempfile::tempdir().unwrap();
        let config = SweepConfigBuilder::default()
            .model_dir("unused")
            .output_dir(output_dir.path())
            .substrate_nutrient("M_fru")
            .substrate_label("fru")
            .start_exponent(-1.0)
            .stop_exponent(0.25)
            .build()
            .unwrap();
        run_sweep(&mut model, &config).unwrap();

        assert_eq!(model.medium().len(), 2);
        assert_relative_eq!(model.medium()["M_o2"], 0.21, epsilon = 1e-12);
        assert_relative_eq!(model.medium()["M_fru"], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn sweep_writes_tables_for_each_concentration() {
        let mut model = uptake_limited_model();
        let output_dir = tempfile::tempdir().unwrap();
        let config = SweepConfigBuilder::default()
            .model_dir("unused")
            .output_dir(output_dir.path())
            .substrate_nutrient("M_fru")
            .substrate_label("fru")
            .start_exponent(-1.0)
            .stop_exponent(0.25)
            .substrate(Some(Substrate {
                reaction: "R_upt".to_string(),
                molar_mass: 0.18,
            }))
            .build()
            .unwrap();
        run_sweep(&mut model, &config).unwrap();

        for concentration in ["0.1", "1"] {
            for name in [
                format!("fluxes_fru_{}.tsv", concentration),
                format!("proteins_fru_{}.csv", concentration),
                format!("macroprocesses_fru_{}.tsv", concentration),
            ] {
                assert!(
                    output_dir.path().join(&name).exists(),
                    "missing {}",
                    name
                );
            }
        }
        let macroprocesses = std::fs::read_to_string(
            output_dir.path().join("macroprocesses_fru_1.tsv"),
        )
        .unwrap();
        assert!(macroprocesses.lines().any(|line| line.starts_with("mu\t")));
        assert!(macroprocesses
            .lines()
            .any(|line| line.starts_with("yield\t")));
    }

    #[test]
    fn missing_output_directory_propagates() {
        let mut model = uptake_limited_model();
        let config = SweepConfigBuilder::default()
            .model_dir("unused")
            .output_dir("/nonexistent/simulation/dir")
            .substrate_nutrient("M_fru")
            .substrate_label("fru")
            .start_exponent(0.0)
            .stop_exponent(0.25)
            .build()
            .unwrap();
        assert!(matches!(
            run_sweep(&mut model, &config),
            Err(SweepError::Report(_))
        ));
    }

    #[test]
    fn sweep_from_directory_reads_the_model() {
        let model_dir = tempfile::tempdir().unwrap();
        uptake_limited_model().write_dir(model_dir.path()).unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let config = SweepConfigBuilder::default()
            .model_dir(model_dir.path())
            .output_dir(output_dir.path())
            .substrate_nutrient("M_fru")
            .substrate_label("fru")
            .start_exponent(0.0)
            .stop_exponent(0.25)
            .build()
            .unwrap();
        run(&config).unwrap();
        assert!(output_dir.path().join("fluxes_fru_1.tsv").exists());
    }
}
