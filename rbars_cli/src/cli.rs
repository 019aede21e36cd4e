use std::path::PathBuf;

use clap::Parser;

/// Sweep a resource balance model over substrate concentrations
#[derive(Parser, Debug)]
#[command(name = "rbars", version, about)]
pub struct Cli {
    /// Directory holding the model definition files
    #[arg(long, default_value = "model")]
    pub model_dir: PathBuf,

    /// Directory receiving the result tables
    #[arg(long, default_value = "simulation")]
    pub output_dir: PathBuf,

    /// Medium key whose concentration is varied
    #[arg(long, default_value = "M_fru")]
    pub substrate_nutrient: String,

    /// Label inserted into result file names
    #[arg(long, default_value = "fru")]
    pub substrate_label: String,

    /// Uptake reaction used for the yield calculation
    #[arg(long, default_value = "R_FRUpts2")]
    pub substrate_reaction: String,

    /// Molar mass of the substrate in g/mmol
    #[arg(long, default_value_t = 0.18)]
    pub substrate_molar_mass: f64,

    /// First exponent of the concentration series
    #[arg(long, default_value_t = -4.0, allow_negative_numbers = true)]
    pub start_exponent: f64,

    /// Exclusive final exponent of the concentration series
    #[arg(long, default_value_t = 0.25, allow_negative_numbers = true)]
    pub stop_exponent: f64,

    /// Increment between consecutive exponents
    #[arg(long, default_value_t = 0.25)]
    pub step: f64,

    /// Skip the yield calculation
    #[arg(long)]
    pub no_yield: bool,
}
