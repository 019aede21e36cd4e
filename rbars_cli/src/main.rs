//! Command line entry point for substrate concentration sweeps.

mod cli;

use clap::Parser;
use rbars_core::report::Substrate;
use rbars_core::sweep::{self, SweepConfigBuilder};

use crate::cli::Cli;

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let substrate = if cli.no_yield {
        None
    } else {
        Some(Substrate {
            reaction: cli.substrate_reaction,
            molar_mass: cli.substrate_molar_mass,
        })
    };
    let config = SweepConfigBuilder::default()
        .model_dir(cli.model_dir)
        .output_dir(cli.output_dir)
        .substrate_nutrient(cli.substrate_nutrient)
        .substrate_label(cli.substrate_label)
        .start_exponent(cli.start_exponent)
        .stop_exponent(cli.stop_exponent)
        .step(cli.step)
        .substrate(substrate)
        .build()?;
    sweep::run(&config)?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {}", error);
        std::process::exit(1);
    }
}
