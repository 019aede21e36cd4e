//! This module provides the metabolite struct representing a metabolite

use derive_builder::Builder;

/// Represents a metabolite
#[derive(Builder, Debug, Clone)]
#[builder(setter(into))]
pub struct Metabolite {
    /// Used to identify the metabolite (must be unique)
    pub id: String,
    /// Human readable name of the metabolite
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Whether the metabolite is outside the cell boundary
    ///
    /// Boundary metabolites are excluded from mass balance; their availability
    /// is controlled through the medium instead.
    #[builder(default = "false")]
    pub boundary: bool,
    /// Growth associated demand in mmol per gram biomass
    ///
    /// The metabolite must be produced at `biomass_demand * mu` to sustain a
    /// growth rate of mu.
    #[builder(default = "0.0")]
    pub biomass_demand: f64,
}
