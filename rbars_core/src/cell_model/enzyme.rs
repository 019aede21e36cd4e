//! This module provides a struct for representing enzymes
use derive_builder::Builder;
use indexmap::IndexMap;

/// Represents an enzyme catalyzing a single reaction
///
/// The enzyme concentration limits the flux of its reaction through the
/// catalytic efficiencies; synthesizing the enzyme in turn loads the process
/// machineries named in its composition.
#[derive(Builder, Debug, Clone)]
#[builder(setter(into))]
pub struct Enzyme {
    /// Used to identify the enzyme (must be unique)
    pub id: String,
    /// Id of the reaction the enzyme catalyzes
    pub reaction: String,
    /// Catalytic efficiency in the forward direction (1/h)
    pub forward_efficiency: f64,
    /// Catalytic efficiency in the reverse direction (1/h)
    #[builder(default = "0.0")]
    pub reverse_efficiency: f64,
    /// Synthesis cost per process machinery id (cost units per unit enzyme)
    #[builder(default = "IndexMap::new()")]
    pub composition: IndexMap<String, f64>,
    /// Molecular weight in grams per mmol, counted against the protein density bound
    #[builder(default = "0.0")]
    pub molecular_weight: f64,
}
