//! This module provides a struct for representing process machineries
use derive_builder::Builder;
use indexmap::IndexMap;

/// Represents a non-enzymatic process machinery, such as a ribosome
///
/// A machinery provides capacity for building the cell's components: at growth
/// rate mu the total synthesis demand placed on a process must stay within
/// `capacity_rate` times the machinery concentration.
#[derive(Builder, Debug, Clone)]
#[builder(setter(into))]
pub struct Process {
    /// Used to identify the process (must be unique)
    pub id: String,
    /// Human readable name of the process
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Capacity of one unit of machinery (cost units per hour)
    pub capacity_rate: f64,
    /// Synthesis cost of the machinery itself, per process machinery id
    #[builder(default = "IndexMap::new()")]
    pub composition: IndexMap<String, f64>,
    /// Molecular weight in grams per mmol, counted against the protein density bound
    #[builder(default = "0.0")]
    pub molecular_weight: f64,
}
