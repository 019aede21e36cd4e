//! This module provides a struct for representing reactions
use derive_builder::Builder;
use indexmap::IndexMap;

use crate::configuration::CONFIGURATION;

/// Represents a reaction in the cell model
#[derive(Builder, Debug, Clone)]
#[builder(setter(into))]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Metabolite stoichiometry of the reaction
    #[builder(default = "IndexMap::new()")]
    pub stoichiometry: IndexMap<String, f64>,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Lower flux bound
    #[builder(default = "CONFIGURATION.read().unwrap().lower_bound")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "CONFIGURATION.read().unwrap().upper_bound")]
    pub upper_bound: f64,
    /// Id of the enzyme catalyzing the reaction, if any
    #[builder(default = "None")]
    pub enzyme: Option<String>,
    /// Medium saturation of the reaction, set for transport reactions
    #[builder(default = "None")]
    pub transport: Option<Transport>,
}

impl Reaction {
    /// Whether the reaction can carry negative flux
    pub fn is_reversible(&self) -> bool {
        self.lower_bound < 0.0
    }
}

/// Michaelis-Menten coupling of a transport reaction to a medium nutrient
///
/// The effective capacity of the reaction is scaled by
/// `c / (saturation_constant + c)` where c is the nutrient concentration in
/// the medium.
#[derive(Debug, Clone, PartialEq)]
pub struct Transport {
    /// Medium nutrient imported by the reaction
    pub nutrient: String,
    /// Half saturation concentration of the nutrient
    pub saturation_constant: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let reaction = ReactionBuilder::default().id("R_test").build().unwrap();
        let configuration = CONFIGURATION.read().unwrap();
        assert_eq!(reaction.lower_bound, configuration.lower_bound);
        assert_eq!(reaction.upper_bound, configuration.upper_bound);
        assert!(reaction.enzyme.is_none());
        assert!(reaction.transport.is_none());
        assert!(reaction.is_reversible());
    }

    #[test]
    fn irreversible_reaction() {
        let reaction = ReactionBuilder::default()
            .id("R_irrev")
            .lower_bound(0.0)
            .build()
            .unwrap();
        assert!(!reaction.is_reversible());
    }
}
