//! Module providing representation of optimization problem variables
use std::fmt::{Display, Formatter};
use std::sync::{Arc, RwLock};

use derive_builder::Builder;

use crate::configuration::CONFIGURATION;

/// A continuous variable in an optimization problem
#[derive(Builder, Debug, Clone)]
#[builder(setter(into))]
pub struct Variable {
    /// Used to identify the variable (must be unique within a problem)
    pub id: String,
    /// Human-readable variable name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Lowest value the variable can take
    #[builder(default = "CONFIGURATION.read().unwrap().lower_bound")]
    pub lower_bound: f64,
    /// Highest value the variable can take
    #[builder(default = "CONFIGURATION.read().unwrap().upper_bound")]
    pub upper_bound: f64,
    /// Position of the variable within its problem, set when added
    #[builder(default = "0")]
    pub index: usize,
}

impl Variable {
    /// Wrap the variable in an Arc<RwLock<>> for sharing between problem and constraints
    pub fn wrap(self) -> Arc<RwLock<Variable>> {
        Arc::new(RwLock::new(self))
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_configured_bounds() {
        let variable = VariableBuilder::default().id("x").build().unwrap();
        let configuration = CONFIGURATION.read().unwrap();
        assert_eq!(variable.lower_bound, configuration.lower_bound);
        assert_eq!(variable.upper_bound, configuration.upper_bound);
        assert_eq!(variable.index, 0);
    }

    #[test]
    fn display_prefers_name() {
        let variable = VariableBuilder::default()
            .id("v1")
            .name("glucose uptake".to_string())
            .build()
            .unwrap();
        assert_eq!(format!("{}", variable), "glucose uptake");

        let unnamed = VariableBuilder::default().id("v2").build().unwrap();
        assert_eq!(format!("{}", unnamed), "v2");
    }
}
