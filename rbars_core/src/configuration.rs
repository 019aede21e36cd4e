//! Process wide configuration defaults
use std::sync::{LazyLock, RwLock};

use crate::optimize::solvers::Solver;

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

/// Defaults applied when a model or problem doesn't specify a value itself
pub struct Configuration {
    /// Default lower flux bound for reactions and problem variables
    pub lower_bound: f64,
    /// Default upper flux bound for reactions and problem variables
    pub upper_bound: f64,
    /// Upper end of the growth rate interval searched during a solve (1/h)
    pub max_growth_rate: f64,
    /// Absolute tolerance at which the growth rate search stops
    pub growth_tolerance: f64,
    /// Maximum number of bisection steps in a growth rate search
    pub max_bisections: u32,
    /// Which solver backend to use for the per growth rate feasibility problems
    pub solver: Solver,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            max_growth_rate: 10.,
            growth_tolerance: 1e-06,
            max_bisections: 64,
            solver: Solver::Microlp,
        }
    }
}
