//! Solver backends for optimization problems

pub mod microlp;

use thiserror::Error;

/// Enum used to specify which solver backend to use
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Solver {
    /// Use the microlp simplex solver
    #[default]
    Microlp,
}

/// Errors raised by a solver backend itself
///
/// Infeasible and unbounded problems are not errors; they are reported through
/// [`crate::optimize::OptimizationStatus`].
#[derive(Error, Debug)]
pub enum SolverError {
    /// The backend failed for a reason other than the problem being
    /// infeasible or unbounded
    #[error("solver backend failure: {0}")]
    Backend(String),
}
