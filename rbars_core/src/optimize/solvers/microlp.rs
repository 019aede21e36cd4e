//! Implements a solver interface for microlp

use indexmap::IndexMap;
use microlp::{
    ComparisonOp, Error as LpError, OptimizationDirection, Problem as LpProblem,
    Variable as LpVariable,
};

use crate::optimize::constraint::Constraint;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;
use crate::optimize::solvers::SolverError;
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Translate a [`Problem`] into a microlp problem and solve it
pub(crate) fn solve(problem: &Problem) -> Result<ProblemSolution, SolverError> {
    let direction = match problem.objective.sense {
        ObjectiveSense::Minimize => OptimizationDirection::Minimize,
        ObjectiveSense::Maximize => OptimizationDirection::Maximize,
    };
    let objective_coefficients = problem.objective_coefficients();

    let mut lp_problem = LpProblem::new(direction);
    let mut lp_variables: IndexMap<String, LpVariable> = IndexMap::new();
    for (variable_id, variable) in &problem.variables {
        let variable = variable.read().unwrap();
        let coefficient = objective_coefficients
            .get(variable_id)
            .copied()
            .unwrap_or(0.0);
        lp_variables.insert(
            variable_id.clone(),
            lp_problem.add_var(coefficient, (variable.lower_bound, variable.upper_bound)),
        );
    }

    for constraint in problem.constraints.values() {
        let constraint = constraint.read().unwrap();
        // Accumulate per variable so repeated terms become a single coefficient
        let mut accumulated: IndexMap<String, f64> = IndexMap::new();
        for term in constraint.terms() {
            *accumulated
                .entry(term.variable.read().unwrap().id.clone())
                .or_insert(0.0) += term.coefficient;
        }
        let expression: Vec<(LpVariable, f64)> = accumulated
            .iter()
            .map(|(variable_id, &coefficient)| (lp_variables[variable_id.as_str()], coefficient))
            .collect();
        match &*constraint {
            Constraint::Equality { equals, .. } => {
                lp_problem.add_constraint(expression, ComparisonOp::Eq, *equals);
            }
            Constraint::Inequality {
                lower_bound,
                upper_bound,
                ..
            } => {
                // A double sided inequality becomes two rows
                if lower_bound.is_finite() {
                    lp_problem.add_constraint(expression.clone(), ComparisonOp::Ge, *lower_bound);
                }
                if upper_bound.is_finite() {
                    lp_problem.add_constraint(expression, ComparisonOp::Le, *upper_bound);
                }
            }
        }
    }

    match lp_problem.solve() {
        Ok(lp_solution) => {
            let variable_values: IndexMap<String, f64> = lp_variables
                .iter()
                .map(|(variable_id, &lp_variable)| (variable_id.clone(), lp_solution[lp_variable]))
                .collect();
            Ok(ProblemSolution {
                status: OptimizationStatus::Optimal,
                objective_value: Some(lp_solution.objective()),
                variable_values: Some(variable_values),
            })
        }
        Err(LpError::Infeasible) => Ok(ProblemSolution {
            status: OptimizationStatus::Infeasible,
            objective_value: None,
            variable_values: None,
        }),
        Err(LpError::Unbounded) => Ok(ProblemSolution {
            status: OptimizationStatus::Unbounded,
            objective_value: None,
            variable_values: None,
        }),
        Err(other) => Err(SolverError::Backend(other.to_string())),
    }
}
