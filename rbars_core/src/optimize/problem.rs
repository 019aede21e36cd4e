//! Provides struct representing an optimization problem
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use thiserror::Error;

use crate::configuration::CONFIGURATION;
use crate::optimize::constraint::Constraint;
use crate::optimize::objective::{Objective, ObjectiveSense, ObjectiveTerm};
use crate::optimize::problem::ProblemError::{
    NonExistentVariable, NonExistentVariablesInObjective,
};
use crate::optimize::solvers::{self, Solver, SolverError};
use crate::optimize::variable::{Variable, VariableBuilder};
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// A linear optimization problem over continuous variables
#[derive(Debug, Clone)]
pub struct Problem {
    /// Objective to optimize
    pub(crate) objective: Objective,
    /// Variables of the optimization problem
    pub(crate) variables: IndexMap<String, Arc<RwLock<Variable>>>,
    /// Constraints of the optimization problem
    pub(crate) constraints: IndexMap<String, Arc<RwLock<Constraint>>>,
    /// Current status of the optimization problem
    pub(crate) status: OptimizationStatus,
    /// Values of the optimized variables. Will be None before optimization
    pub(crate) variable_values: Option<IndexMap<String, f64>>,
    /// Current number of variables in the problem
    num_variables: usize,
    /// Current number of constraints in the problem
    num_constraints: usize,
}

impl Problem {
    // region Creation Functions
    /// Create a new optimization problem
    pub fn new(objective_sense: ObjectiveSense) -> Self {
        Self {
            objective: Objective::new(objective_sense),
            variables: IndexMap::new(),
            constraints: IndexMap::new(),
            status: OptimizationStatus::Unoptimized,
            variable_values: None,
            num_variables: 0,
            num_constraints: 0,
        }
    }

    /// Create a new maximization problem
    pub fn new_maximization() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new minimization problem
    pub fn new_minimization() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }
    // endregion Creation Functions

    /// Update the objective sense of the problem
    pub fn update_objective_sense(&mut self, sense: ObjectiveSense) {
        self.objective.set_sense(sense);
    }

    // region Adding Variables
    /// Add a variable to the optimization problem
    pub fn add_variable(&mut self, variable: Arc<RwLock<Variable>>) -> Result<(), ProblemError> {
        // Validate that the variable can in fact be added to the problem
        self.validate_variable(variable.clone())?;
        // Update the index of the variable to reflect the current variable count
        variable.write().unwrap().index = self.num_variables;
        self.num_variables += 1;
        let variable_id = variable.read().unwrap().id.clone();
        self.variables.insert(variable_id, variable);
        Ok(())
    }

    /// Create a new variable and add it to the optimization problem
    pub fn add_new_variable(
        &mut self,
        id: &str,
        name: Option<&str>,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        let variable = VariableBuilder::default()
            .id(id)
            .name(name.map(str::to_string))
            .lower_bound(lower_bound)
            .upper_bound(upper_bound)
            .build()
            .map_err(|err| ProblemError::UnableToBuildVariable(err.to_string()))?
            .wrap();
        self.add_variable(variable)
    }
    // endregion Adding Variables

    // region Adding Constraints
    /// Add a constraint to the problem
    pub fn add_constraint(
        &mut self,
        constraint: Arc<RwLock<Constraint>>,
    ) -> Result<(), ProblemError> {
        self.validate_constraint(constraint.clone())?;
        self.num_constraints += 1;
        self.constraints
            .insert(constraint.read().unwrap().get_id(), constraint.clone());
        Ok(())
    }

    /// Create a new equality constraint and add it to the problem
    pub fn add_new_equality_constraint(
        &mut self,
        id: &str,
        variables: &[Arc<RwLock<Variable>>],
        coefficients: &[f64],
        equals: f64,
    ) -> Result<(), ProblemError> {
        let constraint = Constraint::new_equality(id, variables, coefficients, equals).wrap();
        self.add_constraint(constraint)
    }

    /// Create a new equality constraint using variable ids rather than variable references,
    /// and add it to the problem
    pub fn add_new_equality_constraint_by_id(
        &mut self,
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        equals: f64,
    ) -> Result<(), ProblemError> {
        let variables = self.gather_variables(variables)?;
        self.add_new_equality_constraint(id, &variables, coefficients, equals)
    }

    /// Create a new inequality constraint and add it to the problem
    pub fn add_new_inequality_constraint(
        &mut self,
        id: &str,
        variables: &[Arc<RwLock<Variable>>],
        coefficients: &[f64],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        let constraint =
            Constraint::new_inequality(id, variables, coefficients, lower_bound, upper_bound)
                .wrap();
        self.add_constraint(constraint)
    }

    /// Create a new inequality constraint using variable ids rather than variable references,
    /// and add it to the problem
    pub fn add_new_inequality_constraint_by_id(
        &mut self,
        id: &str,
        variables: &[&str],
        coefficients: &[f64],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ProblemError> {
        let variables = self.gather_variables(variables)?;
        self.add_new_inequality_constraint(id, &variables, coefficients, lower_bound, upper_bound)
    }
    // endregion Adding Constraints

    // region Adding Objective Terms
    /// Add a new linear term to the objective
    pub fn add_new_linear_objective_term(
        &mut self,
        variable: Arc<RwLock<Variable>>,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        self.validate_objective_term(&variable)?;
        self.objective.add_linear_term(variable, coefficient);
        Ok(())
    }

    /// Add a new linear term to the objective using the variable id
    pub fn add_new_linear_objective_term_by_id(
        &mut self,
        variable_id: &str,
        coefficient: f64,
    ) -> Result<(), ProblemError> {
        let variable = match self.variables.get(variable_id) {
            Some(variable) => variable.clone(),
            None => return Err(NonExistentVariablesInObjective),
        };
        self.add_new_linear_objective_term(variable, coefficient)
    }
    // endregion Adding Objective Terms

    // region Optimization
    /// Optimize the problem with the solver selected in the global configuration
    ///
    /// Returns a [`ProblemSolution`], whose status indicates whether an optimum
    /// was found; infeasibility and unboundedness are reported through the status
    /// rather than as errors.
    pub fn optimize(&mut self) -> Result<ProblemSolution, SolverError> {
        let solver = CONFIGURATION.read().unwrap().solver.clone();
        let solution = match solver {
            Solver::Microlp => solvers::microlp::solve(self)?,
        };
        self.status = solution.status;
        self.variable_values = solution.variable_values.clone();
        Ok(solution)
    }
    // endregion Optimization

    // region Validation Functions
    /// Look up a slice of variable ids, failing if any is not part of the problem
    fn gather_variables(
        &self,
        variable_ids: &[&str],
    ) -> Result<Vec<Arc<RwLock<Variable>>>, ProblemError> {
        variable_ids
            .iter()
            .map(|variable_id| {
                self.variables
                    .get(*variable_id)
                    .cloned()
                    .ok_or(NonExistentVariable)
            })
            .collect()
    }

    /// Check that a variable to be added is valid to add to this problem
    fn validate_variable(&self, variable: Arc<RwLock<Variable>>) -> Result<(), ProblemError> {
        // Check if there is already a variable with this id
        if self.variables.get(&variable.read().unwrap().id).is_some() {
            return Err(ProblemError::VariableIdAlreadyExists);
        };
        // Check if the variable bounds are valid
        let lower_bound = variable.read().unwrap().lower_bound;
        let upper_bound = variable.read().unwrap().upper_bound;
        if lower_bound > upper_bound {
            return Err(ProblemError::InvalidVariableBounds);
        }
        Ok(())
    }

    /// Check that a constraint to be added is valid to add to this Problem
    fn validate_constraint(&self, constraint: Arc<RwLock<Constraint>>) -> Result<(), ProblemError> {
        // Check that a constraint with the same id doesn't already exist
        if self
            .constraints
            .get(&constraint.read().unwrap().get_id())
            .is_some()
        {
            return Err(ProblemError::ConstraintAlreadyExists);
        }
        // Check that for inequality constraints the bounds make sense
        match *constraint.read().unwrap() {
            Constraint::Equality { .. } => {}
            Constraint::Inequality {
                lower_bound,
                upper_bound,
                ..
            } => {
                if lower_bound > upper_bound {
                    return Err(ProblemError::InvalidConstraintBounds);
                }
            }
        }
        // Check that the variables in this constraint are in the problem
        for variable in constraint.read().unwrap().get_variables() {
            if let Some(problem_variable) = self.variables.get(&variable.read().unwrap().id) {
                if !Arc::ptr_eq(&variable, problem_variable) {
                    return Err(ProblemError::NonExistentVariablesInConstraint);
                }
            } else {
                return Err(ProblemError::NonExistentVariablesInConstraint);
            }
        }
        Ok(())
    }

    /// Check that an objective term's variable is part of this Problem
    fn validate_objective_term(&self, variable: &Arc<RwLock<Variable>>) -> Result<(), ProblemError> {
        if let Some(problem_variable) = self.variables.get(&variable.read().unwrap().id) {
            if !Arc::ptr_eq(variable, problem_variable) {
                return Err(NonExistentVariablesInObjective);
            }
        } else {
            return Err(NonExistentVariablesInObjective);
        }
        Ok(())
    }
    // endregion Validation Functions

    /// Accumulate the objective coefficient per variable id
    pub(crate) fn objective_coefficients(&self) -> IndexMap<String, f64> {
        let mut coefficients: IndexMap<String, f64> = IndexMap::new();
        for ObjectiveTerm {
            variable,
            coefficient,
        } in &self.objective.terms
        {
            *coefficients
                .entry(variable.read().unwrap().id.clone())
                .or_insert(0.0) += coefficient;
        }
        coefficients
    }
}

/// Errors associated with the Problem
#[derive(Error, Debug, Clone)]
pub enum ProblemError {
    /// Error when trying to add a variable with the same id as an existing variable
    #[error("Tried to add a variable with the same id as an existing variable")]
    VariableIdAlreadyExists,
    /// Error when trying to add variable with invalid bounds
    #[error("Tried to add a variable with lower_bound>upper_bound")]
    InvalidVariableBounds,
    /// Error when a variable could not be constructed
    #[error("Unable to build variable: {0}")]
    UnableToBuildVariable(String),
    /// Error when trying to add a constraint with the same id as an existing constraint
    #[error("Tried to add a constraint with the same id as an existing constraint")]
    ConstraintAlreadyExists,
    /// Error when trying to add a constraint with invalid bounds
    #[error("Tried to add an inequality constraint with lower_bound > upper_bound")]
    InvalidConstraintBounds,
    /// Error when trying to add a constraint that contains variables not in the problem
    #[error("Tried to add a constraint with variables not in the problem")]
    NonExistentVariablesInConstraint,
    /// Error when trying to add an objective term which includes variables not in the problem
    #[error("Tried adding an objective term with variables not in the problem")]
    NonExistentVariablesInObjective,
    /// Error when trying to reference a variable that doesn't exist
    #[error("Tried to access a variable that doesn't exist")]
    NonExistentVariable,
}
