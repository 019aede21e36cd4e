//! This module provides the RbaModel struct for representing an entire cell model
use std::collections::HashMap;

use indexmap::IndexMap;
use nalgebra_sparse::{coo::CooMatrix, csr::CsrMatrix};
use thiserror::Error;

use crate::cell_model::enzyme::Enzyme;
use crate::cell_model::metabolite::Metabolite;
use crate::cell_model::process::Process;
use crate::cell_model::reaction::Reaction;
use crate::cell_model::result::RbaResult;
use crate::configuration::CONFIGURATION;
use crate::optimize::problem::{Problem, ProblemError};
use crate::optimize::solvers::SolverError;
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Represents a resource balance cell model
#[derive(Clone, Debug)]
pub struct RbaModel {
    /// Map of metabolite ids to Metabolite objects
    pub metabolites: IndexMap<String, Metabolite>,
    /// Map of reaction ids to Reaction objects
    pub reactions: IndexMap<String, Reaction>,
    /// Map of enzyme ids to Enzyme objects
    pub enzymes: IndexMap<String, Enzyme>,
    /// Map of process ids to Process objects
    pub processes: IndexMap<String, Process>,
    /// Medium composition, nutrient id to concentration
    medium: IndexMap<String, f64>,
    /// Upper bound on the summed mass of enzymes and machineries (g per g biomass)
    pub protein_density_bound: f64,
    /// Id associated with the model
    pub id: Option<String>,
    /// A version identifier for the model, stored as a string
    pub version: Option<String>,
}

impl RbaModel {
    pub fn new_empty() -> Self {
        RbaModel {
            metabolites: IndexMap::new(),
            reactions: IndexMap::new(),
            enzymes: IndexMap::new(),
            processes: IndexMap::new(),
            medium: IndexMap::new(),
            protein_density_bound: f64::INFINITY,
            id: None,
            version: None,
        }
    }

    /// Add a metabolite to the model
    pub fn add_metabolite(&mut self, metabolite: Metabolite) {
        let id = metabolite.id.clone();
        self.metabolites.insert(id, metabolite);
    }

    /// Add a reaction to the model
    pub fn add_reaction(&mut self, reaction: Reaction) {
        let id = reaction.id.clone();
        self.reactions.insert(id, reaction);
    }

    /// Add an enzyme to the model
    pub fn add_enzyme(&mut self, enzyme: Enzyme) {
        let id = enzyme.id.clone();
        self.enzymes.insert(id, enzyme);
    }

    /// Add a process machinery to the model
    pub fn add_process(&mut self, process: Process) {
        let id = process.id.clone();
        self.processes.insert(id, process);
    }

    /// The current medium composition
    pub fn medium(&self) -> &IndexMap<String, f64> {
        &self.medium
    }

    /// Replace the medium composition
    ///
    /// The whole mapping is assigned at once; keys present in the new mapping
    /// but absent from the old one are added, and keys absent from the new
    /// mapping are removed.
    pub fn set_medium(&mut self, medium: IndexMap<String, f64>) {
        self.medium = medium;
    }

    // region Problem Construction

    /// Medium saturation factor of a reaction
    ///
    /// 1.0 for non-transport reactions; `c / (K + c)` for transport reactions,
    /// with a nutrient missing from the medium treated as concentration zero.
    fn saturation(&self, reaction: &Reaction) -> f64 {
        match &reaction.transport {
            Some(transport) => {
                let concentration = self
                    .medium
                    .get(&transport.nutrient)
                    .copied()
                    .unwrap_or(0.0);
                let denominator = transport.saturation_constant + concentration;
                if denominator > 0.0 {
                    concentration / denominator
                } else {
                    0.0
                }
            }
            None => 1.0,
        }
    }

    /// Assemble the stoichiometry matrix over internal metabolites
    ///
    /// Rows follow the returned (metabolite id, biomass demand) list, columns
    /// follow the model's reaction order. Stoichiometry entries referencing
    /// metabolites not present in the model are treated as boundary species.
    fn stoichiometry_matrix(&self) -> (CsrMatrix<f64>, Vec<(String, f64)>) {
        let internal: Vec<(String, f64)> = self
            .metabolites
            .iter()
            .filter(|(_, metabolite)| !metabolite.boundary)
            .map(|(id, metabolite)| (id.clone(), metabolite.biomass_demand))
            .collect();
        let row_of: HashMap<&str, usize> = internal
            .iter()
            .enumerate()
            .map(|(row, (id, _))| (id.as_str(), row))
            .collect();

        let mut coo = CooMatrix::new(internal.len(), self.reactions.len());
        for (column, reaction) in self.reactions.values().enumerate() {
            for (metabolite_id, &coefficient) in &reaction.stoichiometry {
                if let Some(&row) = row_of.get(metabolite_id.as_str()) {
                    coo.push(row, column, coefficient);
                }
            }
        }
        (CsrMatrix::from(&coo), internal)
    }

    /// Build the feasibility problem for a fixed growth rate
    ///
    /// The problem has one flux variable per reaction and one concentration
    /// variable per enzyme and process machinery, with mass balance, capacity
    /// and density constraints as described on [`RbaModel::solve`]. The
    /// objective minimizes the total enzyme and machinery concentration, so an
    /// optimal solution is the parsimonious one.
    pub fn build_problem(&self, growth_rate: f64) -> Result<Problem, SolveError> {
        let mut problem = Problem::new_minimization();

        // Flux variables; transport reactions without an enzyme have their
        // bounds scaled by the medium saturation directly
        for (reaction_id, reaction) in &self.reactions {
            let saturation = self.saturation(reaction);
            let (mut lower_bound, mut upper_bound) = (reaction.lower_bound, reaction.upper_bound);
            if reaction.enzyme.is_none() && reaction.transport.is_some() {
                lower_bound *= saturation;
                upper_bound *= saturation;
            }
            problem.add_new_variable(
                reaction_id,
                reaction.name.as_deref(),
                lower_bound,
                upper_bound,
            )?;
        }

        // Concentration variables, all minimized
        for enzyme_id in self.enzymes.keys() {
            problem.add_new_variable(enzyme_id, None, 0.0, f64::INFINITY)?;
            problem.add_new_linear_objective_term_by_id(enzyme_id, 1.0)?;
        }
        for process_id in self.processes.keys() {
            problem.add_new_variable(process_id, None, 0.0, f64::INFINITY)?;
            problem.add_new_linear_objective_term_by_id(process_id, 1.0)?;
        }

        // Mass balance: S v = mu * b for every internal metabolite
        let (matrix, internal) = self.stoichiometry_matrix();
        for (row, (metabolite_id, biomass_demand)) in matrix.row_iter().zip(&internal) {
            if row.col_indices().is_empty() {
                // An empty row reads 0 = mu * b, which only holds when the
                // right hand side is zero
                if growth_rate * biomass_demand != 0.0 {
                    return Err(SolveError::UnsatisfiableMassBalance {
                        metabolite: metabolite_id.clone(),
                    });
                }
                continue;
            }
            let variable_ids: Vec<&str> = row
                .col_indices()
                .iter()
                .map(|&column| self.reactions.get_index(column).unwrap().0.as_str())
                .collect();
            problem.add_new_equality_constraint_by_id(
                &format!("mass_balance_{metabolite_id}"),
                &variable_ids,
                row.values(),
                growth_rate * biomass_demand,
            )?;
        }

        // Enzyme capacity: |v| within the saturated efficiencies times the
        // enzyme concentration
        for (enzyme_id, enzyme) in &self.enzymes {
            let reaction =
                self.reactions
                    .get(&enzyme.reaction)
                    .ok_or_else(|| SolveError::UnknownReaction {
                        enzyme: enzyme_id.clone(),
                        reaction: enzyme.reaction.clone(),
                    })?;
            let saturation = self.saturation(reaction);
            problem.add_new_inequality_constraint_by_id(
                &format!("capacity_fwd_{enzyme_id}"),
                &[reaction.id.as_str(), enzyme_id.as_str()],
                &[1.0, -enzyme.forward_efficiency * saturation],
                f64::NEG_INFINITY,
                0.0,
            )?;
            if reaction.is_reversible() {
                problem.add_new_inequality_constraint_by_id(
                    &format!("capacity_rev_{enzyme_id}"),
                    &[reaction.id.as_str(), enzyme_id.as_str()],
                    &[-1.0, -enzyme.reverse_efficiency * saturation],
                    f64::NEG_INFINITY,
                    0.0,
                )?;
            }
        }

        // Process capacity: mu * sum(cost * concentration) <= rate * machinery
        for (process_id, process) in &self.processes {
            let mut coefficients: IndexMap<&str, f64> = IndexMap::new();
            for (enzyme_id, enzyme) in &self.enzymes {
                if let Some(&cost) = enzyme.composition.get(process_id) {
                    *coefficients.entry(enzyme_id.as_str()).or_insert(0.0) += growth_rate * cost;
                }
            }
            for (other_id, other) in &self.processes {
                if let Some(&cost) = other.composition.get(process_id) {
                    *coefficients.entry(other_id.as_str()).or_insert(0.0) += growth_rate * cost;
                }
            }
            *coefficients.entry(process_id.as_str()).or_insert(0.0) -= process.capacity_rate;
            let (variable_ids, values): (Vec<&str>, Vec<f64>) = coefficients.into_iter().unzip();
            problem.add_new_inequality_constraint_by_id(
                &format!("capacity_{process_id}"),
                &variable_ids,
                &values,
                f64::NEG_INFINITY,
                0.0,
            )?;
        }

        // Protein density: total mass of enzymes and machineries is capped
        if self.protein_density_bound.is_finite() {
            let mut variable_ids: Vec<&str> = Vec::new();
            let mut weights: Vec<f64> = Vec::new();
            for (enzyme_id, enzyme) in &self.enzymes {
                variable_ids.push(enzyme_id.as_str());
                weights.push(enzyme.molecular_weight);
            }
            for (process_id, process) in &self.processes {
                variable_ids.push(process_id.as_str());
                weights.push(process.molecular_weight);
            }
            if !variable_ids.is_empty() {
                problem.add_new_inequality_constraint_by_id(
                    "protein_density",
                    &variable_ids,
                    &weights,
                    f64::NEG_INFINITY,
                    self.protein_density_bound,
                )?;
            }
        }

        Ok(problem)
    }

    // endregion Problem Construction

    // region Solving

    /// Solve the model for its maximal growth rate
    ///
    /// At a fixed growth rate mu the model is a linear feasibility problem:
    /// - mass balance, `S v = mu * b`, for every internal metabolite;
    /// - enzyme capacity, `v <= k_fwd * sat * e` and `-v <= k_rev * sat * e`;
    /// - process capacity, `mu * sum(cost * concentration) <= rate * machinery`;
    /// - a cap on the total protein mass.
    ///
    /// The maximal feasible mu is located by bisection over
    /// `[0, max_growth_rate]` using the tolerance from the global
    /// configuration, and the solution at that point is returned as an
    /// [`RbaResult`].
    pub fn solve(&self) -> Result<RbaResult, SolveError> {
        let (max_growth_rate, tolerance, max_bisections) = {
            let configuration = CONFIGURATION.read().unwrap();
            (
                configuration.max_growth_rate,
                configuration.growth_tolerance,
                configuration.max_bisections,
            )
        };

        let mut best = match self.solve_at(0.0)? {
            Some(solution) => solution,
            None => return Err(SolveError::Infeasible),
        };
        let mut feasible = 0.0;
        let mut infeasible = max_growth_rate;

        if let Some(solution) = self.solve_at(max_growth_rate)? {
            // The whole search interval is feasible; growth is limited by the
            // configured ceiling rather than the model
            return Ok(self.collect_result(max_growth_rate, &solution));
        }

        for _ in 0..max_bisections {
            if infeasible - feasible <= tolerance {
                break;
            }
            let midpoint = 0.5 * (feasible + infeasible);
            match self.solve_at(midpoint)? {
                Some(solution) => {
                    best = solution;
                    feasible = midpoint;
                }
                None => infeasible = midpoint,
            }
        }

        Ok(self.collect_result(feasible, &best))
    }

    /// Solve the feasibility problem at a fixed growth rate
    ///
    /// Returns Some(solution) if the problem is feasible, None if it is
    /// infeasible, and an error for any other solver outcome.
    fn solve_at(&self, growth_rate: f64) -> Result<Option<ProblemSolution>, SolveError> {
        let mut problem = match self.build_problem(growth_rate) {
            Ok(problem) => problem,
            // An unsatisfiable balance row makes this growth rate infeasible
            Err(SolveError::UnsatisfiableMassBalance { .. }) => return Ok(None),
            Err(error) => return Err(error),
        };
        let solution = problem.optimize()?;
        match solution.status {
            OptimizationStatus::Optimal => Ok(Some(solution)),
            OptimizationStatus::Infeasible => Ok(None),
            status => Err(SolveError::UnexpectedStatus(status)),
        }
    }

    /// Assemble an [`RbaResult`] from a feasible solution
    fn collect_result(&self, growth_rate: f64, solution: &ProblemSolution) -> RbaResult {
        let empty = IndexMap::new();
        let values = solution.variable_values.as_ref().unwrap_or(&empty);
        let value_of = |id: &String| values.get(id).copied().unwrap_or(0.0);

        let reaction_fluxes: IndexMap<String, f64> = self
            .reactions
            .keys()
            .map(|id| (id.clone(), value_of(id)))
            .collect();
        let enzyme_concentrations: IndexMap<String, f64> = self
            .enzymes
            .keys()
            .map(|id| (id.clone(), value_of(id)))
            .collect();
        let process_machinery_concentrations: IndexMap<String, f64> = self
            .processes
            .keys()
            .map(|id| (id.clone(), value_of(id)))
            .collect();
        let transport_reactions: Vec<String> = self
            .reactions
            .iter()
            .filter(|(_, reaction)| {
                reaction.transport.is_some()
                    || reaction.stoichiometry.keys().any(|metabolite_id| {
                        self.metabolites
                            .get(metabolite_id)
                            .map_or(false, |metabolite| metabolite.boundary)
                    })
            })
            .map(|(id, _)| id.clone())
            .collect();

        RbaResult {
            growth_rate,
            reaction_fluxes,
            enzyme_concentrations,
            process_machinery_concentrations,
            transport_reactions,
        }
    }

    // endregion Solving
}

/// Errors raised while building or solving the growth problem
#[derive(Error, Debug)]
pub enum SolveError {
    /// The model admits no solution even at zero growth
    #[error("model is infeasible even at zero growth")]
    Infeasible,
    /// An enzyme references a reaction the model doesn't contain
    #[error("enzyme {enzyme} references unknown reaction {reaction}")]
    UnknownReaction { enzyme: String, reaction: String },
    /// A metabolite with a growth coupled demand appears in no reaction, so
    /// its balance row cannot hold at a positive growth rate
    #[error("metabolite {metabolite} has a biomass demand but no reactions")]
    UnsatisfiableMassBalance { metabolite: String },
    /// The solver returned a status the growth search can't act on
    #[error("solver returned {0:?} while probing a growth rate")]
    UnexpectedStatus(OptimizationStatus),
    /// The problem could not be assembled
    #[error(transparent)]
    Problem(#[from] ProblemError),
    /// The solver backend failed
    #[error(transparent)]
    Solver(#[from] SolverError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_model::enzyme::EnzymeBuilder;
    use crate::cell_model::metabolite::MetaboliteBuilder;
    use crate::cell_model::process::ProcessBuilder;
    use crate::cell_model::reaction::{ReactionBuilder, Transport};
    use approx::assert_relative_eq;

    /// A single uptake reaction feeding a biomass precursor, catalyzed by an
    /// enzyme whose synthesis loads a self-replicating ribosome-like process.
    fn ribosome_limited_model() -> RbaModel {
        let mut model = RbaModel::new_empty();
        model.add_metabolite(
            MetaboliteBuilder::default()
                .id("M_prec")
                .biomass_demand(1.0)
                .build()
                .unwrap(),
        );
        model.add_reaction(
            ReactionBuilder::default()
                .id("R_upt")
                .stoichiometry(IndexMap::from([("M_prec".to_string(), 1.0)]))
                .lower_bound(0.0)
                .upper_bound(1000.0)
                .enzyme("E_upt".to_string())
                .build()
                .unwrap(),
        );
        model.add_enzyme(
            EnzymeBuilder::default()
                .id("E_upt")
                .reaction("R_upt")
                .forward_efficiency(10.0)
                .composition(IndexMap::from([("P_rib".to_string(), 500.0)]))
                .molecular_weight(0.05)
                .build()
                .unwrap(),
        );
        model.add_process(
            ProcessBuilder::default()
                .id("P_rib")
                .capacity_rate(36000.0)
                .composition(IndexMap::from([("P_rib".to_string(), 7459.0)]))
                .molecular_weight(0.8)
                .build()
                .unwrap(),
        );
        model.protein_density_bound = 1e6;
        model
    }

    #[test]
    fn set_medium_replaces_the_mapping() {
        let mut model = RbaModel::new_empty();
        model.set_medium(IndexMap::from([
            ("M_glc".to_string(), 1.0),
            ("M_o2".to_string(), 0.2),
        ]));
        assert_eq!(model.medium().len(), 2);

        let mut medium = model.medium().clone();
        medium.insert("M_glc".to_string(), 5.0);
        model.set_medium(medium);
        assert_eq!(model.medium()["M_glc"], 5.0);
        assert_eq!(model.medium()["M_o2"], 0.2);
    }

    #[test]
    fn build_problem_shape() {
        let model = ribosome_limited_model();
        let problem = model.build_problem(0.1).unwrap();
        // One flux, one enzyme, one machinery variable
        assert_eq!(problem.variables.len(), 3);
        // Mass balance, forward capacity, process capacity, density
        assert!(problem.constraints.contains_key("mass_balance_M_prec"));
        assert!(problem.constraints.contains_key("capacity_fwd_E_upt"));
        assert!(problem.constraints.contains_key("capacity_P_rib"));
        assert!(problem.constraints.contains_key("protein_density"));
        // Irreversible reaction, so no reverse capacity row
        assert!(!problem.constraints.contains_key("capacity_rev_E_upt"));
    }

    #[test]
    fn solve_converges_to_ribosome_limit() {
        let model = ribosome_limited_model();
        let result = model.solve().unwrap();
        // Growth is capped by ribosome self-replication: the process row
        // becomes unsatisfiable at mu = capacity_rate / self cost
        assert_relative_eq!(result.growth_rate, 36000.0 / 7459.0, epsilon = 1e-3);
        // Mass balance pins the uptake flux to mu, and the parsimonious
        // objective pins the enzyme to its capacity minimum
        assert_relative_eq!(
            result.reaction_fluxes["R_upt"],
            result.growth_rate,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            result.enzyme_concentrations["E_upt"],
            result.growth_rate / 10.0,
            epsilon = 1e-6
        );
        assert!(result.process_machinery_concentrations["P_rib"] > 0.0);
    }

    #[test]
    fn transport_saturation_limits_growth() {
        let mut model = RbaModel::new_empty();
        model.add_metabolite(
            MetaboliteBuilder::default()
                .id("M_prec")
                .biomass_demand(1.0)
                .build()
                .unwrap(),
        );
        model.add_reaction(
            ReactionBuilder::default()
                .id("R_upt")
                .stoichiometry(IndexMap::from([("M_prec".to_string(), 1.0)]))
                .lower_bound(0.0)
                .upper_bound(10.0)
                .transport(Transport {
                    nutrient: "M_glc".to_string(),
                    saturation_constant: 1.0,
                })
                .build()
                .unwrap(),
        );
        model.set_medium(IndexMap::from([("M_glc".to_string(), 1.0)]));

        // Half saturated uptake caps the flux at 5, and mass balance pins
        // the growth rate to the flux
        let result = model.solve().unwrap();
        assert_relative_eq!(result.growth_rate, 5.0, epsilon = 1e-4);
        assert_relative_eq!(result.reaction_fluxes["R_upt"], 5.0, epsilon = 1e-4);

        // An empty medium means no uptake and no growth
        model.set_medium(IndexMap::new());
        let starved = model.solve().unwrap();
        assert_relative_eq!(starved.growth_rate, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn infeasible_model_errors() {
        let mut model = RbaModel::new_empty();
        model.add_metabolite(MetaboliteBuilder::default().id("M_a").build().unwrap());
        // Forced consumption of a metabolite nothing produces
        model.add_reaction(
            ReactionBuilder::default()
                .id("R_drain")
                .stoichiometry(IndexMap::from([("M_a".to_string(), -1.0)]))
                .lower_bound(5.0)
                .upper_bound(10.0)
                .build()
                .unwrap(),
        );
        assert!(matches!(model.solve(), Err(SolveError::Infeasible)));
    }

    #[test]
    fn unproduced_demand_limits_growth_to_zero() {
        let mut model = RbaModel::new_empty();
        model.add_metabolite(
            MetaboliteBuilder::default()
                .id("M_orphan")
                .biomass_demand(1.0)
                .build()
                .unwrap(),
        );

        // At a positive growth rate the balance row reads 0 = mu, which
        // cannot hold
        assert!(matches!(
            model.build_problem(1.0),
            Err(SolveError::UnsatisfiableMassBalance { .. })
        ));
        assert!(model.build_problem(0.0).is_ok());

        // The growth search must settle at zero, not the configured ceiling
        let result = model.solve().unwrap();
        assert_eq!(result.growth_rate, 0.0);
    }

    #[test]
    fn enzyme_with_unknown_reaction_errors() {
        let mut model = RbaModel::new_empty();
        model.add_enzyme(
            EnzymeBuilder::default()
                .id("E_orphan")
                .reaction("R_missing")
                .forward_efficiency(1.0)
                .build()
                .unwrap(),
        );
        assert!(matches!(
            model.build_problem(0.0),
            Err(SolveError::UnknownReaction { .. })
        ));
    }
}
