use crate::evaluation::{BooleanResolver, EvaluationError};
use crate::expression::ExpressionTree;
use crate::simulation::{
    Constraints, Convergence, LpSolver, RegulatoryState, Sense, SimulationConfig, SimulationError,
    Solution, Trajectory,
};
use crate::RegulatoryMetabolicModel;
use num_traits::Zero;
use std::collections::{BTreeMap, HashSet};

/// An interaction with parsed events.
struct CompiledInteraction {
    target: String,
    events: Vec<(f64, ExpressionTree)>,
}

impl CompiledInteraction {
    /// The coefficient of the first event that holds, or `0` if there is none.
    fn evaluate(&self, resolver: &BooleanResolver) -> Result<f64, EvaluationError> {
        for (coefficient, expression) in &self.events {
            if expression.evaluate_boolean(resolver)? {
                return Ok(*coefficient);
            }
        }
        Ok(0.0)
    }
}

/// Couples the regulatory network of a [`RegulatoryMetabolicModel`] with flux balance
/// analysis performed by an [`LpSolver`].
///
/// One simulation step performs:
///  1. *Regulatory decode*: every interaction targeting a gene or regulator is evaluated
///     against the same snapshot of the current state (synchronous update).
///  2. *Metabolic decode*: interactions targeting reactions or metabolites are evaluated
///     against the state updated by step 1.
///
/// A state is then turned into flux constraints (reactions whose GPR is false, or which are
/// regulated to zero, are blocked) and the objective is optimized by the solver.
///
/// All rules are parsed when the engine is created, so malformed rules are reported before
/// any simulation starts. The engine owns the solver, hence one engine should be used per
/// concurrent task.
pub struct RegulatoryMetabolicEngine<'a, S: LpSolver> {
    model: &'a RegulatoryMetabolicModel,
    solver: S,
    config: SimulationConfig,
    regulatory: Vec<CompiledInteraction>,
    metabolic: Vec<CompiledInteraction>,
    metabolic_ids: HashSet<String>,
}

impl<'a, S: LpSolver> RegulatoryMetabolicEngine<'a, S> {
    /// Create a new engine, parsing all rules of the `model` and registering its reactions
    /// (variables) and steady-state mass balance (one equality per metabolite) with the
    /// `solver`.
    pub fn new(
        model: &'a RegulatoryMetabolicModel,
        mut solver: S,
        config: SimulationConfig,
    ) -> Result<Self, SimulationError> {
        let metabolic_ids = model
            .reactions
            .iter()
            .map(|it| it.id.clone())
            .chain(model.metabolites.iter().map(|it| it.id.clone()))
            .collect::<HashSet<_>>();

        let mut regulatory = Vec::new();
        let mut metabolic = Vec::new();
        for interaction in &model.interactions {
            let compiled = CompiledInteraction {
                target: interaction.target.clone(),
                events: interaction.parse_events()?,
            };
            if metabolic_ids.contains(&interaction.target) {
                metabolic.push(compiled);
            } else {
                regulatory.push(compiled);
            }
        }

        for reaction in &model.reactions {
            // Populates the GPR cache.
            reaction.gpr()?;
            solver
                .add_variable(&reaction.id, reaction.lower_bound, reaction.upper_bound)
                .map_err(SimulationError::Solver)?;
        }

        for metabolite in &model.metabolites {
            let coefficients = model
                .reactions
                .iter()
                .filter_map(|reaction| {
                    let coefficient = reaction.stoichiometry.get(&metabolite.id)?;
                    Some((reaction.id.clone(), *coefficient))
                })
                .collect::<BTreeMap<_, _>>();
            if coefficients.is_empty() {
                log::debug!("Metabolite `{}` is not used by any reaction.", metabolite.id);
                continue;
            }
            solver
                .add_constraint(&metabolite.id, &coefficients, Sense::Equal, 0.0)
                .map_err(SimulationError::Solver)?;
        }

        log::debug!(
            "Engine for model `{}` created ({} regulatory and {} metabolic interactions).",
            model.id,
            regulatory.len(),
            metabolic.len()
        );

        Ok(RegulatoryMetabolicEngine {
            model,
            solver,
            config,
            regulatory,
            metabolic,
            metabolic_ids,
        })
    }

    #[must_use]
    pub fn model(&self) -> &RegulatoryMetabolicModel {
        self.model
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Consume the engine, returning the solver.
    pub fn into_solver(self) -> S {
        self.solver
    }

    /// The initial state: every regulator and every gene is active (`1`), unless
    /// `overrides` say otherwise. Overrides can also seed reactions or metabolites.
    #[must_use]
    pub fn initial_state(&self, overrides: &RegulatoryState) -> RegulatoryState {
        let mut state = self
            .model
            .regulators
            .iter()
            .chain(self.model.genes.iter())
            .map(|id| (id.clone(), 1.0))
            .collect::<RegulatoryState>();
        state.extend(overrides.iter().map(|(id, value)| (id.clone(), *value)));
        state
    }

    /// Evaluate all interactions that target genes or regulators. Every interaction sees the
    /// same `state`, hence the result does not depend on the order of interactions.
    ///
    /// Returns the new coefficients of the regulated targets only.
    pub fn decode_regulatory_state(
        &self,
        state: &RegulatoryState,
    ) -> Result<RegulatoryState, EvaluationError> {
        Self::decode(&self.regulatory, state)
    }

    /// Same as [`RegulatoryMetabolicEngine::decode_regulatory_state`], but for interactions
    /// that target reactions or metabolites.
    pub fn decode_metabolic_state(
        &self,
        state: &RegulatoryState,
    ) -> Result<RegulatoryState, EvaluationError> {
        Self::decode(&self.metabolic, state)
    }

    fn decode(
        interactions: &[CompiledInteraction],
        state: &RegulatoryState,
    ) -> Result<RegulatoryState, EvaluationError> {
        let resolver = BooleanResolver::from_state(state);
        interactions
            .iter()
            .map(|interaction| {
                let value = interaction.evaluate(&resolver)?;
                Ok((interaction.target.clone(), value))
            })
            .collect()
    }

    /// Perform one simulation step: regulatory decode on `state`, then metabolic decode
    /// on the updated state.
    pub fn step(&self, state: &RegulatoryState) -> Result<RegulatoryState, EvaluationError> {
        let mut next = state.clone();
        next.extend(self.decode_regulatory_state(state)?);
        let metabolic = self.decode_metabolic_state(&next)?;
        next.extend(metabolic);
        Ok(next)
    }

    /// Derive flux constraints from a state.
    ///
    /// A reaction is blocked (bounds `(0, 0)`) if its GPR is not empty and does not hold, or
    /// if the state assigns it a zero coefficient (it was regulated or overridden to zero).
    /// Reactions with an empty GPR are not constrained by genes.
    pub fn decode_constraints(&self, state: &RegulatoryState) -> Result<Constraints, SimulationError> {
        let resolver = BooleanResolver::from_state(state);
        let mut constraints = Constraints::new();
        for reaction in &self.model.reactions {
            let gpr = reaction.gpr()?;
            let gpr_blocked = !gpr.is_empty() && !gpr.evaluate_boolean(&resolver)?;
            let regulated_off = state.get(&reaction.id).is_some_and(Zero::is_zero);
            if gpr_blocked || regulated_off {
                constraints.insert(reaction.id.clone(), (0.0, 0.0));
            }
        }
        Ok(constraints)
    }

    /// Apply the constraints of `state` and optimize the objective of the model.
    pub fn solve(&mut self, state: &RegulatoryState) -> Result<Solution, SimulationError> {
        let constraints = self.decode_constraints(state)?;
        let solution = self
            .solver
            .solve(&self.model.objective, self.config.minimize, &constraints)
            .map_err(SimulationError::Solver)?;
        log::debug!(
            "Solved with {} blocked reaction(s): {:?} (objective: {:?}).",
            constraints.len(),
            solution.status,
            solution.objective_value
        );
        Ok(solution)
    }

    /// Steady-state simulation: a single step from the initial state followed by one solve.
    pub fn steady_state(&mut self, overrides: &RegulatoryState) -> Result<Solution, SimulationError> {
        let initial = self.initial_state(overrides);
        let state = self.step(&initial)?;
        self.solve(&state)
    }

    /// Dynamic simulation: repeat simulation steps until a previously visited state is
    /// reached (a cyclic attractor) or until `max_iterations` steps were performed. Then
    /// solve one problem per state of the attractor (or of the whole partial trajectory).
    pub fn dynamic(&mut self, overrides: &RegulatoryState) -> Result<Trajectory, SimulationError> {
        let mut current = self.initial_state(overrides);
        let mut history = vec![current.clone()];
        let mut convergence = Convergence::IterationLimitReached;
        let mut iterations = 0;
        while iterations < self.config.max_iterations {
            iterations += 1;
            let next = self.step(&current)?;
            if let Some(start) = history.iter().position(|it| self.states_match(it, &next)) {
                log::info!(
                    "Attractor of length {} found after {iterations} step(s).",
                    history.len() - start
                );
                convergence = Convergence::Attractor { start };
                break;
            }
            log::debug!("Step {iterations}: {next:?}");
            history.push(next.clone());
            current = next;
        }

        let states = match convergence {
            Convergence::Attractor { start } => history.split_off(start),
            Convergence::IterationLimitReached => {
                log::warn!(
                    "No attractor found within {} iterations; returning the partial trajectory.",
                    self.config.max_iterations
                );
                history
            }
        };

        let solutions = states
            .iter()
            .map(|state| self.solve(state))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Trajectory {
            states,
            solutions,
            convergence,
            iterations,
        })
    }

    /// Compare two states. Reactions and metabolites are compared by whether they carry flux
    /// (absolute value above tolerance), everything else by tolerant numeric equality.
    /// Missing entries are `0`.
    #[must_use]
    pub fn states_match(&self, a: &RegulatoryState, b: &RegulatoryState) -> bool {
        let tolerance = self.config.tolerance;
        a.keys().chain(b.keys()).all(|id| {
            let x = a.get(id).copied().unwrap_or_default();
            let y = b.get(id).copied().unwrap_or_default();
            if self.metabolic_ids.contains(id) {
                (x.abs() > tolerance) == (y.abs() > tolerance)
            } else {
                (x - y).abs() <= tolerance
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::model::tests::simple_model;
    use crate::simulation::tests::MockSolver;
    use crate::{
        Convergence, Interaction, Metabolite, Reaction, RegulatoryMetabolicEngine,
        RegulatoryMetabolicModel, RegulatoryState, Sense, SimulationConfig, SimulationError, Status,
    };

    fn state(items: &[(&str, f64)]) -> RegulatoryState {
        items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn engine(model: &RegulatoryMetabolicModel) -> RegulatoryMetabolicEngine<'_, MockSolver> {
        RegulatoryMetabolicEngine::new(model, MockSolver::default(), SimulationConfig::default())
            .unwrap()
    }

    /// `EX_a` imports `a`, `CONV` (requires gene `g1`) converts it. Gene `g1` is expressed
    /// only when regulator `O2` is present.
    fn two_reaction_model() -> RegulatoryMetabolicModel {
        let mut model = RegulatoryMetabolicModel::new("two-reactions");
        model.metabolites = vec![Metabolite::new("a")];
        model.genes = vec!["g1".to_string()];
        model.regulators = vec!["O2".to_string()];
        model.reactions = vec![
            Reaction::new("EX_a", 0.0, 10.0).with_metabolite("a", 1.0),
            Reaction::new("CONV", 0.0, 10.0)
                .with_metabolite("a", -1.0)
                .with_gpr("g1"),
        ];
        model.interactions = vec![Interaction::new("g1").with_event(1.0, "O2")];
        model.set_objective("CONV");
        model
    }

    /// A single regulator that inhibits itself: its value alternates every step.
    fn toggle_model() -> RegulatoryMetabolicModel {
        let mut model = RegulatoryMetabolicModel::new("toggle");
        model.regulators = vec!["R".to_string()];
        model.interactions = vec![Interaction::new("R").with_event(1.0, "not R")];
        model
    }

    #[test]
    fn registers_variables_and_mass_balance() {
        let model = simple_model();
        let solver = engine(&model).into_solver();
        assert_eq!(solver.variables.len(), 3);
        assert_eq!(solver.variables["EX_glc"], (0.0, 10.0));
        assert_eq!(solver.constraints.len(), 2);
        let (id, coefficients, sense, rhs) = &solver.constraints[0];
        assert_eq!(id, "glc");
        assert_eq!(coefficients["EX_glc"], 1.0);
        assert_eq!(coefficients["UPT"], -1.0);
        assert_eq!(*sense, Sense::Equal);
        assert_eq!(*rhs, 0.0);
    }

    #[test]
    fn initial_state_activates_genes_and_regulators() {
        let model = two_reaction_model();
        let engine = engine(&model);
        assert_eq!(
            engine.initial_state(&state(&[])),
            state(&[("O2", 1.0), ("g1", 1.0)])
        );
        assert_eq!(
            engine.initial_state(&state(&[("O2", 0.0), ("EX_a", 0.0)])),
            state(&[("O2", 0.0), ("g1", 1.0), ("EX_a", 0.0)])
        );
    }

    #[test]
    fn first_true_event_wins() {
        let mut model = RegulatoryMetabolicModel::new("events");
        model.regulators = vec!["R".to_string()];
        model.genes = vec!["T".to_string()];
        model.interactions = vec![
            Interaction::new("T")
                .with_event(1.0, "R>0")
                .with_event(0.0, "1"),
        ];
        let engine = engine(&model);

        let decoded = engine.decode_regulatory_state(&state(&[("R", 5.0)])).unwrap();
        assert_eq!(decoded, state(&[("T", 1.0)]));
        let decoded = engine.decode_regulatory_state(&state(&[("R", -1.0)])).unwrap();
        assert_eq!(decoded, state(&[("T", 0.0)]));
    }

    #[test]
    fn synchronous_update_is_order_independent() {
        let mut model = RegulatoryMetabolicModel::new("swap");
        model.genes = vec!["A".to_string(), "B".to_string()];
        model.interactions = vec![
            Interaction::new("A").with_event(1.0, "B"),
            Interaction::new("B").with_event(1.0, "A"),
        ];
        let mut reversed = model.clone();
        reversed.interactions.reverse();

        let initial = state(&[("A", 1.0), ("B", 0.0)]);
        let expected = state(&[("A", 0.0), ("B", 1.0)]);
        assert_eq!(engine(&model).step(&initial).unwrap(), expected);
        assert_eq!(engine(&reversed).step(&initial).unwrap(), expected);
    }

    #[test]
    fn metabolic_decode_sees_regulatory_result() {
        let mut model = two_reaction_model();
        // `CONV` is switched directly by the (already updated) gene `g1`.
        model.interactions.push(Interaction::new("CONV").with_event(1.0, "g1"));
        model.reactions[1].set_gpr(None);
        let engine = engine(&model);

        let initial = engine.initial_state(&state(&[("O2", 0.0)]));
        let next = engine.step(&initial).unwrap();
        assert_eq!(next["g1"], 0.0);
        assert_eq!(next["CONV"], 0.0);
        let constraints = engine.decode_constraints(&next).unwrap();
        assert_eq!(constraints.get("CONV"), Some(&(0.0, 0.0)));
    }

    #[test]
    fn inactive_regulator_blocks_reaction() {
        let model = two_reaction_model();
        let mut engine = engine(&model);

        let solution = engine.steady_state(&state(&[("O2", 0.0)])).unwrap();
        assert_eq!(solution.status, Status::Optimal);
        assert_eq!(solution.flux("CONV"), 0.0);
        assert_eq!(solution.objective_value, Some(0.0));

        let solution = engine.steady_state(&state(&[])).unwrap();
        assert_eq!(solution.flux("CONV"), 10.0);
        assert_eq!(engine.solver().solves, 2);
    }

    #[test]
    fn empty_gpr_adds_no_constraint() {
        let model = two_reaction_model();
        let engine = engine(&model);
        let constraints = engine
            .decode_constraints(&state(&[("O2", 0.0), ("g1", 0.0)]))
            .unwrap();
        assert_eq!(constraints.len(), 1);
        assert!(!constraints.contains_key("EX_a"));
    }

    #[test]
    fn infeasibility_is_not_an_error() {
        let mut model = two_reaction_model();
        model.reactions[1].lower_bound = 1.0;
        let mut engine = engine(&model);
        let solution = engine.steady_state(&state(&[("O2", 0.0)])).unwrap();
        assert_eq!(solution.status, Status::Infeasible);
        assert!(!solution.is_optimal());
    }

    #[test]
    fn solver_failure_is_an_error() {
        let model = two_reaction_model();
        let solver = MockSolver {
            fail: true,
            ..Default::default()
        };
        let mut engine =
            RegulatoryMetabolicEngine::new(&model, solver, SimulationConfig::default()).unwrap();
        let result = engine.steady_state(&state(&[]));
        assert!(matches!(result, Err(SimulationError::Solver(_))));
    }

    #[test]
    fn malformed_rules_fail_at_construction() {
        let mut model = two_reaction_model();
        model.reactions[1].set_gpr(Some("g1 and (g2"));
        let result =
            RegulatoryMetabolicEngine::new(&model, MockSolver::default(), SimulationConfig::default());
        assert!(matches!(result, Err(SimulationError::Expression(_))));

        let mut model = two_reaction_model();
        model.interactions[0] = Interaction::new("g1").with_event(1.0, "O2 or");
        let result =
            RegulatoryMetabolicEngine::new(&model, MockSolver::default(), SimulationConfig::default());
        assert!(matches!(result, Err(SimulationError::Expression(_))));
    }

    #[test]
    fn oscillation_is_an_attractor_of_length_two() {
        let model = toggle_model();
        let config = SimulationConfig {
            max_iterations: 10,
            ..Default::default()
        };
        let mut engine = RegulatoryMetabolicEngine::new(&model, MockSolver::default(), config).unwrap();
        let trajectory = engine.dynamic(&state(&[])).unwrap();
        assert_eq!(trajectory.convergence, Convergence::Attractor { start: 0 });
        assert!(trajectory.is_converged());
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.states[0], state(&[("R", 1.0)]));
        assert_eq!(trajectory.states[1], state(&[("R", 0.0)]));
        assert_eq!(trajectory.solutions.len(), 2);
        assert_eq!(trajectory.iterations, 2);
    }

    #[test]
    fn fixed_point_is_an_attractor_of_length_one() {
        let model = two_reaction_model();
        let mut engine = engine(&model);
        let trajectory = engine.dynamic(&state(&[("O2", 0.0)])).unwrap();
        // The initial state (`g1` active) is left after the first step and never revisited.
        assert_eq!(trajectory.convergence, Convergence::Attractor { start: 1 });
        assert_eq!(trajectory.states, vec![state(&[("O2", 0.0), ("g1", 0.0)])]);
        assert_eq!(trajectory.solutions[0].flux("CONV"), 0.0);
        assert_eq!(trajectory.iterations, 2);
    }

    /// Three regulators, each repressing the next one in the cycle `A -| B -| C -| A`.
    fn repressilator_model() -> RegulatoryMetabolicModel {
        let mut model = RegulatoryMetabolicModel::new("repressilator");
        model.regulators = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        model.interactions = vec![
            Interaction::new("A").with_event(1.0, "not C"),
            Interaction::new("B").with_event(1.0, "not A"),
            Interaction::new("C").with_event(1.0, "not B"),
        ];
        model
    }

    #[test]
    fn repressilator_attractors() {
        let model = repressilator_model();
        let mut engine = engine(&model);
        // 2^3 + 1 steps always suffice for three Boolean regulators.
        let bound = 9;

        let trajectory = engine.dynamic(&state(&[])).unwrap();
        assert_eq!(trajectory.convergence, Convergence::Attractor { start: 0 });
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.states[1], state(&[("A", 0.0), ("B", 0.0), ("C", 0.0)]));
        assert!(trajectory.iterations <= bound);

        let trajectory = engine.dynamic(&state(&[("B", 0.0), ("C", 0.0)])).unwrap();
        assert_eq!(trajectory.convergence, Convergence::Attractor { start: 0 });
        assert_eq!(trajectory.len(), 6);
        assert_eq!(trajectory.solutions.len(), 6);
        assert_eq!(trajectory.iterations, 6);
        assert!(trajectory.iterations <= bound);
        assert_eq!(trajectory.states[1], state(&[("A", 1.0), ("B", 0.0), ("C", 1.0)]));
        assert_eq!(trajectory.states[5], state(&[("A", 1.0), ("B", 1.0), ("C", 0.0)]));
    }

    #[test]
    fn iteration_limit_returns_partial_trajectory() {
        let model = toggle_model();
        let config = SimulationConfig {
            max_iterations: 1,
            ..Default::default()
        };
        let mut engine = RegulatoryMetabolicEngine::new(&model, MockSolver::default(), config).unwrap();
        let trajectory = engine.dynamic(&state(&[])).unwrap();
        assert_eq!(trajectory.convergence, Convergence::IterationLimitReached);
        assert!(!trajectory.is_converged());
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.solutions.len(), 2);
        assert_eq!(trajectory.iterations, 1);
    }

    #[test]
    fn metabolic_entries_compare_by_flux() {
        let model = two_reaction_model();
        let engine = engine(&model);
        assert!(engine.states_match(&state(&[("EX_a", 2.0)]), &state(&[("EX_a", 7.5)])));
        assert!(!engine.states_match(&state(&[("EX_a", 2.0)]), &state(&[("EX_a", 0.0)])));
        assert!(engine.states_match(&state(&[("EX_a", 0.0)]), &state(&[])));
        assert!(!engine.states_match(&state(&[("O2", 2.0)]), &state(&[("O2", 1.0)])));
        assert!(engine.states_match(&state(&[("O2", 1.0)]), &state(&[("O2", 1.0 + 1e-12)])));
    }
}
