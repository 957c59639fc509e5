//! Rust library for regulatory flux balance analysis (rFBA).
//!
//! A [`RegulatoryMetabolicModel`] combines a metabolic network (reactions with bounds,
//! stoichiometry and gene-protein-reaction rules) with a Boolean regulatory network
//! (interactions that set the coefficients of genes, regulators and reactions). The
//! [`RegulatoryMetabolicEngine`] alternates regulatory updates with flux optimization
//! performed by any [`LpSolver`].
//!
//! Rules are parsed into [`ExpressionTree`] instances using a [`grammar::Grammar`]
//! (Boolean for rules, arithmetic for rate laws) and evaluated by resolvers from the
//! [`evaluation`] module.

pub mod evaluation;
pub mod expression;
pub mod grammar;
pub mod model;
pub mod simulation;
pub mod validation;

mod utils;

pub use evaluation::{EvaluationError, Operation};
pub use expression::{ExpressionTree, MalformedExpression};
pub use model::{
    Interaction, InteractionError, Metabolite, ModelError, Reaction, ReactionError,
    RegulatoryEvent, RegulatoryMetabolicModel,
};
pub use simulation::{
    Constraints, Convergence, LpSolver, RegulatoryMetabolicEngine, RegulatoryState, Sense,
    SimulationConfig, SimulationError, Solution, Status, Trajectory,
};
pub use validation::{ContextualValidation, ErrorReporter, Validation};
