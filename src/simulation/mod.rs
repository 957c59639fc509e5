//! Regulatory-metabolic simulation: the [`RegulatoryMetabolicEngine`] and the [`LpSolver`]
//! interface it uses.

use std::collections::BTreeMap;

mod engine;
mod simulation_config;
mod simulation_error;
mod solver;
mod trajectory;

pub use engine::RegulatoryMetabolicEngine;
pub use simulation_config::SimulationConfig;
pub use simulation_error::SimulationError;
pub use solver::{Constraints, LpSolver, Sense, Solution, Status};
pub use trajectory::{Convergence, Trajectory};

/// Coefficients of genes, regulators, reactions and metabolites (identifier -> value).
/// A non-zero coefficient means the identifier is active.
pub type RegulatoryState = BTreeMap<String, f64>;
