use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::BTreeMap;

/// Flux bounds imposed on individual reactions for a single solve (reaction id -> bounds).
pub type Constraints = BTreeMap<String, (f64, f64)>;

/// The status of an LP solve. Infeasibility is a regular outcome, not an error.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    Optimal,
    Infeasible,
    Unbounded,
    #[default]
    Unknown,
}

/// The sense of a linear constraint.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
    Equal,
    LessOrEqual,
    GreaterOrEqual,
}

/// The result of a single LP solve.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Solution {
    pub status: Status,
    pub objective_value: Option<f64>,
    /// Variable (reaction) id -> flux.
    #[serde(default)]
    pub values: BTreeMap<String, f64>,
}

impl Solution {
    /// A solution without values carrying the given (non-optimal) status.
    #[must_use]
    pub fn with_status(status: Status) -> Self {
        Solution {
            status,
            objective_value: None,
            values: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn is_optimal(&self) -> bool {
        self.status == Status::Optimal
    }

    /// Flux of the given reaction, or `0` if the solution has no such value.
    #[must_use]
    pub fn flux(&self, id: &str) -> f64 {
        self.values.get(id).copied().unwrap_or_default()
    }
}

/// The capabilities that the simulation needs from an external LP solver.
///
/// Variables and linear constraints are registered once, when the engine is created.
/// Each call to [`LpSolver::solve`] then optimizes the objective with extra per-reaction
/// bounds that only apply to that call.
///
/// Failures of the backend itself are reported as errors. An infeasible or unbounded problem
/// is not an error and must be reported through [`Solution::status`].
pub trait LpSolver {
    fn add_variable(&mut self, id: &str, lower_bound: f64, upper_bound: f64) -> anyhow::Result<()>;

    fn add_constraint(
        &mut self,
        id: &str,
        coefficients: &BTreeMap<String, f64>,
        sense: Sense,
        rhs: f64,
    ) -> anyhow::Result<()>;

    fn solve(
        &mut self,
        objective: &BTreeMap<String, f64>,
        minimize: bool,
        constraints: &Constraints,
    ) -> anyhow::Result<Solution>;
}
