use crate::simulation::{RegulatoryState, Solution};
use serde::{Deserialize, Serialize};

/// How a dynamic simulation ended.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Convergence {
    /// The simulation returned to an already visited state. `start` is the index (in the full
    /// history, the initial state being `0`) of the first state of the cyclic attractor.
    /// A fixed point is an attractor of length one.
    Attractor { start: usize },
    /// No state repeated within the allowed number of iterations. The trajectory holds every
    /// visited state.
    IterationLimitReached,
}

/// The result of a dynamic simulation: the states of the detected attractor (or the whole
/// partial trajectory) together with one flux solution per state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub states: Vec<RegulatoryState>,
    pub solutions: Vec<Solution>,
    pub convergence: Convergence,
    /// The number of simulation steps performed.
    pub iterations: usize,
}

impl Trajectory {
    #[must_use]
    pub fn is_converged(&self) -> bool {
        matches!(self.convergence, Convergence::Attractor { .. })
    }

    /// Number of states in the attractor (or the partial trajectory).
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
