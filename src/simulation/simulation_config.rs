use serde::{Deserialize, Serialize};

/// Settings of a [`crate::RegulatoryMetabolicEngine`].
///
/// All fields have defaults, so a partial configuration (e.g. `{ "max_iterations": 20 }`)
/// can be deserialized.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// The maximal number of steps of a dynamic simulation.
    pub max_iterations: usize,
    /// Two coefficients are equal if they differ by at most `tolerance`. Reactions and
    /// metabolites carry flux if their absolute value exceeds `tolerance`.
    pub tolerance: f64,
    /// Minimize the objective instead of maximizing it.
    pub minimize: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            max_iterations: 100,
            tolerance: 1e-9,
            minimize: false,
        }
    }
}
