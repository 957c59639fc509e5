use crate::evaluation::EvaluationError;
use crate::expression::MalformedExpression;
use thiserror::Error;

/// An error that stops a simulation.
///
/// Rule defects are reported as [`SimulationError::Expression`] (a rule cannot be parsed)
/// or [`SimulationError::Evaluation`] (a rule cannot be evaluated). Infeasible problems and
/// unfinished attractor searches are not errors.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error(transparent)]
    Expression(#[from] MalformedExpression),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Solver(anyhow::Error),
}
