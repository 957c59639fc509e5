use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error raised while evaluating an [`crate::expression::ExpressionTree`].
///
/// All variants indicate a defect in the rule text (or in the resolvers supplied by the
/// caller) rather than a runtime failure of the simulation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Error)]
pub enum EvaluationError {
    #[error("Operator `{operator}` is not supported by the evaluator")]
    UnsupportedOperator { operator: String },
    #[error("Variable `{name}` is not bound to a numeric value")]
    UnboundVariable { name: String },
    #[error("Condition `{condition}` does not contain a relational operator")]
    InvalidConditionFormat { condition: String },
    #[error("Operator `{operator}` cannot be applied to {arguments} argument(s)")]
    ArityMismatch { operator: String, arguments: usize },
}
