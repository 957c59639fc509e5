//! Safe evaluation of [`crate::expression::ExpressionTree`] objects.
//!
//! Evaluation is always expressed through an operand resolver and an operator resolver.
//! Rule strings are never executed as code.

mod _impl_evaluate;
mod condition;
mod evaluation_error;
mod operation;
mod resolvers;

pub use condition::{evaluate_condition, is_condition};
pub use evaluation_error::EvaluationError;
pub use operation::Operation;
pub use resolvers::{ArithmeticResolver, BooleanResolver};
