use serde::{Deserialize, Serialize};
use thiserror::Error;

/// This is an internal error type for the parsing process. The public API for this is
/// [`MalformedExpression`]. The difference is that this error does
/// not contain the original input string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Error)]
#[error("Invalid expression: {message} at position `{position}`")]
pub(crate) struct ParserError {
    pub position: usize,
    pub message: String,
}

impl ParserError {
    pub fn at(position: usize, message: String) -> ParserError {
        ParserError { position, message }
    }
}

/// An error raised when a rule string cannot be tokenized or parsed (unbalanced parentheses,
/// unexpected characters, missing operands, ...).
///
/// A malformed rule is never partially trusted: the error is raised before any tree is
/// produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Error)]
#[error("Malformed expression `{expression}`: {message} at position `{position}`")]
pub struct MalformedExpression {
    pub expression: String,
    pub position: usize,
    pub message: String,
}

impl MalformedExpression {
    pub(crate) fn from_parser_error(error: ParserError, expression: &str) -> Self {
        MalformedExpression {
            expression: expression.to_string(),
            position: error.position,
            message: error.message,
        }
    }
}
