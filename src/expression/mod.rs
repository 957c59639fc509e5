//! Rule expressions: tokenizer, operator-precedence tree builder and the arena-based
//! [`ExpressionTree`] with its queries, transformations and renderings.

use crate::grammar::Grammar;

mod expression_error;
mod expression_parser;
mod expression_token;
mod expression_tree;

mod _impl_queries;
mod _impl_render;
mod _impl_transform;

pub(crate) use expression_error::ParserError;
pub use expression_error::MalformedExpression;
pub use expression_token::{Token, TokenData};
pub use expression_tree::{Arity, ExpressionNode, ExpressionTree, NodeId};
pub use _impl_render::InfixStyle;

/// Split a rule string into [`Token`] objects using the given [`Grammar`].
///
/// Mostly useful for diagnostics; [`ExpressionTree::parse`] performs tokenization internally.
pub fn tokenize(expression: &str, grammar: &Grammar) -> Result<Vec<Token>, MalformedExpression> {
    expression_token::try_tokenize(expression, grammar)
        .map_err(|e| MalformedExpression::from_parser_error(e, expression))
}

#[cfg(test)]
mod tests {
    use crate::expression::{ExpressionTree, TokenData, tokenize};
    use crate::grammar::{arithmetic_grammar, boolean_grammar};
    use test_generator::test_resources;

    /// Re-serializing a rebuilt tree reaches a fixed point after one extra trip.
    fn check_round_trip(path: &str, grammar: &crate::grammar::Grammar) {
        let content = std::fs::read_to_string(path).unwrap();
        for rule in content.lines().filter(|it| !it.trim().is_empty()) {
            let tree = ExpressionTree::parse(rule, grammar).unwrap();
            let first = tree.to_string();
            let rebuilt = ExpressionTree::parse(&first, grammar).unwrap();
            assert_eq!(tree, rebuilt, "Tree of `{rule}` changed after re-parsing.");
            assert_eq!(first, rebuilt.to_string());
        }
    }

    #[test_resources("resources/rules/boolean/*.txt")]
    fn boolean_round_trip(path: &str) {
        check_round_trip(path, boolean_grammar());
    }

    #[test_resources("resources/rules/arithmetic/*.txt")]
    fn arithmetic_round_trip(path: &str) {
        check_round_trip(path, arithmetic_grammar());
    }

    #[test]
    fn test_public_tokenize() {
        let tokens = tokenize("not A", boolean_grammar()).unwrap();
        let data = tokens.into_iter().map(|it| it.data).collect::<Vec<_>>();
        assert_eq!(
            data,
            vec![
                TokenData::Empty,
                TokenData::Operator("~".to_string()),
                TokenData::Operand("A".to_string())
            ]
        );

        let error = tokenize("(a + b", arithmetic_grammar()).unwrap_err();
        assert_eq!(error.expression, "(a + b");
    }
}
