use crate::expression::ExpressionTree;
use crate::grammar::ARGUMENT_SEPARATOR;
use crate::utils::is_numeric_literal;
use std::collections::BTreeSet;

impl ExpressionTree {
    /// Collect the values of all leaves (identifiers, literals, conditions). The empty leaf
    /// is not an operand.
    #[must_use]
    pub fn get_operands(&self) -> BTreeSet<String> {
        self.nodes_of_tree()
            .filter(|node| node.is_leaf() && !node.is_empty_leaf())
            .map(|node| node.value.clone())
            .collect()
    }

    /// Collect all operator symbols and function names. The structural argument separator
    /// is not an operator.
    #[must_use]
    pub fn get_operators(&self) -> BTreeSet<String> {
        self.nodes_of_tree()
            .filter(|node| !node.is_leaf() && node.value != ARGUMENT_SEPARATOR)
            .map(|node| node.value.clone())
            .collect()
    }

    /// Same as [`ExpressionTree::get_operands`], but numeric literals are excluded.
    #[must_use]
    pub fn get_parameters(&self) -> BTreeSet<String> {
        self.get_operands()
            .into_iter()
            .filter(|operand| !is_numeric_literal(operand))
            .collect()
    }

    /// True if any node of this tree (leaf or internal) has the given value.
    #[must_use]
    pub fn contains_value(&self, value: &str) -> bool {
        self.nodes_of_tree().any(|node| node.value == value)
    }

    fn nodes_of_tree(&self) -> impl Iterator<Item = &crate::expression::ExpressionNode> {
        self.pre_order().into_iter().map(move |id| self.node(id))
    }
}

#[cfg(test)]
mod tests {
    use crate::expression::ExpressionTree;
    use crate::grammar::{arithmetic_grammar, boolean_grammar};
    use std::collections::BTreeSet;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|it| it.to_string()).collect()
    }

    #[test]
    fn test_boolean_queries() {
        let tree = ExpressionTree::parse("(g1 and g2) or not g3", boolean_grammar()).unwrap();
        assert_eq!(tree.get_operands(), set(&["g1", "g2", "g3"]));
        assert_eq!(tree.get_operators(), set(&["&", "|", "~"]));
        assert_eq!(tree.get_parameters(), set(&["g1", "g2", "g3"]));
    }

    #[test]
    fn test_arithmetic_queries() {
        let tree = ExpressionTree::parse(
            "vmax * S / (km + S) - max(0, 1.5e-3, k)",
            arithmetic_grammar(),
        )
        .unwrap();
        assert_eq!(
            tree.get_operands(),
            set(&["vmax", "S", "km", "0", "1.5e-3", "k"])
        );
        assert_eq!(tree.get_operators(), set(&["*", "/", "+", "-", "max"]));
        assert_eq!(tree.get_parameters(), set(&["vmax", "S", "km", "k"]));
        assert!(tree.contains_value("max"));
        assert!(!tree.contains_value("min"));
    }

    #[test]
    fn test_operands_and_operators_cover_tokens() {
        let tree = ExpressionTree::parse("a + b * c ^ d", arithmetic_grammar()).unwrap();
        let mut all = tree.get_operands();
        all.extend(tree.get_operators());
        assert_eq!(all, set(&["a", "b", "c", "d", "+", "*", "^"]));
    }

    #[test]
    fn test_empty_tree_queries() {
        let tree = ExpressionTree::empty();
        assert!(tree.get_operands().is_empty());
        assert!(tree.get_operators().is_empty());
    }
}
