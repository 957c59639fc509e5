use crate::grammar::{Associativity, EMPTY_LEAF, Grammar, OperatorSpec};

/// Canonical conjunction symbol.
pub const AND: &str = "&";
/// Canonical disjunction symbol.
pub const OR: &str = "|";
/// Canonical negation symbol.
pub const NOT: &str = "~";

/// Relational symbols that can appear inside Boolean operands, e.g. `R > 0`.
pub const RELATIONAL_SYMBOLS: [&str; 7] = [">=", "<=", "==", "!=", ">", "<", "="];

impl Grammar {
    /// The grammar of Boolean regulatory rules and GPR expressions.
    ///
    /// Operators (highest precedence first): `~` (negation, prefix), `&` (conjunction),
    /// `|` (disjunction). Textual aliases: `not`, `!`, `and`, `&&`, `or`, `||`.
    ///
    /// Relational conditions are not operators of this grammar. Instead, they are kept inside
    /// operand words and resolved by the condition evaluator at evaluation time.
    #[must_use]
    pub fn boolean() -> Grammar {
        Grammar::new("boolean")
            .with_operator(OperatorSpec::binary(OR, 1, Associativity::Left))
            .with_operator(OperatorSpec::binary(AND, 2, Associativity::Left))
            .with_operator(OperatorSpec::unary(NOT, 3))
            .with_alias("and", &[AND])
            .with_alias("&&", &[AND])
            .with_alias("or", &[OR])
            .with_alias("||", &[OR])
            .with_alias("not", &[EMPTY_LEAF, NOT])
            .with_alias("!", &[EMPTY_LEAF, NOT])
            .with_relational_symbols(&RELATIONAL_SYMBOLS)
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::{Associativity, Grammar};
    use std::cmp::Ordering;

    #[test]
    fn boolean_operators() {
        let grammar = Grammar::boolean();
        assert_eq!(grammar.precedence("~", "&"), Some(Ordering::Greater));
        assert_eq!(grammar.precedence("&", "|"), Some(Ordering::Greater));
        assert_eq!(grammar.associativity("~"), Some(Associativity::Right));
        assert_eq!(grammar.arity("~"), Some(1));
        assert_eq!(grammar.arity("&"), Some(2));
        assert_eq!(grammar.prefix_precedence(), 4);
    }

    #[test]
    fn boolean_aliases() {
        let grammar = Grammar::boolean();
        assert_eq!(grammar.alias("AND"), Some(&["&".to_string()][..]));
        assert_eq!(
            grammar.alias("Not"),
            Some(&[String::new(), "~".to_string()][..])
        );
        assert_eq!(grammar.alias("nor"), None);
        // Relational symbols are sorted longest first.
        assert_eq!(grammar.relational_symbols()[0].len(), 2);
    }
}
