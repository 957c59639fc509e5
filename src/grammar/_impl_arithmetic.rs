use crate::grammar::{Associativity, Grammar, OperatorSpec};

impl Grammar {
    /// The grammar of arithmetic rate laws.
    ///
    /// Operators (highest precedence first): `^` (right associative), `*` and `/`, `+` and
    /// `-`. Both `+` and `-` can be used as prefix operators. `**` is an alias of `^`.
    /// Function calls (`exp(x)`, `max(a, b, c)`) need no declaration.
    #[must_use]
    pub fn arithmetic() -> Grammar {
        Grammar::new("arithmetic")
            .with_operator(OperatorSpec::binary("+", 1, Associativity::Left).with_prefix())
            .with_operator(OperatorSpec::binary("-", 1, Associativity::Left).with_prefix())
            .with_operator(OperatorSpec::binary("*", 2, Associativity::Left))
            .with_operator(OperatorSpec::binary("/", 2, Associativity::Left))
            .with_operator(OperatorSpec::binary("^", 3, Associativity::Right))
            .with_alias("**", &["^"])
    }
}
