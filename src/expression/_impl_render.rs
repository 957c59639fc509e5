use crate::expression::{Arity, ExpressionTree, NodeId};
use crate::grammar::{AND, NOT, OR, arithmetic_grammar, boolean_grammar};
use crate::utils::is_numeric_literal;
use std::collections::HashMap;

/// Formatting options of [`ExpressionTree::to_infix`].
///
/// The `rename` table substitutes canonical operator symbols (and function names) with
/// display text, e.g. `& -> and`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InfixStyle {
    pub open: String,
    pub close: String,
    pub separator: String,
    pub argument_separator: String,
    pub rename: HashMap<String, String>,
}

impl Default for InfixStyle {
    fn default() -> Self {
        InfixStyle {
            open: "(".to_string(),
            close: ")".to_string(),
            separator: " ".to_string(),
            argument_separator: ", ".to_string(),
            rename: HashMap::new(),
        }
    }
}

impl InfixStyle {
    /// Add an entry to the rename table.
    #[must_use]
    pub fn rename(mut self, symbol: &str, display: &str) -> Self {
        self.rename.insert(symbol.to_string(), display.to_string());
        self
    }

    fn display<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.rename.get(symbol).map(String::as_str).unwrap_or(symbol)
    }
}

/// Precedence reported by atomic LaTeX fragments (leaves, function calls, fractions).
const ATOMIC: u8 = u8::MAX;

impl ExpressionTree {
    /// Deterministic infix serialization of this tree.
    ///
    /// The empty leaf renders as an empty string, unary nodes as `name(child)`, binary infix
    /// nodes as `(left SEP value SEP right)` and function calls as `name(a, b, ...)`.
    #[must_use]
    pub fn to_infix(&self, style: &InfixStyle) -> String {
        let mut result = String::new();
        self.infix_rec(self.root, style, &mut result);
        result
    }

    fn infix_rec(&self, id: NodeId, style: &InfixStyle, out: &mut String) {
        let node = self.node(id);
        if node.is_leaf() {
            out.push_str(&node.value);
            return;
        }
        match node.arity {
            Arity::Infix => {
                out.push_str(&style.open);
                if let Some(left) = node.left {
                    self.infix_rec(left, style, out);
                }
                out.push_str(&style.separator);
                out.push_str(style.display(&node.value));
                out.push_str(&style.separator);
                if let Some(right) = node.right {
                    self.infix_rec(right, style, out);
                }
                out.push_str(&style.close);
            }
            Arity::Unary | Arity::Binary | Arity::Nary => {
                out.push_str(style.display(&node.value));
                out.push_str(&style.open);
                for (i, argument) in self.arguments(id).into_iter().enumerate() {
                    if i > 0 {
                        out.push_str(&style.argument_separator);
                    }
                    self.infix_rec(argument, style, out);
                }
                out.push_str(&style.close);
            }
        }
    }

    /// Render this tree as a LaTeX formula. Returns the formula and the precedence of its
    /// top-level construct.
    ///
    /// Precedence is threaded bottom-up: a child is wrapped in parentheses only when its
    /// precedence is lower than the precedence of the enclosing operator. The right operand
    /// of `-` is also wrapped at equal precedence, as subtraction is not associative.
    ///
    /// Precedences are taken from the built-in Boolean and arithmetic grammars. Operators
    /// of other grammars render as `\mathbin{..}` with every non-atomic operand bracketed,
    /// and are bracketed themselves inside any other operator.
    #[must_use]
    pub fn to_latex(&self) -> (String, u8) {
        self.latex_rec(self.root)
    }

    fn latex_rec(&self, id: NodeId) -> (String, u8) {
        let node = self.node(id);
        if node.is_leaf() {
            return (latex_operand(&node.value), ATOMIC);
        }

        if node.arity == Arity::Unary {
            let prefix = prefix_precedence();
            let Some(child) = node.right else {
                unreachable!("Unary nodes always have a right child.")
            };
            let (child, child_precedence) = self.latex_rec(child);
            return match node.value.as_str() {
                NOT => (format!("\\neg {}", wrap(child, child_precedence < prefix)), prefix),
                "-" | "+" => {
                    let wrapped = wrap(child, child_precedence < prefix);
                    (format!("{}{wrapped}", node.value), prefix)
                }
                "sqrt" => (format!("\\sqrt{{{child}}}"), ATOMIC),
                "abs" => (format!("\\left|{child}\\right|"), ATOMIC),
                "exp" => (format!("e^{{{child}}}"), ATOMIC),
                name => (format!("\\operatorname{{{name}}}\\left({child}\\right)"), ATOMIC),
            };
        }

        if node.arity == Arity::Binary || node.arity == Arity::Nary {
            let arguments = self
                .arguments(id)
                .into_iter()
                .map(|it| self.latex_rec(it).0)
                .collect::<Vec<_>>();
            let name = &node.value;
            let arguments = arguments.join(", ");
            return (
                format!("\\operatorname{{{name}}}\\left({arguments}\\right)"),
                ATOMIC,
            );
        }

        let (Some(left), Some(right)) = (node.left, node.right) else {
            unreachable!("Infix nodes always have two children.")
        };
        let (left, left_precedence) = self.latex_rec(left);
        let (right, right_precedence) = self.latex_rec(right);
        match node.value.as_str() {
            "/" => (format!("\\frac{{{left}}}{{{right}}}"), ATOMIC),
            "^" => {
                let precedence = builtin_precedence("^").unwrap_or_default();
                let left = wrap(left, left_precedence <= precedence);
                (format!("{{{left}}}^{{{right}}}"), precedence)
            }
            symbol => {
                let Some(precedence) = builtin_precedence(symbol) else {
                    let left = wrap(left, left_precedence < ATOMIC);
                    let right = wrap(right, right_precedence < ATOMIC);
                    return (format!("{left} \\mathbin{{{symbol}}} {right}"), 0);
                };
                let operator = latex_infix(symbol);
                let left = wrap(left, left_precedence < precedence);
                let strict = symbol == "-";
                let right = wrap(
                    right,
                    right_precedence < precedence || (strict && right_precedence == precedence),
                );
                (format!("{left} {operator} {right}"), precedence)
            }
        }
    }
}

/// Precedence of an infix operator of the built-in grammars.
fn builtin_precedence(symbol: &str) -> Option<u8> {
    [arithmetic_grammar(), boolean_grammar()]
        .into_iter()
        .find_map(|grammar| grammar.operator(symbol))
        .map(|operator| operator.precedence)
}

fn prefix_precedence() -> u8 {
    arithmetic_grammar()
        .prefix_precedence()
        .max(boolean_grammar().prefix_precedence())
}

fn latex_infix(symbol: &str) -> &str {
    match symbol {
        "*" => "\\cdot",
        AND => "\\land",
        OR => "\\lor",
        other => other,
    }
}

fn latex_operand(value: &str) -> String {
    if value.chars().count() <= 1 || is_numeric_literal(value) {
        value.to_string()
    } else {
        format!("\\text{{{}}}", value.replace('_', "\\_"))
    }
}

fn wrap(latex: String, condition: bool) -> String {
    if condition {
        format!("\\left({latex}\\right)")
    } else {
        latex
    }
}

#[cfg(test)]
mod tests {
    use crate::expression::{ExpressionTree, InfixStyle};
    use crate::grammar::{
        Associativity, Grammar, OperatorSpec, arithmetic_grammar, boolean_grammar,
    };

    fn arithmetic(expression: &str) -> ExpressionTree {
        ExpressionTree::parse(expression, arithmetic_grammar()).unwrap()
    }

    #[test]
    fn test_default_infix() {
        let tree = ExpressionTree::parse("A and not (B or C)", boolean_grammar()).unwrap();
        assert_eq!(tree.to_string(), "(A & ~((B | C)))");

        assert_eq!(arithmetic("max(a, b, c) - abs(x)").to_string(), "(max(a, b, c) - abs(x))");
        assert_eq!(arithmetic("-x").to_string(), "-(x)");
    }

    #[test]
    fn test_custom_infix_style() {
        let tree = ExpressionTree::parse("A & B | C", boolean_grammar()).unwrap();
        let style = InfixStyle {
            open: "[".to_string(),
            close: "]".to_string(),
            ..Default::default()
        }
        .rename("&", "and")
        .rename("|", "or");
        assert_eq!(tree.to_infix(&style), "[[A and B] or C]");
    }

    #[test]
    fn test_minimal_latex_brackets() {
        assert_eq!(arithmetic("a + b * c").to_latex().0, "a + b \\cdot c");
        assert_eq!(
            arithmetic("(a + b) * c").to_latex().0,
            "\\left(a + b\\right) \\cdot c"
        );
        assert_eq!(
            arithmetic("a - (b + c)").to_latex().0,
            "a - \\left(b + c\\right)"
        );
        assert_eq!(arithmetic("(a - b) + c").to_latex().0, "a - b + c");
        assert_eq!(arithmetic("a / (b + c)").to_latex().0, "\\frac{a}{b + c}");
        assert_eq!(
            arithmetic("(a + b) ^ 2").to_latex().0,
            "{\\left(a + b\\right)}^{2}"
        );
        assert_eq!(arithmetic("-x * y").to_latex().0, "-x \\cdot y");
    }

    #[test]
    fn test_latex_precedence_and_names() {
        let (latex, precedence) = arithmetic("vmax * S").to_latex();
        assert_eq!(latex, "\\text{vmax} \\cdot S");
        assert_eq!(precedence, 2);

        let (latex, precedence) = arithmetic("max(k_1, 2)").to_latex();
        assert_eq!(latex, "\\operatorname{max}\\left(\\text{k\\_1}, 2\\right)");
        assert_eq!(precedence, u8::MAX);

        let tree = ExpressionTree::parse("not (A | B) & C", boolean_grammar()).unwrap();
        assert_eq!(tree.to_latex().0, "\\neg \\left(A \\lor B\\right) \\land C");
    }

    #[test]
    fn test_latex_precedence_follows_grammars() {
        let (_, precedence) = arithmetic("a ^ b").to_latex();
        assert_eq!(precedence, arithmetic_grammar().operator("^").unwrap().precedence);
        let (_, precedence) = arithmetic("a - b").to_latex();
        assert_eq!(precedence, arithmetic_grammar().operator("-").unwrap().precedence);
        let (_, precedence) = arithmetic("-a").to_latex();
        assert_eq!(precedence, arithmetic_grammar().prefix_precedence());
        let tree = ExpressionTree::parse("A | B", boolean_grammar()).unwrap();
        assert_eq!(tree.to_latex().1, boolean_grammar().operator("|").unwrap().precedence);
    }

    #[test]
    fn test_latex_custom_operator_is_bracketed() {
        let grammar = Grammar::new("custom")
            .with_operator(OperatorSpec::binary("+", 1, Associativity::Left))
            .with_operator(OperatorSpec::binary("*", 2, Associativity::Left))
            .with_operator(OperatorSpec::binary("@", 3, Associativity::Left));
        let parse = |expression: &str| ExpressionTree::parse(expression, &grammar).unwrap();

        assert_eq!(
            parse("a @ b * c").to_latex(),
            ("\\left(a \\mathbin{@} b\\right) \\cdot c".to_string(), 2)
        );
        assert_eq!(
            parse("a + b @ c").to_latex().0,
            "a + \\left(b \\mathbin{@} c\\right)"
        );
        assert_eq!(
            parse("(a + b) @ c").to_latex().0,
            "\\left(a + b\\right) \\mathbin{@} c"
        );
    }
}
