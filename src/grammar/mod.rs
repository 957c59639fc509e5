use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::LazyLock;

mod _impl_arithmetic;
mod _impl_boolean;

pub use _impl_boolean::{AND, NOT, OR, RELATIONAL_SYMBOLS};

/// Value of the "empty leaf" sentinel. An empty leaf denotes an absent operand, and it is used
/// to encode prefix operators (`~A`, `-x`) as binary nodes with one real child.
///
/// The tokenizer never produces an empty operand word, so the sentinel cannot collide with
/// a real identifier.
pub const EMPTY_LEAF: &str = "";

/// Symbol of the structural node that chains arguments of n-ary function calls.
pub const ARGUMENT_SEPARATOR: &str = ",";

static BOOLEAN_GRAMMAR: LazyLock<Grammar> = LazyLock::new(Grammar::boolean);
static ARITHMETIC_GRAMMAR: LazyLock<Grammar> = LazyLock::new(Grammar::arithmetic);

/// Shared instance of [`Grammar::boolean`].
#[must_use]
pub fn boolean_grammar() -> &'static Grammar {
    &BOOLEAN_GRAMMAR
}

/// Shared instance of [`Grammar::arithmetic`].
#[must_use]
pub fn arithmetic_grammar() -> &'static Grammar {
    &ARITHMETIC_GRAMMAR
}

/// Associativity of a binary operator.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Associativity {
    Left,
    Right,
}

/// Declaration of a single operator within a [`Grammar`].
///
/// Operators with `arity == 1` are strictly prefix operators (e.g. Boolean negation). Binary
/// operators marked as `prefix` can also appear in a prefix position (e.g. arithmetic `-`),
/// in which case they are parsed as unary operators.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct OperatorSpec {
    pub symbol: String,
    pub precedence: u8,
    pub associativity: Associativity,
    pub arity: usize,
    pub prefix: bool,
}

impl OperatorSpec {
    /// Make a new binary operator.
    #[must_use]
    pub fn binary(symbol: &str, precedence: u8, associativity: Associativity) -> Self {
        OperatorSpec {
            symbol: symbol.to_string(),
            precedence,
            associativity,
            arity: 2,
            prefix: false,
        }
    }

    /// Make a new strictly unary (prefix) operator.
    #[must_use]
    pub fn unary(symbol: &str, precedence: u8) -> Self {
        OperatorSpec {
            symbol: symbol.to_string(),
            precedence,
            associativity: Associativity::Right,
            arity: 1,
            prefix: true,
        }
    }

    /// Allow this binary operator to be used in a prefix position as well.
    #[must_use]
    pub fn with_prefix(mut self) -> Self {
        self.prefix = true;
        self
    }

    /// True if the operator symbol is made of punctuation (and can therefore appear
    /// without surrounding whitespace).
    #[must_use]
    pub fn is_symbolic(&self) -> bool {
        is_symbolic(&self.symbol)
    }
}

/// A declarative description of an operator set used by the tokenizer and the tree builder.
///
/// A grammar is a plain value: the Boolean and arithmetic rule languages are two instances
/// of the same type ([`Grammar::boolean`] and [`Grammar::arithmetic`]) and custom languages
/// can be assembled using the builder methods.
///
/// Besides operators, a grammar declares:
///  - An alias table mapping case-insensitive textual synonyms to canonical token sequences
///    (e.g. `and -> [&]`, `not -> [EMPTY, ~]`). An empty string in the sequence stands for
///    the empty operand ([`EMPTY_LEAF`]).
///  - Relational symbols (`>=`, `<`, ...) that are kept inside operand words, such that
///    conditions like `x > 5` survive tokenization as a single operand.
///  - The precedence assigned to operators in a prefix position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    name: String,
    operators: Vec<OperatorSpec>,
    aliases: Vec<(String, Vec<String>)>,
    relational_symbols: Vec<String>,
    prefix_precedence: u8,
}

impl Grammar {
    /// Create an empty grammar with the given name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Grammar {
            name: name.to_string(),
            operators: Vec::new(),
            aliases: Vec::new(),
            relational_symbols: Vec::new(),
            prefix_precedence: 0,
        }
    }

    /// Add a new operator. An operator with the same symbol is replaced.
    ///
    /// The prefix precedence of the grammar is raised above the precedence of every declared
    /// operator, unless it has been explicitly set higher.
    #[must_use]
    pub fn with_operator(mut self, operator: OperatorSpec) -> Self {
        self.operators.retain(|it| it.symbol != operator.symbol);
        let above = operator.precedence.saturating_add(1);
        self.prefix_precedence = self.prefix_precedence.max(above);
        self.operators.push(operator);
        self
    }

    /// Add a new alias. Alias keys are matched case-insensitively.
    #[must_use]
    pub fn with_alias(mut self, alias: &str, canonical: &[&str]) -> Self {
        let key = alias.to_lowercase();
        self.aliases.retain(|(it, _)| *it != key);
        let canonical = canonical.iter().map(|it| it.to_string()).collect();
        self.aliases.push((key, canonical));
        self
    }

    /// Declare symbols that should be kept inside operand words.
    #[must_use]
    pub fn with_relational_symbols(mut self, symbols: &[&str]) -> Self {
        self.relational_symbols = symbols.iter().map(|it| it.to_string()).collect();
        // Longest first, so that `>=` is never split as `>` followed by `=`.
        self.relational_symbols
            .sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Find the declaration of the given operator symbol.
    #[must_use]
    pub fn operator(&self, symbol: &str) -> Option<&OperatorSpec> {
        self.operators.iter().find(|it| it.symbol == symbol)
    }

    #[must_use]
    pub fn is_operator(&self, symbol: &str) -> bool {
        self.operator(symbol).is_some()
    }

    /// Compare the precedence of two operators. Returns `None` if one of the symbols is not
    /// an operator of this grammar.
    #[must_use]
    pub fn precedence(&self, op1: &str, op2: &str) -> Option<Ordering> {
        let op1 = self.operator(op1)?;
        let op2 = self.operator(op2)?;
        Some(op1.precedence.cmp(&op2.precedence))
    }

    #[must_use]
    pub fn associativity(&self, symbol: &str) -> Option<Associativity> {
        self.operator(symbol).map(|it| it.associativity)
    }

    #[must_use]
    pub fn arity(&self, symbol: &str) -> Option<usize> {
        self.operator(symbol).map(|it| it.arity)
    }

    /// Precedence of any operator used in a prefix position.
    #[must_use]
    pub fn prefix_precedence(&self) -> u8 {
        self.prefix_precedence
    }

    /// All aliases of this grammar (keys are lowercase).
    #[must_use]
    pub fn alias_table(&self) -> &[(String, Vec<String>)] {
        &self.aliases
    }

    /// Resolve a word through the alias table (case-insensitive).
    #[must_use]
    pub fn alias(&self, word: &str) -> Option<&[String]> {
        let key = word.to_lowercase();
        self.aliases
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, canonical)| canonical.as_slice())
    }

    #[must_use]
    pub fn relational_symbols(&self) -> &[String] {
        &self.relational_symbols
    }

    /// All punctuation sequences that the tokenizer must cut out of the input: symbolic
    /// operators and symbolic aliases. Sorted longest first.
    pub(crate) fn symbolic_tokens(&self) -> Vec<&str> {
        let mut result = self
            .operators
            .iter()
            .filter(|it| it.is_symbolic())
            .map(|it| it.symbol.as_str())
            .chain(
                self.aliases
                    .iter()
                    .map(|(alias, _)| alias.as_str())
                    .filter(|it| is_symbolic(it)),
            )
            .collect::<Vec<_>>();
        result.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        result.dedup();
        result
    }
}

fn is_symbolic(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| !c.is_alphanumeric() && !c.is_whitespace() && c != '_')
}
