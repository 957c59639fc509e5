use crate::expression::ParserError;
use crate::grammar::{EMPTY_LEAF, Grammar};
use std::fmt::{Display, Formatter};

/// Enum of all possible tokens occurring in a rule string.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TokenData {
    /// Operand word (identifier, numeric literal, or a relational condition).
    Operand(String),
    /// The empty operand which precedes a prefix operator.
    Empty,
    /// Canonical operator symbol of the grammar.
    Operator(String),
    Open,
    Close,
    Comma,
}

impl TokenData {
    pub fn at(self, position: usize) -> Token {
        Token {
            data: self,
            position,
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Token {
    pub position: usize,
    pub data: TokenData,
}

impl Display for TokenData {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenData::Operand(value) => write!(f, "{value}"),
            TokenData::Empty => write!(f, "<empty>"),
            TokenData::Operator(symbol) => write!(f, "{symbol}"),
            TokenData::Open => write!(f, "("),
            TokenData::Close => write!(f, ")"),
            TokenData::Comma => write!(f, ","),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.data)
    }
}

/// Tokenize a rule string using the given [`Grammar`].
///
/// The parenthesis structure is validated before any token is produced. Words are replaced
/// through the (case-insensitive) alias table of the grammar, and prefix operators are
/// preceded by [`TokenData::Empty`].
pub(crate) fn try_tokenize(expression: &str, grammar: &Grammar) -> Result<Vec<Token>, ParserError> {
    let chars: Vec<char> = expression.chars().collect();
    check_parentheses(&chars)?;

    let symbolic = grammar
        .symbolic_tokens()
        .into_iter()
        .map(|it| it.chars().collect::<Vec<_>>())
        .collect::<Vec<_>>();
    let relational = grammar
        .relational_symbols()
        .iter()
        .map(|it| it.chars().collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let mut tokenizer = Tokenizer {
        grammar,
        tokens: Vec::new(),
        word: String::new(),
        word_start: 0,
    };

    let mut position = 0;
    while position < chars.len() {
        let c = chars[position];
        if c.is_whitespace() {
            tokenizer.flush_word()?;
            position += 1;
            continue;
        }

        let structural = match c {
            '(' => Some(TokenData::Open),
            ')' => Some(TokenData::Close),
            ',' => Some(TokenData::Comma),
            _ => None,
        };
        if let Some(data) = structural {
            tokenizer.flush_word()?;
            tokenizer.tokens.push(data.at(position));
            position += 1;
            continue;
        }

        // Relational symbols are kept as part of operand words.
        if let Some(symbol) = match_at(&chars, position, &relational) {
            tokenizer.push_word_str(symbol, position);
            position += symbol.len();
            continue;
        }

        if let Some(symbol) = match_at(&chars, position, &symbolic) {
            if is_exponent_sign(&tokenizer.word, symbol) {
                tokenizer.push_word_str(symbol, position);
                position += symbol.len();
                continue;
            }
            tokenizer.flush_word()?;
            let text: String = symbol.iter().collect();
            tokenizer.push_canonical(&text, position)?;
            position += symbol.len();
            continue;
        }

        // Signs that are not operators of the grammar can still start the number on the
        // right side of a condition (`R > -1`) or belong to an exponent (`1e-5`).
        if (c == '-' || c == '+')
            && (is_exponent_sign(&tokenizer.word, &[c]) || tokenizer.follows_relational_symbol())
        {
            tokenizer.push_word_str(&[c], position);
            position += 1;
            continue;
        }

        if is_valid_in_word(c) {
            tokenizer.push_word_str(&[c], position);
            position += 1;
        } else {
            let message = format!("Unexpected `{c}`");
            return Err(ParserError::at(position, message));
        }
    }
    tokenizer.flush_word()?;

    Ok(tokenizer.tokens)
}

/// Internal state of the tokenization process.
struct Tokenizer<'a> {
    grammar: &'a Grammar,
    tokens: Vec<Token>,
    word: String,
    word_start: usize,
}

impl Tokenizer<'_> {
    fn push_word_str(&mut self, chars: &[char], position: usize) {
        if self.word.is_empty() {
            self.word_start = position;
        }
        self.word.extend(chars);
    }

    /// True if the text preceding the current position (the current word, or the previous
    /// operand when the word is empty) ends with a relational symbol.
    fn follows_relational_symbol(&self) -> bool {
        let text = if self.word.is_empty() {
            match self.tokens.last() {
                Some(Token {
                    data: TokenData::Operand(word),
                    ..
                }) => word.as_str(),
                _ => return false,
            }
        } else {
            self.word.as_str()
        };
        self.grammar
            .relational_symbols()
            .iter()
            .any(|symbol| text.ends_with(symbol.as_str()))
    }

    /// Finish the current word, resolving it through the alias table.
    fn flush_word(&mut self) -> Result<(), ParserError> {
        if self.word.is_empty() {
            return Ok(());
        }
        let word = std::mem::take(&mut self.word);
        if self.grammar.alias(&word).is_some() || self.grammar.is_operator(&word) {
            self.push_canonical(&word, self.word_start)
        } else {
            self.tokens
                .push(TokenData::Operand(word).at(self.word_start));
            Ok(())
        }
    }

    /// Push a symbol or alias that is known to the grammar, expanding aliases.
    fn push_canonical(&mut self, text: &str, position: usize) -> Result<(), ParserError> {
        let expansion = match self.grammar.alias(text) {
            Some(canonical) => canonical.to_vec(),
            None => vec![text.to_string()],
        };
        for item in expansion {
            if item == EMPTY_LEAF {
                self.tokens.push(TokenData::Empty.at(position));
            } else if self.grammar.is_operator(&item) {
                self.push_operator(item, position);
            } else {
                self.tokens.push(TokenData::Operand(item).at(position));
            }
        }
        Ok(())
    }

    /// Push an operator token, inserting the empty operand where the operator
    /// acts as a prefix operator.
    fn push_operator(&mut self, symbol: String, position: usize) {
        let Some(spec) = self.grammar.operator(&symbol) else {
            unreachable!("Tokenizer invariant: Only declared operators are pushed.")
        };
        let after_empty = matches!(self.tokens.last(), Some(t) if t.data == TokenData::Empty);
        let in_prefix_position = matches!(
            self.tokens.last().map(|it| &it.data),
            None | Some(TokenData::Open | TokenData::Comma | TokenData::Operator(_))
        );
        if !after_empty && (spec.arity == 1 || (spec.prefix && in_prefix_position)) {
            self.tokens.push(TokenData::Empty.at(position));
        }
        self.tokens.push(TokenData::Operator(symbol).at(position));
    }
}

/// Check that parentheses are balanced. This happens before any token is consumed.
fn check_parentheses(input: &[char]) -> Result<(), ParserError> {
    let mut depth = 0usize;
    for (position, c) in input.iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    let message = "Unexpected `)` (missing opening `(`)";
                    return Err(ParserError::at(position, message.to_string()));
                }
                depth -= 1;
            }
            _ => (),
        }
    }
    if depth > 0 {
        let message = "Input ended while expecting `)`";
        return Err(ParserError::at(input.len(), message.to_string()));
    }
    Ok(())
}

/// Find the first (i.e. longest, since the candidates are sorted) candidate that occurs
/// in the input at the given position.
fn match_at<'a>(input: &[char], position: usize, candidates: &'a [Vec<char>]) -> Option<&'a [char]> {
    candidates
        .iter()
        .find(|candidate| input[position..].starts_with(candidate))
        .map(Vec::as_slice)
}

/// A `+` or `-` directly following a mantissa like `1e` or `2.5E` belongs to the number.
fn is_exponent_sign(word: &str, symbol: &[char]) -> bool {
    if symbol != ['-'] && symbol != ['+'] {
        return false;
    }
    let Some(mantissa) = word.strip_suffix(['e', 'E']) else {
        return false;
    };
    mantissa.starts_with(|c: char| c.is_ascii_digit() || c == '.') && mantissa.parse::<f64>().is_ok()
}

/// Check if given char can appear in an operand word.
///
/// Apart from alphanumeric characters, identifiers of metabolic models regularly contain
/// compartment brackets, dots, colons and apostrophes (e.g. `glc__D[e]`, `M_h2o_c'`).
fn is_valid_in_word(c: char) -> bool {
    c.is_alphanumeric() || ['_', '.', ':', '[', ']', '\''].contains(&c)
}

#[cfg(test)]
mod tests {
    use crate::expression::expression_token::{TokenData, try_tokenize};
    use crate::grammar::{arithmetic_grammar, boolean_grammar};
    use TokenData::{Close, Comma, Empty, Open, Operand, Operator};

    fn op(symbol: &str) -> TokenData {
        Operator(symbol.to_string())
    }

    fn word(value: &str) -> TokenData {
        Operand(value.to_string())
    }

    fn data(expression: &str, arithmetic: bool) -> Vec<TokenData> {
        let grammar = if arithmetic {
            arithmetic_grammar()
        } else {
            boolean_grammar()
        };
        try_tokenize(expression, grammar)
            .unwrap()
            .into_iter()
            .map(|it| it.data)
            .collect()
    }

    #[test]
    fn test_boolean_aliases() {
        let result = try_tokenize("A and not B", boolean_grammar()).unwrap();
        assert_eq!(
            result,
            vec![
                word("A").at(0),
                op("&").at(2),
                Empty.at(6),
                op("~").at(6),
                word("B").at(10),
            ]
        );
        assert_eq!(data("A AND B OR C", false), data("A & B | C", false));
        assert_eq!(data("A&&B||!C", false), data("A & B | ~C", false));
    }

    #[test]
    fn test_relational_conditions_stay_in_words() {
        assert_eq!(data("R>0", false), vec![word("R>0")]);
        assert_eq!(
            data("x >= 5 & y != 1", false),
            vec![
                word("x"),
                word(">="),
                word("5"),
                op("&"),
                word("y"),
                word("!="),
                word("1"),
            ]
        );
    }

    #[test]
    fn test_arithmetic_prefix_operators() {
        assert_eq!(data("-x", true), vec![Empty, op("-"), word("x")]);
        assert_eq!(
            data("2*-x", true),
            vec![word("2"), op("*"), Empty, op("-"), word("x")]
        );
        assert_eq!(
            data("a - b", true),
            vec![word("a"), op("-"), word("b")]
        );
        assert_eq!(
            data("f(-1, +2)", true),
            vec![
                word("f"),
                Open,
                Empty,
                op("-"),
                word("1"),
                Comma,
                Empty,
                op("+"),
                word("2"),
                Close,
            ]
        );
    }

    #[test]
    fn test_exponent_literals() {
        assert_eq!(
            data("1e-5 + 2.5E+3", true),
            vec![word("1e-5"), op("+"), word("2.5E+3")]
        );
        // An identifier ending with `e` is not a mantissa.
        assert_eq!(
            data("Ne-1", true),
            vec![word("Ne"), op("-"), word("1")]
        );
        assert_eq!(data("x ** 2", true), vec![word("x"), op("^"), word("2")]);
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let error = try_tokenize("(A & B", boolean_grammar()).unwrap_err();
        assert_eq!(error.message, "Input ended while expecting `)`");
        assert_eq!(error.position, 6);

        let error = try_tokenize("A & B) | (C", boolean_grammar()).unwrap_err();
        assert_eq!(error.message, "Unexpected `)` (missing opening `(`)");
        assert_eq!(error.position, 5);
    }

    #[test]
    fn test_unexpected_character() {
        let error = try_tokenize("5 + @", arithmetic_grammar()).unwrap_err();
        assert_eq!(error.message, "Unexpected `@`");
        assert_eq!(error.position, 4);

        // Relational symbols are only part of the Boolean language.
        let error = try_tokenize("x > 1", arithmetic_grammar()).unwrap_err();
        assert_eq!(error.message, "Unexpected `>`");
    }

    #[test]
    fn test_signed_condition_thresholds() {
        assert_eq!(data("R > -1", false), vec![word("R"), word(">"), word("-1")]);
        assert_eq!(data("R>=+2", false), vec![word("R>=+2")]);
        assert_eq!(
            data("o2 < 1e-5 | x", false),
            vec![word("o2"), word("<"), word("1e-5"), op("|"), word("x")]
        );
        // A sign that is not part of a number is still invalid in Boolean rules.
        let error = try_tokenize("A - B", boolean_grammar()).unwrap_err();
        assert_eq!(error.message, "Unexpected `-`");
        assert_eq!(error.position, 2);
    }

    #[test]
    fn test_model_identifiers() {
        assert_eq!(
            data("glc__D[e] or M_h2o_c'", false),
            vec![word("glc__D[e]"), op("|"), word("M_h2o_c'")]
        );
    }
}
