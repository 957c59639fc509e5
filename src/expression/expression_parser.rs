use crate::expression::expression_token::{Token, TokenData, try_tokenize};
use crate::expression::{Arity, ExpressionNode, ExpressionTree, NodeId, ParserError};
use crate::grammar::{ARGUMENT_SEPARATOR, Associativity, EMPTY_LEAF, Grammar};

/// Parse a rule string into an [`ExpressionTree`]. Basically a wrapper for tokenize+build.
pub(crate) fn parse_expression(
    expression: &str,
    grammar: &Grammar,
) -> Result<ExpressionTree, ParserError> {
    let tokens = try_tokenize(expression, grammar)?;
    build_tree(&tokens, grammar)
}

/// Build an [`ExpressionTree`] from `tokens` using operator-precedence parsing.
///
/// An empty token list yields a tree with a single empty leaf.
pub(crate) fn build_tree(tokens: &[Token], grammar: &Grammar) -> Result<ExpressionTree, ParserError> {
    let mut nodes = Vec::new();
    let root = TreeBuilder::new(grammar, &mut nodes).build(tokens)?;
    match root {
        Some(root) => Ok(ExpressionTree::from_arena(nodes, root)),
        None => Ok(ExpressionTree::empty()),
    }
}

/// An entry of the operator stack.
enum StackEntry {
    Operator {
        symbol: String,
        prefix: bool,
        position: usize,
    },
    Scope,
}

/// What kind of item was processed last. Used to detect missing operands and to merge
/// consecutive operand words.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Previous {
    Nothing,
    /// A plain operand leaf that can absorb the next word.
    Word(NodeId),
    /// A complete operand which cannot be extended (group or function call).
    Operand,
    Empty,
    Operator,
    Open,
}

/// Shunting-yard style tree builder with an operator stack and a tree stack. All nodes are
/// allocated in a shared arena, such that function arguments can be built recursively.
struct TreeBuilder<'a> {
    grammar: &'a Grammar,
    nodes: &'a mut Vec<ExpressionNode>,
    operators: Vec<StackEntry>,
    trees: Vec<NodeId>,
    previous: Previous,
}

impl<'a> TreeBuilder<'a> {
    fn new(grammar: &'a Grammar, nodes: &'a mut Vec<ExpressionNode>) -> Self {
        TreeBuilder {
            grammar,
            nodes,
            operators: Vec::new(),
            trees: Vec::new(),
            previous: Previous::Nothing,
        }
    }

    fn push_node(&mut self, node: ExpressionNode) -> NodeId {
        self.nodes.push(node);
        NodeId::new(self.nodes.len() - 1)
    }

    fn build(mut self, tokens: &[Token]) -> Result<Option<NodeId>, ParserError> {
        let mut index = 0;
        while index < tokens.len() {
            let token = &tokens[index];
            match &token.data {
                TokenData::Operand(word) => {
                    let is_call = matches!(tokens.get(index + 1), Some(t) if t.data == TokenData::Open);
                    if is_call {
                        self.expect_operand_position(token)?;
                        index = self.function_call(word, tokens, index)?;
                        self.previous = Previous::Operand;
                        continue;
                    }
                    match self.previous {
                        Previous::Word(id) => {
                            // Identifiers can contain spaces.
                            let leaf = &mut self.nodes[id.index()];
                            leaf.value.push(' ');
                            leaf.value.push_str(word);
                        }
                        _ => {
                            self.expect_operand_position(token)?;
                            let id = self.push_node(ExpressionNode::leaf(word.clone()));
                            self.trees.push(id);
                            self.previous = Previous::Word(id);
                        }
                    }
                }
                TokenData::Empty => {
                    self.expect_operand_position(token)?;
                    let id = self.push_node(ExpressionNode::leaf(EMPTY_LEAF.to_string()));
                    self.trees.push(id);
                    self.previous = Previous::Empty;
                }
                TokenData::Operator(symbol) => {
                    self.push_operator(symbol, token.position)?;
                    self.previous = Previous::Operator;
                }
                TokenData::Open => {
                    self.expect_operand_position(token)?;
                    self.operators.push(StackEntry::Scope);
                    self.previous = Previous::Open;
                }
                TokenData::Close => {
                    match self.previous {
                        Previous::Open => {
                            let message = "Parenthesis group is empty";
                            return Err(ParserError::at(token.position, message.to_string()));
                        }
                        Previous::Operator | Previous::Empty => {
                            return Err(self.missing_right_operand(token.position));
                        }
                        _ => (),
                    }
                    self.close_scope(token.position)?;
                    self.previous = Previous::Operand;
                }
                TokenData::Comma => {
                    let message = "Unexpected `,`";
                    return Err(ParserError::at(token.position, message.to_string()));
                }
            }
            index += 1;
        }

        if matches!(self.previous, Previous::Operator | Previous::Empty) {
            let position = tokens.last().map(|it| it.position).unwrap_or_default();
            return Err(self.missing_right_operand(position));
        }

        while let Some(entry) = self.operators.pop() {
            match entry {
                StackEntry::Operator {
                    symbol,
                    prefix: _,
                    position,
                } => self.reduce(symbol, position)?,
                StackEntry::Scope => {
                    let position = tokens.last().map(|it| it.position + 1).unwrap_or_default();
                    let message = "Input ended while expecting `)`";
                    return Err(ParserError::at(position, message.to_string()));
                }
            }
        }

        match self.trees.len() {
            0 => Ok(None),
            1 => Ok(self.trees.pop()),
            _ => unreachable!("Parser invariant: Juxtaposed operands are rejected."),
        }
    }

    /// Fail if an operand cannot start at the position of `token` (i.e. the previous
    /// item is already a complete operand).
    fn expect_operand_position(&self, token: &Token) -> Result<(), ParserError> {
        match self.previous {
            Previous::Word(_) | Previous::Operand => {
                let message = format!("Unexpected `{token}`. Expecting operator");
                Err(ParserError::at(token.position, message))
            }
            Previous::Empty if token.data != TokenData::Empty => {
                let message = format!("Unexpected `{token}`. Expecting prefix operator");
                Err(ParserError::at(token.position, message))
            }
            _ => Ok(()),
        }
    }

    fn push_operator(&mut self, symbol: &str, position: usize) -> Result<(), ParserError> {
        let Some(spec) = self.grammar.operator(symbol) else {
            let message = format!(
                "`{symbol}` is not an operator of the `{}` grammar",
                self.grammar.name()
            );
            return Err(ParserError::at(position, message));
        };
        let prefix = self.previous == Previous::Empty;
        if !prefix && !matches!(self.previous, Previous::Word(_) | Previous::Operand) {
            let message = format!("Found nothing at the left-hand-side of operator `{symbol}`");
            return Err(ParserError::at(position, message));
        }
        if !prefix && spec.arity == 1 {
            let message = format!("Operator `{symbol}` can only be used as a prefix");
            return Err(ParserError::at(position, message));
        }

        let (precedence, associativity) = if prefix {
            (self.grammar.prefix_precedence(), Associativity::Right)
        } else {
            (spec.precedence, spec.associativity)
        };

        // Right associative operators are pushed without reducing.
        if associativity == Associativity::Left {
            while let Some(StackEntry::Operator {
                symbol: top,
                prefix: top_prefix,
                ..
            }) = self.operators.last()
            {
                let top_precedence = if *top_prefix {
                    self.grammar.prefix_precedence()
                } else {
                    self.grammar
                        .operator(top)
                        .map(|it| it.precedence)
                        .unwrap_or_default()
                };
                if top_precedence < precedence {
                    break;
                }
                let Some(StackEntry::Operator {
                    symbol, position, ..
                }) = self.operators.pop()
                else {
                    unreachable!("Parser invariant: The top entry is an operator.")
                };
                self.reduce(symbol, position)?;
            }
        }

        self.operators.push(StackEntry::Operator {
            symbol: symbol.to_string(),
            prefix,
            position,
        });
        Ok(())
    }

    /// Pop operators until the nearest scope marker.
    fn close_scope(&mut self, position: usize) -> Result<(), ParserError> {
        loop {
            match self.operators.pop() {
                Some(StackEntry::Operator {
                    symbol, position, ..
                }) => self.reduce(symbol, position)?,
                Some(StackEntry::Scope) => return Ok(()),
                None => {
                    let message = "Unexpected `)` (missing opening `(`)";
                    return Err(ParserError::at(position, message.to_string()));
                }
            }
        }
    }

    /// Build a binary node from the two most recently produced subtrees.
    fn reduce(&mut self, symbol: String, position: usize) -> Result<(), ParserError> {
        let right = self.trees.pop();
        let left = self.trees.pop();
        let (Some(left), Some(right)) = (left, right) else {
            return Err(self.missing_right_operand_for(&symbol, position));
        };
        let arity = if self.nodes[left.index()].is_empty_leaf() {
            Arity::Unary
        } else {
            Arity::Infix
        };
        let id = self.push_node(ExpressionNode::internal(symbol, left, right, arity));
        self.trees.push(id);
        Ok(())
    }

    /// Parse a function call starting at `tokens[start]` (the function name). Returns the
    /// index of the first token after the closing parenthesis.
    fn function_call(
        &mut self,
        name: &str,
        tokens: &[Token],
        start: usize,
    ) -> Result<usize, ParserError> {
        let open = start + 1;
        let close = find_matching_parenthesis(tokens, open)?;

        let mut arguments = Vec::new();
        for (arg_start, arg_end) in split_arguments(tokens, open + 1, close) {
            let arg_tokens = &tokens[arg_start..arg_end];
            if arg_tokens.is_empty() {
                let position = tokens[arg_start.min(close)].position;
                return Err(ParserError::at(position, "Argument is empty".to_string()));
            }
            let argument = TreeBuilder::new(self.grammar, self.nodes).build(arg_tokens)?;
            let Some(argument) = argument else {
                unreachable!("Parser invariant: Non-empty tokens produce a tree.")
            };
            arguments.push(argument);
        }

        let position = tokens[start].position;
        let id = match arguments.as_slice() {
            [] => {
                let message = format!("Function `{name}` expects at least one argument");
                return Err(ParserError::at(position, message));
            }
            [argument] => {
                let empty = self.push_node(ExpressionNode::leaf(EMPTY_LEAF.to_string()));
                let node = ExpressionNode::internal(name.to_string(), empty, *argument, Arity::Unary);
                self.push_node(node)
            }
            [first, second] => {
                let node = ExpressionNode::internal(name.to_string(), *first, *second, Arity::Binary);
                self.push_node(node)
            }
            [first, rest @ ..] => {
                let mut chain = rest[rest.len() - 1];
                for argument in rest[..rest.len() - 1].iter().rev() {
                    let separator = ARGUMENT_SEPARATOR.to_string();
                    let node = ExpressionNode::internal(separator, *argument, chain, Arity::Infix);
                    chain = self.push_node(node);
                }
                let node = ExpressionNode::internal(name.to_string(), *first, chain, Arity::Nary);
                self.push_node(node)
            }
        };
        self.trees.push(id);
        Ok(close + 1)
    }

    fn missing_right_operand(&self, position: usize) -> ParserError {
        match self.operators.last() {
            Some(StackEntry::Operator { symbol, .. }) => {
                self.missing_right_operand_for(symbol, position)
            }
            _ => ParserError::at(position, "Missing operand".to_string()),
        }
    }

    fn missing_right_operand_for(&self, symbol: &str, position: usize) -> ParserError {
        let message = format!("Found nothing at the right-hand-side of operator `{symbol}`");
        ParserError::at(position, message)
    }
}

/// Find the index of the `)` matching the `(` at index `open` using a depth counter.
fn find_matching_parenthesis(tokens: &[Token], open: usize) -> Result<usize, ParserError> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token.data {
            TokenData::Open => depth += 1,
            TokenData::Close => {
                depth -= 1;
                if depth == 0 {
                    return Ok(index);
                }
            }
            _ => (),
        }
    }
    let position = tokens.last().map(|it| it.position + 1).unwrap_or_default();
    let message = "Input ended while expecting `)`";
    Err(ParserError::at(position, message.to_string()))
}

/// Split the token range `[start, end)` on commas that are not nested in parentheses.
/// An empty range produces no arguments.
fn split_arguments(tokens: &[Token], start: usize, end: usize) -> Vec<(usize, usize)> {
    if start == end {
        return Vec::new();
    }
    let mut result = Vec::new();
    let mut depth = 0usize;
    let mut arg_start = start;
    for (index, token) in tokens.iter().enumerate().take(end).skip(start) {
        match token.data {
            TokenData::Open => depth += 1,
            TokenData::Close => depth -= 1,
            TokenData::Comma if depth == 0 => {
                result.push((arg_start, index));
                arg_start = index + 1;
            }
            _ => (),
        }
    }
    result.push((arg_start, end));
    result
}
