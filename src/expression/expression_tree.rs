use crate::expression::expression_parser::parse_expression;
use crate::expression::MalformedExpression;
use crate::grammar::{ARGUMENT_SEPARATOR, EMPTY_LEAF, Grammar};
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Index of a node inside the arena of an [`ExpressionTree`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct NodeId(usize);

/// The shape of an [`ExpressionNode`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum Arity {
    /// A leaf, or a binary infix operator (`A & B`).
    Infix,
    /// A prefix operator or a one-argument function call. The left child is the empty leaf.
    Unary,
    /// A two-argument function call (`pow(x, 2)`).
    Binary,
    /// A function call with three or more arguments. The first argument is the left child,
    /// the remaining arguments are chained through `,` nodes on the right.
    Nary,
}

/// A single node of an [`ExpressionTree`].
///
/// The `value` of a leaf is an operand (identifier, numeric literal, condition, or the
/// [`EMPTY_LEAF`] sentinel). The `value` of an internal node is an operator symbol,
/// a function name, or the [`ARGUMENT_SEPARATOR`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ExpressionNode {
    pub value: String,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub arity: Arity,
}

impl ExpressionNode {
    pub(crate) fn leaf(value: String) -> ExpressionNode {
        ExpressionNode {
            value,
            left: None,
            right: None,
            arity: Arity::Infix,
        }
    }

    pub(crate) fn internal(value: String, left: NodeId, right: NodeId, arity: Arity) -> Self {
        ExpressionNode {
            value,
            left: Some(left),
            right: Some(right),
            arity,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    #[must_use]
    pub fn is_empty_leaf(&self) -> bool {
        self.is_leaf() && self.value == EMPTY_LEAF
    }
}

/// A parsed rule: a binary expression tree stored in an arena of [`ExpressionNode`] objects.
///
/// Each tree exclusively owns its arena, and nodes reference their children by [`NodeId`].
/// Grafting a sub-rule ([`ExpressionTree::replace_node`]) therefore rewrites a single arena
/// slot instead of mutating shared subtrees. The tree never contains unreachable nodes after
/// a public operation finishes.
///
/// Trees are context-free values: they do not remember the [`Grammar`] that produced them.
#[derive(Clone, Debug)]
pub struct ExpressionTree {
    pub(crate) nodes: Vec<ExpressionNode>,
    pub(crate) root: NodeId,
}

/// Utility data access.
impl ExpressionTree {
    /// Parse a rule string using the given [`Grammar`].
    ///
    /// An empty (or blank) expression yields a tree with a single empty leaf.
    pub fn parse(expression: &str, grammar: &Grammar) -> Result<ExpressionTree, MalformedExpression> {
        parse_expression(expression, grammar)
            .map_err(|e| MalformedExpression::from_parser_error(e, expression))
    }

    /// A tree consisting of a single empty leaf.
    #[must_use]
    pub fn empty() -> ExpressionTree {
        Self::mk_leaf(EMPTY_LEAF)
    }

    /// A tree consisting of a single leaf with the given value.
    #[must_use]
    pub fn mk_leaf(value: &str) -> ExpressionTree {
        ExpressionTree {
            nodes: vec![ExpressionNode::leaf(value.to_string())],
            root: NodeId(0),
        }
    }

    /// Combine two trees using a binary infix operator.
    #[must_use]
    pub fn mk_infix(operator: &str, left: &ExpressionTree, right: &ExpressionTree) -> Self {
        let mut nodes = Vec::new();
        let left = left.copy_into(&mut nodes, left.root);
        let right = right.copy_into(&mut nodes, right.root);
        let arity = if nodes[left.0].is_empty_leaf() {
            Arity::Unary
        } else {
            Arity::Infix
        };
        nodes.push(ExpressionNode::internal(operator.to_string(), left, right, arity));
        ExpressionTree {
            root: NodeId(nodes.len() - 1),
            nodes,
        }
    }

    /// Apply a prefix operator (or a one-argument function) to a tree.
    #[must_use]
    pub fn mk_unary(operator: &str, child: &ExpressionTree) -> ExpressionTree {
        Self::mk_infix(operator, &ExpressionTree::empty(), child)
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node of this tree.
    ///
    /// # Panics
    ///
    /// Panics if the `id` does not belong to this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &ExpressionNode {
        &self.nodes[id.0]
    }

    #[must_use]
    pub fn root_node(&self) -> &ExpressionNode {
        self.node(self.root)
    }

    /// Number of nodes in this tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the tree only contains the empty leaf (e.g. it was parsed from a blank rule).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root_node().is_empty_leaf()
    }

    /// Height of the tree (a single leaf has depth `0`).
    #[must_use]
    pub fn depth(&self) -> usize {
        fn depth_rec(tree: &ExpressionTree, id: NodeId) -> usize {
            let node = tree.node(id);
            let left = node.left.map(|it| depth_rec(tree, it) + 1).unwrap_or(0);
            let right = node.right.map(|it| depth_rec(tree, it) + 1).unwrap_or(0);
            left.max(right)
        }
        depth_rec(self, self.root)
    }

    /// The arguments of a function call node, in declaration order.
    ///
    /// For [`Arity::Nary`] nodes, the chain of [`ARGUMENT_SEPARATOR`] nodes is flattened.
    /// For [`Arity::Unary`] nodes, the empty left child is skipped.
    #[must_use]
    pub fn arguments(&self, id: NodeId) -> Vec<NodeId> {
        let node = self.node(id);
        let (Some(left), Some(right)) = (node.left, node.right) else {
            return Vec::new();
        };
        match node.arity {
            Arity::Unary => vec![right],
            Arity::Infix | Arity::Binary => vec![left, right],
            Arity::Nary => {
                let mut result = vec![left];
                let mut current = right;
                loop {
                    let node = self.node(current);
                    match (node.left, node.right) {
                        (Some(l), Some(r)) if node.value == ARGUMENT_SEPARATOR => {
                            result.push(l);
                            current = r;
                        }
                        _ => {
                            result.push(current);
                            break;
                        }
                    }
                }
                result
            }
        }
    }

    /// Node IDs in pre-order (depth-first, left to right).
    #[must_use]
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            result.push(id);
            let node = self.node(id);
            if let Some(right) = node.right {
                stack.push(right);
            }
            if let Some(left) = node.left {
                stack.push(left);
            }
        }
        result
    }

    /// Copy the subtree rooted in `id` into the `target` arena, returning the new ID
    /// of the subtree root. Children are always stored before their parents.
    pub(crate) fn copy_into(&self, target: &mut Vec<ExpressionNode>, id: NodeId) -> NodeId {
        let node = self.node(id);
        let left = node.left.map(|it| self.copy_into(target, it));
        let right = node.right.map(|it| self.copy_into(target, it));
        target.push(ExpressionNode {
            value: node.value.clone(),
            left,
            right,
            arity: node.arity,
        });
        NodeId(target.len() - 1)
    }

    /// Drop all arena slots that are not reachable from the root.
    pub(crate) fn compact(&mut self) {
        let mut nodes = Vec::new();
        let root = self.copy_into(&mut nodes, self.root);
        self.nodes = nodes;
        self.root = root;
    }

    pub(crate) fn from_arena(nodes: Vec<ExpressionNode>, root: NodeId) -> ExpressionTree {
        let mut tree = ExpressionTree { nodes, root };
        tree.compact();
        tree
    }
}

impl NodeId {
    pub(crate) fn new(index: usize) -> NodeId {
        NodeId(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Trees are compared structurally; the layout of the arena is irrelevant.
impl PartialEq for ExpressionTree {
    fn eq(&self, other: &Self) -> bool {
        fn eq_rec(a: &ExpressionTree, x: NodeId, b: &ExpressionTree, y: NodeId) -> bool {
            let (x, y) = (a.node(x), b.node(y));
            let children_eq = |l: Option<NodeId>, r: Option<NodeId>| match (l, r) {
                (None, None) => true,
                (Some(l), Some(r)) => eq_rec(a, l, b, r),
                _ => false,
            };
            x.value == y.value
                && x.arity == y.arity
                && children_eq(x.left, y.left)
                && children_eq(x.right, y.right)
        }
        eq_rec(self, self.root, other, other.root)
    }
}

impl Eq for ExpressionTree {}

impl Default for ExpressionTree {
    fn default() -> Self {
        ExpressionTree::empty()
    }
}

impl Display for ExpressionTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_infix(&Default::default()))
    }
}

/// Trees are serialized as their canonical infix string.
impl Serialize for ExpressionTree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}
