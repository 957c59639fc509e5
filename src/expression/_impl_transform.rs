use crate::expression::ExpressionTree;
use std::collections::{HashMap, HashSet};

impl ExpressionTree {
    /// Create a copy of this tree where the values of leaves are rewritten according to
    /// the given `mapping`. Leaves that are not in the mapping are kept. The original tree
    /// is not modified.
    #[must_use]
    pub fn replace(&self, mapping: &HashMap<String, String>) -> ExpressionTree {
        let mut result = self.clone();
        for node in &mut result.nodes {
            if node.is_leaf() {
                if let Some(value) = mapping.get(&node.value) {
                    node.value = value.clone();
                }
            }
        }
        result
    }

    /// Graft `subtree` in place of the first node (in depth-first pre-order) whose value
    /// equals `key`. The value, children and arity of that node are overwritten by those of
    /// the subtree root.
    ///
    /// Returns `false` if no node has the given value.
    pub fn replace_node(&mut self, key: &str, subtree: &ExpressionTree) -> bool {
        let Some(target) = self
            .pre_order()
            .into_iter()
            .find(|id| self.node(*id).value == key)
        else {
            return false;
        };
        let grafted = subtree.copy_into(&mut self.nodes, subtree.root);
        let grafted = self.nodes[grafted.index()].clone();
        self.nodes[target.index()] = grafted;
        self.compact();
        true
    }

    /// Inline named sub-rules (e.g. rate-law functions defined elsewhere in a model).
    ///
    /// Every node whose value is a key of `definitions` is replaced by the corresponding
    /// tree. Definitions can use each other: names are processed in sorted order, in rounds,
    /// until no replacement happens (at most one round per definition, so cyclic definitions
    /// are expanded a bounded number of times). A definition that references its own name is
    /// only inlined once.
    pub fn inline_definitions(&mut self, definitions: &HashMap<String, ExpressionTree>) {
        let mut names = definitions.keys().collect::<Vec<_>>();
        names.sort();
        let mut self_referencing_done = HashSet::new();
        for _ in 0..definitions.len() {
            let mut changed = false;
            for name in &names {
                let definition = &definitions[*name];
                if definition.contains_value(name) {
                    if !self_referencing_done.contains(*name) && self.replace_node(name, definition) {
                        self_referencing_done.insert(*name);
                        changed = true;
                    }
                    continue;
                }
                while self.replace_node(name, definition) {
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }
}
