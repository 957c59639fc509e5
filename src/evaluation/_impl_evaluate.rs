use crate::evaluation::{ArithmeticResolver, BooleanResolver, EvaluationError, Operation};
use crate::expression::{Arity, ExpressionTree, NodeId};
use std::collections::HashMap;

impl ExpressionTree {
    /// Evaluate this tree bottom-up using the supplied resolvers.
    ///
    /// Leaves are resolved through `operand`; the empty leaf evaluates to `None` ("absent").
    /// Internal nodes resolve their symbol through `operator` and combine the values of their
    /// children:
    ///  - Both children present: the binary form of the operation is applied.
    ///  - One child present: the unary form is applied; operations without a unary form
    ///    return the present value unchanged.
    ///  - [`Arity::Nary`] nodes pass all their arguments to a variadic operation.
    ///
    /// The tree is never modified, so several evaluations with different resolvers can share it.
    pub fn evaluate<V, O, P>(&self, operand: O, operator: P) -> Result<Option<V>, EvaluationError>
    where
        O: Fn(&str) -> Result<V, EvaluationError>,
        P: Fn(&str) -> Option<Operation<V>>,
    {
        self.evaluate_rec(self.root(), &operand, &operator)
    }

    fn evaluate_rec<V, O, P>(
        &self,
        id: NodeId,
        operand: &O,
        operator: &P,
    ) -> Result<Option<V>, EvaluationError>
    where
        O: Fn(&str) -> Result<V, EvaluationError>,
        P: Fn(&str) -> Option<Operation<V>>,
    {
        let node = self.node(id);
        if node.is_empty_leaf() {
            return Ok(None);
        }
        if node.is_leaf() {
            return operand(&node.value).map(Some);
        }

        let Some(operation) = operator(&node.value) else {
            return Err(EvaluationError::UnsupportedOperator {
                operator: node.value.clone(),
            });
        };
        let mismatch = |arguments: usize| EvaluationError::ArityMismatch {
            operator: node.value.clone(),
            arguments,
        };

        if node.arity == Arity::Nary {
            let mut values = Vec::new();
            for argument in self.arguments(id) {
                if let Some(value) = self.evaluate_rec(argument, operand, operator)? {
                    values.push(value);
                }
            }
            let count = values.len();
            return operation
                .apply_variadic(&values)
                .map(Some)
                .ok_or_else(|| mismatch(count));
        }

        let left = match node.left {
            Some(left) => self.evaluate_rec(left, operand, operator)?,
            None => None,
        };
        let right = match node.right {
            Some(right) => self.evaluate_rec(right, operand, operator)?,
            None => None,
        };
        match (left, right) {
            (Some(left), Some(right)) => operation
                .apply_binary(left, right)
                .map(Some)
                .ok_or_else(|| mismatch(2)),
            (Some(value), None) | (None, Some(value)) => Ok(Some(operation.apply_unary(value))),
            (None, None) => Ok(None),
        }
    }

    /// Evaluate this tree as a Boolean rule. An empty rule evaluates to `false`.
    pub fn evaluate_boolean(&self, resolver: &BooleanResolver) -> Result<bool, EvaluationError> {
        let result = self.evaluate(|it| resolver.operand(it), BooleanResolver::operator)?;
        Ok(result.unwrap_or(false))
    }

    /// Evaluate this tree as an arithmetic rate law, with parameters bound to `values`.
    /// An empty rule evaluates to `0`.
    ///
    /// Fails with [`EvaluationError::UnboundVariable`] if a parameter has no value.
    pub fn evaluate_arithmetic(&self, values: &HashMap<String, f64>) -> Result<f64, EvaluationError> {
        let operand = |value: &str| match values.get(value) {
            Some(bound) => Ok(*bound),
            None => ArithmeticResolver::operand(value),
        };
        let result = self.evaluate(operand, ArithmeticResolver::operator)?;
        Ok(result.unwrap_or_default())
    }
}
