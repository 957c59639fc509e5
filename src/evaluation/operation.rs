/// The semantics of a single operator (or function), as supplied by an operator resolver.
///
/// An operation declares which argument shapes it accepts. [`Operation::Both`] is used by
/// operators that have a prefix and an infix form (`-x` vs. `a - b`).
pub enum Operation<V> {
    Unary(fn(V) -> V),
    Binary(fn(V, V) -> V),
    Both(fn(V) -> V, fn(V, V) -> V),
    Variadic(fn(&[V]) -> V),
}

impl<V> Operation<V> {
    /// Apply the operation to a single present argument.
    ///
    /// Operations without a unary form return the argument unchanged.
    pub fn apply_unary(&self, value: V) -> V {
        match self {
            Operation::Unary(function) | Operation::Both(function, _) => function(value),
            Operation::Variadic(function) => function(std::slice::from_ref(&value)),
            Operation::Binary(_) => value,
        }
    }

    /// Apply the operation to two arguments. Returns `None` if the operation is unary only.
    pub fn apply_binary(&self, left: V, right: V) -> Option<V> {
        match self {
            Operation::Binary(function) | Operation::Both(_, function) => Some(function(left, right)),
            Operation::Variadic(function) => Some(function(&[left, right])),
            Operation::Unary(_) => None,
        }
    }

    /// Apply the operation to a list of arguments. Returns `None` unless the operation
    /// is variadic.
    pub fn apply_variadic(&self, arguments: &[V]) -> Option<V> {
        match self {
            Operation::Variadic(function) => Some(function(arguments)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::evaluation::Operation;

    #[test]
    fn test_operation_shapes() {
        let minus = Operation::Both(|x: f64| -x, |a: f64, b: f64| a - b);
        assert_eq!(minus.apply_unary(2.0), -2.0);
        assert_eq!(minus.apply_binary(5.0, 2.0), Some(3.0));
        assert_eq!(minus.apply_variadic(&[1.0]), None);

        let not = Operation::Unary(|x: bool| !x);
        assert!(not.apply_unary(false));
        assert_eq!(not.apply_binary(true, true), None);

        // A binary operation with one present argument skips the combination.
        let and = Operation::Binary(|a: bool, b: bool| a && b);
        assert!(and.apply_unary(true));

        let sum = Operation::Variadic(|values: &[f64]| values.iter().sum());
        assert_eq!(sum.apply_variadic(&[1.0, 2.0, 3.0]), Some(6.0));
        assert_eq!(sum.apply_binary(1.0, 2.0), Some(3.0));
        assert_eq!(sum.apply_unary(4.0), 4.0);
    }
}
