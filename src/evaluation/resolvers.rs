use crate::evaluation::{EvaluationError, Operation, evaluate_condition, is_condition};
use crate::grammar::{AND, NOT, OR};
use crate::utils::is_numeric_literal;
use num_traits::Zero;
use std::collections::{BTreeMap, HashSet};

static NO_VARIABLES: BTreeMap<String, f64> = BTreeMap::new();

/// Resolves operands and operators of Boolean rules (regulatory events and GPRs).
///
/// An operand is true if it is the literal `1`/`TRUE` or an identifier from the *active set*.
/// Relational conditions (`R > 0`) are compared against the numeric `variables`. Anything
/// else is false.
pub struct BooleanResolver<'a> {
    active: HashSet<&'a str>,
    variables: &'a BTreeMap<String, f64>,
}

impl<'a> BooleanResolver<'a> {
    /// Identifiers with a non-zero coefficient in `state` form the active set. The same state
    /// is used to resolve relational conditions.
    #[must_use]
    pub fn from_state(state: &'a BTreeMap<String, f64>) -> Self {
        let active = state
            .iter()
            .filter(|(_, value)| !value.is_zero())
            .map(|(id, _)| id.as_str())
            .collect();
        BooleanResolver {
            active,
            variables: state,
        }
    }

    /// Build a resolver from an explicit active set. Conditions see no variables
    /// (every variable is `0`).
    pub fn from_active<I: IntoIterator<Item = &'a str>>(active: I) -> Self {
        BooleanResolver {
            active: active.into_iter().collect(),
            variables: &NO_VARIABLES,
        }
    }

    #[must_use]
    pub fn is_active(&self, id: &str) -> bool {
        self.active.contains(id)
    }

    pub fn operand(&self, value: &str) -> Result<bool, EvaluationError> {
        if value == "1" || value.eq_ignore_ascii_case("true") || self.is_active(value) {
            Ok(true)
        } else if is_condition(value) {
            evaluate_condition(value, self.variables)
        } else {
            Ok(false)
        }
    }

    #[must_use]
    pub fn operator(symbol: &str) -> Option<Operation<bool>> {
        match symbol {
            AND => Some(Operation::Binary(|a: bool, b: bool| a && b)),
            OR => Some(Operation::Binary(|a: bool, b: bool| a || b)),
            NOT => Some(Operation::Unary(|a: bool| !a)),
            _ => None,
        }
    }
}

/// Resolves operands and operators of arithmetic rate laws.
///
/// Operands must be numeric literals: free parameters have to be substituted before the
/// evaluation (see [`crate::expression::ExpressionTree::replace`]).
pub struct ArithmeticResolver;

impl ArithmeticResolver {
    /// Resolve a numeric literal. Identifiers (including `inf` or `NaN`) are unbound.
    pub fn operand(value: &str) -> Result<f64, EvaluationError> {
        value
            .parse::<f64>()
            .ok()
            .filter(|_| is_numeric_literal(value))
            .ok_or_else(|| EvaluationError::UnboundVariable {
                name: value.to_string(),
            })
    }

    #[must_use]
    pub fn operator(symbol: &str) -> Option<Operation<f64>> {
        let operation: Operation<f64> = match symbol {
            "+" => Operation::Both(|x: f64| x, |a: f64, b: f64| a + b),
            "-" => Operation::Both(|x: f64| -x, |a: f64, b: f64| a - b),
            "*" => Operation::Binary(|a: f64, b: f64| a * b),
            "/" => Operation::Binary(|a: f64, b: f64| a / b),
            "^" | "pow" => Operation::Binary(f64::powf),
            "abs" => Operation::Unary(f64::abs),
            "exp" => Operation::Unary(f64::exp),
            "log" => Operation::Unary(f64::ln),
            "log10" => Operation::Unary(f64::log10),
            "sqrt" => Operation::Unary(f64::sqrt),
            "ceil" => Operation::Unary(f64::ceil),
            "floor" => Operation::Unary(f64::floor),
            "min" => Operation::Variadic(|values: &[f64]| {
                values.iter().copied().fold(f64::INFINITY, f64::min)
            }),
            "max" => Operation::Variadic(|values: &[f64]| {
                values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            }),
            "avg" => Operation::Variadic(average),
            _ => return None,
        };
        Some(operation)
    }
}

#[allow(clippy::cast_precision_loss)]
fn average(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
