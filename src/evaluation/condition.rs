use crate::evaluation::EvaluationError;
use crate::grammar::RELATIONAL_SYMBOLS;
use crate::utils::is_numeric_literal;
use std::collections::BTreeMap;

/// True if the given operand contains one of the relational symbols (i.e. it is a condition
/// like `R > 0` and not a plain identifier).
#[must_use]
pub fn is_condition(operand: &str) -> bool {
    RELATIONAL_SYMBOLS.iter().any(|it| operand.contains(it))
}

/// Evaluate a relational condition (e.g. `o2[e] >= 0.5`) against numeric `variables`.
///
/// The condition is split on the first relational symbol found, trying longer symbols first
/// (so `>=` is never read as `>`). Each side is either a numeric literal or a variable name.
/// Missing variables have value `0`.
pub fn evaluate_condition(
    condition: &str,
    variables: &BTreeMap<String, f64>,
) -> Result<bool, EvaluationError> {
    let invalid = || EvaluationError::InvalidConditionFormat {
        condition: condition.to_string(),
    };

    let Some((symbol, (left, right))) = RELATIONAL_SYMBOLS
        .iter()
        .find_map(|symbol| condition.split_once(symbol).map(|it| (*symbol, it)))
    else {
        return Err(invalid());
    };

    let (left, right) = (left.trim(), right.trim());
    if left.is_empty() || right.is_empty() {
        return Err(invalid());
    }
    let left = resolve_side(left, variables);
    let right = resolve_side(right, variables);

    let result = match symbol {
        ">=" => left >= right,
        "<=" => left <= right,
        ">" => left > right,
        "<" => left < right,
        "==" | "=" => (left - right).abs() < f64::EPSILON,
        "!=" => (left - right).abs() >= f64::EPSILON,
        _ => return Err(invalid()),
    };
    Ok(result)
}

fn resolve_side(side: &str, variables: &BTreeMap<String, f64>) -> f64 {
    side.parse::<f64>()
        .ok()
        .filter(|_| is_numeric_literal(side))
        .unwrap_or_else(|| variables.get(side).copied().unwrap_or_default())
}
