/// Make a trimmed copy of the provided `String`, or `None` if it is blank.
pub fn take_if_not_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// True if the given operand is a numeric literal (`2`, `-1.5`, `.5`, `1e-5`).
///
/// Identifiers that happen to parse as a float (`inf`, `NaN`) are not literals.
pub fn is_numeric_literal(value: &str) -> bool {
    value.starts_with(|c: char| c.is_ascii_digit() || ['.', '+', '-'].contains(&c))
        && value.parse::<f64>().is_ok()
}

/// A helper method to check that a given `value` is stored in the `container`, and it is the
/// only item with such ID in the container.
///
/// Returns `None` when the `value` (compared by address) is not in the `container`.
/// Otherwise, returns `Some(true)` if the ID is unique and `Some(false)` if it is not.
pub fn is_unique_id<T, ID: Eq, F>(container: &[T], value: &T, id: F) -> Option<bool>
where
    F: Fn(&T) -> ID,
{
    let check_id = id(value);
    let mut found = false;
    let mut count = 0u32;
    for item in container {
        if std::ptr::eq(value, item) {
            found = true;
        }
        if id(item) == check_id {
            count += 1;
        }
    }
    found.then_some(count == 1)
}
