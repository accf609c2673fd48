//! Numeric coercion.

/// Parses a cell as a finite `f64`.
///
/// Accepts an optional thousands separator (`12,000`). Returns `None` for
/// empty, malformed or non-finite input.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = match trimmed.parse::<f64>() {
        Ok(number) => number,
        Err(_) if trimmed.contains(',') => trimmed.replace(',', "").parse::<f64>().ok()?,
        Err(_) => return None,
    };
    parsed.is_finite().then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_grouped_numbers() {
        assert_eq!(parse_number("200"), Some(200.0));
        assert_eq!(parse_number(" 0.512 "), Some(0.512));
        assert_eq!(parse_number("12,000"), Some(12000.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
    }

    #[test]
    fn malformed_values_are_missing() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("200 OK"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }
}
