//! Conversion of locale-formatted numeric text into `f64`.

use crate::error::ScraperError;

/// Parses `raw` as a number written with the given separators.
///
/// Every `thousands_separator` is removed first, then every
/// `decimal_separator` is replaced with `.`. Stripping has to come first so
/// that European input (`1.234,56` with `.`/`,`) never turns the grouping
/// dots into decimal points. Empty separators are skipped. Surrounding
/// whitespace, including non-breaking spaces, is ignored.
///
/// # Errors
///
/// Returns [`ScraperError::Normalization`] if the substituted text is not a
/// valid floating-point literal.
pub fn normalize_number(
    raw: &str,
    thousands_separator: &str,
    decimal_separator: &str,
) -> Result<f64, ScraperError> {
    let mut value = raw.trim().to_string();

    if !thousands_separator.is_empty() {
        value = value.replace(thousands_separator, "");
    }
    if !decimal_separator.is_empty() && decimal_separator != "." {
        value = value.replace(decimal_separator, ".");
    }

    value
        .parse::<f64>()
        .map_err(|source| ScraperError::Normalization {
            value: raw.to_string(),
            thousands_separator: thousands_separator.to_string(),
            decimal_separator: decimal_separator.to_string(),
            source,
        })
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
