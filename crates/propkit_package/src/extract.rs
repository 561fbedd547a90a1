//! Lossy numeric extraction from mixed-format cells.

use std::sync::LazyLock;

use propkit_io_xlsx::EnumCellValue;
use regex::Regex;

/// Optional sign, then either a decimal with digits after the point or an integer.
static RE_FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?(?:[0-9]*\.[0-9]+|[0-9]+)").expect("numeric pattern is valid")
});

/// First numeric token in `text`, scanning left to right.
pub fn extract_first_number(text: &str) -> Option<f64> {
    RE_FIRST_NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Lower bound of a carpet-area cell.
///
/// Missing, NaN and text without any number all resolve to `0.0`; numeric
/// cells pass through unchanged.
pub fn extract_lower_carpet(value: &EnumCellValue) -> f64 {
    match value {
        EnumCellValue::None => 0.0,
        EnumCellValue::Number(n) if n.is_nan() => 0.0,
        EnumCellValue::Number(n) => *n,
        EnumCellValue::String(s) => extract_first_number(s).unwrap_or(0.0),
    }
}
