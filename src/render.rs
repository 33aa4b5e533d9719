//! Canonical number rendering for values written back into the expression.

use compact_str::{format_compact, CompactString};

/// Decimal places kept after an evaluation or a percentage.
pub const PRECISION: usize = 10;

/// Rounds to [`PRECISION`] decimal places to suppress binary floating point
/// noise, so `0.1 + 0.2` becomes exactly `0.3`.
pub fn round(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", PRECISION, value).parse().unwrap_or(value)
}

/// Renders a finite value without exponent or trailing zeros.
///
/// The output always matches the literal grammar, so it can be edited and
/// evaluated again.
pub fn render(value: f64) -> CompactString {
    let value = round(value);
    // Display for f64 never switches to exponent notation
    if value == 0.0 {
        CompactString::new("0")
    } else {
        format_compact!("{}", value)
    }
}
