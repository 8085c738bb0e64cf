//! Display formatting for report values.
//!
//! Every function is total: absent or non-finite input formats as `0`, so
//! the report never shows `NaN` or an empty cell where a number belongs.
//! Grouping follows en-US conventions (`1,234.5`).

pub mod delta;

pub use delta::{Delta, Direction, chip, delta};

/// Placeholder for absent text values.
pub const EM_DASH: &str = "—";

/// Largest magnitude rounded through `f64::round`; beyond this the
/// fraction digits are meaningless anyway.
const EXACT_ROUNDING_LIMIT: f64 = 9.0e15;

fn finite_or_zero(n: Option<f64>) -> f64 {
    n.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Round half away from zero to `digits` fraction digits.
fn round_to(n: f64, digits: usize) -> f64 {
    let factor = 10f64.powi(i32::try_from(digits).unwrap_or(i32::MAX));
    let scaled = n * factor;
    if scaled.abs() >= EXACT_ROUNDING_LIMIT || !scaled.is_finite() {
        return n;
    }
    scaled.round() / factor
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Grouped decimal with at most `digits` fraction digits, trailing zeros
/// trimmed.
#[must_use]
pub fn num_digits(n: Option<f64>, digits: usize) -> String {
    let rounded = round_to(finite_or_zero(n), digits);
    let negative = rounded < 0.0;
    let fixed = format!("{:.*}", digits, rounded.abs());

    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::new();
    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    if negative && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Grouped integer.
#[must_use]
pub fn int(n: Option<f64>) -> String {
    num_digits(n, 0)
}

/// Grouped decimal, at most two fraction digits.
#[must_use]
pub fn num(n: Option<f64>) -> String {
    num_digits(n, 2)
}

/// Milliseconds, no fraction.
#[must_use]
pub fn ms(n: Option<f64>) -> String {
    format!("{} ms", num_digits(n, 0))
}

/// Percentage, at most one fraction digit.
#[must_use]
pub fn pct(n: Option<f64>) -> String {
    format!("{}%", num_digits(n, 1))
}

/// Megabytes, at most two fraction digits.
#[must_use]
pub fn mb(n: Option<f64>) -> String {
    format!("{} MB", num_digits(n, 2))
}

/// Fixed one-decimal share, as shown in the stage table (`50.0%`).
#[must_use]
pub fn share(n: f64) -> String {
    let v = if n.is_finite() { n } else { 0.0 };
    let rounded = round_to(v, 1);
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.1}%")
}

/// Text value or the em-dash placeholder.
#[must_use]
pub fn text_or_dash(value: Option<&str>) -> String {
    value
        .filter(|s| !s.is_empty())
        .map_or_else(|| EM_DASH.to_string(), str::to_string)
}
