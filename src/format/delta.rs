//! Before/after deltas.
//!
//! Direction reflects goodness, not arithmetic sign: for inverted metrics
//! (latency, memory, CPU, allocation rate) a decrease is `Up`.

use super::{num, num_digits};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Flat => "flat",
        }
    }

    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Up => "▲",
            Self::Down => "▼",
            Self::Flat => "•",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Delta {
    pub val: f64,
    pub dir: Direction,
    pub pct: f64,
}

impl Delta {
    pub const FLAT: Self = Self {
        val: 0.0,
        dir: Direction::Flat,
        pct: 0.0,
    };
}

/// Compare `after` against `before`.
///
/// Either side absent yields [`Delta::FLAT`]. `pct` is `0` when the
/// baseline is `0`.
#[must_use]
pub fn delta(after: Option<f64>, before: Option<f64>, invert: bool) -> Delta {
    let (Some(after), Some(before)) = (after, before) else {
        return Delta::FLAT;
    };
    let raw = after - before;
    let better = if invert { raw < 0.0 } else { raw > 0.0 };
    let dir = if raw == 0.0 {
        Direction::Flat
    } else if better {
        Direction::Up
    } else {
        Direction::Down
    };
    let pct = if before == 0.0 {
        0.0
    } else {
        raw / before * 100.0
    };
    Delta { val: raw, dir, pct }
}

/// Render a delta as a chip: glyph, percentage, and the absolute change in
/// the title.
#[must_use]
pub fn chip(d: &Delta, unit: &str) -> String {
    let pct = if d.pct.is_finite() {
        num_digits(Some(d.pct), 1)
    } else {
        "0.0".to_string()
    };
    format!(
        r#"<span class="delta {dir}" title="{val}{unit}">{glyph} {pct}%</span>"#,
        dir = d.dir.as_str(),
        val = num(Some(d.val)),
        glyph = d.dir.glyph(),
    )
}
