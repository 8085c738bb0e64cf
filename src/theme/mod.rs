//! Theme tokens and the chart theme derived from them.
//!
//! The chart theme is a pure function of five colour tokens. Tokens come
//! from the active palette (the same values the page exposes as CSS custom
//! properties), so charts always match the page. Nothing here is cached:
//! callers rebuild the theme on every mount.

pub mod store;

pub use store::{FileThemeStore, MemoryThemeStore, THEME_KEY, ThemeStore};

use crate::error::ReportError;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const FALLBACK_TEXT: &str = "#e6ebf3";
pub const FALLBACK_MUTED: &str = "#9aa3b2";
pub const FALLBACK_BORDER: &str = "#223047";
pub const FALLBACK_ACCENT: &str = "#7aa2f7";
pub const FALLBACK_ACCENT_2: &str = "#9b8cff";

/// Fixed hues that follow the two accents in the category palette.
const EXTRA_HUES: [&str; 5] = ["#22c55e", "#f59e0b", "#ef4444", "#06b6d4", "#e879f9"];

const GRID_ALPHA: f64 = 0.55;
const DOMAIN_ALPHA: f64 = 0.85;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            _ => Err(ReportError::InvalidTheme {
                value: s.to_string(),
            }),
        }
    }
}

/// The five colour tokens charts are styled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeTokens {
    pub text: String,
    pub muted: String,
    pub border: String,
    pub accent: String,
    pub accent_2: String,
}

impl Default for ThemeTokens {
    fn default() -> Self {
        Self {
            text: FALLBACK_TEXT.to_string(),
            muted: FALLBACK_MUTED.to_string(),
            border: FALLBACK_BORDER.to_string(),
            accent: FALLBACK_ACCENT.to_string(),
            accent_2: FALLBACK_ACCENT_2.to_string(),
        }
    }
}

impl ThemeTokens {
    /// Built-in palette for a mode.
    #[must_use]
    pub fn palette(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::default(),
            ThemeMode::Light => Self {
                text: "#1b2330".to_string(),
                muted: "#5d6778".to_string(),
                border: "#d3dae6".to_string(),
                accent: "#3b64d8".to_string(),
                accent_2: "#7c5cff".to_string(),
            },
        }
    }

    /// Read tokens from CSS custom properties (`--text`, `--muted`,
    /// `--border`, `--accent`, `--accent-2`). Unset or malformed values fall
    /// back to the fixed defaults.
    #[must_use]
    pub fn from_css_vars(vars: &IndexMap<String, String>) -> Self {
        let pick = |name: &str, fallback: &str| {
            vars.get(name)
                .map(|v| v.trim())
                .filter(|v| is_hex_color(v))
                .map_or_else(|| fallback.to_string(), str::to_string)
        };
        Self {
            text: pick("--text", FALLBACK_TEXT),
            muted: pick("--muted", FALLBACK_MUTED),
            border: pick("--border", FALLBACK_BORDER),
            accent: pick("--accent", FALLBACK_ACCENT),
            accent_2: pick("--accent-2", FALLBACK_ACCENT_2),
        }
    }

    /// Tokens as CSS custom properties, in a stable order.
    #[must_use]
    pub fn css_vars(&self) -> IndexMap<String, String> {
        let mut vars = IndexMap::new();
        vars.insert("--text".to_string(), self.text.clone());
        vars.insert("--muted".to_string(), self.muted.clone());
        vars.insert("--border".to_string(), self.border.clone());
        vars.insert("--accent".to_string(), self.accent.clone());
        vars.insert("--accent-2".to_string(), self.accent_2.clone());
        vars
    }
}

/// Token sets for both modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palettes {
    pub dark: ThemeTokens,
    pub light: ThemeTokens,
}

impl Default for Palettes {
    fn default() -> Self {
        Self {
            dark: ThemeTokens::palette(ThemeMode::Dark),
            light: ThemeTokens::palette(ThemeMode::Light),
        }
    }
}

impl Palettes {
    #[must_use]
    pub const fn get(&self, mode: ThemeMode) -> &ThemeTokens {
        match mode {
            ThemeMode::Dark => &self.dark,
            ThemeMode::Light => &self.light,
        }
    }

    pub fn get_mut(&mut self, mode: ThemeMode) -> &mut ThemeTokens {
        match mode {
            ThemeMode::Dark => &mut self.dark,
            ThemeMode::Light => &mut self.light,
        }
    }
}

/// `#` followed by 3, 4, 6 or 8 hex digits.
#[must_use]
pub fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 4 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Convert `#rrggbb` (or `#rrggbbaa`, alpha ignored) plus an opacity to an
/// `rgba(...)` string. Any other length yields black at the given opacity.
#[must_use]
pub fn hex_to_rgba(hex: &str, alpha: f64) -> String {
    let digits = hex.trim().replace('#', "");
    if digits.len() != 6 && digits.len() != 8 {
        return format!("rgba(0,0,0,{alpha})");
    }
    let channel = |i: usize| {
        digits
            .get(i..i + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .unwrap_or(0)
    };
    format!("rgba({},{},{},{alpha})", channel(0), channel(2), channel(4))
}

/// Vega-Lite `config` block for the active theme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartTheme {
    pub background: Option<String>,
    pub view: ViewConfig,
    pub axis: AxisConfig,
    pub legend: LegendConfig,
    pub range: RangeConfig,
    pub line: LineConfig,
    pub point: PointConfig,
    pub bar: BarConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewConfig {
    pub stroke: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisConfig {
    pub label_color: String,
    pub title_color: String,
    pub grid_color: String,
    pub tick_color: String,
    pub domain_color: String,
    pub label_font_size: u32,
    pub title_font_size: u32,
    pub grid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendConfig {
    pub label_color: String,
    pub title_color: String,
    pub label_font_size: u32,
    pub title_font_size: u32,
    pub symbol_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeConfig {
    pub category: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointConfig {
    pub filled: bool,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarConfig {
    pub corner_radius_end: u32,
}

/// Build the chart theme from tokens.
#[must_use]
pub fn chart_theme(tokens: &ThemeTokens) -> ChartTheme {
    let grid_color = hex_to_rgba(&tokens.border, GRID_ALPHA);
    let domain_color = hex_to_rgba(&tokens.border, DOMAIN_ALPHA);

    let mut category = vec![tokens.accent.clone(), tokens.accent_2.clone()];
    category.extend(EXTRA_HUES.iter().map(|h| (*h).to_string()));

    ChartTheme {
        background: None,
        view: ViewConfig {
            stroke: grid_color.clone(),
        },
        axis: AxisConfig {
            label_color: tokens.text.clone(),
            title_color: tokens.text.clone(),
            grid_color,
            tick_color: domain_color.clone(),
            domain_color,
            label_font_size: 12,
            title_font_size: 12,
            grid: true,
        },
        legend: LegendConfig {
            label_color: tokens.text.clone(),
            title_color: tokens.text.clone(),
            label_font_size: 12,
            title_font_size: 12,
            symbol_type: "stroke".to_string(),
        },
        range: RangeConfig { category },
        line: LineConfig { stroke_width: 2.2 },
        point: PointConfig {
            filled: true,
            size: 48,
        },
        bar: BarConfig {
            corner_radius_end: 3,
        },
    }
}
