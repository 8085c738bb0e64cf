//! Artifact directory slugs.
//!
//! A slug names the per-run directory under the artifact root. Three modes:
//! - `hashprefix`: first `len` hex chars of SHA256(key) (default)
//! - `basename`: the key's file name, whole
//! - `keypath`: the whole key with path separators turned into `-`
//!
//! Characters outside `[A-Za-z0-9_.-]` collapse to a single `-`. The length
//! only bounds hash prefixes; names are never cut, so distinct inputs keep
//! distinct directories.

use crate::error::ReportError;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SLUG_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlugMode {
    #[default]
    HashPrefix,
    Basename,
    KeyPath,
}

impl SlugMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HashPrefix => "hashprefix",
            Self::Basename => "basename",
            Self::KeyPath => "keypath",
        }
    }
}

impl fmt::Display for SlugMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlugMode {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hashprefix" | "hash-prefix" | "hash" => Ok(Self::HashPrefix),
            "basename" => Ok(Self::Basename),
            "keypath" | "key-path" => Ok(Self::KeyPath),
            other => Err(ReportError::Config(format!(
                "unknown slug mode '{other}' (use hashprefix, basename or keypath)"
            ))),
        }
    }
}

/// Hex SHA256 prefix of `key`.
#[must_use]
pub fn hex_hash_prefix(key: &str, len: usize) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let hex = format!("{digest:x}");
    hex.chars().take(len).collect()
}

fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-') {
            out.push(ch);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    out
}

/// Build a slug for `key`.
#[must_use]
pub fn make_slug(key: &str, mode: SlugMode, len: usize) -> String {
    let slug = match mode {
        SlugMode::HashPrefix => return hex_hash_prefix(key, len),
        SlugMode::Basename => {
            let base = key.rsplit(['/', '\\']).next().unwrap_or(key);
            sanitize(base)
        }
        SlugMode::KeyPath => sanitize(&key.replace(['/', '\\'], "-")),
    };
    if slug.is_empty() || slug.chars().all(|c| c == '.') {
        hex_hash_prefix(key, len.max(1))
    } else {
        slug
    }
}
