//! Persisted theme preference.
//!
//! The preference is the only state that survives between renders: a single
//! `light`/`dark` value under a fixed key.

use super::ThemeMode;
use crate::error::Result;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key the preference is stored under.
pub const THEME_KEY: &str = "ts-theme";

const STATE_FILE: &str = "state.json";

pub trait ThemeStore {
    /// The stored preference, if any. Unreadable values count as absent.
    fn load(&self) -> Option<ThemeMode>;

    /// Persist a preference.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be written.
    fn save(&mut self, mode: ThemeMode) -> Result<()>;
}

/// Preference kept in `<state-dir>/state.json`.
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    path: PathBuf,
}

impl FileThemeStore {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(STATE_FILE),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_state(&self) -> Map<String, Value> {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return Map::new();
        };
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "ignoring unreadable theme state");
                Map::new()
            }
        }
    }
}

impl ThemeStore for FileThemeStore {
    fn load(&self) -> Option<ThemeMode> {
        let state = self.read_state();
        let raw = state.get(THEME_KEY)?.as_str()?;
        match raw.parse() {
            Ok(mode) => Some(mode),
            Err(e) => {
                warn!(error = %e, "ignoring stored theme");
                None
            }
        }
    }

    fn save(&mut self, mode: ThemeMode) -> Result<()> {
        let mut state = self.read_state();
        state.insert(THEME_KEY.to_string(), Value::String(mode.as_str().to_string()));
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&Value::Object(state))?)?;
        debug!(path = %self.path.display(), theme = %mode, "Saved theme preference");
        Ok(())
    }
}

/// In-memory preference, for tests and one-shot renders.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryThemeStore {
    value: Option<ThemeMode>,
}

impl MemoryThemeStore {
    #[must_use]
    pub const fn with(mode: ThemeMode) -> Self {
        Self { value: Some(mode) }
    }
}

impl ThemeStore for MemoryThemeStore {
    fn load(&self) -> Option<ThemeMode> {
        self.value
    }

    fn save(&mut self, mode: ThemeMode) -> Result<()> {
        self.value = Some(mode);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_no_preference() {
        let dir = TempDir::new().unwrap();
        assert!(FileThemeStore::new(dir.path()).load().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut store = FileThemeStore::new(dir.path().join("nested"));
        store.save(ThemeMode::Light).unwrap();
        assert_eq!(store.load(), Some(ThemeMode::Light));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"ts-theme\": \"light\""));
    }

    #[test]
    fn save_keeps_unrelated_keys() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STATE_FILE), r#"{"other": 1}"#).unwrap();
        let mut store = FileThemeStore::new(dir.path());
        store.save(ThemeMode::Dark).unwrap();
        let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["other"], 1);
        assert_eq!(raw[THEME_KEY], "dark");
    }

    #[test]
    fn bogus_value_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STATE_FILE), r#"{"ts-theme": "sepia"}"#).unwrap();
        assert!(FileThemeStore::new(dir.path()).load().is_none());
    }
}
