//! Theme command implementation.

use super::resolve_config;
use crate::cli::ThemeCommands;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::output::OutputContext;
use crate::theme::{FileThemeStore, THEME_KEY, ThemeMode, ThemeStore};
use serde::Serialize;
use std::path::Path;
use tracing::info;

#[derive(Serialize)]
struct ThemeOutput<'a> {
    key: &'static str,
    theme: ThemeMode,
    /// Whether a preference is stored, as opposed to the default.
    stored: bool,
    path: &'a Path,
}

/// Apply a theme subcommand to `store`. Returns the resulting theme and
/// whether it is persisted.
///
/// # Errors
///
/// Returns an error if the preference cannot be saved.
pub fn apply(command: &ThemeCommands, store: &mut dyn ThemeStore) -> Result<(ThemeMode, bool)> {
    let stored = store.load();
    match command {
        ThemeCommands::Show => Ok((stored.unwrap_or_default(), stored.is_some())),
        ThemeCommands::Set { mode } => {
            let mode = ThemeMode::from(*mode);
            store.save(mode)?;
            info!(theme = %mode, "theme preference set");
            Ok((mode, true))
        }
        ThemeCommands::Toggle => {
            let mode = stored.unwrap_or_default().toggled();
            store.save(mode)?;
            info!(theme = %mode, "theme preference toggled");
            Ok((mode, true))
        }
    }
}

/// Execute the theme command.
///
/// # Errors
///
/// Returns an error if config is invalid or the preference cannot be saved.
pub fn execute(command: &ThemeCommands, state_dir: Option<&Path>, ctx: &OutputContext) -> Result<()> {
    let overrides = CliOverrides {
        state_dir: state_dir.map(Path::to_path_buf),
        ..CliOverrides::default()
    };
    let config = resolve_config(&overrides)?;
    let mut store = FileThemeStore::new(&config.state_dir);
    let (theme, stored) = apply(command, &mut store)?;

    if ctx.is_json() {
        return ctx.json_pretty(&ThemeOutput {
            key: THEME_KEY,
            theme,
            stored,
            path: store.path(),
        });
    }

    if stored {
        ctx.print(theme.as_str());
    } else {
        ctx.print(&format!("{theme} (default)"));
    }
    Ok(())
}
