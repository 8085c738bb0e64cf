//! Configuration management for `runreport`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`RUNREPORT_*`)
//! 3. Project config (.runreport/config.yaml)
//! 4. User config (~/.config/runreport/config.yaml)
//! 5. Defaults
//!
//! Every source is flattened into a [`ConfigLayer`] of normalized dotted keys
//! (`mount.width-attempts`, `theme.light.accent-2`) before merging, so YAML
//! nesting, env var names and CLI flags all address the same key space.

use crate::charts::{AssetSource, MountConfig, VegaAssets};
use crate::document::Layout;
use crate::error::{ReportError, Result};
use crate::theme::{Palettes, ThemeMode, ThemeTokens, is_hex_color};
use crate::util::{DEFAULT_SLUG_LENGTH, RetryPolicy, SlugMode};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "RUNREPORT_";

const PROJECT_DIR: &str = ".runreport";
const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_ARTIFACT_ROOT: &str = "artifacts";
const DEFAULT_TITLE: &str = "Run Report";

/// Default chart runtime readiness budget: 40 probes, 100ms apart.
pub const DEFAULT_RUNTIME_POLICY: RetryPolicy = RetryPolicy::new(40, 100);

/// A flattened set of config keys from one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        debug!(path = %path.display(), "Loaded config layer");
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(env::vars())
    }

    /// Build a layer from `RUNREPORT_*` variables. `RUNREPORT_MOUNT_MIN_WIDTH`
    /// addresses `mount.min-width`.
    #[must_use]
    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                if !stripped.is_empty() {
                    layer.insert(stripped, value);
                }
            }
        }
        layer
    }

    /// Insert a value under a normalized key.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    /// Look up a key in any spelling (`mount.min-width`, `MOUNT_MIN_WIDTH`).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub artifact_root: Option<PathBuf>,
    pub slug_mode: Option<String>,
    pub title: Option<String>,
    pub state_dir: Option<PathBuf>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.artifact_root {
            layer.insert("artifact-root", path.to_string_lossy());
        }
        if let Some(mode) = &self.slug_mode {
            layer.insert("slug.mode", mode.clone());
        }
        if let Some(title) = &self.title {
            layer.insert("title", title.clone());
        }
        if let Some(path) = &self.state_dir {
            layer.insert("state-dir", path.to_string_lossy());
        }

        layer
    }
}

/// Load project config (.runreport/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_dir: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&project_dir.join(PROJECT_DIR).join(CONFIG_FILE))
}

/// Load user config (~/.config/runreport/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config(home: Option<&Path>) -> Result<ConfigLayer> {
    let Some(home) = home else {
        return Ok(ConfigLayer::default());
    };
    ConfigLayer::from_yaml(&user_config_dir(home).join(CONFIG_FILE))
}

fn user_config_dir(home: &Path) -> PathBuf {
    home.join(".config").join("runreport")
}

/// Load configuration with the standard precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_config(
    project_dir: &Path,
    home: Option<&Path>,
    env_layer: &ConfigLayer,
    cli: &CliOverrides,
) -> Result<ConfigLayer> {
    let user = load_user_config(home)?;
    let project = load_project_config(project_dir)?;
    let cli_layer = cli.as_layer();

    Ok(ConfigLayer::merge_layers(&[
        user,
        project,
        env_layer.clone(),
        cli_layer,
    ]))
}

/// Typed configuration for a render.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub artifact_root: PathBuf,
    pub slug_mode: SlugMode,
    pub slug_length: usize,
    pub title: String,
    pub layout: Layout,
    pub mount: MountConfig,
    pub runtime: RetryPolicy,
    pub assets: VegaAssets,
    /// Copy local asset files next to the report.
    pub copy_assets: bool,
    /// Extra stylesheet copied next to the report and linked from it.
    pub stylesheet: Option<PathBuf>,
    /// Where the theme preference lives.
    pub state_dir: PathBuf,
    pub palettes: Palettes,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            artifact_root: PathBuf::from(DEFAULT_ARTIFACT_ROOT),
            slug_mode: SlugMode::default(),
            slug_length: DEFAULT_SLUG_LENGTH,
            title: DEFAULT_TITLE.to_string(),
            layout: Layout::default(),
            mount: MountConfig::default(),
            runtime: DEFAULT_RUNTIME_POLICY,
            assets: VegaAssets::default(),
            copy_assets: true,
            stylesheet: None,
            state_dir: PathBuf::from(PROJECT_DIR),
            palettes: Palettes::default(),
        }
    }
}

impl ReportConfig {
    /// Resolve a merged layer into typed settings. Absent keys keep their
    /// defaults; the state dir defaults to the user config dir when a home
    /// directory is known.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Config` if a value cannot be parsed.
    pub fn from_layer(layer: &ConfigLayer, home: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(home) = home {
            config.state_dir = user_config_dir(home);
        }

        if let Some(value) = non_empty(layer, "artifact-root") {
            config.artifact_root = PathBuf::from(value);
        }
        if let Some(value) = non_empty(layer, "slug.mode") {
            config.slug_mode = value.parse()?;
        }
        if let Some(length) = parse_number::<usize>(layer, "slug.length")? {
            if length == 0 {
                return Err(ReportError::Config("slug.length must be at least 1".into()));
            }
            config.slug_length = length;
        }
        if let Some(value) = non_empty(layer, "title") {
            config.title = value.to_string();
        }
        if let Some(width) = parse_number::<f64>(layer, "layout.viewport-width")? {
            config.layout.viewport_width = width;
        }

        let mount = &mut config.mount;
        if let Some(v) = parse_number(layer, "mount.width-attempts")? {
            mount.width_attempts = v;
        }
        if let Some(v) = parse_number(layer, "mount.width-interval-ms")? {
            mount.width_interval_ms = v;
        }
        if let Some(v) = parse_number(layer, "mount.fallback-width")? {
            mount.fallback_width = v;
        }
        if let Some(v) = parse_number(layer, "mount.min-width")? {
            mount.min_width = v;
        }
        if let Some(v) = parse_number(layer, "mount.fallback-min-height")? {
            mount.fallback_min_height = v;
        }

        let attempts = parse_number(layer, "runtime.attempts")?.unwrap_or(config.runtime.attempts);
        let interval = parse_number(layer, "runtime.interval-ms")?
            .unwrap_or_else(|| duration_ms(config.runtime));
        config.runtime = RetryPolicy::new(attempts, interval);

        if let Some(value) = non_empty(layer, "assets.vega") {
            config.assets.vega = AssetSource::parse(value);
        }
        if let Some(value) = non_empty(layer, "assets.vega-lite") {
            config.assets.vega_lite = AssetSource::parse(value);
        }
        if let Some(value) = non_empty(layer, "assets.vega-embed") {
            config.assets.vega_embed = AssetSource::parse(value);
        }
        if let Some(value) = non_empty(layer, "assets.copy") {
            config.copy_assets = parse_bool(value).ok_or_else(|| {
                ReportError::Config(format!("assets.copy: expected a boolean, got '{value}'"))
            })?;
        }
        if let Some(value) = non_empty(layer, "assets.css") {
            config.stylesheet = Some(PathBuf::from(value));
        }
        if let Some(value) = non_empty(layer, "state-dir") {
            config.state_dir = PathBuf::from(value);
        }

        for mode in [ThemeMode::Dark, ThemeMode::Light] {
            apply_theme_overrides(layer, mode, config.palettes.get_mut(mode))?;
        }

        Ok(config)
    }
}

fn apply_theme_overrides(layer: &ConfigLayer, mode: ThemeMode, tokens: &mut ThemeTokens) -> Result<()> {
    let slots: [(&str, &mut String); 5] = [
        ("text", &mut tokens.text),
        ("muted", &mut tokens.muted),
        ("border", &mut tokens.border),
        ("accent", &mut tokens.accent),
        ("accent-2", &mut tokens.accent_2),
    ];
    for (name, slot) in slots {
        let key = format!("theme.{mode}.{name}");
        let Some(value) = non_empty(layer, &key) else {
            continue;
        };
        if !is_hex_color(value) {
            return Err(ReportError::Config(format!(
                "{key} must be a hex colour like #1b2330, got '{value}'"
            )));
        }
        *slot = value.to_string();
    }
    Ok(())
}

fn duration_ms(policy: RetryPolicy) -> u64 {
    u64::try_from(policy.interval.as_millis()).unwrap_or(u64::MAX)
}

/// Keys compare equal regardless of case and of `.`, `_` or `-` separators.
fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace(['_', '.'], "-")
}

fn non_empty<'a>(layer: &'a ConfigLayer, key: &str) -> Option<&'a str> {
    layer.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number<T: std::str::FromStr>(layer: &ConfigLayer, key: &str) -> Result<Option<T>> {
    let Some(value) = non_empty(layer, key) else {
        return Ok(None);
    };
    value
        .parse::<T>()
        .map(Some)
        .map_err(|_| ReportError::Config(format!("{key}: expected a number, got '{value}'")))
}

/// Parse a boolean flag value.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        layer.insert(&key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let joined = values
                .iter()
                .filter_map(yaml_scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            out.insert(prefix.to_string(), joined);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn layer(pairs: &[(&str, &str)]) -> ConfigLayer {
        let mut layer = ConfigLayer::default();
        for (k, v) in pairs {
            layer.insert(k, *v);
        }
        layer
    }

    #[test]
    fn merge_precedence_order() {
        let user = layer(&[("title", "user")]);
        let project = layer(&[("title", "project")]);
        let env_layer = layer(&[("title", "env")]);
        let cli = layer(&[("title", "cli")]);

        let merged = ConfigLayer::merge_layers(&[user, project, env_layer, cli]);
        assert_eq!(merged.get("title"), Some("cli"));
    }

    #[test]
    fn yaml_nested_keys_flatten_with_dots() {
        let yaml = r"
mount:
  width-attempts: 5
theme:
  light:
    accent-2: '#112233'
";
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).expect("parse yaml");
        let layer = layer_from_yaml_value(&value);
        assert_eq!(layer.get("mount.width-attempts"), Some("5"));
        assert_eq!(layer.get("theme.light.accent-2"), Some("#112233"));
    }

    #[test]
    fn env_vars_map_onto_dotted_keys() {
        let layer = ConfigLayer::from_env_vars(vec![
            ("RUNREPORT_MOUNT_MIN_WIDTH".to_string(), "300".to_string()),
            ("RUNREPORT_SLUG_MODE".to_string(), "basename".to_string()),
            ("UNRELATED".to_string(), "x".to_string()),
        ]);
        assert_eq!(layer.get("mount.min-width"), Some("300"));
        assert_eq!(layer.get("slug.mode"), Some("basename"));
        assert_eq!(layer.values.len(), 2);
    }

    #[test]
    fn normalize_key_handles_various_formats() {
        assert_eq!(normalize_key("Mount.Width_Attempts"), "mount-width-attempts");
        assert_eq!(normalize_key(" state-dir "), "state-dir");
    }

    #[test]
    fn parse_bool_handles_common_spellings() {
        for v in ["1", "true", "YES", "on"] {
            assert_eq!(parse_bool(v), Some(true));
        }
        for v in ["0", "false", "No", "off"] {
            assert_eq!(parse_bool(v), Some(false));
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn defaults_when_layer_is_empty() {
        let config = ReportConfig::from_layer(&ConfigLayer::default(), None).unwrap();
        assert_eq!(config, ReportConfig::default());
        assert_eq!(config.mount.width_attempts, 12);
        assert_eq!(config.runtime.attempts, 40);
        assert_eq!(config.runtime.interval, Duration::from_millis(100));
    }

    #[test]
    fn state_dir_follows_home() {
        let config = ReportConfig::from_layer(&ConfigLayer::default(), Some(Path::new("/home/u"))).unwrap();
        assert_eq!(config.state_dir, PathBuf::from("/home/u/.config/runreport"));
    }

    #[test]
    fn typed_values_are_parsed() {
        let merged = layer(&[
            ("slug.mode", "keypath"),
            ("slug.length", "12"),
            ("mount.width-attempts", "3"),
            ("mount.fallback-width", "800"),
            ("runtime.interval-ms", "5"),
            ("assets.vega", "vendor/vega.min.js"),
            ("theme.light.accent", "#ff0000"),
        ]);
        let config = ReportConfig::from_layer(&merged, None).unwrap();
        assert_eq!(config.slug_mode, SlugMode::KeyPath);
        assert_eq!(config.slug_length, 12);
        assert_eq!(config.mount.width_attempts, 3);
        assert!((config.mount.fallback_width - 800.0).abs() < f64::EPSILON);
        assert_eq!(config.runtime, RetryPolicy::new(40, 5));
        assert_eq!(
            config.assets.vega,
            AssetSource::File(PathBuf::from("vendor/vega.min.js"))
        );
        assert_eq!(config.palettes.get(ThemeMode::Light).accent, "#ff0000");
        assert_eq!(
            config.palettes.get(ThemeMode::Dark),
            &ThemeTokens::palette(ThemeMode::Dark)
        );
    }

    #[test]
    fn bad_numbers_are_config_errors() {
        let err = ReportConfig::from_layer(&layer(&[("mount.min-width", "wide")]), None).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
        assert!(err.to_string().contains("mount.min-width"));
    }

    #[test]
    fn bad_theme_colour_is_rejected() {
        let err = ReportConfig::from_layer(&layer(&[("theme.dark.text", "white")]), None).unwrap_err();
        assert!(err.to_string().contains("theme.dark.text"));
    }

    #[test]
    fn load_config_reads_files_and_cli() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let user_dir = home.path().join(".config").join("runreport");
        fs::create_dir_all(&user_dir).unwrap();
        fs::write(user_dir.join(CONFIG_FILE), "title: from-user\nslug:\n  length: 6\n").unwrap();
        fs::create_dir_all(project.path().join(PROJECT_DIR)).unwrap();
        fs::write(
            project.path().join(PROJECT_DIR).join(CONFIG_FILE),
            "title: from-project\n",
        )
        .unwrap();

        let env_layer = layer(&[("slug.mode", "basename")]);
        let cli = CliOverrides {
            artifact_root: Some(PathBuf::from("out")),
            ..CliOverrides::default()
        };
        let merged = load_config(project.path(), Some(home.path()), &env_layer, &cli).unwrap();
        assert_eq!(merged.get("title"), Some("from-project"));
        assert_eq!(merged.get("slug.length"), Some("6"));
        assert_eq!(merged.get("slug.mode"), Some("basename"));
        assert_eq!(merged.get("artifact-root"), Some("out"));
    }

    #[test]
    fn missing_files_are_empty_layers() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_project_config(dir.path()).unwrap(), ConfigLayer::default());
        assert_eq!(load_user_config(None).unwrap(), ConfigLayer::default());
    }

    #[test]
    fn asset_copy_flag_is_boolean() {
        let config = ReportConfig::from_layer(&layer(&[("assets.copy", "off")]), None).unwrap();
        assert!(!config.copy_assets);
        let err = ReportConfig::from_layer(&layer(&[("assets.copy", "sometimes")]), None).unwrap_err();
        assert!(err.to_string().contains("assets.copy"));
    }
}
