//! Chart library availability.

use crate::util::{Pause, PollOutcome, RetryPolicy, poll};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const VEGA_CDN: &str = "https://cdn.jsdelivr.net/npm/vega@5";
pub const VEGA_LITE_CDN: &str = "https://cdn.jsdelivr.net/npm/vega-lite@5";
pub const VEGA_EMBED_CDN: &str = "https://cdn.jsdelivr.net/npm/vega-embed@6";

/// Something that may or may not be able to draw charts yet.
pub trait ChartRuntime {
    fn is_ready(&self) -> bool;

    /// Which pieces are present, for diagnostics.
    fn describe(&self) -> String;
}

/// Where one library script comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Cdn(String),
    File(PathBuf),
}

impl AssetSource {
    /// URLs are CDN sources, anything else is a local file.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("https://") || value.starts_with("http://") || value.starts_with("//") {
            Self::Cdn(value.to_string())
        } else {
            Self::File(PathBuf::from(value))
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        match self {
            Self::Cdn(_) => true,
            Self::File(path) => path.is_file(),
        }
    }

    /// File name the asset gets when copied next to the report.
    #[must_use]
    pub fn file_name(&self) -> Option<String> {
        match self {
            Self::Cdn(_) => None,
            Self::File(path) => path.file_name().map(|n| n.to_string_lossy().into_owned()),
        }
    }

    /// `src` for the page. Copied files are referenced by file name.
    #[must_use]
    pub fn script_src(&self, copied: bool) -> String {
        match self {
            Self::Cdn(url) => url.clone(),
            Self::File(path) if copied => self
                .file_name()
                .unwrap_or_else(|| path.to_string_lossy().into_owned()),
            Self::File(path) => path_src(path),
        }
    }
}

fn path_src(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cdn(url) => write!(f, "cdn:{url}"),
            Self::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}

/// The three scripts the page needs: vega, vega-lite and vega-embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VegaAssets {
    pub vega: AssetSource,
    pub vega_lite: AssetSource,
    pub vega_embed: AssetSource,
}

impl Default for VegaAssets {
    fn default() -> Self {
        Self {
            vega: AssetSource::Cdn(VEGA_CDN.to_string()),
            vega_lite: AssetSource::Cdn(VEGA_LITE_CDN.to_string()),
            vega_embed: AssetSource::Cdn(VEGA_EMBED_CDN.to_string()),
        }
    }
}

impl VegaAssets {
    /// Assets in load order, with their names.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &AssetSource); 3] {
        [
            ("vega", &self.vega),
            ("vega-lite", &self.vega_lite),
            ("vega-embed", &self.vega_embed),
        ]
    }
}

impl ChartRuntime for VegaAssets {
    fn is_ready(&self) -> bool {
        self.entries().iter().all(|(_, source)| source.is_available())
    }

    fn describe(&self) -> String {
        self.entries()
            .iter()
            .map(|(name, source)| {
                let state = if source.is_available() { "" } else { " (missing)" };
                format!("{name}={source}{state}")
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Wait for `runtime` to become ready.
pub fn wait_for_runtime(
    runtime: &dyn ChartRuntime,
    policy: RetryPolicy,
    pause: &dyn Pause,
) -> PollOutcome<()> {
    let outcome = poll(policy, pause, || runtime.is_ready().then_some(()));
    debug!(runtime = %runtime.describe(), ready = matches!(outcome, PollOutcome::Ready { .. }), "chart runtime");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::NoPause;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parse_distinguishes_urls() {
        assert_eq!(
            AssetSource::parse("https://cdn.example/vega.js"),
            AssetSource::Cdn("https://cdn.example/vega.js".to_string())
        );
        assert_eq!(
            AssetSource::parse("web/js/vega.min.js"),
            AssetSource::File(PathBuf::from("web/js/vega.min.js"))
        );
    }

    #[test]
    fn cdn_assets_are_ready() {
        assert!(VegaAssets::default().is_ready());
    }

    #[test]
    fn missing_file_is_not_ready() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("vega.min.js");
        fs::write(&present, "//").unwrap();
        let assets = VegaAssets {
            vega: AssetSource::File(present),
            vega_lite: AssetSource::File(dir.path().join("vega-lite.min.js")),
            ..VegaAssets::default()
        };
        assert!(!assets.is_ready());
        let described = assets.describe();
        assert!(described.contains("vega-lite=file:"));
        assert!(described.contains("(missing)"));
        assert_eq!(
            wait_for_runtime(&assets, RetryPolicy::new(3, 1), &NoPause),
            PollOutcome::TimedOut { attempts: 3 }
        );
    }

    #[test]
    fn script_src_for_copied_files() {
        let source = AssetSource::File(PathBuf::from("web/js/vega.min.js"));
        assert_eq!(source.script_src(true), "vega.min.js");
        assert_eq!(source.script_src(false), "web/js/vega.min.js");
    }

    struct Eventually(Cell<u32>);

    impl ChartRuntime for Eventually {
        fn is_ready(&self) -> bool {
            self.0.set(self.0.get() + 1);
            self.0.get() >= 3
        }

        fn describe(&self) -> String {
            format!("probe {}", self.0.get())
        }
    }

    #[test]
    fn waits_until_ready() {
        let runtime = Eventually(Cell::new(0));
        let outcome = wait_for_runtime(&runtime, RetryPolicy::new(40, 100), &NoPause);
        assert_eq!(outcome, PollOutcome::Ready { value: (), attempt: 3 });
    }
}
