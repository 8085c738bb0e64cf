//! Concrete inline sources and fetchers.

use super::{InlineSource, RUN_DATA_ID, ResourceFetcher};
use crate::error::{ReportError, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Literal payload text (a JSON file or stdin).
#[derive(Debug, Clone)]
pub struct InlineText {
    text: String,
    name: String,
}

impl InlineText {
    pub fn new(text: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            name: name.into(),
        }
    }
}

impl InlineSource for InlineText {
    fn inline_text(&self) -> Option<String> {
        Some(self.text.clone())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// The `#run-data` element of a previously written report page.
#[derive(Debug, Clone)]
pub struct EmbeddedElement {
    html: String,
    path: PathBuf,
}

impl EmbeddedElement {
    /// Read a report page from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_file(path: &Path) -> Result<Self> {
        let html = fs::read_to_string(path)?;
        Ok(Self {
            html,
            path: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            path: PathBuf::from("<memory>"),
        }
    }
}

impl InlineSource for EmbeddedElement {
    fn inline_text(&self) -> Option<String> {
        extract_element_text(&self.html, RUN_DATA_ID)
    }

    fn describe(&self) -> String {
        format!("#{RUN_DATA_ID} in {}", self.path.display())
    }
}

/// Return the raw text content of the first element with the given id.
///
/// Only the flat text between the opening tag and the matching closing tag
/// name is returned; the element is expected to hold text, not markup.
#[must_use]
pub fn extract_element_text(html: &str, id: &str) -> Option<String> {
    let pattern = format!(
        r#"(?is)<([a-z][a-z0-9-]*)\b[^>]*\bid\s*=\s*["']{}["'][^>]*>"#,
        regex::escape(id)
    );
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(html)?;
    let tag = caps.get(1)?.as_str().to_ascii_lowercase();
    let start = caps.get(0)?.end();
    let rest = &html[start..];
    let close = format!("</{tag}");
    let end = rest.to_ascii_lowercase().find(&close)?;
    Some(rest[..end].to_string())
}

/// Reads fallback resources from a directory.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    base_dir: PathBuf,
}

impl FileFetcher {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl ResourceFetcher for FileFetcher {
    fn fetch(&self, name: &str) -> Result<String> {
        let path = self.base_dir.join(name);
        debug!(path = %path.display(), "Fetching fallback resource");
        fs::read_to_string(&path).map_err(|e| ReportError::Fetch {
            resource: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// A fetcher with nothing behind it (stdin input has no siblings).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFetch;

impl ResourceFetcher for NoFetch {
    fn fetch(&self, name: &str) -> Result<String> {
        Err(ReportError::Fetch {
            resource: name.to_string(),
            reason: "no fallback location".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn extracts_script_payload() {
        let html = r#"<html><body><script id="run-data" type="application/json">{"rows": 1}</script></body></html>"#;
        assert_eq!(
            extract_element_text(html, "run-data").as_deref(),
            Some(r#"{"rows": 1}"#)
        );
    }

    #[test]
    fn attribute_order_and_case_do_not_matter() {
        let html = "<SCRIPT type='application/json' ID='run-data'>[]</SCRIPT>";
        assert_eq!(extract_element_text(html, "run-data").as_deref(), Some("[]"));
    }

    #[test]
    fn missing_element_is_none() {
        assert!(extract_element_text("<div id=\"other\">x</div>", "run-data").is_none());
        let holder = EmbeddedElement::from_html("<p>nothing</p>");
        assert!(holder.inline_text().is_none());
    }

    #[test]
    fn file_fetcher_reads_sibling() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("run.json"), "{\"rows\": 2}").unwrap();
        let fetcher = FileFetcher::new(dir.path());
        assert_eq!(fetcher.fetch("run.json").unwrap(), "{\"rows\": 2}");
        assert!(matches!(
            fetcher.fetch("absent.json"),
            Err(ReportError::Fetch { .. })
        ));
    }
}
