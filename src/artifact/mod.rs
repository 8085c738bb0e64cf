//! Report output directory.
//!
//! Each render lands in `<artifact-root>/<slug>/`:
//! - `report.html`: the rendered page, data embedded
//! - `run.json`: the loaded payload, pretty-printed, read by the page when
//!   the embedded copy cannot be parsed
//! - copies of local chart library scripts and the extra stylesheet
//!
//! Files are written to a temp file and renamed into place.

use crate::error::{ReportError, Result};
use crate::loader::FALLBACK_RESOURCE;
use crate::util::{SlugMode, make_slug};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const REPORT_FILE: &str = "report.html";

/// Paths produced by one write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WrittenArtifacts {
    pub dir: PathBuf,
    pub report: PathBuf,
    pub run_json: PathBuf,
    pub assets: Vec<PathBuf>,
    /// Assets that were configured but not found.
    pub missing_assets: Vec<PathBuf>,
    /// SHA-256 of `report.html`.
    pub report_sha256: String,
    pub written_at: DateTime<Utc>,
}

/// Resolves output directories and writes report files into them.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
    slug_mode: SlugMode,
    slug_length: usize,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>, slug_mode: SlugMode, slug_length: usize) -> Self {
        Self {
            root: root.into(),
            slug_mode,
            slug_length,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for the input identified by `key`.
    #[must_use]
    pub fn dir_for(&self, key: &str) -> PathBuf {
        self.root.join(make_slug(key, self.slug_mode, self.slug_length))
    }

    /// Write the page, the payload and any local assets into `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory, the page or the payload cannot be
    /// written. Missing assets are reported in the result instead.
    pub fn write(
        &self,
        dir: &Path,
        html: &str,
        payload: &Value,
        assets: &[PathBuf],
    ) -> Result<WrittenArtifacts> {
        fs::create_dir_all(dir)
            .map_err(|e| ReportError::with_context(format!("create {}", dir.display()), e))?;

        let report = dir.join(REPORT_FILE);
        write_atomic(&report, html.as_bytes())?;

        let run_json = dir.join(FALLBACK_RESOURCE);
        let mut pretty = serde_json::to_string_pretty(payload)?;
        pretty.push('\n');
        write_atomic(&run_json, pretty.as_bytes())?;

        let (copied, missing) = copy_assets(dir, assets);
        let digest = format!("{:x}", Sha256::digest(html.as_bytes()));

        info!(dir = %dir.display(), assets = copied.len(), "report written");
        Ok(WrittenArtifacts {
            dir: dir.to_path_buf(),
            report,
            run_json,
            assets: copied,
            missing_assets: missing,
            report_sha256: digest,
            written_at: Utc::now(),
        })
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let file = File::create(&temp_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))?
        .sync_all()?;
    fs::rename(&temp_path, path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}

/// Copy each asset into `dir` by file name. Returns the copies and the
/// sources that could not be copied.
fn copy_assets(dir: &Path, assets: &[PathBuf]) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut copied = Vec::new();
    let mut missing = Vec::new();
    for source in assets {
        let Some(name) = source.file_name() else {
            warn!(asset = %source.display(), "asset path has no file name, skipped");
            missing.push(source.clone());
            continue;
        };
        let dest = dir.join(name);
        match fs::copy(source, &dest) {
            Ok(_) => copied.push(dest),
            Err(e) => {
                warn!(asset = %source.display(), error = %e, "asset not copied");
                missing.push(source.clone());
            }
        }
    }
    (copied, missing)
}
