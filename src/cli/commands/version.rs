//! Version command implementation.

use crate::charts::{VEGA_EMBED_CDN, VEGA_LITE_CDN};
use crate::error::Result;
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    vega_lite: &'a str,
    vega_embed: &'a str,
}

fn version_line(version: &str, build: &str, branch: Option<&str>, commit: Option<&str>) -> String {
    let mut line = format!("runreport {version} ({build})");
    let short = commit.map(|c| &c[..c.len().min(7)]);
    match (branch, short) {
        (Some(branch), Some(short)) => {
            let _ = write!(line, " ({branch}@{short})");
        }
        (Some(branch), None) => {
            let _ = write!(line, " ({branch})");
        }
        (None, Some(short)) => {
            let _ = write!(line, " ({short})");
        }
        (None, None) => {}
    }
    line
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };

    let commit = option_env!("VERGEN_GIT_SHA").filter(|s| !s.trim().is_empty());
    let branch = option_env!("VERGEN_GIT_BRANCH").filter(|s| !s.trim().is_empty());

    if json {
        let output = VersionOutput {
            version,
            build,
            commit,
            branch,
            vega_lite: VEGA_LITE_CDN,
            vega_embed: VEGA_EMBED_CDN,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{}", version_line(version, build, branch, commit));
    Ok(())
}
