use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Debug)]
pub struct ReportRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

pub struct ReportWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl ReportWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    /// Write `contents` to a file under the workspace and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dir");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    pub fn read(&self, path: impl AsRef<Path>) -> String {
        fs::read_to_string(self.root.join(path)).expect("read file")
    }
}

pub fn run_report<I, S>(workspace: &ReportWorkspace, args: I) -> ReportRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_report_with_env(workspace, args, std::iter::empty::<(String, String)>(), None)
}

pub fn run_report_with_env<I, S, E, K, V>(
    workspace: &ReportWorkspace,
    args: I,
    env_vars: E,
    stdin: Option<&str>,
) -> ReportRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("runreport"));
    cmd.current_dir(&workspace.root);
    cmd.args(args);
    cmd.env_remove("RUST_LOG");
    cmd.env("HOME", &workspace.root);
    cmd.envs(env_vars);
    if let Some(input) = stdin {
        cmd.write_stdin(input);
    }

    let output = cmd.output().expect("run runreport");
    ReportRun {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        status: output.status,
    }
}
