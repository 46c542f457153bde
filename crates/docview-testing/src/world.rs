//! TestWorld pattern for CLI integration tests.
//!
//! Each world owns a temp directory holding a `docs/` tree and a
//! `config.toml` pointing at it, and runs the `docview` binary with
//! `DOCVIEW_CONFIG` set so the user's own configuration never leaks in.

use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::tree::DocTree;

pub struct TestWorld {
    temp_dir: TempDir,
    docs_root: PathBuf,
    config_path: PathBuf,
    env_vars: HashMap<String, String>,
}

impl TestWorld {
    /// Create an isolated environment with an empty document root.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let docs_root = temp_dir.path().join("docs");
        let config_path = temp_dir.path().join("config.toml");
        std::fs::create_dir_all(&docs_root)?;

        let world = Self {
            temp_dir,
            docs_root,
            config_path,
            env_vars: HashMap::new(),
        };
        world.write_config("")?;
        Ok(world)
    }

    /// Populate the document root.
    pub fn with_docs(self, tree: DocTree) -> Result<Self> {
        tree.build_in(&self.docs_root)?;
        Ok(self)
    }

    /// Append extra TOML to the generated config (after the `root` key).
    pub fn with_config(self, extra: &str) -> Result<Self> {
        self.write_config(extra)?;
        Ok(self)
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn docs_root(&self) -> &Path {
        &self.docs_root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn write_config(&self, extra: &str) -> Result<()> {
        // TOML literal string: no escaping of path separators.
        let config = format!("root = '{}'\n{}", self.docs_root.display(), extra);
        std::fs::write(&self.config_path, config)?;
        Ok(())
    }

    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.current_dir(self.temp_dir.path())
            .env("DOCVIEW_CONFIG", &self.config_path)
            .env_remove("RUST_LOG");
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run `docview` with `args` and capture its output.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("docview")
            .map_err(|e| anyhow::anyhow!("Failed to find docview binary: {}", e))?;
        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;
        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
