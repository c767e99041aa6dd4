use anyhow::{Context, Result};
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// CLI test helper: a temporary working directory to run `dbdiff` in.
pub struct CliTestHelper {
    pub temp_dir: TempDir,
    pub project_root: PathBuf,
}

impl CliTestHelper {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let project_root = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            project_root,
        }
    }

    /// A `dbdiff` command running inside the project root, with logging env cleared.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("dbdiff").expect("dbdiff binary should build");
        cmd.current_dir(&self.project_root)
            .env_remove("RUST_LOG")
            .env_remove("DIFF_DIALECT");
        cmd
    }

    pub fn write_document(&self, name: &str, xml: &str) -> Result<PathBuf> {
        let path = self.project_root.join(name);
        fs::write(&path, xml).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn write_config(&self, yaml: &str) -> Result<()> {
        fs::write(self.project_root.join("dbdiff.yaml"), yaml)?;
        Ok(())
    }

    pub fn read_output(&self, relative: impl AsRef<Path>) -> Result<String> {
        let path = self.project_root.join(relative);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    pub fn output_exists(&self, relative: impl AsRef<Path>) -> bool {
        self.project_root.join(relative).exists()
    }
}

impl Default for CliTestHelper {
    fn default() -> Self {
        Self::new()
    }
}
