//! Common test utilities and helpers

use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

/// Isolated project and home directories for a CLI run
pub struct TestEnv {
    pub project: TempDir,
    pub home: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            project: TempDir::new().expect("Failed to create project dir"),
            home: TempDir::new().expect("Failed to create home dir"),
        }
    }

    /// Command for the gcm-tags binary bound to this environment
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("gcm-tags").expect("Failed to find gcm-tags binary");
        cmd.env("HOME", self.home.path())
            .env_remove("GCM_API_KEY")
            .env_remove("RUST_LOG")
            .arg("--project")
            .arg(self.project.path());
        cmd
    }

    pub fn config_path(&self) -> std::path::PathBuf {
        self.project.path().join(".gcm-tags").join("config.toml")
    }

    /// Writes a project config file
    pub fn write_config(&self, content: &str) {
        let path = self.config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    pub fn write_file(&self, name: &str, content: &str) -> std::path::PathBuf {
        let path = self.project.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
