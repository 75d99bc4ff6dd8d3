use crate::error::ExecutorError;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{Duration, SystemTime};

static DEPLOYMENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]{0,63}$").unwrap());

/// One directory per deployment under a shared root.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory for a new deployment. Fails if it already exists.
    pub fn create(&self, deployment_id: &str) -> Result<PathBuf, ExecutorError> {
        validate_deployment_id(deployment_id)?;

        fs::create_dir_all(&self.root).map_err(|e| {
            ExecutorError::Workspace(format!(
                "cannot create workspace root {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let dir = self.root.join(deployment_id);
        fs::create_dir(&dir).map_err(|e| {
            ExecutorError::Workspace(format!("cannot create {}: {}", dir.display(), e))
        })?;
        Ok(dir)
    }

    /// Directory of an existing deployment.
    pub fn existing(&self, deployment_id: &str) -> Result<PathBuf, ExecutorError> {
        validate_deployment_id(deployment_id)?;

        let dir = self.root.join(deployment_id);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(ExecutorError::DeploymentNotFound(deployment_id.to_string()))
        }
    }

    pub fn write_file(&self, dir: &Path, name: &str, content: &str) -> Result<(), ExecutorError> {
        let path = dir.join(name);
        fs::write(&path, content).map_err(|e| {
            ExecutorError::Workspace(format!("cannot write {}: {}", path.display(), e))
        })
    }

    /// Remove deployment directories last modified at least `max_age` ago.
    ///
    /// Returns how many were removed. Entries that cannot be inspected or
    /// removed are logged and skipped.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("Nothing to clean in {}: {}", self.root.display(), e);
                return 0;
            }
        };

        let now = SystemTime::now();
        let mut removed = 0;

        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !path.is_dir() || !DEPLOYMENT_ID.is_match(name) {
                continue;
            }

            let age = match entry.metadata().and_then(|m| m.modified()) {
                Ok(modified) => now.duration_since(modified).unwrap_or(Duration::ZERO),
                Err(e) => {
                    log::warn!("Cannot read modification time of {}: {}", path.display(), e);
                    continue;
                }
            };
            if age < max_age {
                continue;
            }

            match fs::remove_dir_all(&path) {
                Ok(()) => {
                    log::info!("Removed expired deployment {}", name);
                    removed += 1;
                }
                Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }

        removed
    }
}

/// Deployment ids become directory names, so only `[A-Za-z0-9-]` is accepted.
pub fn validate_deployment_id(deployment_id: &str) -> Result<(), ExecutorError> {
    if DEPLOYMENT_ID.is_match(deployment_id) {
        Ok(())
    } else {
        Err(ExecutorError::InvalidDeploymentId(deployment_id.to_string()))
    }
}
