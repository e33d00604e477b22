//! Per-run workspace staging
//!
//! Each sandbox run gets a uniquely named directory holding the submitted
//! source and, when present, an input file. The directory is exclusively
//! owned by that run and removed on drop, so cleanup happens on every exit
//! path including errors, timeouts, and panics.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ExecError;
use crate::models::{INPUT_FILE_NAME, Language};

/// An ephemeral staging directory for one sandbox run.
#[derive(Debug)]
pub struct RunWorkspace {
    dir: PathBuf,
    run_id: String,
    has_input: bool,
}

impl RunWorkspace {
    /// Stage source code (and optional stdin payload) into a fresh
    /// workspace under `base_dir`. Any filesystem failure aborts with
    /// `ExecError::Staging` before a container is started.
    pub async fn stage(
        base_dir: &Path,
        language: Language,
        source_code: &str,
        input: Option<&str>,
    ) -> Result<Self, ExecError> {
        let run_id = Uuid::new_v4().to_string();
        let dir = base_dir.join(format!("runbox-{run_id}"));

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| ExecError::Staging {
                path: dir.clone(),
                source,
            })?;

        // From here on the directory exists, so ownership must transfer to
        // a RunWorkspace before any fallible write to keep Drop cleanup on
        // the error paths too.
        let mut workspace = Self {
            dir,
            run_id,
            has_input: false,
        };

        let source_path = workspace.dir.join(language.source_file_name());
        tokio::fs::write(&source_path, source_code)
            .await
            .map_err(|source| ExecError::Staging {
                path: source_path.clone(),
                source,
            })?;

        if let Some(input) = input {
            if !input.is_empty() {
                let input_path = workspace.dir.join(INPUT_FILE_NAME);
                tokio::fs::write(&input_path, input)
                    .await
                    .map_err(|source| ExecError::Staging {
                        path: input_path.clone(),
                        source,
                    })?;
                workspace.has_input = true;
            }
        }

        debug!(run_id = %workspace.run_id, dir = %workspace.dir.display(), "staged workspace");
        Ok(workspace)
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn has_input(&self) -> bool {
        self.has_input
    }
}

impl Drop for RunWorkspace {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(run_id = %self.run_id, "failed to remove workspace: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stage_writes_source_file() {
        let base = tempfile::tempdir().unwrap();
        let ws = RunWorkspace::stage(base.path(), Language::Go, "package main", None)
            .await
            .unwrap();
        let source = std::fs::read_to_string(ws.path().join("main.go")).unwrap();
        assert_eq!(source, "package main");
        assert!(!ws.has_input());
        assert!(!ws.path().join(INPUT_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_stage_writes_input_file() {
        let base = tempfile::tempdir().unwrap();
        let ws = RunWorkspace::stage(base.path(), Language::Go, "package main", Some("1 2 3"))
            .await
            .unwrap();
        assert!(ws.has_input());
        let input = std::fs::read_to_string(ws.path().join(INPUT_FILE_NAME)).unwrap();
        assert_eq!(input, "1 2 3");
    }

    #[tokio::test]
    async fn test_empty_input_is_not_staged() {
        let base = tempfile::tempdir().unwrap();
        let ws = RunWorkspace::stage(base.path(), Language::Go, "package main", Some(""))
            .await
            .unwrap();
        assert!(!ws.has_input());
        assert!(!ws.path().join(INPUT_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_drop_removes_workspace() {
        let base = tempfile::tempdir().unwrap();
        let ws = RunWorkspace::stage(base.path(), Language::Go, "package main", None)
            .await
            .unwrap();
        let dir = ws.path().to_path_buf();
        assert!(dir.exists());
        drop(ws);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_two_stagings_are_independent() {
        let base = tempfile::tempdir().unwrap();
        let a = RunWorkspace::stage(base.path(), Language::Go, "package main // a", None)
            .await
            .unwrap();
        let b = RunWorkspace::stage(base.path(), Language::Go, "package main // b", None)
            .await
            .unwrap();
        assert_ne!(a.path(), b.path());
        drop(a);
        // b's files survive a's cleanup
        assert!(b.path().join("main.go").exists());
    }

    #[tokio::test]
    async fn test_staging_failure_surfaces_as_error() {
        // base dir is a file, so create_dir_all fails
        let base = tempfile::tempdir().unwrap();
        let blocker = base.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let result = RunWorkspace::stage(&blocker, Language::Go, "package main", None).await;
        assert!(matches!(result, Err(ExecError::Staging { .. })));
    }
}
