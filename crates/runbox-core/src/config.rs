//! Executor configuration - timeouts, staging paths, and resource ceilings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::Language;

/// Configuration for the code executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Wall-clock limit for one sandbox run, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Root directory workspaces are staged under.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// Host-side path that corresponds to `base_dir` when this service
    /// itself runs inside a container. Docker volume mounts must use host
    /// paths, so staged workspace paths are remapped onto this prefix.
    #[serde(default)]
    pub host_base_dir: Option<PathBuf>,
    /// Sandbox image reference.
    #[serde(default = "default_image")]
    pub image: String,
    /// Hard memory ceiling for the container, in megabytes.
    #[serde(default = "default_memory_mb")]
    pub memory_mb: u64,
    /// Fractional CPU ceiling for the container.
    #[serde(default = "default_cpus")]
    pub cpus: f64,
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("/tmp/runbox")
}

fn default_image() -> String {
    Language::Go.default_image().to_string()
}

fn default_memory_mb() -> u64 {
    256
}

fn default_cpus() -> f64 {
    0.5
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            base_dir: default_base_dir(),
            host_base_dir: None,
            image: default_image(),
            memory_mb: default_memory_mb(),
            cpus: default_cpus(),
        }
    }
}

impl ExecutorConfig {
    /// Defaults overridden from the environment: `RUNBOX_BASE_DIR` for the
    /// staging root and `HOST_TEMP_DIR` for the host-side mount prefix.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("RUNBOX_BASE_DIR") {
            if !dir.is_empty() {
                config.base_dir = PathBuf::from(dir);
            }
        }
        if let Ok(dir) = std::env::var("HOST_TEMP_DIR") {
            if !dir.is_empty() {
                config.host_base_dir = Some(PathBuf::from(dir));
            }
        }
        config
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    /// Shared Go build cache, mounted into every container. Append-only
    /// across runs, never cleared by this service.
    pub fn build_cache_dir(&self) -> PathBuf {
        self.base_dir.join("go-build-cache")
    }

    /// Shared Go module cache, mounted into every container.
    pub fn mod_cache_dir(&self) -> PathBuf {
        self.base_dir.join("go-mod-cache")
    }

    /// Translate a path under `base_dir` to its host-side equivalent for a
    /// Docker volume mount. Identity when no host prefix is configured.
    pub fn host_path(&self, path: &Path) -> PathBuf {
        match &self.host_base_dir {
            Some(host_base) => match path.strip_prefix(&self.base_dir) {
                Ok(rest) => host_base.join(rest),
                Err(_) => path.to_path_buf(),
            },
            None => path.to_path_buf(),
        }
    }
}
