//! Sandbox launcher seam - isolated container execution behind a narrow trait
//!
//! The evaluator and workspace manager only see `SandboxLauncher`, so the
//! concrete isolation backend (Docker here) is swappable.

pub mod docker;
pub mod image;

use std::path::PathBuf;

use async_trait::async_trait;

pub use docker::DockerLauncher;
pub use image::ImageCache;

/// Everything a backend needs to launch one sandboxed process.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// Name the container is launched under, used for kill-by-name.
    pub container_name: String,
    /// Image reference to run.
    pub image: String,
    /// Host-side path of the staged workspace, bind-mounted at the
    /// fixed in-container working directory.
    pub workspace_dir: PathBuf,
    /// Host-side path of the shared build cache mount.
    pub build_cache_dir: PathBuf,
    /// Host-side path of the shared module cache mount.
    pub mod_cache_dir: PathBuf,
    /// Shell command executed inside the container.
    pub command: String,
    /// Hard memory ceiling in megabytes.
    pub memory_mb: u64,
    /// Fractional CPU ceiling.
    pub cpus: f64,
}

/// Captured streams and exit status of one completed launch.
#[derive(Debug, Clone)]
pub struct LaunchOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_ok: bool,
}

/// A backend that can run one isolated process per call.
#[async_trait]
pub trait SandboxLauncher: Send + Sync {
    /// Launch the described container and wait for it to exit, capturing
    /// stdout and stderr separately. An `Err` means the process could not
    /// be spawned at all; a failing sandboxed program is an `Ok` output
    /// with `exit_ok == false`.
    async fn launch(&self, spec: &LaunchSpec) -> std::io::Result<LaunchOutput>;

    /// Forcibly terminate a container previously launched under `name`.
    async fn kill(&self, name: &str);
}
