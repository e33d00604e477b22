//! Docker launcher - run one isolated container per call via the docker CLI

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{ImageCache, LaunchOutput, LaunchSpec, SandboxLauncher};

/// In-container mount point for the staged workspace; also the working
/// directory of the sandboxed process.
pub const WORKSPACE_MOUNT: &str = "/app";

const BUILD_CACHE_MOUNT: &str = "/root/.cache/go-build";
const MOD_CACHE_MOUNT: &str = "/go/pkg/mod";

/// `SandboxLauncher` backed by the local Docker daemon.
#[derive(Debug, Default)]
pub struct DockerLauncher {
    images: ImageCache,
}

impl DockerLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if Docker is usable on this host.
    pub async fn is_available(&self) -> bool {
        Command::new("docker")
            .arg("info")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn build_args(spec: &LaunchSpec) -> Vec<String> {
        vec![
            "run".to_string(),
            "--rm".to_string(),
            "--name".to_string(),
            spec.container_name.clone(),
            "--network".to_string(),
            "none".to_string(),
            "--memory".to_string(),
            format!("{}m", spec.memory_mb),
            "--cpus".to_string(),
            spec.cpus.to_string(),
            "-v".to_string(),
            format!("{}:{}", spec.workspace_dir.display(), WORKSPACE_MOUNT),
            "-v".to_string(),
            format!("{}:{}:rw", spec.build_cache_dir.display(), BUILD_CACHE_MOUNT),
            "-v".to_string(),
            format!("{}:{}:rw", spec.mod_cache_dir.display(), MOD_CACHE_MOUNT),
            "-w".to_string(),
            WORKSPACE_MOUNT.to_string(),
            spec.image.clone(),
            "sh".to_string(),
            "-c".to_string(),
            spec.command.clone(),
        ]
    }
}

#[async_trait]
impl SandboxLauncher for DockerLauncher {
    async fn launch(&self, spec: &LaunchSpec) -> std::io::Result<LaunchOutput> {
        self.images.ensure_available(&spec.image).await;

        let args = Self::build_args(spec);
        debug!(container = %spec.container_name, "executing docker {}", args.join(" "));

        // kill_on_drop reaps the CLI process when the caller cancels
        // mid-run; the container itself is taken down by the kill guard in
        // the executor.
        let output = Command::new("docker")
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(LaunchOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_ok: output.status.success(),
        })
    }

    async fn kill(&self, name: &str) {
        if let Err(e) = Command::new("docker").args(["kill", name]).output().await {
            warn!("failed to kill container {}: {}", name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn spec() -> LaunchSpec {
        LaunchSpec {
            container_name: "runbox-test".to_string(),
            image: "golang:1.22-alpine".to_string(),
            workspace_dir: PathBuf::from("/tmp/runbox/runbox-x"),
            build_cache_dir: PathBuf::from("/tmp/runbox/go-build-cache"),
            mod_cache_dir: PathBuf::from("/tmp/runbox/go-mod-cache"),
            command: "GOFLAGS=-mod=readonly go run main.go".to_string(),
            memory_mb: 256,
            cpus: 0.5,
        }
    }

    #[test]
    fn test_build_args_disable_network() {
        let args = DockerLauncher::build_args(&spec());
        let pos = args.iter().position(|a| a == "--network").unwrap();
        assert_eq!(args[pos + 1], "none");
    }

    #[test]
    fn test_build_args_resource_ceilings() {
        let args = DockerLauncher::build_args(&spec());
        let mem = args.iter().position(|a| a == "--memory").unwrap();
        assert_eq!(args[mem + 1], "256m");
        let cpus = args.iter().position(|a| a == "--cpus").unwrap();
        assert_eq!(args[cpus + 1], "0.5");
    }

    #[test]
    fn test_build_args_mounts_workspace_and_caches() {
        let args = DockerLauncher::build_args(&spec());
        assert!(args.contains(&"/tmp/runbox/runbox-x:/app".to_string()));
        assert!(args.contains(&"/tmp/runbox/go-build-cache:/root/.cache/go-build:rw".to_string()));
        assert!(args.contains(&"/tmp/runbox/go-mod-cache:/go/pkg/mod:rw".to_string()));
        let wd = args.iter().position(|a| a == "-w").unwrap();
        assert_eq!(args[wd + 1], "/app");
    }

    #[test]
    fn test_build_args_command_tail() {
        let args = DockerLauncher::build_args(&spec());
        let tail: Vec<_> = args.iter().rev().take(3).rev().collect();
        assert_eq!(tail[0], "sh");
        assert_eq!(tail[1], "-c");
        assert_eq!(tail[2], "GOFLAGS=-mod=readonly go run main.go");
    }
}
