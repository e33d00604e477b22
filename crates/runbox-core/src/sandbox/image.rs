//! Sandbox image cache - process-wide, lazily populated, never invalidated

use std::collections::HashSet;
use std::sync::Mutex;

use tokio::process::Command;
use tracing::{debug, info, warn};

/// Tracks which images are known present in the local store. Entries are
/// added lazily and never evicted for the life of the process.
#[derive(Debug, Default)]
pub struct ImageCache {
    known: Mutex<HashSet<String>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `image` is available locally, pulling it on first miss. A
    /// failed pull is logged and the image is still marked present, so a
    /// genuinely missing image surfaces later as a container-start failure
    /// instead of re-pulling on every run.
    pub async fn ensure_available(&self, image: &str) {
        if self.is_known(image) {
            return;
        }

        debug!("checking if image {} is available locally", image);
        let inspect = Command::new("docker")
            .args(["image", "inspect", image])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .await;

        match inspect {
            Ok(status) if status.success() => {
                debug!("image {} is already available locally", image);
            }
            _ => {
                info!("image {} not found locally, pulling", image);
                match Command::new("docker").args(["pull", image]).output().await {
                    Ok(output) if output.status.success() => {
                        info!("image {} pulled successfully", image);
                    }
                    Ok(output) => {
                        warn!(
                            "failed to pull image {}: {}",
                            image,
                            String::from_utf8_lossy(&output.stderr).trim()
                        );
                    }
                    Err(e) => {
                        warn!("failed to pull image {}: {}", image, e);
                    }
                }
            }
        }

        self.mark_present(image);
    }

    fn is_known(&self, image: &str) -> bool {
        self.known.lock().unwrap().contains(image)
    }

    fn mark_present(&self, image: &str) {
        self.known.lock().unwrap().insert(image.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_starts_cold() {
        let cache = ImageCache::new();
        assert!(!cache.is_known("golang:1.22-alpine"));
    }

    #[test]
    fn test_mark_present_is_sticky() {
        let cache = ImageCache::new();
        cache.mark_present("golang:1.22-alpine");
        assert!(cache.is_known("golang:1.22-alpine"));
        assert!(!cache.is_known("node:22-slim"));
    }

    #[tokio::test]
    async fn test_ensure_available_skips_docker_when_cached() {
        // With the entry pre-marked, ensure_available must return without
        // touching the docker CLI.
        let cache = ImageCache::new();
        cache.mark_present("golang:1.22-alpine");
        tokio::time::timeout(
            std::time::Duration::from_millis(50),
            cache.ensure_available("golang:1.22-alpine"),
        )
        .await
        .expect("cached image lookup must not shell out");
    }
}
