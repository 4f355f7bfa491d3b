//! Local mirror of upstream boot images.
//!
//! Images are served from a cache directory keyed by their upstream file
//! name; a miss downloads the file once and serves the local copy from then
//! on. Downloads stream to disk, since PXE images run to hundreds of
//! megabytes.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{error_for_status, MirrorError};

/// Serve-or-fetch cache over a root directory.
pub struct ImageMirror {
    root_dir: PathBuf,
    client: reqwest::Client,
}

impl ImageMirror {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Return the local path for `relative_path`, downloading it from
    /// `remote_url` first if the cache misses.
    pub async fn serve_or_fetch(
        &self,
        relative_path: &str,
        remote_url: &str,
    ) -> Result<PathBuf, MirrorError> {
        let local = self.root_dir.join(relative_path);
        match tokio::fs::metadata(&local).await {
            Ok(_) => return Ok(local),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!(path = relative_path, url = remote_url, "fetching image");
        let response = self.client.get(remote_url).send().await?;
        let response = error_for_status(response).await?;

        // Download to a temporary name so a failed transfer never leaves a
        // truncated file that later hits the cache.
        let partial = partial_path(&local);
        let result = write_stream(&partial, response).await;
        if let Err(err) = result {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(err);
        }
        tokio::fs::rename(&partial, &local).await?;
        Ok(local)
    }
}

/// Appends `.partial` to the full file name, so artifacts differing only by
/// extension never share an in-flight download path.
fn partial_path(local: &Path) -> PathBuf {
    let mut name = local.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

async fn write_stream(path: &Path, response: reqwest::Response) -> Result<(), MirrorError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_path_keeps_the_original_extension() {
        assert_eq!(
            partial_path(Path::new("coreos/a.img")),
            Path::new("coreos/a.img.partial")
        );
        assert_eq!(
            partial_path(Path::new("coreos/a.iso")),
            Path::new("coreos/a.iso.partial")
        );
        assert_eq!(
            partial_path(Path::new("coreos/kernel-x86_64")),
            Path::new("coreos/kernel-x86_64.partial")
        );
    }

    #[tokio::test]
    async fn cache_hit_serves_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let cached = dir.path().join("coreos/kernel-x86_64");
        tokio::fs::create_dir_all(cached.parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(&cached, b"kernel bits").await.unwrap();

        let mirror = ImageMirror::new(dir.path());
        // Unroutable URL proves the hit never goes upstream.
        let path = mirror
            .serve_or_fetch("coreos/kernel-x86_64", "http://127.0.0.1:1/kernel")
            .await
            .unwrap();
        assert_eq!(path, cached);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"kernel bits");
    }

    #[tokio::test]
    async fn cache_miss_with_unreachable_upstream_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = ImageMirror::new(dir.path());

        let err = mirror
            .serve_or_fetch("coreos/kernel-x86_64", "http://127.0.0.1:1/kernel")
            .await
            .unwrap_err();
        assert!(matches!(err, MirrorError::Http(_)));
        // No partial file may survive a failed fetch.
        assert!(!dir.path().join("coreos/kernel-x86_64").exists());
        assert!(!dir.path().join("coreos/kernel-x86_64.partial").exists());
    }
}
