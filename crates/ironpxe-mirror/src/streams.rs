//! CoreOS stream-metadata cache.
//!
//! Stream metadata describes the published artifacts for a release stream
//! (`stable`, `testing`, `next`). Lookups fall through three levels:
//! in-memory map, a JSON file under the local image directory, then the
//! upstream builds server. Fetched metadata is written back to disk on a
//! best-effort basis.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{error_for_status, MirrorError};

/// Upstream base URL for stream metadata JSON.
pub const STREAMS_BASE_URL: &str = "https://builds.coreos.fedoraproject.org/streams";

/// The streams published upstream.
pub const KNOWN_STREAMS: &[&str] = &["stable", "testing", "next"];

/// Stream metadata, reduced to the subset needed for PXE serving.
/// Unknown fields in the upstream document are ignored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stream {
    pub stream: String,
    #[serde(default)]
    pub architectures: HashMap<String, Architecture>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Architecture {
    #[serde(default)]
    pub artifacts: HashMap<String, Artifact>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub release: String,
    #[serde(default)]
    pub formats: HashMap<String, Format>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Format {
    pub kernel: Option<Media>,
    pub initramfs: Option<Media>,
    pub rootfs: Option<Media>,
}

/// One downloadable file within a format.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Media {
    pub location: String,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
}

impl Media {
    /// The file name component of the artifact location, used as the
    /// mirror-relative cache path.
    pub fn file_name(&self) -> Result<&str, MirrorError> {
        self.location
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| MirrorError::MissingArtifact {
                name: format!("file name in location {}", self.location),
            })
    }
}

/// The three files a PXE boot needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PxeFileType {
    Kernel,
    Initrd,
    Rootfs,
}

impl FromStr for PxeFileType {
    type Err = MirrorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kernel" => Ok(PxeFileType::Kernel),
            "initrd" => Ok(PxeFileType::Initrd),
            "rootfs" => Ok(PxeFileType::Rootfs),
            other => Err(MirrorError::MissingArtifact {
                name: other.to_owned(),
            }),
        }
    }
}

impl Stream {
    /// Resolve the PXE artifact for an architecture and file type.
    pub fn pxe_artifact(&self, arch: &str, file_type: PxeFileType) -> Result<&Media, MirrorError> {
        let architecture = self
            .architectures
            .get(arch)
            .ok_or_else(|| MirrorError::UnknownArchitecture(arch.to_owned()))?;
        let metal = architecture
            .artifacts
            .get("metal")
            .ok_or_else(|| MirrorError::MissingArtifact {
                name: "metal".to_owned(),
            })?;
        let pxe = metal
            .formats
            .get("pxe")
            .ok_or_else(|| MirrorError::MissingArtifact {
                name: "pxe".to_owned(),
            })?;
        let media = match file_type {
            PxeFileType::Kernel => &pxe.kernel,
            PxeFileType::Initrd => &pxe.initramfs,
            PxeFileType::Rootfs => &pxe.rootfs,
        };
        media.as_ref().ok_or_else(|| MirrorError::MissingArtifact {
            name: format!("{file_type:?}").to_lowercase(),
        })
    }
}

/// Three-level cache of stream metadata: memory, local file, upstream.
pub struct StreamCache {
    local_dir: PathBuf,
    base_url: String,
    client: reqwest::Client,
    cache: Mutex<HashMap<String, Stream>>,
}

impl StreamCache {
    pub fn new(local_dir: impl Into<PathBuf>) -> Self {
        Self {
            local_dir: local_dir.into(),
            base_url: STREAMS_BASE_URL.to_owned(),
            client: reqwest::Client::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Override the upstream base URL (tests point this at a local server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Look up metadata for a stream by name.
    pub async fn get(&self, name: &str) -> Result<Stream, MirrorError> {
        let mut cache = self.cache.lock().await;
        if let Some(stream) = cache.get(name) {
            debug!(stream = name, "stream metadata from memory");
            return Ok(stream.clone());
        }

        if let Some(stream) = self.read_file(name).await? {
            debug!(stream = name, "stream metadata from local file");
            cache.insert(name.to_owned(), stream.clone());
            return Ok(stream);
        }

        debug!(stream = name, "stream metadata from upstream");
        let stream = self.fetch(name).await?;
        if let Err(err) = self.write_file(&stream).await {
            warn!(stream = name, error = %err, "failed to persist stream metadata");
        }
        cache.insert(name.to_owned(), stream.clone());
        Ok(stream)
    }

    /// Warm the cache for every known stream.
    pub async fn load_all(&self) -> Result<(), MirrorError> {
        for name in KNOWN_STREAMS {
            self.get(name).await?;
        }
        Ok(())
    }

    fn local_path(&self, name: &str) -> PathBuf {
        self.local_dir.join(format!("{name}.json"))
    }

    async fn read_file(&self, name: &str) -> Result<Option<Stream>, MirrorError> {
        let body = match tokio::fs::read(self.local_path(name)).await {
            Ok(body) => body,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&body)?))
    }

    async fn write_file(&self, stream: &Stream) -> Result<(), MirrorError> {
        let body = serde_json::to_vec(stream)?;
        tokio::fs::create_dir_all(&self.local_dir).await?;
        tokio::fs::write(self.local_path(&stream.stream), body).await?;
        Ok(())
    }

    async fn fetch(&self, name: &str) -> Result<Stream, MirrorError> {
        let url = format!("{}/{name}.json", self.base_url);
        let response = self.client.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MirrorError::UnknownStream(name.to_owned()));
        }
        let response = error_for_status(response).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM_JSON: &str = r#"{
        "stream": "stable",
        "architectures": {
            "x86_64": {
                "artifacts": {
                    "metal": {
                        "release": "39.20240101.3.0",
                        "formats": {
                            "pxe": {
                                "kernel": {"location": "https://example.com/prod/fedora-coreos-39-live-kernel-x86_64"},
                                "initramfs": {"location": "https://example.com/prod/fedora-coreos-39-live-initramfs.x86_64.img"},
                                "rootfs": {"location": "https://example.com/prod/fedora-coreos-39-live-rootfs.x86_64.img"}
                            }
                        }
                    }
                }
            }
        }
    }"#;

    fn stable() -> Stream {
        serde_json::from_str(STREAM_JSON).unwrap()
    }

    #[test]
    fn parses_upstream_shape() {
        let stream = stable();
        assert_eq!(stream.stream, "stable");
        assert!(stream.architectures.contains_key("x86_64"));
    }

    #[test]
    fn resolves_each_pxe_file_type() {
        let stream = stable();
        let kernel = stream.pxe_artifact("x86_64", PxeFileType::Kernel).unwrap();
        assert_eq!(
            kernel.file_name().unwrap(),
            "fedora-coreos-39-live-kernel-x86_64"
        );
        let initrd = stream.pxe_artifact("x86_64", PxeFileType::Initrd).unwrap();
        assert!(initrd.location.contains("initramfs"));
        let rootfs = stream.pxe_artifact("x86_64", PxeFileType::Rootfs).unwrap();
        assert!(rootfs.location.contains("rootfs"));
    }

    #[test]
    fn unknown_architecture_is_not_found() {
        let err = stable()
            .pxe_artifact("s390x", PxeFileType::Kernel)
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, MirrorError::UnknownArchitecture(a) if a == "s390x"));
    }

    #[test]
    fn file_type_parses_from_path_segment() {
        assert_eq!("kernel".parse::<PxeFileType>().unwrap(), PxeFileType::Kernel);
        assert_eq!("initrd".parse::<PxeFileType>().unwrap(), PxeFileType::Initrd);
        assert_eq!("rootfs".parse::<PxeFileType>().unwrap(), PxeFileType::Rootfs);
        assert!("vmlinuz".parse::<PxeFileType>().is_err());
    }

    #[tokio::test]
    async fn reads_metadata_from_local_file_without_network() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("stable.json"), STREAM_JSON)
            .await
            .unwrap();

        // An unroutable base URL proves no fetch happens.
        let cache = StreamCache::new(dir.path()).with_base_url("http://127.0.0.1:1");
        let stream = cache.get("stable").await.unwrap();
        assert_eq!(stream.stream, "stable");

        // Second lookup hits the in-memory map.
        let again = cache.get("stable").await.unwrap();
        assert_eq!(again.stream, "stable");
    }

    #[tokio::test]
    async fn corrupt_local_file_is_a_metadata_error() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("stable.json"), b"not json")
            .await
            .unwrap();

        let cache = StreamCache::new(dir.path()).with_base_url("http://127.0.0.1:1");
        let err = cache.get("stable").await.unwrap_err();
        assert!(matches!(err, MirrorError::Metadata(_)));
    }
}
