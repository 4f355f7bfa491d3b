use std::net::SocketAddr;
use std::path::PathBuf;

use ironpxe_compose::MergePolicy;
use serde::{Deserialize, Serialize};

/// Path-key matchers for the fields Butane treats as local file references.
pub fn default_path_keys() -> Vec<String> {
    vec![
        ".local".to_owned(),
        ".contents_local".to_owned(),
        ".ssh_authorized_keys_local".to_owned(),
    ]
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Root of the per-OS configuration trees (`<config_dir>/<osname>/...`).
    pub config_dir: PathBuf,
    /// Root of the local boot-image cache.
    pub image_dir: PathBuf,
    /// Fields rewritten relative to their owning layer during composition.
    pub path_keys: Vec<String>,
    /// Conflict/overwrite/append policy for layer merging.
    pub policy: MergePolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8086)),
            config_dir: PathBuf::from("/var/lib/ironpxe/configs"),
            image_dir: PathBuf::from("/var/lib/ironpxe/images"),
            path_keys: default_path_keys(),
            policy: MergePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "0.0.0.0:8086".parse::<SocketAddr>().unwrap());
        assert_eq!(c.path_keys.len(), 3);
        assert_eq!(c.policy, MergePolicy::default());
    }

    #[test]
    fn default_path_keys_are_suffix_matchers() {
        for key in default_path_keys() {
            assert!(key.starts_with('.'));
        }
    }
}
