use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CartError, CartResult};

/// Storage key the cart snapshot lives under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "@products:car";

/// What to do when the persisted snapshot cannot be decoded on load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptSnapshotPolicy {
    /// Log a warning and start from an empty cart. The corrupt value is
    /// overwritten by the next mutation.
    #[default]
    Reset,
    /// Fail initialization with [`CartError::CorruptSnapshot`].
    Fail,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Key the snapshot is stored under.
    pub storage_key: String,
    /// Directory used by file-backed storage.
    pub data_dir: PathBuf,
    pub on_corrupt: CorruptSnapshotPolicy,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: PathBuf::from(".cart"),
            on_corrupt: CorruptSnapshotPolicy::default(),
        }
    }
}

impl CartConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(raw: &str) -> CartResult<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| CartError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> CartResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CartError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> CartResult<()> {
        if self.storage_key.trim().is_empty() {
            return Err(CartError::Config("storage_key must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = CartConfig::default();
        assert_eq!(c.storage_key, "@products:car");
        assert_eq!(c.data_dir, PathBuf::from(".cart"));
        assert_eq!(c.on_corrupt, CorruptSnapshotPolicy::Reset);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = CartConfig::from_toml_str("on_corrupt = \"fail\"\n").unwrap();
        assert_eq!(c.on_corrupt, CorruptSnapshotPolicy::Fail);
        assert_eq!(c.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn full_toml() {
        let raw = r#"
            storage_key = "shop:cart"
            data_dir = "/var/lib/cart"
            on_corrupt = "reset"
        "#;
        let c = CartConfig::from_toml_str(raw).unwrap();
        assert_eq!(c.storage_key, "shop:cart");
        assert_eq!(c.data_dir, PathBuf::from("/var/lib/cart"));
    }

    #[test]
    fn empty_key_rejected() {
        let err = CartConfig::from_toml_str("storage_key = \"  \"").unwrap_err();
        assert!(matches!(err, CartError::Config(_)));
    }

    #[test]
    fn unknown_policy_rejected() {
        let err = CartConfig::from_toml_str("on_corrupt = \"ignore\"").unwrap_err();
        assert!(matches!(err, CartError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.toml");
        std::fs::write(&path, "storage_key = \"k\"").unwrap();
        assert_eq!(CartConfig::load(&path).unwrap().storage_key, "k");

        let missing = CartConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, CartError::Config(_)));
    }
}
