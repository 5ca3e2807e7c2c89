//! CLI configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use turbo_cart::CartConfig;

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Storage configuration.
    #[serde(default)]
    pub store: StoreConfig,

    /// Cart session configuration.
    #[serde(default)]
    pub cart: CartConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Render the config as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render config")
    }
}

/// Where the cart is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Data directory for the file-backed store.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    ".turbo-cart".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turbo_cart::WriteMode;

    #[test]
    fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.toml");
        std::fs::write(
            &path,
            r#"
[store]
data_dir = "/var/lib/cart"

[cart]
storage_key = "shop:cart"
write_mode = "detached"
"#,
        )
        .unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.store.data_dir, "/var/lib/cart");
        assert_eq!(config.cart.storage_key, "shop:cart");
        assert_eq!(config.cart.write_mode, WriteMode::Detached);
    }

    #[test]
    fn test_load_json_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, r#"{"cart": {"storage_key": "k"}}"#).unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.store, StoreConfig::default());
        assert_eq!(config.cart.storage_key, "k");
        assert_eq!(config.cart.write_mode, WriteMode::Queued);
    }

    #[test]
    fn test_load_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.toml");
        std::fs::write(&path, "store = 3").unwrap();

        assert!(CliConfig::load(&path).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CliConfig::default();
        let rendered = config.to_toml().unwrap();
        assert_eq!(toml::from_str::<CliConfig>(&rendered).unwrap(), config);
    }
}
