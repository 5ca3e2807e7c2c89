//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use turbo_cache::FileStore;
use turbo_cart::{CartProvider, CartStore, Hydration};

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names searched for, in order, in each directory.
const CONFIG_NAMES: [&str; 3] = ["cart.toml", ".cart.toml", "cart.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            CliConfig::load(Path::new(path))?
        } else {
            // Try to find config in current directory or parent directories
            Self::find_config(&cwd).unwrap_or_default()
        };

        Ok(Self { config, output, cwd })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<CliConfig> {
        start
            .ancestors()
            .flat_map(|dir| CONFIG_NAMES.iter().map(move |name| dir.join(name)))
            .filter(|path| path.exists())
            .find_map(|path| CliConfig::load(&path).ok())
    }

    /// Resolved data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.cwd.join(&self.config.store.data_dir)
    }

    /// Open and hydrate the cart session for this invocation.
    pub async fn open_cart(&self) -> Result<CartProvider> {
        let dir = self.data_dir();
        self.output.debug(&format!("Data directory: {}", dir.display()));

        let store = FileStore::open(&dir)
            .await
            .with_context(|| format!("Failed to open cart store at {}", dir.display()))?;
        let cart = CartStore::new(Arc::new(store), self.config.cart.clone());

        match cart.hydrate().await.context("Failed to load cart")? {
            Hydration::Discarded => {
                self.output
                    .warn("Persisted cart could not be read and was ignored.");
            }
            outcome => self.output.debug(&format!("Hydration: {:?}", outcome)),
        }

        Ok(CartProvider::new(cart))
    }
}
