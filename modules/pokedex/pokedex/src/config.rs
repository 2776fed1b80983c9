//! Server configuration.

use std::path::PathBuf;

use pokedex_bootstrap::LoggingConfig;
use serde::{Deserialize, Serialize};

use crate::domain::service::DEFAULT_IMAGE_BASE_URL;

/// Environment prefix for overrides, e.g. `POKEDEX__LISTEN_ADDR=127.0.0.1:6000`.
pub const ENV_PREFIX: &str = "POKEDEX__";

/// Pokedex server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PokedexConfig {
    /// TCP address the gRPC server binds to.
    pub listen_addr: String,

    /// Prefix of sprite URLs; the reply appends `<id>.png`.
    pub image_base_url: String,

    /// External YAML catalog. The built-in catalog is used when unset.
    pub catalog_path: Option<PathBuf>,

    pub logging: LoggingConfig,
}

impl Default for PokedexConfig {
    fn default() -> Self {
        Self {
            listen_addr: format!("0.0.0.0:{}", pokedex_sdk::DEFAULT_PORT),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_owned(),
            catalog_path: None,
            logging: LoggingConfig::default(),
        }
    }
}
