//! Layered configuration loading.
//!
//! Precedence, lowest first:
//! 1. `T::default()`
//! 2. YAML file (if a path is given)
//! 3. Environment variables with the given prefix, `__` separating nested keys
//!    (e.g. `POKEDEX__LOGGING__LEVEL=debug`)
//!
//! CLI overrides are applied by the binaries on the extracted value.

use std::path::Path;

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging section shared by every binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive, used when neither `RUST_LOG` nor `-v` is given.
    pub level: String,

    /// Text for humans, JSON for collectors.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

/// Load `T` from defaults, an optional YAML file and the environment.
///
/// # Errors
///
/// Returns an error if the file does not exist or any layer fails to
/// deserialize into `T`.
pub fn load_layered<T>(path: Option<&Path>, env_prefix: &str) -> Result<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    let mut figment = Figment::from(Serialized::defaults(T::default()));

    if let Some(path) = path {
        if !path.is_file() {
            bail!("config file does not exist: {}", path.display());
        }
        figment = figment.merge(Yaml::file(path));
    }

    figment
        .merge(Env::prefixed(env_prefix).split("__"))
        .extract()
        .context("failed to load configuration")
}

/// Render a configuration value as YAML (used by `--print-config`).
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_saphyr::to_string(value).context("failed to render configuration as YAML")
}
