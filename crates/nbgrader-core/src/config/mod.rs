//! Application configuration schemas.
//!
//! The configuration is loaded once at startup with the `config` crate and
//! then passed around immutably. Every field has a default, so an absent
//! configuration file is valid.

pub mod access;
pub mod hub;
pub mod logging;

use std::path::Path;

use serde::{Deserialize, Serialize};

use self::access::AccessConfig;
use self::hub::HubConfig;
use self::logging::LoggingConfig;

use crate::result::AppResult;

/// Prefix for environment variable overrides, e.g. `NBGRADER__AUTH__BACKEND`.
pub const ENV_PREFIX: &str = "NBGRADER";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Access-control backend selection.
    #[serde(default)]
    pub auth: AccessConfig,
    /// Hub API connection settings.
    #[serde(default)]
    pub hub: HubConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file plus `NBGRADER__*` overrides.
    ///
    /// A missing file is tolerated unless `required` is set, so the CLI can
    /// run with defaults outside a configured deployment.
    pub fn load(path: impl AsRef<Path>, required: bool) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
