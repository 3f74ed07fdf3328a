use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CATALOG_PATH: &str = "products.json";
pub const DEFAULT_RATES_PATH: &str = "RawMaterialRates.json";
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";
const ENV_PREFIX: &str = "PRICING";

#[derive(Debug, Error)]
#[error("configuration error: {0}")]
pub struct SettingsError(#[from] config::ConfigError);

/// Runtime settings shared by the CLI and the HTTP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSettings {
    pub catalog_path: PathBuf,
    pub rates_path: PathBuf,
    /// Copper rate applied as an override when the operator has not typed one.
    #[serde(default)]
    pub copper_rate: Option<String>,
    pub http_addr: String,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            rates_path: PathBuf::from(DEFAULT_RATES_PATH),
            copper_rate: None,
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
        }
    }
}

impl PricingSettings {
    /// Defaults, then an optional `pricing.*` file in the working directory,
    /// then `PRICING_*` environment variables.
    pub fn load() -> Result<Self, SettingsError> {
        let builder = Self::defaults()?
            .add_source(config::File::with_name("pricing").required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX));
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Defaults overlaid with a single settings file; the environment is not
    /// consulted.
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let builder = Self::defaults()?.add_source(config::File::from(path));
        Ok(builder.build()?.try_deserialize()?)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, SettingsError> {
        Ok(config::Config::builder()
            .set_default("catalog_path", DEFAULT_CATALOG_PATH)?
            .set_default("rates_path", DEFAULT_RATES_PATH)?
            .set_default("http_addr", DEFAULT_HTTP_ADDR)?)
    }
}
