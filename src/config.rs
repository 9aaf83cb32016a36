//! Configuration module for the storefront toolkit
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `PRADO__SECTION__KEY` environment variables (a `.env` file is honoured).

use config::{Config, Environment, File};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::{ProductConfig, DEFAULT_PRICE_PER_METER, MAX_LENGTH_MM, MIN_LENGTH_MM};

/// SHA-256 of the shared admin secret used when none is configured
pub const DEFAULT_ADMIN_SECRET_HASH: &str =
    "16175223c8ddce5ace0493c948569c211b03c4c6bb3d3e484434999448cffe01";

static API_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").expect("valid regex"));

static SHA256_HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{64}$").expect("valid regex"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode configuration: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub shopify: ShopifyConfig,
    pub admin: AdminConfig,
    pub storage: StorageConfig,
    pub pricing: PricingConfig,
    pub import: ImportConfig,
    pub logging: LoggingConfig,
}

/// Shop endpoints and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopifyConfig {
    /// Shop domain (`name.myshopify.com`) or a full base URL
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Public Storefront API token
    #[serde(default)]
    pub storefront_token: Option<String>,

    /// Admin API access token
    #[serde(default)]
    pub admin_token: Option<String>,

    #[serde(default = "default_storefront_api_version")]
    pub storefront_api_version: String,

    #[serde(default = "default_admin_api_version")]
    pub admin_api_version: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Admin area credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub email: Option<String>,

    /// Hex SHA-256 of the admin password
    #[serde(default)]
    pub password_hash: Option<String>,

    /// Hex SHA-256 of the shared admin secret
    #[serde(default = "default_secret_hash")]
    pub shared_secret_hash: String,

    #[serde(default = "default_session_hours")]
    pub session_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the local state database
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

/// Fallback pricing when a product has no stored configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_price_per_meter")]
    pub default_price_per_meter: f64,

    #[serde(default = "default_min_length")]
    pub min_length_mm: u32,

    #[serde(default = "default_max_length")]
    pub max_length_mm: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Pause between imported rows, to stay under the API rate limit
    #[serde(default = "default_row_delay")]
    pub row_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

fn default_domain() -> String { "lovable-project-969u3.myshopify.com".to_string() }
fn default_storefront_api_version() -> String { "2025-07".to_string() }
fn default_admin_api_version() -> String { "2024-10".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_secret_hash() -> String { DEFAULT_ADMIN_SECRET_HASH.to_string() }
fn default_session_hours() -> i64 { crate::types::ADMIN_SESSION_DURATION_HOURS }
fn default_storage_path() -> PathBuf { PathBuf::from("data/prado-store") }
fn default_price_per_meter() -> f64 { DEFAULT_PRICE_PER_METER }
fn default_min_length() -> u32 { MIN_LENGTH_MM }
fn default_max_length() -> u32 { MAX_LENGTH_MM }
fn default_row_delay() -> u64 { 500 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            storefront_token: None,
            admin_token: None,
            storefront_api_version: default_storefront_api_version(),
            admin_api_version: default_admin_api_version(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: None,
            password_hash: None,
            shared_secret_hash: default_secret_hash(),
            session_hours: default_session_hours(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_price_per_meter: default_price_per_meter(),
            min_length_mm: default_min_length(),
            max_length_mm: default_max_length(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            row_delay_ms: default_row_delay(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl PricingConfig {
    /// Product configuration used when the shop has nothing stored
    pub fn product_defaults(&self) -> ProductConfig {
        ProductConfig {
            price_per_meter: self.default_price_per_meter,
            min_length_mm: self.min_length_mm,
            max_length_mm: self.max_length_mm,
            ..ProductConfig::default()
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file only
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Load defaults, the optional file and environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        } else {
            builder = builder.add_source(File::with_name("prado-store").required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix("PRADO")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML, e.g. to seed a config file
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shopify.domain.trim().is_empty() {
            return Err(ConfigError::Invalid("shopify.domain must not be empty".into()));
        }
        for (name, version) in [
            ("shopify.storefront_api_version", &self.shopify.storefront_api_version),
            ("shopify.admin_api_version", &self.shopify.admin_api_version),
        ] {
            if !API_VERSION_RE.is_match(version) {
                return Err(ConfigError::Invalid(format!(
                    "{} must look like YYYY-MM, got '{}'",
                    name, version
                )));
            }
        }
        if self.shopify.timeout_secs == 0 {
            return Err(ConfigError::Invalid("shopify.timeout_secs must be > 0".into()));
        }

        if !SHA256_HEX_RE.is_match(&self.admin.shared_secret_hash) {
            return Err(ConfigError::Invalid(
                "admin.shared_secret_hash must be a hex SHA-256 digest".into(),
            ));
        }
        if let Some(hash) = &self.admin.password_hash {
            if !SHA256_HEX_RE.is_match(hash) {
                return Err(ConfigError::Invalid(
                    "admin.password_hash must be a hex SHA-256 digest".into(),
                ));
            }
        }
        if self.admin.session_hours <= 0 {
            return Err(ConfigError::Invalid("admin.session_hours must be > 0".into()));
        }

        let pricing = &self.pricing;
        if !(pricing.default_price_per_meter.is_finite() && pricing.default_price_per_meter >= 0.0) {
            return Err(ConfigError::Invalid(
                "pricing.default_price_per_meter must be a non-negative number".into(),
            ));
        }
        if pricing.min_length_mm == 0 || pricing.min_length_mm > pricing.max_length_mm {
            return Err(ConfigError::Invalid(format!(
                "pricing length bounds are inconsistent: {}..{}",
                pricing.min_length_mm, pricing.max_length_mm
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.shopify.storefront_api_version, "2025-07");
        assert_eq!(config.shopify.admin_api_version, "2024-10");
        assert_eq!(config.import.row_delay_ms, 500);
        assert_eq!(config.admin.session_hours, 8);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[shopify]\ndomain = \"loja.myshopify.com\"\n\n[pricing]\ndefault_price_per_meter = 120.0").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.shopify.domain, "loja.myshopify.com");
        assert_eq!(config.shopify.timeout_secs, 30);
        assert_eq!(config.pricing.default_price_per_meter, 120.0);
        assert_eq!(config.pricing.max_length_mm, 3000);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.shopify.admin_api_version = "latest".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.pricing.min_length_mm = 500;
        config.pricing.max_length_mm = 100;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.admin.password_hash = Some("not-a-hash".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_product_defaults_follow_pricing() {
        let mut pricing = PricingConfig::default();
        pricing.default_price_per_meter = 75.0;
        pricing.max_length_mm = 2000;
        let product = pricing.product_defaults();
        assert_eq!(product.price_per_meter, 75.0);
        assert_eq!(product.max_length_mm, 2000);
        assert_eq!(product.allowed_services.len(), 8);
    }

    #[test]
    fn test_toml_round_trip() {
        let text = AppConfig::default().to_toml().unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.shopify.domain, AppConfig::default().shopify.domain);
    }
}
