//! Configuration
//!
//! Settings are read from CLI flags, falling back to environment variables (and a `.env` file
//! loaded by the binary).

use std::path::PathBuf;

use clap::Args;
use decimal_percentage::Percentage;

use crate::{
    catalog::{Catalog, CatalogError},
    orders::DEFAULT_WHATSAPP_NUMBER,
    pricing::{DEFAULT_DELIVERY_CHARGE, DEFAULT_FREE_DELIVERY_THRESHOLD, PricingPolicy},
    storage::FileStorage,
};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Where persisted state and the product catalogue live.
#[derive(Debug, Clone, Args)]
pub struct StorageConfig {
    /// Directory holding the saved cart and customer details
    #[arg(long, env = "BOLTFIT_DATA_DIR", default_value = ".boltfit", global = true)]
    pub data_dir: PathBuf,

    /// Product catalogue (YAML)
    #[arg(long, env = "BOLTFIT_CATALOG", global = true)]
    pub catalog: Option<PathBuf>,
}

impl StorageConfig {
    /// File-backed storage rooted at the data directory.
    #[must_use]
    pub fn storage(&self) -> FileStorage {
        FileStorage::new(self.data_dir.clone())
    }

    /// Loads the configured catalogue, if one is set.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the file cannot be read or parsed.
    pub fn load_catalog(&self) -> Result<Option<Catalog>, CatalogError> {
        self.catalog.as_ref().map(Catalog::load).transpose()
    }
}

/// Cart pricing rules.
#[derive(Debug, Clone, Args)]
pub struct PricingConfig {
    /// Discount applied to the subtotal, in percent
    #[arg(
        long,
        env = "BOLTFIT_DISCOUNT_PERCENT",
        default_value_t = 10.0,
        value_parser = parse_percent,
        global = true
    )]
    pub discount_percent: f64,

    /// Subtotal (in rupees) at which delivery becomes free
    #[arg(
        long,
        env = "BOLTFIT_FREE_DELIVERY_THRESHOLD",
        default_value_t = DEFAULT_FREE_DELIVERY_THRESHOLD,
        global = true
    )]
    pub free_delivery_threshold: u64,

    /// Delivery charge (in rupees) below the threshold
    #[arg(
        long,
        env = "BOLTFIT_DELIVERY_CHARGE",
        default_value_t = DEFAULT_DELIVERY_CHARGE,
        global = true
    )]
    pub delivery_charge: u64,
}

impl PricingConfig {
    /// The pricing policy these settings describe.
    #[must_use]
    pub fn policy(&self) -> PricingPolicy {
        PricingPolicy::new(
            Percentage::from(self.discount_percent / 100.0),
            self.free_delivery_threshold,
            self.delivery_charge,
        )
    }
}

fn parse_percent(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|err| format!("invalid percentage: {err}"))?;

    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("percentage must be between 0 and 100, got {value}"))
    }
}

/// Order hand-off settings.
#[derive(Debug, Clone, Args)]
pub struct CheckoutConfig {
    /// Chat number receiving orders, in international format without `+`
    #[arg(
        long,
        env = "BOLTFIT_WHATSAPP_NUMBER",
        default_value = DEFAULT_WHATSAPP_NUMBER,
        global = true
    )]
    pub whatsapp_number: String,
}

/// All runtime settings.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Persistence settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Pricing rules.
    #[command(flatten)]
    pub pricing: PricingConfig,

    /// Checkout settings.
    #[command(flatten)]
    pub checkout: CheckoutConfig,
}
