//! Configuration for the fleet yield reporter

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::rates::RentalRateTable;

// =============================================================================
// File-based Configuration (config.toml)
// =============================================================================

/// Configuration loaded from config.toml
#[derive(Debug, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub report: ReportSection,
    pub market: MarketSection,
    #[serde(default)]
    pub rental: RentalSection,
    #[serde(default)]
    pub delivery: DeliverySection,
}

/// Report inputs
#[derive(Debug, Default, Deserialize)]
pub struct ReportSection {
    /// Dynamic window in hours
    #[serde(default)]
    pub window_hours: Option<u32>,
    /// Scan log CSV
    #[serde(default)]
    pub records_path: Option<PathBuf>,
    /// Optional coordinate -> base name file
    #[serde(default)]
    pub bases_path: Option<PathBuf>,
    /// Sort fleets by base (defaults to on when a bases file is set)
    #[serde(default)]
    pub sort_by_base: Option<bool>,
}

/// Marketplace and price feed settings
#[derive(Debug, Deserialize)]
pub struct MarketSection {
    /// Endpoint returning open marketplace orders as JSON
    pub orders_url: String,
    #[serde(default = "default_resource_mint")]
    pub resource_mint: String,
    #[serde(default = "default_currency_mint")]
    pub currency_mint: String,
    /// Asks below this price (ATLAS) are ignored
    #[serde(default = "default_min_price")]
    pub min_price: f64,
    #[serde(default = "default_fiat_feed_url")]
    pub fiat_feed_url: String,
    #[serde(default = "default_fiat_asset_id")]
    pub fiat_asset_id: String,
    #[serde(default = "default_fallback_fiat_rate")]
    pub fallback_fiat_rate: f64,
}

/// Rental rate settings
#[derive(Debug, Deserialize)]
pub struct RentalSection {
    #[serde(default = "default_rental_prefix")]
    pub prefix: String,
    /// Fleets whose name contains any of these are never rented
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Prefixed key -> ATLAS per 24h, e.g. RENT_PLANET_EATER = 10
    #[serde(default)]
    pub rates: BTreeMap<String, f64>,
}

impl Default for RentalSection {
    fn default() -> Self {
        Self {
            prefix: default_rental_prefix(),
            exclude: Vec::new(),
            rates: BTreeMap::new(),
        }
    }
}

/// Push notification settings
#[derive(Debug, Default, Deserialize)]
pub struct DeliverySection {
    #[serde(default)]
    pub push_url: Option<String>,
    #[serde(default)]
    pub push_title: Option<String>,
}

fn default_resource_mint() -> String {
    constants::SDU_MINT.to_string()
}

fn default_currency_mint() -> String {
    constants::ATLAS_MINT.to_string()
}

fn default_min_price() -> f64 {
    constants::MIN_ORDER_PRICE
}

fn default_fiat_feed_url() -> String {
    constants::COINGECKO_SIMPLE_PRICE.to_string()
}

fn default_fiat_asset_id() -> String {
    constants::COINGECKO_ATLAS_ID.to_string()
}

fn default_fallback_fiat_rate() -> f64 {
    constants::FALLBACK_ATLAS_USD
}

fn default_rental_prefix() -> String {
    constants::RENTAL_PREFIX.to_string()
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| {
            "Failed to parse config.toml. Check for:\n\
             - Missing required fields (market.orders_url)\n\
             - Invalid TOML syntax (missing quotes, brackets, etc.)\n\
             - Incorrect data types (rental rates must be numbers)\n\n\
             See config.toml.example for the expected format."
        })
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Market settings used by the price source
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub orders_url: String,
    pub resource_mint: String,
    pub currency_mint: String,
    pub min_price: f64,
    pub fiat_feed_url: String,
    pub fiat_asset_id: String,
    pub fallback_fiat_rate: f64,
}

/// Push channel settings
#[derive(Debug, Clone)]
pub struct PushConfig {
    pub url: String,
    pub title: String,
}

/// Command-line values that take precedence over config.toml
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub window_hours: Option<u32>,
    pub records_path: Option<PathBuf>,
    pub bases_path: Option<PathBuf>,
}

/// Immutable settings for one run
#[derive(Debug, Clone)]
pub struct Config {
    pub window_hours: u32,
    pub records_path: Option<PathBuf>,
    pub bases_path: Option<PathBuf>,
    pub sort_by_base: bool,
    pub market: MarketConfig,
    pub rental_rates: RentalRateTable,
    pub push: Option<PushConfig>,
}

impl Config {
    /// Build the runtime config. Rental keys are read from `[rental.rates]` and then
    /// from `env`, so environment variables override file entries with the same key.
    pub fn from_file<E>(file_config: &FileConfig, overrides: Overrides, env: E) -> Result<Self>
    where
        E: IntoIterator<Item = (String, String)>,
    {
        let report = &file_config.report;
        let market = &file_config.market;
        let rental = &file_config.rental;

        let window_hours = overrides
            .window_hours
            .or(report.window_hours)
            .unwrap_or(constants::DEFAULT_WINDOW_HOURS);
        if window_hours == 0 {
            anyhow::bail!("Window must be at least 1 hour");
        }

        if !(market.fallback_fiat_rate.is_finite() && market.fallback_fiat_rate > 0.0) {
            anyhow::bail!(
                "market.fallback_fiat_rate must be positive, got {}",
                market.fallback_fiat_rate
            );
        }
        if !(market.min_price.is_finite() && market.min_price >= 0.0) {
            anyhow::bail!("market.min_price must not be negative, got {}", market.min_price);
        }

        // Later pairs win, so the environment is chained after the file
        let mut pairs: BTreeMap<String, String> = rental
            .rates
            .iter()
            .map(|(key, rate)| (key.clone(), rate.to_string()))
            .collect();
        pairs.extend(env.into_iter().filter(|(key, _)| key.starts_with(&rental.prefix)));
        let rental_rates = RentalRateTable::from_pairs(&rental.prefix, &rental.exclude, pairs);

        let bases_path = overrides.bases_path.or_else(|| report.bases_path.clone());
        let sort_by_base = report.sort_by_base.unwrap_or(bases_path.is_some());

        let push = file_config.delivery.push_url.as_ref().map(|url| PushConfig {
            url: url.clone(),
            title: file_config
                .delivery
                .push_title
                .clone()
                .unwrap_or_else(|| constants::DEFAULT_PUSH_TITLE.to_string()),
        });

        Ok(Self {
            window_hours,
            records_path: overrides.records_path.or_else(|| report.records_path.clone()),
            bases_path,
            sort_by_base,
            market: MarketConfig {
                orders_url: market.orders_url.clone(),
                resource_mint: market.resource_mint.clone(),
                currency_mint: market.currency_mint.clone(),
                min_price: market.min_price,
                fiat_feed_url: market.fiat_feed_url.clone(),
                fiat_asset_id: market.fiat_asset_id.clone(),
                fallback_fiat_rate: market.fallback_fiat_rate,
            },
            rental_rates,
            push,
        })
    }
}
