//! Centralized constants for the fleet yield reporter
//!
//! Universal values for the SDU market and report layout live here.
//! Operator-specific settings (rental rates, endpoints, file paths) are loaded from config.toml.

// =============================================================================
// API Endpoints
// =============================================================================

/// CoinGecko simple price endpoint for ATLAS/USD
pub const COINGECKO_SIMPLE_PRICE: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=star-atlas&vs_currencies=usd";

/// Asset id of ATLAS in the CoinGecko response body
pub const COINGECKO_ATLAS_ID: &str = "star-atlas";

// =============================================================================
// Token Mints
// =============================================================================

/// Survey Data Unit mint (the harvested resource)
pub const SDU_MINT: &str = "SDUsgfSZaDhhZ76U3ZgvtFiXsfnHbf2VrzYxjBZ5YbM";

/// ATLAS mint (the settlement currency of SDU sell orders)
pub const ATLAS_MINT: &str = "ATLASXmbPQxBUYbxPsV97usA3fPQYEqzQBUHgiFCUsXx";

// =============================================================================
// Units
// =============================================================================

/// Display name of the harvested resource
pub const RESOURCE_UNIT: &str = "SDU";

/// Display name of the native settlement unit
pub const NATIVE_UNIT: &str = "ATLAS";

/// Display name of the fiat unit
pub const FIAT_UNIT: &str = "USD";

// =============================================================================
// Thresholds
// =============================================================================

/// Fallback ATLAS price in USD if the price feed fails
pub const FALLBACK_ATLAS_USD: f64 = 0.0025;

/// Minimum SDU ask (ATLAS) to consider - filters out zero-price noise orders
pub const MIN_ORDER_PRICE: f64 = 0.000001;

/// Default dynamic window in hours
pub const DEFAULT_WINDOW_HOURS: u32 = 12;

/// Length of the fixed reference period in hours
pub const REFERENCE_HOURS: u32 = 24;

// =============================================================================
// Record Source
// =============================================================================

/// Required scan log columns
pub const COL_TIMESTAMP: &str = "Timestamp";
pub const COL_FLEET_NAME: &str = "Fleet Name";
pub const COL_SDU_COUNT: &str = "SDU Count";

/// Recognized location column headers, in order of preference
pub const LOCATION_COLUMNS: [&str; 2] = ["Coordinates", "Location"];

/// Base name used when a coordinate has no mapping
pub const UNKNOWN_BASE: &str = "Unknown";

// =============================================================================
// Rental Configuration
// =============================================================================

/// Prefix carried by every rental rate key (e.g. RENT_PLANET_EATER)
pub const RENTAL_PREFIX: &str = "RENT_";

/// Separator between fleet-name segments in a rental key
pub const RENTAL_KEY_DELIMITER: char = '_';

// =============================================================================
// File Names
// =============================================================================

/// Default config file path
pub const CONFIG_FILE: &str = "config.toml";

/// Default push notification title
pub const DEFAULT_PUSH_TITLE: &str = "Fleet SDU report";
