//! Current SDU price (lowest marketplace ask) and ATLAS/USD rate
//!
//! Both lookups are single attempts. A failed market query yields no quote,
//! which the pipeline treats as fatal; a failed fiat query falls back to the
//! configured constant.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::MarketConfig;

/// Open marketplace order as returned by the order book endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOrder {
    pub order_type: String,
    pub order_mint: String,
    pub currency_mint: String,
    pub ui_price: f64,
    #[serde(default)]
    pub order_origination_qty: Option<f64>,
    #[serde(default)]
    pub owner: Option<String>,
}

/// Order book payload: either a bare array or wrapped in `orders`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OrderBookResponse {
    Bare(Vec<MarketOrder>),
    Wrapped { orders: Vec<MarketOrder> },
}

impl OrderBookResponse {
    fn into_orders(self) -> Vec<MarketOrder> {
        match self {
            OrderBookResponse::Bare(orders) | OrderBookResponse::Wrapped { orders } => orders,
        }
    }
}

/// Cheapest qualifying sell order
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    /// ATLAS per SDU
    pub price: f64,
    pub quantity: Option<f64>,
    pub seller: Option<String>,
}

/// Which orders count as an SDU ask
#[derive(Debug, Clone, Copy)]
pub struct OrderFilter<'a> {
    pub resource_mint: &'a str,
    pub currency_mint: &'a str,
    pub min_price: f64,
}

impl<'a> From<&'a MarketConfig> for OrderFilter<'a> {
    fn from(market: &'a MarketConfig) -> Self {
        Self {
            resource_mint: &market.resource_mint,
            currency_mint: &market.currency_mint,
            min_price: market.min_price,
        }
    }
}

/// Pick the lowest-priced sell order for the resource settled in the currency.
/// Orders under `min_price` are noise and never qualify.
pub fn select_lowest_ask(orders: &[MarketOrder], filter: &OrderFilter) -> Option<PriceQuote> {
    let mut asks: Vec<&MarketOrder> = orders
        .iter()
        .filter(|o| o.order_type.eq_ignore_ascii_case("sell"))
        .filter(|o| o.order_mint == filter.resource_mint)
        .filter(|o| o.currency_mint == filter.currency_mint)
        .filter(|o| o.ui_price.is_finite() && o.ui_price >= filter.min_price)
        .collect();

    asks.sort_by(|a, b| a.ui_price.total_cmp(&b.ui_price));

    asks.first().map(|order| PriceQuote {
        price: order.ui_price,
        quantity: order.order_origination_qty,
        seller: order.owner.clone(),
    })
}

/// Read `{ "<asset_id>": { "usd": <rate> } }`. Non-positive rates are rejected.
pub fn parse_fiat_rate(payload: &serde_json::Value, asset_id: &str) -> Option<f64> {
    payload
        .get(asset_id)?
        .get("usd")?
        .as_f64()
        .filter(|rate| rate.is_finite() && *rate > 0.0)
}

/// Source of the two external prices a report needs
pub trait PriceSource {
    /// Lowest current SDU ask, or None if nothing qualifies or the query failed
    async fn lowest_ask(&self) -> Option<PriceQuote>;

    /// ATLAS -> USD rate, falling back to a constant on any failure
    async fn fiat_rate(&self) -> f64;
}

/// Price source backed by the marketplace order endpoint and CoinGecko
pub struct HttpPriceSource {
    client: reqwest::Client,
    market: MarketConfig,
}

impl HttpPriceSource {
    pub fn new(market: MarketConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            market,
        }
    }

    async fn fetch_orders(&self) -> anyhow::Result<Vec<MarketOrder>> {
        let response = self
            .client
            .get(&self.market.orders_url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Order book returned status: {}", response.status());
        }

        let book: OrderBookResponse = response.json().await?;
        Ok(book.into_orders())
    }

    async fn fetch_fiat_rate(&self) -> anyhow::Result<f64> {
        let response = self
            .client
            .get(&self.market.fiat_feed_url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Price feed returned status: {}", response.status());
        }

        let payload: serde_json::Value = response.json().await?;
        parse_fiat_rate(&payload, &self.market.fiat_asset_id)
            .ok_or_else(|| anyhow::anyhow!("No usable '{}' price in response", self.market.fiat_asset_id))
    }
}

impl PriceSource for HttpPriceSource {
    async fn lowest_ask(&self) -> Option<PriceQuote> {
        match self.fetch_orders().await {
            Ok(orders) => {
                debug!("Order book returned {} orders", orders.len());
                select_lowest_ask(&orders, &OrderFilter::from(&self.market))
            }
            Err(e) => {
                warn!("Failed to query SDU order book: {:#}", e);
                None
            }
        }
    }

    async fn fiat_rate(&self) -> f64 {
        match self.fetch_fiat_rate().await {
            Ok(rate) => rate,
            Err(e) => {
                warn!(
                    "Failed to fetch ATLAS/USD rate ({:#}), using fallback {}",
                    e, self.market.fallback_fiat_rate
                );
                self.market.fallback_fiat_rate
            }
        }
    }
}
