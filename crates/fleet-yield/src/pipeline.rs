//! One report run: scan log -> counts -> prices -> profit -> rendered text
//!
//! Stages run strictly in sequence and any fatal failure aborts the run
//! before anything is rendered.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::bases::BaseNames;
use crate::config::Config;
use crate::delivery::Channel;
use crate::error::ReportError;
use crate::prices::{PriceQuote, PriceSource};
use crate::profit::{ProfitReport, calculate};
use crate::records::RecordReader;
use crate::reports::{RenderOptions, RenderTarget, render};

/// What the caller wants rendered
#[derive(Debug, Clone, Copy)]
pub struct ReportRequest {
    pub target: RenderTarget,
    /// Annotate fleets with base names when a bases file is configured
    pub show_locations: bool,
}

/// A finished report
#[derive(Debug, Clone)]
pub struct Report {
    pub text: String,
    pub quote: PriceQuote,
    pub profit: ProfitReport,
}

pub async fn generate_report<P: PriceSource>(
    config: &Config,
    request: &ReportRequest,
    prices: &P,
    now: DateTime<Utc>,
) -> Result<Report> {
    let bases = match (&config.bases_path, request.show_locations) {
        (Some(path), true) => {
            let bases = BaseNames::load(path)?;
            if bases.is_empty() {
                warn!("No base names found in {}", path.display());
            }
            debug!("Loaded {} base names", bases.len());
            Some(bases)
        }
        _ => None,
    };

    let records_path = config
        .records_path
        .as_ref()
        .context("No scan log configured. Set report.records_path or pass --records")?;

    info!("Aggregating {} (window {}h)", records_path.display(), config.window_hours);
    let mut reader = RecordReader::open(records_path)
        .with_context(|| format!("Failed to open scan log: {}", records_path.display()))?;
    if bases.is_some() && !reader.has_location() {
        warn!("Scan log has no location column, fleets will show no base");
    }
    let stats = aggregate(&mut reader, config.window_hours, now, bases.as_ref())
        .with_context(|| format!("Failed to read scan log: {}", records_path.display()))?;
    debug!("Skipped {} invalid scan rows", reader.skipped());
    if stats.is_empty() {
        info!("No fleets active in the last 24 hours");
    } else {
        info!("Found {} fleets active in the last 24 hours", stats.len());
    }

    let quote = prices.lowest_ask().await.ok_or(ReportError::NoValidPrice)?;
    let fiat_rate = prices.fiat_rate().await;
    info!("SDU ask {} ATLAS, ATLAS/USD {}", quote.price, fiat_rate);

    let profit = calculate(
        &stats,
        quote.price,
        &config.rental_rates,
        config.window_hours,
        fiat_rate,
    );
    if !profit.has_window_data() {
        info!("No scans in the last {} hours", config.window_hours);
    }

    let options = RenderOptions {
        show_locations: bases.is_some(),
        sort_by_base: config.sort_by_base,
    };
    let text = render(&profit, request.target, &options);

    Ok(Report {
        text,
        quote,
        profit,
    })
}

/// True when the run failed because no usable market price exists
pub fn is_missing_price(error: &anyhow::Error) -> bool {
    matches!(error.downcast_ref::<ReportError>(), Some(ReportError::NoValidPrice))
}

/// Generate a report and hand it to `channel`. A missing price is also
/// announced through the channel's alert before the error is returned.
pub async fn publish<P: PriceSource>(
    config: &Config,
    request: &ReportRequest,
    prices: &P,
    channel: &Channel,
    now: DateTime<Utc>,
) -> Result<Report> {
    let report = match generate_report(config, request, prices, now).await {
        Ok(report) => report,
        Err(e) => {
            if is_missing_price(&e) {
                if let Err(alert_err) = channel.alert(&e.to_string()).await {
                    warn!("Could not send price alert: {}", alert_err);
                }
            }
            return Err(e);
        }
    };

    channel.deliver(&report.text).await?;
    Ok(report)
}
