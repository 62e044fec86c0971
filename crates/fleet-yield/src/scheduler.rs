//! Periodic report publishing.
//!
//! Each tick builds a fresh report from the current scan log and market state
//! and sends it through the configured channel.

use std::time::Duration;

use chrono::Utc;
use tokio::signal;
use tokio::time;

use crate::config::Config;
use crate::delivery::Channel;
use crate::pipeline::{ReportRequest, publish};
use crate::prices::PriceSource;

/// Publish a report every `interval` until Ctrl+C.
///
/// The first report goes out immediately. A failed run is logged and the
/// loop waits for the next tick.
pub async fn run_watch<P: PriceSource>(
    config: &Config,
    request: &ReportRequest,
    prices: &P,
    channel: &Channel,
    interval: Duration,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    tracing::info!("Watch started (interval: {}s)", interval.as_secs());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tick(config, request, prices, channel).await;
            }

            _ = signal::ctrl_c() => {
                tracing::info!("Shutdown signal received. Stopping watch.");
                break;
            }
        }
    }

    tracing::info!("Watch stopped");
}

/// One report cycle. Returns whether a report was delivered.
async fn tick<P: PriceSource>(
    config: &Config,
    request: &ReportRequest,
    prices: &P,
    channel: &Channel,
) -> bool {
    match publish(config, request, prices, channel, Utc::now()).await {
        Ok(report) => {
            tracing::info!(
                "Report published: {} fleets at {:.4} ATLAS/SDU",
                report.profit.fleets.len(),
                report.quote.price
            );
            true
        }
        Err(err) => {
            tracing::error!("Report run failed, retrying next tick: {:#}", err);
            false
        }
    }
}
