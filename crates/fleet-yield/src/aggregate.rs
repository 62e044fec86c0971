//! Per-fleet SDU counts over the dynamic window and the fixed 24h window

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::debug;

use crate::bases::BaseNames;
use crate::constants;
use crate::error::ReportError;
use crate::records::ScanRecord;

/// SDU counts for one fleet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetWindowStats {
    /// SDU found inside the caller's window
    pub window_count: u64,
    /// SDU found in the last 24 hours
    pub last_24h_count: u64,
    /// Records that fell inside the caller's window, zero-count ones included
    pub window_scans: u32,
    /// Base of the most recently processed record that carried a location
    pub base_name: Option<String>,
}

/// Fleet name -> stats, iterated in first-seen order
#[derive(Debug, Clone, Default)]
pub struct FleetStatsMap {
    order: Vec<String>,
    stats: HashMap<String, FleetWindowStats>,
}

impl FleetStatsMap {
    fn entry(&mut self, fleet_name: &str) -> &mut FleetWindowStats {
        if !self.stats.contains_key(fleet_name) {
            self.order.push(fleet_name.to_string());
        }
        self.stats.entry(fleet_name.to_string()).or_default()
    }

    #[cfg(test)]
    pub fn get(&self, fleet_name: &str) -> Option<&FleetWindowStats> {
        self.stats.get(fleet_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FleetWindowStats)> {
        self.order
            .iter()
            .filter_map(|name| self.stats.get(name).map(|s| (name.as_str(), s)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Folds scan records into a [`FleetStatsMap`]
pub struct Aggregator<'a> {
    now: DateTime<Utc>,
    since_window: DateTime<Utc>,
    since_24h: DateTime<Utc>,
    bases: Option<&'a BaseNames>,
    stats: FleetStatsMap,
}

impl<'a> Aggregator<'a> {
    pub fn new(window_hours: u32, now: DateTime<Utc>, bases: Option<&'a BaseNames>) -> Self {
        Self {
            now,
            since_window: now - Duration::hours(i64::from(window_hours)),
            since_24h: now - Duration::hours(i64::from(constants::REFERENCE_HOURS)),
            bases,
            stats: FleetStatsMap::default(),
        }
    }

    /// Add one record. Returns false if it falls outside both windows.
    ///
    /// The two windows are checked independently since either may contain the other.
    pub fn fold(&mut self, record: &ScanRecord) -> bool {
        if record.timestamp > self.now {
            return false;
        }
        let in_window = record.timestamp >= self.since_window;
        let in_24h = record.timestamp >= self.since_24h;
        if !in_window && !in_24h {
            return false;
        }

        let bases = self.bases;
        let entry = self.stats.entry(&record.fleet_name);
        if in_window {
            entry.window_count += record.sdu_count;
            entry.window_scans += 1;
        }
        if in_24h {
            entry.last_24h_count += record.sdu_count;
        }

        // Last writer wins: records arrive in source order, so the latest row's base sticks
        if let (Some(location), Some(bases)) = (&record.location, bases) {
            entry.base_name = Some(bases.resolve(location).to_string());
        }

        true
    }

    pub fn finish(self) -> FleetStatsMap {
        self.stats
    }
}

/// Aggregate a record stream. The first stream error aborts aggregation.
pub fn aggregate<I>(
    records: I,
    window_hours: u32,
    now: DateTime<Utc>,
    bases: Option<&BaseNames>,
) -> Result<FleetStatsMap, ReportError>
where
    I: IntoIterator<Item = Result<ScanRecord, ReportError>>,
{
    let mut aggregator = Aggregator::new(window_hours, now, bases);
    let mut ignored = 0usize;
    for record in records {
        if !aggregator.fold(&record?) {
            ignored += 1;
        }
    }
    debug!("Ignored {} scans outside both windows", ignored);
    Ok(aggregator.finish())
}
