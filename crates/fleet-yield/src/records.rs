//! Scan log ingestion
//!
//! The scan log is a CSV with one row per fleet observation. Rows are validated
//! into [`ScanRecord`]s; rows that fail validation (including rows that are not
//! valid UTF-8) are skipped, while read errors on the underlying stream abort the run.

use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{ByteRecord, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::constants;
use crate::error::ReportError;

/// A validated scan log row
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRecord {
    pub timestamp: DateTime<Utc>,
    pub fleet_name: String,
    pub sdu_count: u64,
    pub location: Option<String>,
}

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    timestamp: usize,
    fleet_name: usize,
    sdu_count: usize,
    location: Option<usize>,
}

impl ColumnMap {
    pub fn from_headers(headers: &StringRecord) -> Result<Self, ReportError> {
        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        let require =
            |name: &str| find(name).ok_or_else(|| ReportError::MissingColumn(name.to_string()));

        Ok(Self {
            timestamp: require(constants::COL_TIMESTAMP)?,
            fleet_name: require(constants::COL_FLEET_NAME)?,
            sdu_count: require(constants::COL_SDU_COUNT)?,
            location: constants::LOCATION_COLUMNS.iter().find_map(|name| find(*name)),
        })
    }

    pub fn has_location(&self) -> bool {
        self.location.is_some()
    }
}

impl ScanRecord {
    /// Validate one row. Returns None for rows without a fleet name or with an
    /// unparseable timestamp; a missing or bad count is read as 0.
    pub fn from_row(row: &StringRecord, columns: &ColumnMap) -> Option<Self> {
        let fleet_name = row.get(columns.fleet_name)?.trim();
        if fleet_name.is_empty() {
            return None;
        }

        let timestamp = parse_timestamp(row.get(columns.timestamp)?)?;
        let sdu_count = parse_count(row.get(columns.sdu_count));
        let location = columns
            .location
            .and_then(|i| row.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Some(Self {
            timestamp,
            fleet_name: fleet_name.to_string(),
            sdu_count,
            location,
        })
    }
}

/// Parse a scan timestamp. Accepts RFC 3339, naive date-times (read as UTC)
/// and unix seconds or milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    // Unix time; anything past year ~5138 in seconds is taken as milliseconds
    let value: i64 = raw.parse().ok()?;
    if value.abs() >= 100_000_000_000 {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

fn parse_count(raw: Option<&str>) -> u64 {
    let Some(raw) = raw.map(str::trim) else {
        return 0;
    };
    if let Ok(count) = raw.parse::<u64>() {
        return count;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value.trunc() as u64,
        _ => 0,
    }
}

/// Streaming reader over a scan log
pub struct RecordReader<R: Read> {
    reader: csv::Reader<R>,
    columns: ColumnMap,
    raw: ByteRecord,
    skipped: usize,
}

impl RecordReader<File> {
    pub fn open(path: &Path) -> Result<Self, ReportError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl<R: Read> RecordReader<R> {
    pub fn from_reader(source: R) -> Result<Self, ReportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(source);

        let columns = ColumnMap::from_headers(reader.headers()?)?;

        Ok(Self {
            reader,
            columns,
            raw: ByteRecord::new(),
            skipped: 0,
        })
    }

    pub fn has_location(&self) -> bool {
        self.columns.has_location()
    }

    /// Rows skipped so far because they failed validation
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<ScanRecord, ReportError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_byte_record(&mut self.raw) {
                Ok(false) => return None,
                Ok(true) => {}
                Err(e) => return Some(Err(e.into())),
            }

            // The buffer is handed back after each row so it can be reused
            let raw = std::mem::take(&mut self.raw);
            let record = match StringRecord::from_byte_record(raw) {
                Ok(row) => {
                    let record = ScanRecord::from_row(&row, &self.columns);
                    self.raw = row.into_byte_record();
                    record
                }
                Err(e) => {
                    self.raw = e.into_byte_record();
                    None
                }
            };

            match record {
                Some(record) => return Some(Ok(record)),
                None => self.skipped += 1,
            }
        }
    }
}
