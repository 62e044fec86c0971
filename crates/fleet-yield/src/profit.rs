//! Profit and ROI per fleet and per ownership category
//!
//! Values are SDU counts times the current ask (ATLAS). Rented fleets pay their
//! configured daily rate; for the dynamic window that rate is prorated linearly.
//! Everything is kept at full precision here; rounding happens only at render time.

use std::fmt;

use crate::aggregate::FleetStatsMap;
use crate::constants;
use crate::rates::RentalRateTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Rented,
    Owned,
}

/// Row of the profit summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryCategory {
    Rented,
    Owned,
    Overall,
}

impl fmt::Display for SummaryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryCategory::Rented => write!(f, "Rented"),
            SummaryCategory::Owned => write!(f, "Owned"),
            SummaryCategory::Overall => write!(f, "Overall"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Last24h,
    Window,
}

/// Per-fleet figures in ATLAS
#[derive(Debug, Clone, PartialEq)]
pub struct FleetProfit {
    pub fleet_name: String,
    pub base_name: Option<String>,
    pub window_count: u64,
    pub last_24h_count: u64,
    /// Scans inside the window; zero means the fleet was only seen earlier in the day
    pub window_scans: u32,
    pub value_window: f64,
    pub value_24h: f64,
    /// Daily rental rate, only for rented fleets
    pub rent_24h: Option<f64>,
    /// Rental rate prorated to the window
    pub rent_window: Option<f64>,
    /// 24h value over daily rent, whole percent
    pub roi_percent: Option<i64>,
    pub ownership: Ownership,
}

impl FleetProfit {
    pub fn net_24h(&self) -> f64 {
        self.value_24h - self.rent_24h.unwrap_or(0.0)
    }

    pub fn net_window(&self) -> f64 {
        self.value_window - self.rent_window.unwrap_or(0.0)
    }
}

/// Accumulated value and rent for one summary category
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProfitRow {
    pub value_24h: f64,
    pub rent_24h: f64,
    pub value_window: f64,
    pub rent_window: f64,
}

/// Net amount for one category and period, in ATLAS and USD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodFigures {
    pub native: f64,
    pub fiat: f64,
    pub roi_percent: Option<i64>,
}

impl ProfitRow {
    fn add(&mut self, fleet: &FleetProfit) {
        self.value_24h += fleet.value_24h;
        self.value_window += fleet.value_window;
        self.rent_24h += fleet.rent_24h.unwrap_or(0.0);
        self.rent_window += fleet.rent_window.unwrap_or(0.0);
    }

    /// Field-wise sum of two rows
    pub fn combined(&self, other: &ProfitRow) -> ProfitRow {
        ProfitRow {
            value_24h: self.value_24h + other.value_24h,
            rent_24h: self.rent_24h + other.rent_24h,
            value_window: self.value_window + other.value_window,
            rent_window: self.rent_window + other.rent_window,
        }
    }

    pub fn figures(&self, period: Period, fiat_rate: f64) -> PeriodFigures {
        let (value, rent) = match period {
            Period::Last24h => (self.value_24h, self.rent_24h),
            Period::Window => (self.value_window, self.rent_window),
        };
        let native = value - rent;
        PeriodFigures {
            native,
            fiat: native * fiat_rate,
            roi_percent: roi_percent(value, rent),
        }
    }
}

/// Rented, owned and overall rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitSummary {
    pub rented: ProfitRow,
    pub owned: ProfitRow,
    pub overall: ProfitRow,
}

impl ProfitSummary {
    pub fn rows(&self) -> [(SummaryCategory, &ProfitRow); 3] {
        [
            (SummaryCategory::Rented, &self.rented),
            (SummaryCategory::Owned, &self.owned),
            (SummaryCategory::Overall, &self.overall),
        ]
    }
}

/// Everything the renderers need
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitReport {
    /// Fleets in aggregation order
    pub fleets: Vec<FleetProfit>,
    pub summary: ProfitSummary,
    /// ATLAS per SDU
    pub price: f64,
    /// USD per ATLAS
    pub fiat_rate: f64,
    pub window_hours: u32,
}

impl ProfitReport {
    /// True when at least one scan fell inside the requested window
    pub fn has_window_data(&self) -> bool {
        self.fleets.iter().any(|f| f.window_scans > 0)
    }
}

/// Daily rate scaled to a window of `window_hours`
pub fn prorate(rate_24h: f64, window_hours: u32) -> f64 {
    rate_24h * (f64::from(window_hours) / f64::from(constants::REFERENCE_HOURS))
}

/// `round(value / rent * 100)`, or None without a positive rent
pub fn roi_percent(value: f64, rent: f64) -> Option<i64> {
    if rent > 0.0 {
        Some((value / rent * 100.0).round() as i64)
    } else {
        None
    }
}

/// Price every fleet and fold them into the summary rows
pub fn calculate(
    stats: &FleetStatsMap,
    price: f64,
    rates: &RentalRateTable,
    window_hours: u32,
    fiat_rate: f64,
) -> ProfitReport {
    let mut fleets = Vec::with_capacity(stats.len());
    let mut rented = ProfitRow::default();
    let mut owned = ProfitRow::default();

    for (name, s) in stats.iter() {
        let value_window = s.window_count as f64 * price;
        let value_24h = s.last_24h_count as f64 * price;

        // Zero or negative rates are treated the same as no rate at all
        let rent = rates.lookup(name).filter(|rate| *rate > 0.0);

        let fleet = FleetProfit {
            fleet_name: name.to_string(),
            base_name: s.base_name.clone(),
            window_count: s.window_count,
            window_scans: s.window_scans,
            last_24h_count: s.last_24h_count,
            value_window,
            value_24h,
            rent_24h: rent,
            rent_window: rent.map(|r| prorate(r, window_hours)),
            roi_percent: rent.and_then(|r| roi_percent(value_24h, r)),
            ownership: if rent.is_some() {
                Ownership::Rented
            } else {
                Ownership::Owned
            },
        };

        match fleet.ownership {
            Ownership::Rented => rented.add(&fleet),
            Ownership::Owned => owned.add(&fleet),
        }
        fleets.push(fleet);
    }

    ProfitReport {
        fleets,
        summary: ProfitSummary {
            rented,
            owned,
            overall: rented.combined(&owned),
        },
        price,
        fiat_rate,
        window_hours,
    }
}
