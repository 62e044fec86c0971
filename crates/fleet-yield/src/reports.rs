//! Report rendering (wide console table and condensed push notification)

use clap::ValueEnum;

use crate::constants::{FIAT_UNIT, NATIVE_UNIT, RESOURCE_UNIT, UNKNOWN_BASE};
use crate::profit::{FleetProfit, Ownership, Period, PeriodFigures, ProfitReport};

/// Cell separator. `format_table` collapses whitespace runs inside cells so this stays unambiguous.
const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderTarget {
    /// Aligned table for terminals and files
    Wide,
    /// Short bullet list for push notifications
    Condensed,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Show the base column (only when at least one fleet has a base)
    pub show_locations: bool,
    /// Order fleets by base name instead of first-seen order
    pub sort_by_base: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_locations: true,
            sort_by_base: true,
        }
    }
}

pub fn render(report: &ProfitReport, target: RenderTarget, options: &RenderOptions) -> String {
    match target {
        RenderTarget::Wide => render_wide(report, options),
        RenderTarget::Condensed => render_condensed(report, options),
    }
}

/// Per-fleet table followed by the profit summary table.
///
/// Without a single scan inside the requested window only the "No data" notice
/// and the price line are rendered, even if older scans fill the 24h columns.
pub fn render_wide(report: &ProfitReport, options: &RenderOptions) -> String {
    let hours = report.window_hours;
    let mut out = format!("{} yield report (last {}h)\n\n", RESOURCE_UNIT, hours);

    if !report.has_window_data() {
        out.push_str(&no_data_notice(hours));
        out.push('\n');
        out.push_str(&price_line(report));
        out.push('\n');
        return out;
    }

    let with_base = options.show_locations && report.fleets.iter().any(|f| f.base_name.is_some());
    let fleets = ordered_fleets(report, with_base && options.sort_by_base);

    let mut header = vec!["Fleet".to_string()];
    if with_base {
        header.push("Base".to_string());
    }
    header.extend([
        format!("{} {}h", RESOURCE_UNIT, hours),
        format!("{} 24h", RESOURCE_UNIT),
        format!("Value {}h ({})", hours, NATIVE_UNIT),
        format!("Value 24h ({})", NATIVE_UNIT),
        format!("Rent 24h ({})", NATIVE_UNIT),
        format!("Net 24h ({})", NATIVE_UNIT),
        format!("Net {}h ({})", hours, NATIVE_UNIT),
        "ROI".to_string(),
    ]);

    let rows: Vec<Vec<String>> = fleets
        .iter()
        .map(|fleet| {
            let mut row = vec![fleet.fleet_name.clone()];
            if with_base {
                row.push(fleet.base_name.clone().unwrap_or_else(|| UNKNOWN_BASE.to_string()));
            }
            row.extend([
                fleet.window_count.to_string(),
                fleet.last_24h_count.to_string(),
                format_amount(fleet.value_window),
                format_amount(fleet.value_24h),
                fleet.rent_24h.map(format_amount).unwrap_or_else(|| "N/A".to_string()),
                format_amount(fleet.net_24h()),
                format_amount(fleet.net_window()),
                format_roi(fleet.roi_percent),
            ]);
            row
        })
        .collect();

    out.push_str(&format_table(&header, &rows));
    out.push('\n');

    let summary_header = vec![
        "Profit".to_string(),
        format!("Net 24h ({})", NATIVE_UNIT),
        format!("Net 24h ({})", FIAT_UNIT),
        "ROI 24h".to_string(),
        format!("Net {}h ({})", hours, NATIVE_UNIT),
        format!("Net {}h ({})", hours, FIAT_UNIT),
        format!("ROI {}h", hours),
    ];
    let summary_rows: Vec<Vec<String>> = report
        .summary
        .rows()
        .iter()
        .map(|(category, row)| {
            let day = row.figures(Period::Last24h, report.fiat_rate);
            let window = row.figures(Period::Window, report.fiat_rate);
            vec![
                category.to_string(),
                format_amount(day.native),
                format_amount(day.fiat),
                format_roi(day.roi_percent),
                format_amount(window.native),
                format_amount(window.fiat),
                format_roi(window.roi_percent),
            ]
        })
        .collect();

    out.push_str(&format_table(&summary_header, &summary_rows));
    out.push('\n');
    out.push_str(&price_line(report));
    out.push('\n');
    out
}

/// Rented fleets as bullets plus one line per summary category
pub fn render_condensed(report: &ProfitReport, options: &RenderOptions) -> String {
    let hours = report.window_hours;
    let mut out = format!("{} report ({}h)\n", RESOURCE_UNIT, hours);

    if !report.has_window_data() {
        out.push_str(&no_data_notice(hours));
        out.push('\n');
        out.push_str(&price_line(report));
        out.push('\n');
        return out;
    }

    let with_base = options.show_locations && report.fleets.iter().any(|f| f.base_name.is_some());
    let rented: Vec<&FleetProfit> = ordered_fleets(report, with_base && options.sort_by_base)
        .into_iter()
        .filter(|f| f.ownership == Ownership::Rented)
        .collect();

    if rented.is_empty() {
        out.push_str("No rented fleets active\n");
    }

    for fleet in rented {
        match (&fleet.base_name, with_base) {
            (Some(base), true) => out.push_str(&format!("• {} @ {}\n", fleet.fleet_name, base)),
            _ => out.push_str(&format!("• {}\n", fleet.fleet_name)),
        }
        out.push_str(&format!("  ROI: {}\n", format_roi(fleet.roi_percent)));
        out.push_str(&format!(
            "  24h: {} {} ({})\n",
            format_amount(fleet.value_24h),
            NATIVE_UNIT,
            format_fiat(fleet.value_24h * report.fiat_rate)
        ));
        out.push_str(&format!(
            "  {}h: {} {} ({})\n",
            hours,
            format_amount(fleet.value_window),
            NATIVE_UNIT,
            format_fiat(fleet.value_window * report.fiat_rate)
        ));
    }

    out.push('\n');
    for (category, row) in report.summary.rows() {
        let day = row.figures(Period::Last24h, report.fiat_rate);
        let window = row.figures(Period::Window, report.fiat_rate);
        out.push_str(&format!("{} 24h: {}\n", category, summary_figures(&day)));
        out.push_str(&format!("{} {}h: {}\n", category, hours, summary_figures(&window)));
    }

    out.push_str(&price_line(report));
    out.push('\n');
    out
}

fn summary_figures(figures: &PeriodFigures) -> String {
    let mut line = format!(
        "{} {} ({})",
        format_amount(figures.native),
        NATIVE_UNIT,
        format_fiat(figures.fiat)
    );
    if let Some(roi) = figures.roi_percent {
        line.push_str(&format!(", ROI {}%", roi));
    }
    line
}

fn ordered_fleets(report: &ProfitReport, by_base: bool) -> Vec<&FleetProfit> {
    let mut fleets: Vec<&FleetProfit> = report.fleets.iter().collect();
    if by_base {
        // Stable sort keeps first-seen order inside a base; fleets without a base go last
        fleets.sort_by(|a, b| match (&a.base_name, &b.base_name) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }
    fleets
}

fn no_data_notice(hours: u32) -> String {
    format!("No data for the last {} hours.", hours)
}

fn price_line(report: &ProfitReport) -> String {
    format!(
        "Current {} price: {:.4} {} ({}/{} = ${:.6})",
        RESOURCE_UNIT,
        report.price,
        NATIVE_UNIT,
        NATIVE_UNIT,
        FIAT_UNIT,
        report.fiat_rate
    )
}

/// Left-aligned columns, each as wide as its widest cell
pub fn format_table(header: &[String], rows: &[Vec<String>]) -> String {
    let header: Vec<String> = header.iter().map(|cell| collapse_spaces(cell)).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| collapse_spaces(cell)).collect())
        .collect();

    let columns = header.len();
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate().take(columns) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let format_row = |cells: &[String]| -> String {
        let line = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);
        line.trim_end().to_string()
    };

    let mut out = format_row(&header);
    out.push('\n');
    for row in &rows {
        out.push_str(&format_row(row));
        out.push('\n');
    }
    out
}

/// "Planet  Eater " -> "Planet Eater"
fn collapse_spaces(cell: &str) -> String {
    cell.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Two decimals, never "-0.00"
pub fn format_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    if formatted == "-0.00" {
        "0.00".to_string()
    } else {
        formatted
    }
}

fn format_fiat(value: f64) -> String {
    let amount = format_amount(value);
    match amount.strip_prefix('-') {
        Some(abs) => format!("-${}", abs),
        None => format!("${}", amount),
    }
}

fn format_roi(roi: Option<i64>) -> String {
    roi.map(|r| format!("{}%", r)).unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::bases::BaseNames;
    use crate::profit::calculate;
    use crate::rates::RentalRateTable;
    use crate::records::ScanRecord;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    fn record(hours_ago: i64, fleet: &str, count: u64, location: Option<&str>) -> ScanRecord {
        ScanRecord {
            timestamp: now() - Duration::hours(hours_ago),
            fleet_name: fleet.to_string(),
            sdu_count: count,
            location: location.map(str::to_string),
        }
    }

    fn report_from(records: Vec<ScanRecord>, bases: Option<&BaseNames>) -> ProfitReport {
        let stats = aggregate(records.into_iter().map(Ok), 12, now(), bases).unwrap();
        let rates = RentalRateTable::from_pairs("RENT_", &[], [("RENT_ALPHA", "10"), ("RENT_GAMMA", "4")]);
        calculate(&stats, 0.02, &rates, 12, 0.5)
    }

    fn sample_report() -> ProfitReport {
        report_from(
            vec![
                record(1, "Alpha", 50, None),
                record(20, "Alpha", 70, None),
                record(2, "Beta Long Fleet Name", 3, None),
                record(5, "Gamma", 0, None),
            ],
            None,
        )
    }

    /// Split a rendered table line on the column gap
    fn cells(line: &str) -> Vec<String> {
        line.split(COLUMN_GAP)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1.0), "1.00");
        assert_eq!(format_amount(-4.0), "-4.00");
        assert_eq!(format_amount(-0.0001), "0.00");
        assert_eq!(format_amount(2.456), "2.46");
        assert_eq!(format_fiat(-1.5), "-$1.50");
        assert_eq!(format_fiat(0.25), "$0.25");
        assert_eq!(format_roi(Some(24)), "24%");
        assert_eq!(format_roi(None), "N/A");
    }

    #[test]
    fn test_format_table_aligns_columns() {
        let header = vec!["A".to_string(), "Bee".to_string(), "C".to_string()];
        let rows = vec![
            vec!["long cell".to_string(), "x".to_string(), "1".to_string()],
            vec!["s".to_string(), "yy".to_string(), "22".to_string()],
        ];
        let table = format_table(&header, &rows);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "A          Bee  C");
        assert_eq!(lines[1], "long cell  x    1");
        assert_eq!(lines[2], "s          yy   22");
    }

    #[test]
    fn test_wide_table_round_trip() {
        let report = sample_report();
        let rendered = render_wide(&report, &RenderOptions::default());

        for fleet in &report.fleets {
            let line = rendered
                .lines()
                .find(|l| l.starts_with(&fleet.fleet_name))
                .expect("fleet row");
            let row = cells(line);
            assert_eq!(row.len(), 9, "{line}");
            assert_eq!(row[0], fleet.fleet_name);
            assert_eq!(row[1].parse::<u64>().unwrap(), fleet.window_count);
            assert_eq!(row[2].parse::<u64>().unwrap(), fleet.last_24h_count);

            let close = |cell: &str, value: f64| (cell.parse::<f64>().unwrap() - value).abs() <= 0.005 + 1e-9;
            assert!(close(&row[3], fleet.value_window));
            assert!(close(&row[4], fleet.value_24h));
            match fleet.rent_24h {
                Some(rent) => assert!(close(&row[5], rent)),
                None => assert_eq!(row[5], "N/A"),
            }
            assert!(close(&row[6], fleet.net_24h()));
            assert!(close(&row[7], fleet.net_window()));
        }
    }

    #[test]
    fn test_wide_row_with_repeated_spaces_in_names() {
        let bases = BaseNames::parse("1:1 Mining   Outpost");
        let report = report_from(vec![record(1, "Planet  Eater", 50, Some("1:1"))], Some(&bases));
        let rendered = render_wide(&report, &RenderOptions::default());

        let row = cells(rendered.lines().find(|l| l.starts_with("Planet")).unwrap());
        assert_eq!(row.len(), 10, "{row:?}");
        assert_eq!(row[0], "Planet Eater");
        assert_eq!(row[1], "Mining Outpost");
        assert_eq!(row[2], "50");
        assert_eq!(row[3], "50");
        assert_eq!(row[4], "1.00");
        assert_eq!(row[9], "N/A");
    }

    #[test]
    fn test_format_table_collapses_inner_whitespace() {
        let header = vec!["Name".to_string(), "N".to_string()];
        let rows = vec![vec!["a  b\tc".to_string(), "1".to_string()]];
        let table = format_table(&header, &rows);
        assert_eq!(table, "Name   N\na b c  1\n");
    }

    #[test]
    fn test_wide_table_rows_share_column_starts() {
        let rendered = render_wide(&sample_report(), &RenderOptions::default());
        let lines: Vec<&str> = rendered.lines().collect();
        let header = lines.iter().position(|l| l.starts_with("Fleet")).unwrap();

        let start_of = |line: &str, col: usize| -> usize {
            // Column start = position right after the col-th gap run
            let mut idx = 0;
            let mut seen = 0;
            let bytes = line.as_bytes();
            while seen < col {
                while bytes[idx] != b' ' || bytes[idx + 1] != b' ' {
                    idx += 1;
                }
                while bytes[idx] == b' ' {
                    idx += 1;
                }
                seen += 1;
            }
            idx
        };

        for offset in 1..=3 {
            assert_eq!(start_of(lines[header], 1), start_of(lines[header + offset], 1));
            assert_eq!(start_of(lines[header], 4), start_of(lines[header + offset], 4));
        }
    }

    #[test]
    fn test_wide_scenario_values() {
        let rendered = render_wide(&sample_report(), &RenderOptions::default());
        let alpha = cells(rendered.lines().find(|l| l.starts_with("Alpha")).unwrap());
        assert_eq!(alpha, vec!["Alpha", "50", "120", "1.00", "2.40", "10.00", "-7.60", "-4.00", "24%"]);

        let beta = cells(rendered.lines().find(|l| l.starts_with("Beta")).unwrap());
        assert_eq!(beta[5], "N/A");
        assert_eq!(beta[8], "N/A");

        let rented = cells(rendered.lines().find(|l| l.starts_with("Rented")).unwrap());
        assert_eq!(rented[1], "-11.60");
        let owned = cells(rendered.lines().find(|l| l.starts_with("Owned")).unwrap());
        assert_eq!(owned[3], "N/A");
        assert!(rendered.trim_end().ends_with("Current SDU price: 0.0200 ATLAS (ATLAS/USD = $0.500000)"));
    }

    #[test]
    fn test_empty_report_shows_notice() {
        let report = report_from(vec![record(40, "Alpha", 9, None)], None);
        let wide = render_wide(&report, &RenderOptions::default());
        let condensed = render_condensed(&report, &RenderOptions::default());

        assert!(wide.contains("No data for the last 12 hours."));
        assert!(!wide.contains("Fleet"));
        assert!(condensed.contains("No data for the last 12 hours."));
        assert!(wide.contains("Current SDU price"));
        assert!(condensed.contains("Current SDU price"));
    }

    #[test]
    fn test_notice_when_only_older_scans_in_24h() {
        let report = report_from(vec![record(13, "Alpha", 9, None), record(20, "Beta", 4, None)], None);
        assert_eq!(report.fleets.len(), 2);

        let wide = render_wide(&report, &RenderOptions::default());
        assert!(wide.contains("No data for the last 12 hours."));
        assert!(!wide.contains("Fleet"));
        let condensed = render_condensed(&report, &RenderOptions::default());
        assert!(condensed.contains("No data for the last 12 hours."));
        assert!(!condensed.contains("• Alpha"));
    }

    #[test]
    fn test_zero_count_scan_in_window_renders_table() {
        let report = report_from(vec![record(2, "Alpha", 0, None)], None);
        let wide = render_wide(&report, &RenderOptions::default());
        assert!(!wide.contains("No data"));
        assert!(wide.lines().any(|l| l.starts_with("Alpha")));
    }

    #[test]
    fn test_wide_sorts_by_base_when_locations_present() {
        let bases = BaseNames::parse("1:1 Zulu\n2:2 Alpha Base");
        let report = report_from(
            vec![
                record(1, "First", 1, Some("1:1")),
                record(1, "Second", 1, None),
                record(1, "Third", 1, Some("2:2")),
            ],
            Some(&bases),
        );

        let rendered = render_wide(&report, &RenderOptions::default());
        let order: Vec<String> = rendered
            .lines()
            .skip_while(|l| !l.starts_with("Fleet"))
            .skip(1)
            .take(3)
            .map(|l| cells(l)[0].clone())
            .collect();
        assert_eq!(order, vec!["Third", "First", "Second"]);
        let second = cells(rendered.lines().find(|l| l.starts_with("Second")).unwrap());
        assert_eq!(second[1], "Unknown");

        let unsorted = render_wide(
            &report,
            &RenderOptions {
                show_locations: true,
                sort_by_base: false,
            },
        );
        let first_row = unsorted.lines().skip_while(|l| !l.starts_with("Fleet")).nth(1).unwrap();
        assert!(first_row.starts_with("First"));

        let hidden = render_wide(
            &report,
            &RenderOptions {
                show_locations: false,
                sort_by_base: true,
            },
        );
        assert!(!hidden.contains("Base"));
    }

    #[test]
    fn test_condensed_lists_only_rented_fleets() {
        let rendered = render_condensed(&sample_report(), &RenderOptions::default());

        assert!(rendered.contains("• Alpha\n"));
        assert!(rendered.contains("• Gamma\n"));
        assert!(!rendered.contains("Beta"));
        assert!(rendered.contains("  ROI: 24%\n"));
        assert!(rendered.contains("  24h: 2.40 ATLAS ($1.20)\n"));
        assert!(rendered.contains("  12h: 1.00 ATLAS ($0.50)\n"));
        assert!(rendered.contains("  ROI: 0%\n"));
        assert!(rendered.contains("Rented 24h: -11.60 ATLAS (-$5.80), ROI 17%\n"));
        assert!(rendered.contains("Owned 24h: 0.06 ATLAS ($0.03)\n"));
        assert!(rendered.trim_end().lines().last().unwrap().starts_with("Current SDU price"));
    }

    #[test]
    fn test_condensed_without_rented_fleets() {
        let report = report_from(vec![record(1, "Beta", 5, None)], None);
        let rendered = render(&report, RenderTarget::Condensed, &RenderOptions::default());
        assert!(rendered.contains("No rented fleets active"));
        assert!(rendered.contains("Owned 24h: 0.10 ATLAS ($0.05)"));
    }
}
