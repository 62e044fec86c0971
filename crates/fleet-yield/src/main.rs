//! Fleet SDU yield reporter
//!
//! Reads the fleet scan log, prices the harvested SDU at the lowest marketplace
//! ask and reports value, rent and ROI per fleet for the last 24 hours and a
//! shorter dynamic window.

mod aggregate;
mod bases;
mod config;
mod constants;
mod delivery;
mod error;
mod logging;
mod pipeline;
mod prices;
mod profit;
mod rates;
mod records;
mod reports;
mod scheduler;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, FileConfig, Overrides};
use delivery::{Channel, PushChannel};
use pipeline::ReportRequest;
use prices::{HttpPriceSource, PriceSource};
use reports::RenderTarget;

/// Load config file or exit with helpful message
fn load_config_file(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        anyhow::bail!(
            "Config file '{}' not found.\n\n\
            To get started:\n\
            1. Copy config.toml.example to config.toml\n\
            2. Set market.orders_url and report.records_path\n\
            3. Add your rental rates under [rental.rates]\n\n\
            See config.toml.example for the required format.",
            path.display()
        );
    }

    FileConfig::load(path)
}

#[derive(Parser, Debug)]
#[command(name = "fleet-yield")]
#[command(about = "SDU yield and rental ROI reports for harvesting fleets")]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = constants::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one report (default)
    Report(ReportArgs),

    /// Publish a report periodically until interrupted
    Watch {
        #[command(flatten)]
        report: ReportArgs,

        /// Minutes between reports
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
        interval_minutes: u64,
    },

    /// Show the current lowest SDU ask and ATLAS/USD rate
    Price,

    /// List the configured rental rates
    Rates,
}

#[derive(clap::Args, Debug, Default)]
struct ReportArgs {
    /// Dynamic window in hours (default: report.window_hours or 12)
    #[arg(short, long)]
    window: Option<u32>,

    /// Scan log CSV (overrides report.records_path)
    #[arg(long)]
    records: Option<PathBuf>,

    /// Coordinate to base name file (overrides report.bases_path)
    #[arg(long)]
    bases: Option<PathBuf>,

    /// Layout (default: condensed for push, wide otherwise)
    #[arg(short, long, value_enum)]
    format: Option<RenderTarget>,

    /// Where to send the report
    #[arg(long, value_enum)]
    channel: Option<ChannelKind>,

    /// Output file for the file channel
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Leave out base names even when a bases file is configured
    #[arg(long)]
    no_locations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ChannelKind {
    Console,
    File,
    Push,
}

impl ReportArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            window_hours: self.window,
            records_path: self.records.clone(),
            bases_path: self.bases.clone(),
        }
    }

    /// `--out` alone implies the file channel
    fn channel(&self, config: &Config) -> Result<Channel> {
        let kind = match (self.channel, &self.out) {
            (Some(kind), _) => kind,
            (None, Some(_)) => ChannelKind::File,
            (None, None) => ChannelKind::Console,
        };

        match kind {
            ChannelKind::Console => Ok(Channel::Console),
            ChannelKind::File => match &self.out {
                Some(path) => Ok(Channel::File(path.clone())),
                None => anyhow::bail!("The file channel needs --out <PATH>"),
            },
            ChannelKind::Push => match &config.push {
                Some(push) => Ok(Channel::Push(PushChannel::new(push.clone()))),
                None => anyhow::bail!("The push channel needs delivery.push_url in the config file"),
            },
        }
    }

    fn request(&self, channel: &Channel) -> ReportRequest {
        ReportRequest {
            target: self.format.unwrap_or_else(|| channel.default_target()),
            show_locations: !self.no_locations,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    let file_config = load_config_file(&args.config)?;

    match args.command {
        None => run_report(&file_config, &ReportArgs::default()).await,
        Some(Command::Report(report)) => run_report(&file_config, &report).await,
        Some(Command::Watch {
            report,
            interval_minutes,
        }) => run_watch(&file_config, &report, interval_minutes).await,
        Some(Command::Price) => show_price(&file_config).await,
        Some(Command::Rates) => show_rates(&file_config),
    }
}

async fn run_report(file_config: &FileConfig, args: &ReportArgs) -> Result<()> {
    let config = Config::from_file(file_config, args.overrides(), std::env::vars())?;
    let channel = args.channel(&config)?;
    let prices = HttpPriceSource::new(config.market.clone());

    pipeline::publish(&config, &args.request(&channel), &prices, &channel, Utc::now()).await?;
    Ok(())
}

async fn run_watch(file_config: &FileConfig, args: &ReportArgs, interval_minutes: u64) -> Result<()> {
    let config = Config::from_file(file_config, args.overrides(), std::env::vars())?;
    let channel = args.channel(&config)?;
    let prices = HttpPriceSource::new(config.market.clone());

    scheduler::run_watch(
        &config,
        &args.request(&channel),
        &prices,
        &channel,
        Duration::from_secs(interval_minutes * 60),
    )
    .await;
    Ok(())
}

async fn show_price(file_config: &FileConfig) -> Result<()> {
    let config = Config::from_file(file_config, Overrides::default(), std::env::vars())?;
    let prices = HttpPriceSource::new(config.market.clone());

    let quote = prices.lowest_ask().await.ok_or(error::ReportError::NoValidPrice)?;
    let fiat_rate = prices.fiat_rate().await;

    println!("Lowest {} ask: {:.6} {}", constants::RESOURCE_UNIT, quote.price, constants::NATIVE_UNIT);
    if let Some(quantity) = quote.quantity {
        println!("  Quantity: {}", quantity);
    }
    if let Some(seller) = &quote.seller {
        println!("  Seller:   {}", seller);
    }
    println!(
        "{}/{}: ${:.6}",
        constants::NATIVE_UNIT,
        constants::FIAT_UNIT,
        fiat_rate
    );
    Ok(())
}

fn show_rates(file_config: &FileConfig) -> Result<()> {
    let config = Config::from_file(file_config, Overrides::default(), std::env::vars())?;

    if config.rental_rates.is_empty() {
        println!("No rental rates configured. All fleets are reported as owned.");
        return Ok(());
    }

    let header = vec![
        "Fleet".to_string(),
        format!("Rent 24h ({})", constants::NATIVE_UNIT),
        format!("Rent {}h ({})", config.window_hours, constants::NATIVE_UNIT),
    ];
    let rows: Vec<Vec<String>> = config
        .rental_rates
        .entries()
        .into_iter()
        .map(|(fleet, rate)| {
            vec![
                fleet.to_string(),
                reports::format_amount(rate),
                reports::format_amount(profit::prorate(rate, config.window_hours)),
            ]
        })
        .collect();

    print!("{}", reports::format_table(&header, &rows));
    println!("\n{} rented fleets", config.rental_rates.len());
    Ok(())
}
