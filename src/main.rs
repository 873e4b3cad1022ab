use analytics::{Quadrant, RrgResult};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::Config;
use core_types::{DataSource, RrgRequest, Study, TailInterval, MAX_SYMBOLS};
use engine::RotationEngine;
use tracing_subscriber::EnvFilter;

mod universe;

/// The main entry point for the relative-rotation CLI.
#[tokio::main]
async fn main() {
    // Load RUST_LOG and overrides from a .env file, if present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Compute(args) => handle_compute(args).await,
        Commands::Sectors => {
            handle_sectors();
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Relative Rotation Graphs from the terminal: normalized relative strength
/// and momentum for a basket of instruments against a benchmark.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a rotation graph for a basket of symbols.
    Compute(ComputeArgs),
    /// List the built-in sector-ETF baskets.
    Sectors,
}

#[derive(Parser)]
struct ComputeArgs {
    /// Comma-separated tickers (up to 20), e.g. "XOM,CVX,COP".
    #[arg(long, conflicts_with = "sector")]
    symbols: Option<String>,

    /// Use a built-in sector-ETF basket (e.g. "XLE") instead of --symbols.
    /// Unless overridden, the sector ETF also becomes the benchmark.
    #[arg(long)]
    sector: Option<String>,

    /// The benchmark ticker every ratio is measured against.
    #[arg(long)]
    benchmark: Option<String>,

    /// The study to rotate on: price, volume or volatility.
    #[arg(long)]
    study: Option<Study>,

    /// The last trading date included (format: YYYY-MM-DD; default today).
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Long lookback in trading days.
    #[arg(long)]
    long_period: Option<usize>,

    /// Short lookback in trading days.
    #[arg(long)]
    short_period: Option<usize>,

    /// Rolling window for the volatility study.
    #[arg(long)]
    window: Option<usize>,

    /// Trading periods per year for volatility annualization.
    #[arg(long)]
    trading_periods: Option<usize>,

    /// Include rotation tails in the output.
    #[arg(long)]
    tails: bool,

    /// Number of tail points per symbol.
    #[arg(long)]
    tail_periods: Option<usize>,

    /// Tail sampling interval: week or month.
    #[arg(long)]
    tail_interval: Option<TailInterval>,

    /// Data source: yahoo or cboe.
    #[arg(long)]
    source: Option<DataSource>,

    /// Emit the renderer-agnostic chart description as JSON.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Handles the orchestration of one compute request.
async fn handle_compute(args: ComputeArgs) -> anyhow::Result<()> {
    let config = configuration::load_config()?;
    let request = build_request(&args, &config)?;

    let provider = provider::provider_for(request.source, &config.provider)?;
    let engine = RotationEngine::new(provider, config.provider.warmup_margin_days);

    let result = engine.compute(request).await?;

    for note in result.dropped_symbols() {
        eprintln!("warning: dropped {}: {}", note.symbol, note.reason);
    }

    if args.json {
        let chart = result.chart(
            args.tails,
            result.request().tail_periods,
            result.request().tail_interval,
        );
        println!("{}", serde_json::to_string_pretty(&chart)?);
    } else {
        print_summary(&result);
        if args.tails {
            print_tails(&result);
        }
    }

    Ok(())
}

fn handle_sectors() {
    let mut table = Table::new();
    table.set_header(vec!["Sector ETF", "Constituents"]);
    for (etf, members) in universe::SECTORS {
        table.add_row(vec![etf.to_string(), members.join(", ")]);
    }
    println!("{table}");
}

/// Merges CLI arguments over the configured defaults into a validated
/// request. Validation itself happens inside the engine.
fn build_request(args: &ComputeArgs, config: &Config) -> anyhow::Result<RrgRequest> {
    let defaults = &config.defaults;

    let (symbols, benchmark) = match (&args.symbols, &args.sector) {
        (Some(list), None) => {
            // No truncation here: an oversized list must fail validation, not
            // silently lose its tail.
            let symbols: Vec<String> = list
                .split(',')
                .map(|s| s.trim().to_ascii_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            let benchmark = args
                .benchmark
                .clone()
                .unwrap_or_else(|| defaults.benchmark.clone());
            (symbols, benchmark)
        }
        (None, Some(sector)) => {
            let mut symbols = universe::sector_symbols(sector).ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown sector '{}'; run `rrg sectors` for the available baskets",
                    sector
                )
            })?;
            if symbols.len() > MAX_SYMBOLS {
                eprintln!(
                    "warning: the {} basket has {} members; using the first {}",
                    sector.to_ascii_uppercase(),
                    symbols.len(),
                    MAX_SYMBOLS
                );
                symbols.truncate(MAX_SYMBOLS);
            }
            // The sector ETF itself is the natural benchmark for its members.
            let benchmark = args
                .benchmark
                .clone()
                .unwrap_or_else(|| sector.to_ascii_uppercase());
            (symbols, benchmark)
        }
        _ => anyhow::bail!("exactly one of --symbols or --sector is required"),
    };

    let mut request = RrgRequest::new(symbols, benchmark);
    request.study = args.study.unwrap_or(Study::Price);
    if let Some(date) = args.date {
        request.end_date = date;
    }
    request.long_period = args.long_period.unwrap_or(defaults.long_period);
    request.short_period = args.short_period.unwrap_or(defaults.short_period);
    request.window = args.window.unwrap_or(defaults.window);
    request.trading_periods = args.trading_periods.unwrap_or(defaults.trading_periods);
    request.tail_periods = args.tail_periods.unwrap_or(defaults.tail_periods);
    request.tail_interval = args.tail_interval.unwrap_or(defaults.tail_interval);
    request.source = args.source.unwrap_or(defaults.source);

    Ok(request)
}

// ==============================================================================
// Output Rendering
// ==============================================================================

/// The latest reading per symbol, with its quadrant.
fn print_summary(result: &RrgResult) {
    let request = result.request();
    println!(
        "Relative rotation vs {} ({} study), as of {}",
        request.benchmark,
        request.study,
        result
            .ratio_table()
            .dates()
            .last()
            .map(|d| d.to_string())
            .unwrap_or_default()
    );

    let mut table = Table::new();
    table.set_header(vec!["Symbol", "RS-Ratio", "RS-Momentum", "Quadrant"]);

    let ratio_row = result.ratio_table().last_row().unwrap_or_default();
    for (symbol, ratio) in ratio_row {
        let momentum = result
            .momentum_table()
            .column(symbol)
            .and_then(|c| c.last().copied())
            .unwrap_or(f64::NAN);
        table.add_row(vec![
            symbol.to_string(),
            format!("{ratio:.2}"),
            format!("{momentum:.2}"),
            Quadrant::of(ratio, momentum).to_string(),
        ]);
    }

    println!("{table}");
}

/// The resampled rotation trail per symbol.
fn print_tails(result: &RrgResult) {
    let request = result.request();
    let tails = analytics::build_tails(
        result.ratio_table(),
        result.momentum_table(),
        request.tail_periods,
        request.tail_interval,
    );

    for (symbol, points) in tails {
        println!(
            "\n{} tail ({} points, per {}):",
            symbol,
            points.len(),
            request.tail_interval
        );
        let mut table = Table::new();
        table.set_header(vec!["Date", "RS-Ratio", "RS-Momentum"]);
        for point in points {
            table.add_row(vec![
                point.date.to_string(),
                format!("{:.2}", point.ratio),
                format!("{:.2}", point.momentum),
            ]);
        }
        println!("{table}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(symbols: Option<&str>, sector: Option<&str>) -> ComputeArgs {
        ComputeArgs {
            symbols: symbols.map(str::to_string),
            sector: sector.map(str::to_string),
            benchmark: None,
            study: None,
            date: None,
            long_period: None,
            short_period: None,
            window: None,
            trading_periods: None,
            tails: false,
            tail_periods: None,
            tail_interval: None,
            source: None,
            json: false,
        }
    }

    #[test]
    fn oversized_symbol_list_is_not_silently_truncated() {
        let list = (0..25)
            .map(|i| format!("SYM{i}"))
            .collect::<Vec<_>>()
            .join(",");
        let request = build_request(&args(Some(&list), None), &Config::default()).unwrap();

        // The full list survives so validation can reject it loudly.
        assert_eq!(request.symbols.len(), 25);
        assert!(request.validate().is_err());
    }

    #[test]
    fn sector_shorthand_fills_symbols_and_benchmark() {
        let request = build_request(&args(None, Some("xle")), &Config::default()).unwrap();

        assert_eq!(request.benchmark, "XLE");
        assert!(!request.symbols.is_empty());
        assert!(request.symbols.len() <= MAX_SYMBOLS);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn symbols_and_sector_are_mutually_required() {
        assert!(build_request(&args(None, None), &Config::default()).is_err());
    }
}
