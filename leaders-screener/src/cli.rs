//! Command-line interface for the `leaders` binary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use leaders_common::{Config, Validate};
use leaders_screener::export::write_artifact;
use leaders_screener::screener::{
    ScreenerConfig, ScreenerEngine, ScreenerReport, ScreeningPolicy,
};
use leaders_screener::watchlist::{
    read_csv_file, EntryFields, WatchlistEntry, WatchlistStore, DEFAULT_ALLOCATION,
    DEFAULT_INVESTMENT_AMOUNT, DEFAULT_SHARES,
};
use leaders_screener::{FmpClient, Warning};

/// Default file name for the watch-list export.
const EXPORT_FILE_NAME: &str = "industry_leaders.csv";

/// `leaders` - ROE screener and Industry Leaders watch-list.
#[derive(Parser, Debug)]
#[command(name = "leaders")]
#[command(version)]
#[command(about = "Screen stocks by return on equity and manage an Industry Leaders watch-list", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.leaders/config.json)
    #[arg(long, global = true, env = "LEADERS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Screen an index (or explicit symbols) by ROE and write the result as CSV
    Screen {
        /// ROE threshold in percent
        #[arg(long)]
        threshold: Option<f64>,

        /// "all" or the minimum number of periods above the threshold
        #[arg(long)]
        policy: Option<ScreeningPolicy>,

        /// Index to screen (sp500, nasdaq, dowjones)
        #[arg(long)]
        index: Option<String>,

        /// Screen only the first N constituents
        #[arg(long)]
        limit: Option<usize>,

        /// Screen these symbols instead of an index
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Write the CSV to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage the Industry Leaders watch-list
    Watchlist {
        #[command(subcommand)]
        watchlist_command: WatchlistCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum WatchlistCommands {
    /// Add a symbol, or update it if already listed
    Add {
        symbol: String,

        /// Company name (default: from the profile lookup)
        #[arg(long)]
        name: Option<String>,

        /// Sector (default: from the profile lookup)
        #[arg(long)]
        sector: Option<String>,

        /// Allocation percentage (1-100)
        #[arg(long, default_value_t = DEFAULT_ALLOCATION)]
        allocation: f64,

        /// Investment amount (at least 1000)
        #[arg(long, default_value_t = DEFAULT_INVESTMENT_AMOUNT)]
        amount: f64,

        /// Number of shares
        #[arg(long, default_value_t = DEFAULT_SHARES)]
        shares: u32,
    },

    /// Remove a symbol
    Remove { symbol: String },

    /// Print the watch-list
    List,

    /// Refresh market data for a listed symbol
    Enrich { symbol: String },

    /// Import a CSV table, looking up every row
    Import { file: PathBuf },

    /// Export the watch-list as CSV
    Export {
        /// Output file
        #[arg(short, long, default_value = EXPORT_FILE_NAME)]
        output: PathBuf,
    },
}

/// Apply command-line overrides, validate, and run the command.
pub async fn run(cli: Cli, mut config: Config) -> Result<()> {
    if let Commands::Screen {
        threshold,
        index,
        limit,
        ..
    } = &cli.command
    {
        if let Some(threshold) = threshold {
            config.screener.threshold = *threshold;
        }
        if let Some(index) = index {
            config.fmp.index = index.to_lowercase();
        }
        if limit.is_some() {
            config.screener.limit = *limit;
        }
    }

    config.validate().context("Invalid configuration")?;
    let client = FmpClient::from_config(&config).context("FMP API key not configured")?;

    match cli.command {
        Commands::Screen {
            policy,
            symbols,
            output,
            ..
        } => handle_screen(&config, client, policy, symbols, output.as_deref()).await,
        Commands::Watchlist { watchlist_command } => {
            handle_watchlist(watchlist_command, &config, &client).await
        }
    }
}

// ============================================================================
// Screen
// ============================================================================

async fn handle_screen(
    config: &Config,
    client: FmpClient,
    policy: Option<ScreeningPolicy>,
    symbols: Vec<String>,
    output: Option<&Path>,
) -> Result<()> {
    let mut screener_config = ScreenerConfig::from_config(config)?;
    if let Some(policy) = policy {
        screener_config.policy = policy;
    }

    let engine = ScreenerEngine::new(screener_config, Arc::new(client));
    let run = if symbols.is_empty() {
        engine
            .run_index_scan()
            .await
            .with_context(|| format!("Failed to list {} constituents", config.fmp.index))?
    } else {
        let symbols: Vec<String> = symbols
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        engine.run_for_symbols(&symbols).await
    };

    let report = ScreenerReport::new(&run);
    eprintln!("{}", report.to_summary());

    match output {
        Some(path) => {
            let written = report.save_to_file(path)?;
            eprintln!("Wrote {}", written.display());
        }
        None => {
            let csv = report.to_csv()?;
            std::io::stdout()
                .write_all(&csv)
                .context("Failed to write CSV to stdout")?;
        }
    }

    print_warnings(&run.warnings);
    Ok(())
}

// ============================================================================
// Watchlist
// ============================================================================

async fn handle_watchlist(
    command: WatchlistCommands,
    config: &Config,
    client: &FmpClient,
) -> Result<()> {
    let mut store = WatchlistStore::open(&config.watchlist.path)?
        .with_lookup_timeout(config.fmp.timeout())
        .with_concurrency(config.fmp.concurrency);

    match command {
        WatchlistCommands::Add {
            symbol,
            name,
            sector,
            allocation,
            amount,
            shares,
        } => {
            let fields = EntryFields {
                company_name: name.unwrap_or_default(),
                sector: sector.unwrap_or_default(),
                allocation,
                investment_amount: amount,
                shares,
            };
            let entry = store.submit(&symbol, fields, client).await?;
            store.save()?;
            println!("Saved {} ({})", entry.symbol, entry.fields.company_name);
        }

        WatchlistCommands::Remove { symbol } => {
            if store.remove(&symbol) {
                store.save()?;
                println!("Removed {}", symbol.trim().to_uppercase());
            } else {
                println!("{} is not on the watch-list", symbol.trim().to_uppercase());
            }
        }

        WatchlistCommands::List => print_table(&store.export_rows()),

        WatchlistCommands::Enrich { symbol } => {
            let entry = store.enrich(&symbol, client).await?;
            store.save()?;
            print_table(std::slice::from_ref(&entry));
        }

        WatchlistCommands::Import { file } => {
            let rows = read_csv_file(&file)
                .with_context(|| format!("Failed to import {}", file.display()))?;
            let report = store.bulk_enrich_from_table(rows, client).await;
            store.save()?;

            println!("{}", report.summary());
            for (symbol, reason) in &report.rejected {
                println!("  rejected {}: {}", symbol, reason);
            }
        }

        WatchlistCommands::Export { output } => {
            let csv = store.export_csv()?;
            let written = write_artifact(&output, &csv)?;
            println!("Exported {} rows to {}", store.len(), written.display());
        }
    }

    print_warnings(&store.take_warnings());
    Ok(())
}

fn print_table(entries: &[WatchlistEntry]) {
    if entries.is_empty() {
        println!("Watch-list is empty");
        return;
    }

    println!(
        "{:<8} {:<28} {:<22} {:>6} {:>12} {:>7} {:>10} {:>8} {:>7}",
        "Symbol", "Company Name", "Sector", "Alloc", "Amount", "Shares", "Price", "PE", "Yield"
    );
    for entry in entries {
        let e = &entry.enrichment;
        println!(
            "{:<8} {:<28} {:<22} {:>5}% {:>12} {:>7} {:>10} {:>8} {:>7}",
            entry.symbol,
            truncate(&entry.fields.company_name, 28),
            truncate(&entry.fields.sector, 22),
            entry.fields.allocation,
            format!("${:.2}", entry.fields.investment_amount),
            entry.fields.shares,
            or_na(e.price, |v| format!("{:.2}", v)),
            or_na(e.pe, |v| format!("{:.2}", v)),
            or_na(e.dividend_yield, |v| format!("{:.2}%", v)),
        );
    }
}

fn or_na(value: Option<f64>, fmt: impl Fn(f64) -> String) -> String {
    value.map(fmt).unwrap_or_else(|| "N/A".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn print_warnings(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }
    eprintln!("{} warning(s):", warnings.len());
    for warning in warnings {
        eprintln!("  {}", warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_screen() {
        let cli = Cli::parse_from([
            "leaders", "screen", "--threshold", "20", "--policy", "7", "--symbols", "aapl,msft",
        ]);
        match cli.command {
            Commands::Screen {
                threshold,
                policy,
                symbols,
                output,
                ..
            } => {
                assert_eq!(threshold, Some(20.0));
                assert_eq!(policy, Some(ScreeningPolicy::AtLeast(7)));
                assert_eq!(symbols, vec!["aapl", "msft"]);
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_add_defaults() {
        let cli = Cli::parse_from(["leaders", "watchlist", "add", "AAPL"]);
        match cli.command {
            Commands::Watchlist {
                watchlist_command:
                    WatchlistCommands::Add {
                        allocation,
                        amount,
                        shares,
                        ..
                    },
            } => {
                assert_eq!(allocation, 8.0);
                assert_eq!(amount, 6400.0);
                assert_eq!(shares, 10);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_export_default_file() {
        let cli = Cli::parse_from(["leaders", "watchlist", "export"]);
        match cli.command {
            Commands::Watchlist {
                watchlist_command: WatchlistCommands::Export { output },
            } => assert_eq!(output, PathBuf::from("industry_leaders.csv")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_bad_policy_rejected() {
        assert!(Cli::try_parse_from(["leaders", "screen", "--policy", "0"]).is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Apple", 28), "Apple");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}
