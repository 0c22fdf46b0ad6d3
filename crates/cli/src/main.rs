mod config;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use portfolio_history_core::PortfolioHistory;

use crate::config::load_settings;

#[derive(Parser)]
#[command(
    name = "portfolio-history",
    about = "Daily portfolio value from broker exports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Build the deposit/withdrawal summary and daily value series as JSON
    Report {
        /// CSV export of the cash operation history sheet
        #[arg(long)]
        cash: PathBuf,

        /// CSV export of the open position sheet
        #[arg(long)]
        open: Option<PathBuf>,

        /// CSV export of the closed position history sheet
        #[arg(long)]
        closed: Option<PathBuf>,

        /// Valuation date (YYYY-MM-DD), defaults to the local date
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Show price cache statistics
    CacheStats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "portfolio_history_core=info,portfolio_history_cli=info,warn",
        1 => "portfolio_history_core=debug,portfolio_history_cli=debug,info",
        _ => "trace",
    };

    // stdout carries the JSON report; logs go to stderr
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let settings = load_settings()?;
    let app = PortfolioHistory::from_settings(settings).context("building pipeline")?;

    match cli.command {
        Command::Report {
            cash,
            open,
            closed,
            today,
            pretty,
        } => {
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            info!("Building report for {:?} as of {}", cash, today);

            let result = match PortfolioHistory::load_workbook(&cash, open.as_deref(), closed.as_deref()) {
                Ok(workbook) => app.build_report(&workbook, today).await,
                Err(e) => Err(e),
            };

            let body = match result {
                Ok(report) => {
                    let mut body = serde_json::to_value(&report)?;
                    if let Some(obj) = body.as_object_mut() {
                        obj.insert("success".into(), json!(true));
                    }
                    body
                }
                Err(e) => {
                    error!("Report failed ({}): {}", e.status_code(), e);
                    json!({ "success": false, "message": e.to_string() })
                }
            };

            let out = if pretty {
                serde_json::to_string_pretty(&body)?
            } else {
                serde_json::to_string(&body)?
            };
            println!("{out}");
        }

        Command::CacheStats => {
            let count = app.cached_price_count().await?;
            println!("─────────────────────────────────");
            println!("  Portfolio History, Price Cache");
            println!("─────────────────────────────────");
            println!("  File      : {}", app.settings().cache_path.display());
            println!("  Providers : {}", app.settings().providers.join(", "));
            println!("  Prices    : {}", count);
            println!("─────────────────────────────────");
        }
    }

    Ok(())
}
