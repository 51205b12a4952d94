//! Frontier CLI binary.
//!
//! Provides the batch optimizer, one-off optimization runs and the web
//! dashboard.

mod dashboard;

use clap::{Parser, Subcommand, ValueEnum};
use dashboard::DashboardConfig;
use frontier::data::YahooQuoteProvider;
use frontier::optim::OptimizerConfig;
use frontier::output::{ExportFormat, Exporter, format_batch_weights};
use frontier::{OptimizationRequest, OptimizationResult, batch_request};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "frontier")]
#[command(about = "Frontier: mean-variance portfolio optimizer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Minimum-volatility weights for AAPL, MSFT, GOOGL and AMZN over 2022
    Batch,

    /// Optimize a portfolio and print a full report
    Optimize {
        /// Comma-separated tickers (e.g. AAPL,MSFT or RELIANCE.NS,TCS.NS)
        #[arg(long)]
        tickers: String,

        /// First date of price history (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End of price history, exclusive (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Objective to optimize (min-volatility or max-sharpe)
        #[arg(long, default_value = "max-sharpe")]
        objective: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also write the allocation to a .csv or .json file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Export format (csv, json or pretty-json; default: from the
        /// --export extension)
        #[arg(long, requires = "export")]
        export_format: Option<ExportFormat>,
    },

    /// Run the web dashboard
    Serve {
        /// Address to bind (default: FRONTIER_BIND or 127.0.0.1)
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on (default: FRONTIER_PORT or 8501)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Batch => {
            init_tracing("warn");
            run_batch().await?;
        }
        Commands::Optimize {
            tickers,
            start,
            end,
            objective,
            format,
            export,
            export_format,
        } => {
            init_tracing("warn");
            let request = OptimizationRequest::parse(&tickers, &start, &end, &objective)?;
            run_optimize(&request, format, export, export_format).await?;
        }
        Commands::Serve { bind, port } => {
            init_tracing("info");
            let config = DashboardConfig::from_env().with_overrides(bind, port);
            dashboard::serve(config).await?;
        }
    }

    Ok(())
}

/// Progress bar advanced once per fetched ticker.
fn fetch_progress(len: usize) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Fetching price history...");
    Ok(pb)
}

/// Fetch, estimate and optimize with a progress bar on stderr.
async fn optimize_with_progress(
    request: &OptimizationRequest,
) -> Result<OptimizationResult, Box<dyn std::error::Error>> {
    let provider = YahooQuoteProvider::new()?;
    let pb = fetch_progress(request.tickers.len())?;

    let outcome = frontier::run(&provider, request, &OptimizerConfig::default(), |ticker| {
        pb.inc(1);
        pb.set_message(format!("Fetched {ticker}"));
    })
    .await;

    match outcome {
        Ok(result) => {
            pb.finish_and_clear();
            Ok(result)
        }
        Err(e) => {
            pb.abandon_with_message("Failed!");
            Err(e.into())
        }
    }
}

async fn run_batch() -> Result<(), Box<dyn std::error::Error>> {
    let request = batch_request()?;
    let result = optimize_with_progress(&request).await?;

    print!("{}", format_batch_weights(&result.tickers, &result.weights));
    Ok(())
}

async fn run_optimize(
    request: &OptimizationRequest,
    format: OutputFormat,
    export: Option<PathBuf>,
    export_format: Option<ExportFormat>,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = optimize_with_progress(request).await?;

    match format {
        OutputFormat::Text => println!("{}", result.summary()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    if let Some(path) = export {
        let export_format = match export_format {
            Some(format) => format,
            None => ExportFormat::from_path(&path)?,
        };
        result.summary().export_to_file(&path, export_format)?;
        eprintln!("Exported allocation to {}", path.display());
    }

    Ok(())
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
    fn test_optimize_defaults() {
        let cli = Cli::try_parse_from([
            "frontier",
            "optimize",
            "--tickers",
            "AAPL,MSFT",
            "--start",
            "2023-01-01",
            "--end",
            "2024-01-01",
        ])
        .unwrap();

        match cli.command {
            Commands::Optimize {
                objective,
                format,
                export,
                export_format,
                ..
            } => {
                assert_eq!(objective, "max-sharpe");
                assert_eq!(format, OutputFormat::Text);
                assert!(export.is_none());
                assert!(export_format.is_none());
            }
            _ => panic!("expected optimize"),
        }
    }

    #[test]
    fn test_export_format_flag() {
        let args = |format: &'static str| {
            [
                "frontier",
                "optimize",
                "--tickers",
                "AAPL",
                "--start",
                "2023-01-01",
                "--end",
                "2024-01-01",
                "--export",
                "weights.txt",
                "--export-format",
                format,
            ]
        };

        let cli = Cli::try_parse_from(args("pretty-json")).unwrap();
        match cli.command {
            Commands::Optimize { export_format, .. } => {
                assert_eq!(export_format, Some(ExportFormat::PrettyJson));
            }
            _ => panic!("expected optimize"),
        }

        assert!(Cli::try_parse_from(args("xml")).is_err());
    }

    #[test]
    fn test_export_format_requires_export_path() {
        let result = Cli::try_parse_from([
            "frontier",
            "optimize",
            "--tickers",
            "AAPL",
            "--start",
            "2023-01-01",
            "--end",
            "2024-01-01",
            "--export-format",
            "csv",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["frontier", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Serve {
                bind: None,
                port: Some(9000)
            }
        ));
    }
}
