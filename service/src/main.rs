mod cli;
mod command_source;
mod output;

use anyhow::Context;
use clap::Parser as _;
use std::fs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wifi_parser::{Cell, Collector, ParserRegistry, ScanOutput};

use crate::cli::{Args, OutputFormat};
use crate::command_source::CommandSource;
use crate::output::{render_table, ScanReport};

/// Used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "wifi_scan=info,wifi_parser=info";

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let cells = match &args.scan_file {
        Some(_) => parse_saved(&args)?,
        None => {
            tracing::info!("Scanning {} on {}", args.interface, args.platform());
            Collector::new(args.parser(), CommandSource)
                .filter(&args.interface, |cell| args.matches(cell))
                .with_context(|| format!("scan of {} failed", args.interface))?
        }
    };

    match args.format {
        OutputFormat::Table => print!("{}", render_table(&cells)),
        OutputFormat::Json => {
            let report = ScanReport::new(&args.interface, &cells);
            println!("{}", report.to_json().context("failed to encode scan report")?);
        }
    }

    Ok(())
}

/// Parse output captured earlier with `iwlist <iface> scan` or
/// `airport <iface> scan` / `airport -I`.
fn parse_saved(args: &Args) -> anyhow::Result<Vec<Cell>> {
    let mut output = ScanOutput::default();

    if let Some(path) = &args.scan_file {
        output.scan = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
    }
    if let Some(path) = &args.status_file {
        let status = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        output.status = Some(status);
    }

    let cells = match args.platform {
        Some(_) => args.parser().parse(&output),
        None => ParserRegistry::new().parse_auto(&output),
    }
    .context("failed to parse saved scan output")?;

    tracing::info!("Parsed {} cells from saved output", cells.len());
    Ok(cells.into_iter().filter(|cell| args.matches(cell)).collect())
}
