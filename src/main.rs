//! treescan CLI entry point.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use treescan::config::{AppConfig, LogFormat, LoggingConfig};
use treescan::{
    DirectorySource, EntryId, ExpansionState, SampleSource, ScanEntry, ScanStats, ScanStatus,
    Scanner,
};

/// Upload a folder (or a placeholder URL import) and watch a simulated scan.
#[derive(Parser, Debug)]
#[command(name = "treescan", version)]
struct Cli {
    /// Directory to upload.
    #[arg(long, conflicts_with = "url")]
    dir: Option<PathBuf>,

    /// Repository URL to import. Placeholder: yields a fixed sample project.
    #[arg(long)]
    url: Option<String>,

    /// Configuration file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for reproducible verdicts.
    #[arg(long)]
    seed: Option<u64>,

    /// Probability that a file resolves to error.
    #[arg(long)]
    error_probability: Option<f64>,

    /// Run on a virtual clock and print only the final result.
    #[arg(long)]
    instant: bool,

    /// Print the final result as JSON.
    #[arg(long)]
    json: bool,

    /// Show only root-level rows.
    #[arg(long)]
    collapse: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_logging(&config.logging);

    if let Some(seed) = cli.seed {
        config.scan.seed = Some(seed);
    }
    if let Some(p) = cli.error_probability {
        config.scan.error_probability = p;
    }

    let builder = treescan::scan().config(&config.scan);
    let builder = match (&cli.dir, &cli.url) {
        (Some(dir), _) => builder.source(DirectorySource::new(dir)),
        (None, Some(url)) => builder.source(SampleSource::new(url.clone())),
        (None, None) => bail!("either --dir or --url is required"),
    };
    let session = builder.prepare().context("preparing scan")?;
    for path in session.hierarchy().skipped() {
        eprintln!("skipped: {path}");
    }

    if cli.instant {
        let report = session.run_to_completion();
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            let view = view_state(&cli, &report.entries);
            for entry in view.visible(&report.entries) {
                println!("{}", row(entry));
            }
            println!("{}", summary(&report.stats));
        }
        return Ok(());
    }

    let mut scanner = Scanner::new();
    let mut rx = scanner.subscribe();
    scanner.start(session);

    let mut printed: HashMap<EntryId, &'static str> = HashMap::new();
    let last = loop {
        rx.changed().await.context("scanner stopped")?;
        let snapshot = rx.borrow_and_update().clone();

        if !cli.json {
            let view = view_state(&cli, &snapshot.entries);
            for entry in view.visible(&snapshot.entries) {
                let label = entry.status.label();
                if printed.insert(entry.id, label) != Some(label) {
                    println!("{}", row(entry));
                }
            }
        }
        if snapshot.is_finished() {
            break snapshot;
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&last)?);
    } else {
        println!("{}", summary(&last.stats));
    }
    Ok(())
}

fn view_state(cli: &Cli, entries: &[ScanEntry]) -> ExpansionState {
    let mut view = ExpansionState::new();
    if !cli.collapse {
        view.expand_all(entries);
    }
    view
}

fn row(entry: &ScanEntry) -> String {
    let indent = entry.depth * 2;
    match &entry.status {
        ScanStatus::Structural => format!("{:indent$}{}/", "", entry.name),
        ScanStatus::Error { message } => {
            format!("{:indent$}{} [error] {}", "", entry.name, message)
        }
        status => format!("{:indent$}{} [{}]", "", entry.name, status.label()),
    }
}

fn summary(stats: &ScanStats) -> String {
    format!(
        "scanned {}/{} files, {} errors, {} pending",
        stats.scanned,
        stats.total,
        stats.errors,
        stats.pending()
    )
}

fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
