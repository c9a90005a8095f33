#![allow(clippy::doc_markdown)]
//! `bitsieve` CLI - dispatch diagnostics for the predicate engine
//!
//! Usage:
//!   `bitsieve info`
//!   `bitsieve coverage --backend wide`
//!   `bitsieve selfcheck --rows 100000 --seed 7`

mod output;
mod selfcheck;

use std::path::PathBuf;
use std::process::ExitCode;

use bitsieve_core::{
    available_backends, dispatch_info, init_dispatcher, BackendKind, CoverageReport, Dispatcher,
    SieveConfig,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bitsieve")]
#[command(author, version, about = "bitsieve CLI - bitmask predicate engine diagnostics")]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "bitsieve.toml", env = "BITSIEVE_CONFIG")]
    config: PathBuf,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

/// CLI backend option
#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Scalar,
    Wide,
    Avx2,
    Neon,
}

impl From<BackendArg> for BackendKind {
    fn from(b: BackendArg) -> Self {
        match b {
            BackendArg::Scalar => BackendKind::Scalar,
            BackendArg::Wide => BackendKind::Wide,
            BackendArg::Avx2 => BackendKind::Avx2,
            BackendArg::Neon => BackendKind::Neon,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show detected capabilities and the selected backend
    Info,

    /// Probe which (type, operator) combinations a backend covers
    Coverage {
        /// Backend to probe (defaults to every backend this CPU can run)
        #[arg(short, long, value_enum)]
        backend: Option<BackendArg>,
    },

    /// Compare the active backend against the scalar reference on random data
    Selfcheck {
        /// Rows per generated column
        #[arg(short, long, default_value = "65536")]
        rows: usize,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

fn init_logging(config: &SieveConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.level.clone()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = SieveConfig::load_from_path(&cli.config)?;
    config.validate()?;
    init_logging(&config);

    let dispatcher = *init_dispatcher(&config.dispatch)?;
    tracing::debug!(backend = %dispatcher.kind(), "dispatcher bound");

    match cli.command {
        Commands::Info => {
            let info = dispatch_info();
            output::print_info(
                &info.capabilities,
                info.backend,
                &info.available_backends,
                &cli.format,
            )?;
        }
        Commands::Coverage { backend } => {
            let kinds = match backend {
                Some(b) => vec![BackendKind::from(b)],
                None => available_backends(),
            };
            let reports = kinds
                .into_iter()
                .map(|kind| Ok(CoverageReport::probe(Dispatcher::new(kind)?.backend())))
                .collect::<anyhow::Result<Vec<_>>>()?;
            output::print_coverage(&reports, &cli.format)?;
            if reports.iter().any(|r| !r.violations.is_empty()) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Selfcheck { rows, seed } => {
            let summary = selfcheck::run(&dispatcher, rows, seed);
            output::print_selfcheck(&summary, &cli.format)?;
            if summary.mismatches() > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
