#![forbid(unsafe_code)]

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pipcam_core::{PipConfig, Size};
use serde::Serialize;

use crate::error::{HarnessError, Result};
use crate::logging::{LogFormat, init_logging};
use crate::scenario::{self, DragScenario, SessionScenario};

#[derive(Debug, Parser)]
#[command(
    name = "pipcam-harness",
    about = "Replay drag and capture-session scenarios against pipcam-core",
    version
)]
pub struct Cli {
    /// TOML file overriding snap, preview and cost tunables.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format (logs go to stderr).
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Emit single-line JSON instead of pretty-printed JSON.
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a drag scenario and report where the preview settles.
    Snap(SnapArgs),

    /// Replay session events against a simulated device and report each
    /// mitigation step.
    Reduce(ReduceArgs),

    /// Print preview size, inset and corner zones for a screen.
    Layout(ScreenArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ScreenArgs {
    #[arg(long)]
    pub width: f64,
    #[arg(long)]
    pub height: f64,
}

impl ScreenArgs {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, Args)]
pub struct SnapArgs {
    /// JSON drag scenario.
    pub scenario: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct ReduceArgs {
    /// JSON session scenario. Without one, a stock dual 1080p device
    /// receives a single cost update.
    pub scenario: Option<PathBuf>,

    /// Fail when costs are still exceeded after the last event.
    #[arg(long)]
    pub require_resolved: bool,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;
    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = match &cli.config {
        Some(path) => PipConfig::load(path)?,
        None => PipConfig::default(),
    };
    tracing::debug!(?config, "configuration resolved");

    match cli.command {
        Commands::Layout(args) => {
            let report = scenario::run_layout(args.size(), &config)?;
            emit(out, &report, cli.compact)
        }
        Commands::Snap(args) => {
            let drag: DragScenario = scenario::load(&args.scenario)?;
            let report = scenario::run_drag(&drag, &config)?;
            emit(out, &report, cli.compact)
        }
        Commands::Reduce(args) => {
            let session = match &args.scenario {
                Some(path) => scenario::load(path)?,
                None => SessionScenario::default(),
            };
            let report = scenario::run_session(&session, &config)?;
            emit(out, &report, cli.compact)?;
            if args.require_resolved && !report.within_limits {
                let remaining = report
                    .steps
                    .last()
                    .map_or(report.initial.costs, |step| step.device.costs);
                return Err(HarnessError::Unresolved {
                    remaining: pipcam_core::ExceededCosts::from_costs(remaining, &config.cost),
                });
            }
            Ok(())
        }
    }
}

fn emit<T: Serialize>(out: &mut dyn Write, report: &T, compact: bool) -> Result<()> {
    if compact {
        serde_json::to_writer(&mut *out, report)?;
    } else {
        serde_json::to_writer_pretty(&mut *out, report)?;
    }
    writeln!(out)?;
    Ok(())
}
