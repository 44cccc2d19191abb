//! recast CLI
//!
//! Replays construction logs against the simulated kernel and exports every
//! extrude fork point, resuming from the result store.

#![warn(missing_docs)]
#![warn(clippy::all)]

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use recast_core::CoreResult;
use recast_log::JsonLogReader;
use recast_replay::ExportFormat;
use recast_runtime::{BatchConfig, BatchDriver, BatchReport, Launch, ReadinessRegistry};
use recast_sim::{Fault, FaultPlan, FsExportSink, SimHost};
use recast_storage::{ProcessingResult, ResultStore};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recast")]
#[command(about = "recast - Resumable replay-and-fork exporter for CAD logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay every log in a data directory
    Run(RunArgs),
    /// Show result store counts
    Status {
        /// Result store file
        #[arg(short, long)]
        results_file: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Directory holding construction logs
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
    /// Directory for artifacts and the default result store
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Result store file
    #[arg(short, long)]
    results_file: Option<PathBuf>,
    /// Regex log file names must match
    #[arg(short, long)]
    pattern: Option<String>,
    /// Export formats, comma separated
    #[arg(short, long, value_delimiter = ',')]
    formats: Vec<ExportFormat>,
    /// JSON config file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Defer the batch until the host signals readiness
    #[arg(long)]
    wait_for_host: bool,
    /// Fail the primary step at this position in every log
    #[arg(long)]
    sim_fail_step: Option<usize>,
    /// JSON fault plan for the simulated host
    #[arg(long)]
    sim_faults: Option<PathBuf>,
    /// Skip writing this export format
    #[arg(long)]
    sim_drop_format: Option<ExportFormat>,
}

impl RunArgs {
    fn batch_config(&self) -> Result<BatchConfig> {
        let mut config = match &self.config {
            Some(path) => BatchConfig::load(path)?,
            None => {
                let data_dir = self
                    .data_dir
                    .clone()
                    .ok_or_else(|| eyre!("--data-dir is required without --config"))?;
                let output_dir = self
                    .output_dir
                    .clone()
                    .ok_or_else(|| eyre!("--output-dir is required without --config"))?;
                BatchConfig::new(data_dir, output_dir)
            }
        };

        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(file) = &self.results_file {
            config = config.with_results_file(file);
        }
        if let Some(pattern) = &self.pattern {
            config = config.with_pattern(pattern);
        }
        if !self.formats.is_empty() {
            config = config.with_formats(self.formats.clone());
        }
        config.validate()?;
        Ok(config)
    }

    fn fault_plan(&self) -> Result<FaultPlan> {
        let mut plan = match &self.sim_faults {
            Some(path) => FaultPlan::load(path)?,
            None => FaultPlan::none(),
        };
        if let Some(position) = self.sim_fail_step {
            plan = plan.with(Fault::FailStep {
                log: None,
                position,
            });
        }
        Ok(plan)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_batch(
    config: &BatchConfig,
    faults: FaultPlan,
    dropped: Option<ExportFormat>,
) -> CoreResult<BatchReport> {
    let mut store = ResultStore::open(config.results_path())?;
    let reader = JsonLogReader::new();
    let mut host = SimHost::with_faults(faults);
    let mut sink = match dropped {
        Some(format) => FsExportSink::new().dropping(format),
        None => FsExportSink::new(),
    };

    BatchDriver::new(config.clone(), &mut host, &reader, &mut sink).run_discovered(&mut store)
}

fn run(args: &RunArgs) -> Result<BatchReport> {
    let config = args.batch_config()?;
    let faults = args.fault_plan()?;
    let outcome = RefCell::new(None);

    let mut registry = ReadinessRegistry::new();
    let launch = Launch::start(!args.wait_for_host, &mut registry, || {
        *outcome.borrow_mut() = Some(run_batch(&config, faults, args.sim_drop_format));
    })?;
    if let Launch::Deferred(id) = launch {
        // The simulated host has no startup work of its own
        tracing::info!(subscription = %id, "Simulated host started");
        registry.notify_ready();
    }
    drop(registry);

    let report = outcome
        .into_inner()
        .ok_or_else(|| eyre!("batch did not start"))??;
    Ok(report)
}

fn status(results_file: &Path) -> Result<()> {
    let store = ResultStore::open(results_file)?;
    let counts = store.counts();

    println!("Results: {}", store.path().display());
    println!("  total:     {}", counts.total());
    println!("  success:   {}", counts.success);
    println!("  exception: {}", counts.exception);
    println!("  pending:   {}", counts.pending);

    for (name, result) in store.iter() {
        if let ProcessingResult::Exception { kind, message, .. } = result {
            println!("  {}: {} {}", name, kind, message);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            run(&args)?;
            Ok(())
        }
        Commands::Status { results_file } => status(&results_file),
    }
}
