use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use resolver_queue_sim::sweep::{run_sweep, SchedulerName, SweepConfig, SweepOptions};
use resolver_queue_sim::RunSummary;

#[derive(Parser, Debug)]
#[command(author, version, about = "Single-server DNS resolver queue simulator", long_about = None)]
struct Args {
    /// TOML sweep configuration. The built-in grid is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Schedulers to run: fifo, lifo, rr
    #[arg(short, long, value_delimiter = ',')]
    scheduler: Vec<SchedulerName>,

    /// Arrival rates in requests per simulated millisecond
    #[arg(long, value_delimiter = ',')]
    arrival_rate: Vec<f64>,

    #[arg(long, value_delimiter = ',')]
    queue_size: Vec<usize>,

    /// Round-Robin time quanta in milliseconds
    #[arg(long, value_delimiter = ',')]
    time_quantum: Vec<f64>,

    #[arg(long)]
    simulation_time: Option<f64>,

    #[arg(long)]
    deadline: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads, 0 for one per core
    #[arg(short, long)]
    workers: Option<usize>,

    /// Write the request records of every run as CSV into this directory
    #[arg(long)]
    records_dir: Option<PathBuf>,

    /// Write run summaries as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// -v for debug, -vv for per-request trace output
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn sweep_config(&self) -> Result<SweepConfig> {
        let mut sweep = match &self.config {
            Some(path) => SweepConfig::from_file(path)
                .with_context(|| format!("failed to load sweep configuration from {}", path.display()))?,
            None => SweepConfig::default(),
        };

        if !self.scheduler.is_empty() {
            sweep.schedulers = self.scheduler.clone();
        }
        if !self.arrival_rate.is_empty() {
            sweep.arrival_rates = self.arrival_rate.clone();
        }
        if !self.queue_size.is_empty() {
            sweep.max_queue_sizes = self.queue_size.clone();
        }
        if !self.time_quantum.is_empty() {
            sweep.time_quantums = self.time_quantum.clone();
        }
        if let Some(simulation_time) = self.simulation_time {
            sweep.base.simulation_time = simulation_time;
        }
        if let Some(deadline) = self.deadline {
            sweep.base.deadline = deadline;
        }
        if let Some(seed) = self.seed {
            sweep.base.seed = seed;
        }
        if let Some(workers) = self.workers {
            sweep.workers = workers;
        }
        Ok(sweep)
    }

    fn default_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.default_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let sweep = args.sweep_config()?;
    let options = SweepOptions {
        workers: sweep.worker_count(),
        records_dir: args.records_dir.clone(),
        trace: args.verbose >= 2,
    };

    let mut all: Vec<RunSummary> = Vec::new();
    for &scheduler in &sweep.schedulers {
        let runs = sweep.runs_for(scheduler);
        info!(%scheduler, runs = runs.len(), "running sweep");
        let summaries = run_sweep(runs, &options).with_context(|| format!("{} sweep failed", scheduler))?;

        println!("{} Simulation:", scheduler);
        for summary in &summaries {
            println!("{}", summary);
        }
        println!("-----------------------------------------");
        all.extend(summaries);
    }

    if let Some(path) = &args.json {
        let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &all).context("failed to write run summaries")?;
        info!(path = %path.display(), runs = all.len(), "summaries written");
    }
    Ok(())
}
