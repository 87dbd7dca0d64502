//! Parameter sweeps. Runs are independent, so they are fanned out over a
//! pool of worker threads; nothing is shared within a run.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread;

use crossbeam_channel::unbounded;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::RunSummary;
use crate::config::{SchedulerKind, SimulationConfig};
use crate::diagnostics::{Diagnostics, NoopDiagnostics, TracingDiagnostics};
use crate::error::SimError;
use crate::record_logger::RecordLogger;
use crate::simulation::simulate_with;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerName {
    Fifo,
    Lifo,
    RoundRobin,
}

impl FromStr for SchedulerName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fifo" => Ok(SchedulerName::Fifo),
            "lifo" => Ok(SchedulerName::Lifo),
            "rr" | "round_robin" | "round-robin" => Ok(SchedulerName::RoundRobin),
            other => Err(format!("unknown scheduler '{}', expected fifo, lifo or rr", other)),
        }
    }
}

impl fmt::Display for SchedulerName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            SchedulerName::Fifo => "FIFO",
            SchedulerName::Lifo => "LIFO",
            SchedulerName::RoundRobin => "RR",
        })
    }
}

/// Cartesian grid of runs. Every run shares `base` apart from the swept
/// parameters, including the seed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub schedulers: Vec<SchedulerName>,
    pub arrival_rates: Vec<f64>,
    pub max_queue_sizes: Vec<usize>,
    /// Only used by Round-Robin runs.
    pub time_quantums: Vec<f64>,
    /// 0 picks the available parallelism.
    pub workers: usize,
    pub base: SimulationConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            schedulers: vec![SchedulerName::Fifo, SchedulerName::Lifo, SchedulerName::RoundRobin],
            arrival_rates: vec![0.05, 0.1, 0.2, 0.5, 1., 2., 5., 10.],
            max_queue_sizes: vec![10_000, 8000, 5000, 2000, 1000, 500, 200],
            time_quantums: vec![200., 100., 80., 50., 25., 10., 5.],
            workers: 0,
            base: SimulationConfig::default(),
        }
    }
}

impl SweepConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Runs for one scheduler, in arrival rate, queue size, quantum order.
    pub fn runs_for(&self, scheduler: SchedulerName) -> Vec<SimulationConfig> {
        let mut runs = Vec::new();
        for &arrival_rate in &self.arrival_rates {
            for &max_queue_size in &self.max_queue_sizes {
                let with = |kind| SimulationConfig {
                    arrival_rate,
                    max_queue_size,
                    scheduler: kind,
                    ..self.base.clone()
                };
                match scheduler {
                    SchedulerName::Fifo => runs.push(with(SchedulerKind::Fifo)),
                    SchedulerName::Lifo => runs.push(with(SchedulerKind::Lifo)),
                    SchedulerName::RoundRobin => {
                        for &time_quantum in &self.time_quantums {
                            runs.push(with(SchedulerKind::RoundRobin { time_quantum }));
                        }
                    }
                }
            }
        }
        runs
    }

    pub fn runs(&self) -> Vec<SimulationConfig> {
        self.schedulers.iter().flat_map(|&s| self.runs_for(s)).collect()
    }

    pub fn worker_count(&self) -> usize {
        resolve_workers(self.workers)
    }
}

fn resolve_workers(requested: usize) -> usize {
    if requested > 0 {
        return requested;
    }
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

#[derive(Clone, Debug, Default)]
pub struct SweepOptions {
    pub workers: usize,
    /// Writes one CSV of request records per run when set.
    pub records_dir: Option<PathBuf>,
    /// Forward driver events to `tracing`.
    pub trace: bool,
}

pub fn records_file_name(config: &SimulationConfig) -> String {
    let mut name = format!(
        "{}_ar{}_qs{}",
        config.scheduler.name().to_lowercase(),
        config.arrival_rate,
        config.max_queue_size
    );
    if let Some(quantum) = config.scheduler.time_quantum() {
        name.push_str(&format!("_tq{}", quantum));
    }
    name.push_str(".csv");
    name
}

fn execute_run(config: &SimulationConfig, records_dir: Option<&Path>, trace: bool) -> Result<RunSummary, SimError> {
    let mut noop = NoopDiagnostics;
    let mut traced = TracingDiagnostics;
    let diagnostics: &mut dyn Diagnostics = if trace { &mut traced } else { &mut noop };

    let output = simulate_with(config, diagnostics)?;
    if let Some(dir) = records_dir {
        let mut logger = RecordLogger::create(1024, dir.join(records_file_name(config)))?;
        logger.log_all(&output.requests)?;
    }
    Ok(RunSummary::new(config, &output))
}

/// Runs every configuration and returns the summaries in input order.
/// All configurations are validated before any run starts.
pub fn run_sweep(configs: Vec<SimulationConfig>, options: &SweepOptions) -> Result<Vec<RunSummary>, SimError> {
    for config in &configs {
        config.validate()?;
    }
    if let Some(dir) = &options.records_dir {
        fs::create_dir_all(dir)?;
    }

    let total = configs.len();
    let workers = resolve_workers(options.workers).min(total.max(1));
    info!(runs = total, workers, "starting sweep");

    let (job_tx, job_rx) = unbounded::<(usize, SimulationConfig)>();
    let (result_tx, result_rx) = unbounded::<(usize, Result<RunSummary, SimError>)>();
    for job in configs.into_iter().enumerate() {
        job_tx
            .send(job)
            .map_err(|_| SimError::Worker("job queue closed".to_string()))?;
    }
    drop(job_tx);

    let records_dir = options.records_dir.as_deref();
    let trace = options.trace;
    thread::scope(|scope| {
        for worker in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for (index, config) in job_rx.iter() {
                    debug!(worker, index, scheduler = config.scheduler.name(), "run started");
                    let result = execute_run(&config, records_dir, trace);
                    if result_tx.send((index, result)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut summaries: Vec<Option<RunSummary>> = (0..total).map(|_| None).collect();
    for (index, result) in result_rx.iter() {
        summaries[index] = Some(result?);
    }
    summaries
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| SimError::Worker("a worker exited without reporting its run".to_string()))
}
