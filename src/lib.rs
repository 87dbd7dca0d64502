//! Single-server request queue simulation of a DNS resolver under FIFO,
//! LIFO and Round-Robin scheduling, with bounded queue capacity, Poisson
//! arrivals, a composite lookup service time and a per-request deadline.

pub mod analysis;
pub mod config;
pub mod deadline;
pub mod diagnostics;
pub mod distribution;
pub mod error;
pub mod queues;
pub mod record_logger;
pub mod schedulers;
pub mod simulation;
pub mod sweep;

pub use analysis::RunSummary;
pub use config::{SchedulerKind, ServiceTimeConfig, SimulationConfig};
pub use diagnostics::{Diagnostics, NoopDiagnostics, TracingDiagnostics};
pub use error::{ConfigError, SimError};
pub use queues::{FinishState, Request};
pub use simulation::{simulate, simulate_fifo, simulate_lifo, simulate_round_robin, simulate_with, SimulationOutput};
pub use sweep::{run_sweep, SweepConfig, SweepOptions};
