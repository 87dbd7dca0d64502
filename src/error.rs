use thiserror::Error;

/// Rejected configuration. Raised before any simulated time advances.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("arrival rate must be a positive finite number, got {0}")]
    ArrivalRate(f64),

    #[error("max queue size must be at least 1")]
    QueueCapacity,

    #[error("time quantum must be positive, finite and large enough to advance the clock, got {0}")]
    TimeQuantum(f64),

    #[error("idle step must be positive, finite and large enough to advance the clock, got {0}")]
    IdleStep(f64),

    #[error("deadline must be a non-negative number, got {0}")]
    Deadline(f64),

    #[error("simulation time must be a positive finite number, got {0}")]
    SimulationTime(f64),

    #[error("invalid {stage} stage: {reason}")]
    Stage { stage: &'static str, reason: String },

    #[error("{name} probability must lie in [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse sweep configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("worker pool failed: {0}")]
    Worker(String),
}
