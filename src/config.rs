use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schedulers::{Fifo, Lifo, RoundRobin, Scheduler};

/// Milliseconds of tolerated arrival-to-completion latency.
pub const DEFAULT_DEADLINE: f64 = 2000.;
/// Simulated milliseconds per run.
pub const DEFAULT_SIMULATION_TIME: f64 = 10_000.;
/// Clock advance while the server polls an empty queue.
pub const DEFAULT_IDLE_STEP: f64 = 0.001;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchedulerKind {
    #[default]
    Fifo,
    Lifo,
    RoundRobin { time_quantum: f64 },
}

impl SchedulerKind {
    pub fn build(&self) -> Box<dyn Scheduler> {
        match *self {
            SchedulerKind::Fifo => Box::new(Fifo),
            SchedulerKind::Lifo => Box::new(Lifo),
            SchedulerKind::RoundRobin { time_quantum } => Box::new(RoundRobin::new(time_quantum)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SchedulerKind::Fifo => "FIFO",
            SchedulerKind::Lifo => "LIFO",
            SchedulerKind::RoundRobin { .. } => "RR",
        }
    }

    pub fn time_quantum(&self) -> Option<f64> {
        match *self {
            SchedulerKind::RoundRobin { time_quantum } => Some(time_quantum),
            _ => None,
        }
    }
}

/// Normal distribution parameters of one lookup stage, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub mean: f64,
    pub std_dev: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceTimeConfig {
    pub cache: StageConfig,
    pub disk: StageConfig,
    pub network: StageConfig,
    pub cache_miss_probability: f64,
    /// Probability the disk also misses, given a cache miss.
    pub disk_miss_probability: f64,
}

impl Default for ServiceTimeConfig {
    fn default() -> Self {
        ServiceTimeConfig {
            cache: StageConfig { mean: 0.0505, std_dev: 0.012625 },
            disk: StageConfig { mean: 10., std_dev: 2.25 },
            network: StageConfig { mean: 80., std_dev: 15. },
            cache_miss_probability: 0.7,
            disk_miss_probability: 0.8,
        }
    }
}

impl ServiceTimeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, params) in [("cache", &self.cache), ("disk", &self.disk), ("network", &self.network)] {
            if !params.mean.is_finite() {
                return Err(ConfigError::Stage {
                    stage: name,
                    reason: format!("mean must be finite, got {}", params.mean),
                });
            }
            if !(params.std_dev >= 0.) || !params.std_dev.is_finite() {
                return Err(ConfigError::Stage {
                    stage: name,
                    reason: format!("standard deviation must be finite and non-negative, got {}", params.std_dev),
                });
            }
        }
        for (name, value) in [
            ("cache miss", self.cache_miss_probability),
            ("disk miss", self.disk_miss_probability),
        ] {
            if !(0. ..=1.).contains(&value) {
                return Err(ConfigError::Probability { name, value });
            }
        }
        Ok(())
    }
}

/// Everything one simulation run needs. Times are simulated milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Mean requests per simulated millisecond.
    pub arrival_rate: f64,
    pub max_queue_size: usize,
    pub scheduler: SchedulerKind,
    pub deadline: f64,
    pub simulation_time: f64,
    pub idle_step: f64,
    pub seed: u64,
    pub service: ServiceTimeConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            arrival_rate: 1.,
            max_queue_size: 1000,
            scheduler: SchedulerKind::Fifo,
            deadline: DEFAULT_DEADLINE,
            simulation_time: DEFAULT_SIMULATION_TIME,
            idle_step: DEFAULT_IDLE_STEP,
            seed: DEFAULT_SEED,
            service: ServiceTimeConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn new(scheduler: SchedulerKind, max_queue_size: usize, arrival_rate: f64) -> Self {
        SimulationConfig {
            scheduler,
            max_queue_size,
            arrival_rate,
            ..SimulationConfig::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.arrival_rate > 0.) || !self.arrival_rate.is_finite() {
            return Err(ConfigError::ArrivalRate(self.arrival_rate));
        }
        if self.max_queue_size == 0 {
            return Err(ConfigError::QueueCapacity);
        }
        if !(self.simulation_time > 0.) || !self.simulation_time.is_finite() {
            return Err(ConfigError::SimulationTime(self.simulation_time));
        }
        // every step must still move the clock just below the horizon
        if let Some(quantum) = self.scheduler.time_quantum() {
            if !(quantum > 0.) || !quantum.is_finite() || !self.advances_clock(quantum) {
                return Err(ConfigError::TimeQuantum(quantum));
            }
        }
        if !(self.idle_step > 0.) || !self.idle_step.is_finite() || !self.advances_clock(self.idle_step) {
            return Err(ConfigError::IdleStep(self.idle_step));
        }
        if !(self.deadline >= 0.) {
            return Err(ConfigError::Deadline(self.deadline));
        }
        self.service.validate()
    }

    fn advances_clock(&self, step: f64) -> bool {
        self.simulation_time + step > self.simulation_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.deadline, 2000.);
        assert_eq!(config.simulation_time, 10_000.);
        assert_eq!(config.idle_step, 0.001);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_degenerate_parameters() {
        let config = SimulationConfig::new(SchedulerKind::Fifo, 10, 0.);
        assert_eq!(config.validate(), Err(ConfigError::ArrivalRate(0.)));

        let config = SimulationConfig::new(SchedulerKind::Fifo, 10, -1.);
        assert_eq!(config.validate(), Err(ConfigError::ArrivalRate(-1.)));

        let config = SimulationConfig::new(SchedulerKind::Lifo, 0, 1.);
        assert_eq!(config.validate(), Err(ConfigError::QueueCapacity));

        let config = SimulationConfig::new(SchedulerKind::RoundRobin { time_quantum: 0. }, 10, 1.);
        assert_eq!(config.validate(), Err(ConfigError::TimeQuantum(0.)));

        let config = SimulationConfig {
            idle_step: 0.,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::IdleStep(0.)));

        let config = SimulationConfig {
            deadline: -1.,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Deadline(-1.)));
    }

    #[test]
    fn test_rejects_steps_lost_to_rounding_at_the_horizon() {
        let config = SimulationConfig {
            idle_step: 1e-15,
            simulation_time: 100.,
            arrival_rate: 0.001,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::IdleStep(1e-15)));

        let config = SimulationConfig {
            simulation_time: 100.,
            ..SimulationConfig::new(SchedulerKind::RoundRobin { time_quantum: 1e-15 }, 10, 1.)
        };
        assert_eq!(config.validate(), Err(ConfigError::TimeQuantum(1e-15)));

        // small but representable at the horizon
        let config = SimulationConfig {
            idle_step: 1e-9,
            simulation_time: 100.,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_scheduler_is_fifo() {
        assert_eq!(SchedulerKind::default(), SchedulerKind::Fifo);
    }

    #[test]
    fn test_zero_deadline_is_allowed() {
        let config = SimulationConfig {
            deadline: 0.,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_probability_is_rejected() {
        let mut config = SimulationConfig::default();
        config.service.disk_miss_probability = -0.1;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Probability { name: "disk miss", value: -0.1 })
        );
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let config: SimulationConfig = toml::from_str(
            r#"
            arrival_rate = 0.5
            max_queue_size = 200

            [scheduler]
            kind = "round_robin"
            time_quantum = 25.0

            [service]
            cache_miss_probability = 0.3
            "#,
        )
        .unwrap();
        assert_eq!(config.scheduler, SchedulerKind::RoundRobin { time_quantum: 25. });
        assert_eq!(config.scheduler.time_quantum(), Some(25.));
        assert_eq!(config.service.cache_miss_probability, 0.3);
        assert_eq!(config.service.disk_miss_probability, 0.8);
        assert_eq!(config.deadline, DEFAULT_DEADLINE);
    }
}
