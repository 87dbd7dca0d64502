use rand::Rng;
use rand_distr::{Bernoulli, Distribution, Normal};

use crate::config::{ServiceTimeConfig, StageConfig};
use crate::error::ConfigError;

/// Always yields the same value. Handy for deterministic service times.
#[derive(Clone, Copy, Debug)]
pub struct ConstantDistribution<T>
where
    T: Copy,
{
    value: T,
}

impl<T> Distribution<T> for ConstantDistribution<T>
where
    T: Copy,
{
    fn sample<R: Rng + ?Sized>(&self, _: &mut R) -> T {
        self.value
    }
}

impl<T> ConstantDistribution<T>
where
    T: Copy,
{
    pub fn new(value: T) -> Self {
        ConstantDistribution { value }
    }
}

/// Composite service time of a resolver lookup: a cache stage that is always
/// paid, a disk stage on cache miss and a recursive network stage when the
/// disk misses as well.
///
/// Every draw is taken on every sample, in a fixed order, so that a seeded
/// run is reproducible regardless of which stages end up being paid. Samples
/// are not clamped and can occasionally be slightly negative.
#[derive(Clone, Copy, Debug)]
pub struct ResolverServiceTime {
    cache: Normal<f64>,
    disk: Normal<f64>,
    network: Normal<f64>,
    cache_miss: Bernoulli,
    disk_miss: Bernoulli,
}

fn stage(name: &'static str, params: &StageConfig) -> Result<Normal<f64>, ConfigError> {
    Normal::new(params.mean, params.std_dev).map_err(|e| ConfigError::Stage {
        stage: name,
        reason: e.to_string(),
    })
}

fn probability(name: &'static str, value: f64) -> Result<Bernoulli, ConfigError> {
    Bernoulli::new(value).map_err(|_| ConfigError::Probability { name, value })
}

impl ResolverServiceTime {
    pub fn new(config: &ServiceTimeConfig) -> Result<Self, ConfigError> {
        // Normal::new accepts a negative std dev
        config.validate()?;
        Ok(ResolverServiceTime {
            cache: stage("cache", &config.cache)?,
            disk: stage("disk", &config.disk)?,
            network: stage("network", &config.network)?,
            cache_miss: probability("cache miss", config.cache_miss_probability)?,
            disk_miss: probability("disk miss", config.disk_miss_probability)?,
        })
    }
}

impl Distribution<f64> for ResolverServiceTime {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let cache_time = self.cache.sample(rng);
        let disk_time = self.disk.sample(rng);
        let network_time = self.network.sample(rng);
        let cache_miss = self.cache_miss.sample(rng);
        let disk_miss = self.disk_miss.sample(rng);

        let mut total = cache_time;
        if cache_miss {
            total += disk_time;
            if disk_miss {
                total += network_time;
            }
        }
        total
    }
}
