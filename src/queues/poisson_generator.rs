use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};

use crate::config::SimulationConfig;
use crate::distribution::ResolverServiceTime;
use crate::error::ConfigError;
use crate::queues::request::{Request, RequestId};

/// Lazily generated Poisson arrival stream. The first request arrives at
/// time 0; each request is followed by an exponential gap. Each run builds its
/// own generator, so no state is shared between runs.
pub struct PoissonGenerator<T>
where
    T: Distribution<f64>,
{
    next_arrival: f64,
    next_id: RequestId,
    deadline: f64,
    iat_distribution: Exp<f64>,
    service_distribution: T,
    rng: StdRng,
}

impl<T> PoissonGenerator<T>
where
    T: Distribution<f64>,
{
    pub fn new(rate: f64, service_distribution: T, deadline: f64, seed: u64) -> Result<Self, ConfigError> {
        if !(rate > 0.) || !rate.is_finite() {
            return Err(ConfigError::ArrivalRate(rate));
        }
        let iat_distribution = Exp::new(rate).map_err(|_| ConfigError::ArrivalRate(rate))?;
        Ok(PoissonGenerator {
            next_arrival: 0.,
            next_id: 0,
            deadline,
            iat_distribution,
            service_distribution,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn next_request(&mut self) -> Request {
        let processing_time = self.service_distribution.sample(&mut self.rng);
        let req = Request::new(self.next_id, self.next_arrival, processing_time, self.deadline);
        self.next_id += 1;
        self.next_arrival += self.iat_distribution.sample(&mut self.rng);
        req
    }
}

impl PoissonGenerator<ResolverServiceTime> {
    /// Generator for the resolver workload described by `config`.
    pub fn resolver(config: &SimulationConfig) -> Result<Self, ConfigError> {
        let service = ResolverServiceTime::new(&config.service)?;
        PoissonGenerator::new(config.arrival_rate, service, config.deadline, config.seed)
    }
}

impl<T> Iterator for PoissonGenerator<T>
where
    T: Distribution<f64>,
{
    type Item = Request;

    fn next(&mut self) -> Option<Request> {
        Some(self.next_request())
    }
}
