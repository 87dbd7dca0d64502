use super::{Scheduler, Service};
use crate::queues::bounded_queue::Discipline;
use crate::queues::request::Request;

/// Grants at most `time_quantum` of service per turn. Unfinished requests go
/// to the back of the FIFO ready queue.
#[derive(Clone, Copy, Debug)]
pub struct RoundRobin {
    time_quantum: f64,
}

impl RoundRobin {
    pub fn new(time_quantum: f64) -> Self {
        RoundRobin { time_quantum }
    }
}

impl Scheduler for RoundRobin {
    fn name(&self) -> &'static str {
        "RR"
    }

    fn discipline(&self) -> Discipline {
        Discipline::Fifo
    }

    fn service(&mut self, request: &mut Request, now: f64) -> Service {
        let remaining = request.begin_service(now);
        // min() keeps the final burst equal to the remainder, so it reaches 0 exactly
        let burst = self.time_quantum.min(remaining);
        let finished = request.apply_burst(burst, now);
        Service {
            elapsed: burst,
            finished,
        }
    }
}
