//! Scheduling strategies. A strategy picks the ready-queue discipline and
//! renders service on whatever request the driver dequeues.

mod fifo;
mod lifo;
mod round_robin;

pub use self::fifo::Fifo;
pub use self::lifo::Lifo;
pub use self::round_robin::RoundRobin;

use crate::queues::bounded_queue::Discipline;
use crate::queues::request::Request;

/// Result of one service step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Service {
    /// Simulated time consumed by this step.
    pub elapsed: f64,
    /// Whether the request reached a served state.
    pub finished: bool,
}

pub trait Scheduler: Send {
    fn name(&self) -> &'static str;

    fn discipline(&self) -> Discipline;

    /// Serves `request` starting at `now`. A request that is not finished is
    /// handed back to the ready queue by the driver before the next dequeue.
    fn service(&mut self, request: &mut Request, now: f64) -> Service;
}

/// Serves whatever is still owed in a single burst.
pub(crate) fn run_to_completion(request: &mut Request, now: f64) -> Service {
    let remaining = request.begin_service(now);
    let finished = request.apply_burst(remaining, now);
    Service {
        elapsed: remaining,
        finished,
    }
}
