use super::{run_to_completion, Scheduler, Service};
use crate::queues::bounded_queue::Discipline;
use crate::queues::request::Request;

/// Last come, first served. Same service rule as `Fifo`, stack-ordered
/// queue.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lifo;

impl Scheduler for Lifo {
    fn name(&self) -> &'static str {
        "LIFO"
    }

    fn discipline(&self) -> Discipline {
        Discipline::Lifo
    }

    fn service(&mut self, request: &mut Request, now: f64) -> Service {
        run_to_completion(request, now)
    }
}
