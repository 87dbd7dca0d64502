use super::{run_to_completion, Scheduler, Service};
use crate::queues::bounded_queue::Discipline;
use crate::queues::request::Request;

/// First come, first served. Every request runs to completion.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fifo;

impl Scheduler for Fifo {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn discipline(&self) -> Discipline {
        Discipline::Fifo
    }

    fn service(&mut self, request: &mut Request, now: f64) -> Service {
        run_to_completion(request, now)
    }
}
