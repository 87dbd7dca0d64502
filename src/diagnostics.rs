//! Observation hooks for the driver loop. The default sink does nothing;
//! `TracingDiagnostics` forwards events to `tracing`.

use tracing::{debug, info, trace};

use crate::config::SimulationConfig;
use crate::queues::request::Request;
use crate::schedulers::Service;
use crate::simulation::SimulationOutput;

#[allow(unused_variables)]
pub trait Diagnostics {
    fn run_started(&mut self, scheduler: &str, config: &SimulationConfig) {}

    /// A new arrival entered the ready queue, which now holds `queue_len`.
    fn admitted(&mut self, request: &Request, queue_len: usize, now: f64) {}

    /// A partially served request went back to the ready queue.
    fn requeued(&mut self, request: &Request, queue_len: usize, now: f64) {}

    fn rejected(&mut self, request: &Request, now: f64) {}

    fn starved(&mut self, request: &Request, now: f64) {}

    /// A partially served request found the ready queue full.
    fn requeue_failed(&mut self, request: &Request, now: f64) {}

    fn burst(&mut self, request: &Request, service: &Service, now: f64) {}

    fn completed(&mut self, request: &Request, now: f64) {}

    fn run_finished(&mut self, output: &SimulationOutput) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {}

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn run_started(&mut self, scheduler: &str, config: &SimulationConfig) {
        debug!(
            scheduler,
            arrival_rate = config.arrival_rate,
            max_queue_size = config.max_queue_size,
            time_quantum = ?config.scheduler.time_quantum(),
            seed = config.seed,
            "simulation started"
        );
    }

    fn admitted(&mut self, request: &Request, queue_len: usize, now: f64) {
        trace!(id = request.id(), queue_len, now, "admitted");
    }

    fn requeued(&mut self, request: &Request, queue_len: usize, now: f64) {
        trace!(
            id = request.id(),
            remaining = ?request.remaining_processing_time(),
            queue_len,
            now,
            "requeued"
        );
    }

    fn rejected(&mut self, request: &Request, now: f64) {
        trace!(id = request.id(), now, "queue full, request rejected");
    }

    fn starved(&mut self, request: &Request, now: f64) {
        trace!(id = request.id(), wait = request.waiting_time(now), "starved at queue");
    }

    fn requeue_failed(&mut self, request: &Request, now: f64) {
        debug!(
            id = request.id(),
            remaining = ?request.remaining_processing_time(),
            now,
            "queue full on requeue, partially served request evicted"
        );
    }

    fn completed(&mut self, request: &Request, now: f64) {
        trace!(id = request.id(), state = %request.finish_state(), now, "completed");
    }

    fn run_finished(&mut self, output: &SimulationOutput) {
        info!(
            scheduler = output.scheduler,
            requests = output.requests.len(),
            final_time = output.final_time,
            max_queue_len = output.max_queue_len,
            "simulation finished"
        );
    }
}
