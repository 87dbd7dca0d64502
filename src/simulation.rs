//! Single-server driver loop.
//!
//! Each iteration pulls every arrival due by the current clock into the
//! ready queue, hands back a partially served Round-Robin request, then
//! either services the next request or idles the clock forward by a fixed
//! step. The loop stops once the clock reaches the horizon; the last step may
//! overshoot it by one service step.

use std::iter::Peekable;

use crate::config::{SchedulerKind, SimulationConfig};
use crate::deadline;
use crate::diagnostics::{Diagnostics, NoopDiagnostics};
use crate::error::SimError;
use crate::queues::bounded_queue::BoundedQueue;
use crate::queues::poisson_generator::PoissonGenerator;
use crate::queues::request::Request;
use crate::schedulers::Scheduler;

/// Records of one run, ordered by arrival.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationOutput {
    pub scheduler: &'static str,
    pub requests: Vec<Request>,
    /// Clock value when the loop stopped.
    pub final_time: f64,
    /// Largest ready-queue length seen during the run.
    pub max_queue_len: usize,
}

struct Driver<'a, I>
where
    I: Iterator<Item = Request>,
{
    now: f64,
    horizon: f64,
    idle_step: f64,
    arrivals: Peekable<I>,
    requests: Vec<Request>,
    // indices into `requests`
    queue: BoundedQueue<usize>,
    in_flight: Option<usize>,
    scheduler: Box<dyn Scheduler>,
    diagnostics: &'a mut dyn Diagnostics,
}

impl<'a, I> Driver<'a, I>
where
    I: Iterator<Item = Request>,
{
    fn run(mut self) -> SimulationOutput {
        while self.now < self.horizon {
            self.admit_due_arrivals();
            self.requeue_in_flight();

            match self.queue.dequeue() {
                Some(idx) => self.dispatch(idx),
                None => self.now += self.idle_step,
            }
        }

        let output = SimulationOutput {
            scheduler: self.scheduler.name(),
            requests: self.requests,
            final_time: self.now,
            max_queue_len: self.queue.high_water_mark(),
        };
        self.diagnostics.run_finished(&output);
        output
    }

    // Once one arrival bounces off a full queue, every other arrival due at
    // this tick is rejected too.
    fn admit_due_arrivals(&mut self) {
        let mut rejecting = false;
        while let Some(req) = self.arrivals.next_if(|r| r.arrival_time() <= self.now) {
            let idx = self.requests.len();
            self.requests.push(req);

            if !rejecting && self.queue.try_enqueue(idx).is_ok() {
                self.diagnostics.admitted(&self.requests[idx], self.queue.len(), self.now);
                continue;
            }
            rejecting = true;
            let req = &mut self.requests[idx];
            req.mark_rejected();
            self.diagnostics.rejected(req, self.now);
        }
    }

    fn requeue_in_flight(&mut self) {
        let idx = match self.in_flight.take() {
            Some(idx) => idx,
            None => return,
        };
        match self.queue.try_enqueue(idx) {
            Ok(()) => self.diagnostics.requeued(&self.requests[idx], self.queue.len(), self.now),
            Err(idx) => {
                let req = &mut self.requests[idx];
                self.diagnostics.requeue_failed(req, self.now);
                req.mark_starved();
            }
        }
    }

    fn dispatch(&mut self, idx: usize) {
        let req = &mut self.requests[idx];

        if deadline::has_starved_at_queue(req, self.now) {
            req.mark_starved();
            self.diagnostics.starved(req, self.now);
            self.now += self.idle_step;
            return;
        }

        let service = self.scheduler.service(req, self.now);
        self.diagnostics.burst(req, &service, self.now);
        // negative service draws are kept on the record but never rewind the clock
        self.now += service.elapsed.max(0.);

        if service.finished {
            self.diagnostics.completed(req, self.now);
        } else {
            self.in_flight = Some(idx);
        }
    }
}

/// Runs `scheduler` over an explicit arrival stream. Arrivals must come in
/// non-decreasing arrival order; a finite stream simply stops arriving.
pub fn run_with_arrivals<I>(
    config: &SimulationConfig,
    arrivals: I,
    scheduler: Box<dyn Scheduler>,
    diagnostics: &mut dyn Diagnostics,
) -> Result<SimulationOutput, SimError>
where
    I: IntoIterator<Item = Request>,
{
    config.validate()?;
    diagnostics.run_started(scheduler.name(), config);

    let driver = Driver {
        now: 0.,
        horizon: config.simulation_time,
        idle_step: config.idle_step,
        arrivals: arrivals.into_iter().peekable(),
        requests: Vec::new(),
        queue: BoundedQueue::new(config.max_queue_size, scheduler.discipline()),
        in_flight: None,
        scheduler,
        diagnostics,
    };
    Ok(driver.run())
}

/// Runs the resolver workload described by `config`, reporting to
/// `diagnostics`.
pub fn simulate_with(config: &SimulationConfig, diagnostics: &mut dyn Diagnostics) -> Result<SimulationOutput, SimError> {
    config.validate()?;
    let arrivals = PoissonGenerator::resolver(config)?;
    run_with_arrivals(config, arrivals, config.scheduler.build(), diagnostics)
}

pub fn simulate(config: &SimulationConfig) -> Result<SimulationOutput, SimError> {
    simulate_with(config, &mut NoopDiagnostics)
}

pub fn simulate_fifo(max_queue_size: usize, arrival_rate: f64) -> Result<SimulationOutput, SimError> {
    simulate(&SimulationConfig::new(SchedulerKind::Fifo, max_queue_size, arrival_rate))
}

pub fn simulate_lifo(max_queue_size: usize, arrival_rate: f64) -> Result<SimulationOutput, SimError> {
    simulate(&SimulationConfig::new(SchedulerKind::Lifo, max_queue_size, arrival_rate))
}

pub fn simulate_round_robin(
    max_queue_size: usize,
    arrival_rate: f64,
    time_quantum: f64,
) -> Result<SimulationOutput, SimError> {
    simulate(&SimulationConfig::new(
        SchedulerKind::RoundRobin { time_quantum },
        max_queue_size,
        arrival_rate,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::queues::request::FinishState;

    fn config(scheduler: SchedulerKind, capacity: usize, deadline: f64, horizon: f64) -> SimulationConfig {
        SimulationConfig {
            scheduler,
            max_queue_size: capacity,
            deadline,
            simulation_time: horizon,
            idle_step: 0.5,
            ..SimulationConfig::default()
        }
    }

    fn reqs(timings: &[(f64, f64)], deadline: f64) -> Vec<Request> {
        timings.iter()
            .enumerate()
            .map(|(i, &(arrival, processing))| Request::new(i as u64, arrival, processing, deadline))
            .collect()
    }

    fn run(config: &SimulationConfig, arrivals: Vec<Request>) -> SimulationOutput {
        run_with_arrivals(config, arrivals, config.scheduler.build(), &mut NoopDiagnostics).unwrap()
    }

    fn spans(output: &SimulationOutput) -> Vec<(Option<f64>, Option<f64>)> {
        output
            .requests
            .iter()
            .map(|r| (r.start_processing_time(), r.end_processing_time()))
            .collect()
    }

    #[test]
    fn test_fifo_serves_in_arrival_order() {
        let config = config(SchedulerKind::Fifo, 10, 100., 50.);
        let output = run(&config, reqs(&[(0., 5.), (1., 3.), (2., 1.)], 100.));
        assert_eq!(
            spans(&output),
            vec![(Some(0.), Some(5.)), (Some(5.), Some(8.)), (Some(8.), Some(9.))]
        );
        assert!(output
            .requests
            .iter()
            .all(|r| r.finish_state() == FinishState::FinishedSuccessfully));
        assert_eq!(output.scheduler, "FIFO");
    }

    #[test]
    fn test_lifo_serves_newest_first() {
        let config = config(SchedulerKind::Lifo, 10, 100., 50.);
        let output = run(&config, reqs(&[(0., 5.), (1., 3.), (2., 1.)], 100.));
        assert_eq!(
            spans(&output),
            vec![(Some(0.), Some(5.)), (Some(6.), Some(9.)), (Some(5.), Some(6.))]
        );
    }

    #[test]
    fn test_round_robin_interleaves_bursts() {
        let config = config(SchedulerKind::RoundRobin { time_quantum: 2. }, 10, 100., 50.);
        let output = run(&config, reqs(&[(0., 5.), (1., 3.)], 100.));
        assert_eq!(spans(&output), vec![(Some(0.), Some(8.)), (Some(2.), Some(7.))]);
    }

    #[test]
    fn test_starved_request_is_discarded_without_service() {
        let config = config(SchedulerKind::Fifo, 10, 4., 50.);
        let output = run(&config, reqs(&[(0., 10.), (1., 1.)], 4.));
        let states: Vec<_> = output.requests.iter().map(Request::finish_state).collect();
        assert_eq!(
            states,
            vec![FinishState::FinishedAfterDeadline, FinishState::StarvedAtQueue]
        );
        assert_eq!(output.requests[1].start_processing_time(), None);
    }

    #[test]
    fn test_full_queue_rejects_remaining_due_arrivals() {
        let config = config(SchedulerKind::Fifo, 1, 100., 50.);
        let output = run(&config, reqs(&[(0., 10.), (1., 1.), (2., 1.)], 100.));
        let states: Vec<_> = output.requests.iter().map(Request::finish_state).collect();
        assert_eq!(
            states,
            vec![
                FinishState::FinishedSuccessfully,
                FinishState::FinishedSuccessfully,
                FinishState::RejectedAtAdmission,
            ]
        );
        assert_eq!(output.max_queue_len, 1);
    }

    #[test]
    fn test_failed_requeue_marks_partial_request_starved() {
        let config = config(SchedulerKind::RoundRobin { time_quantum: 2. }, 1, 100., 50.);
        let output = run(&config, reqs(&[(0., 5.), (1., 1.)], 100.));
        let first = &output.requests[0];
        assert_eq!(first.finish_state(), FinishState::StarvedAtQueue);
        assert_eq!(first.start_processing_time(), Some(0.));
        assert_eq!(first.end_processing_time(), None);

        let second = &output.requests[1];
        assert_eq!(second.start_processing_time(), Some(2.));
        assert_eq!(second.end_processing_time(), Some(3.));
    }

    #[test]
    fn test_queued_requests_at_horizon_are_incomplete() {
        let config = config(SchedulerKind::Fifo, 10, 100., 3.);
        let output = run(&config, reqs(&[(0., 5.), (0., 1.), (0., 1.)], 100.));
        let states: Vec<_> = output.requests.iter().map(Request::finish_state).collect();
        assert_eq!(
            states,
            vec![
                FinishState::FinishedSuccessfully,
                FinishState::Incomplete,
                FinishState::Incomplete,
            ]
        );
        assert_eq!(output.final_time, 5.);
    }

    #[test]
    fn test_in_flight_request_at_horizon_is_incomplete() {
        let config = config(SchedulerKind::RoundRobin { time_quantum: 2. }, 10, 100., 3.);
        let output = run(&config, reqs(&[(0., 5.)], 100.));
        let req = &output.requests[0];
        assert_eq!(req.finish_state(), FinishState::Incomplete);
        assert_eq!(req.remaining_processing_time(), Some(1.));
        assert_eq!(req.start_processing_time(), Some(0.));
        assert_eq!(output.final_time, 4.);
    }

    #[test]
    fn test_arrivals_after_horizon_are_not_output() {
        let config = config(SchedulerKind::Fifo, 10, 100., 10.);
        let output = run(&config, reqs(&[(0., 1.), (20., 1.)], 100.));
        assert_eq!(output.requests.len(), 1);
        assert!(output.final_time >= 10. && output.final_time < 10.5);
    }

    #[test]
    fn test_zero_deadline_zero_wait_zero_service_succeeds() {
        let config = config(SchedulerKind::Fifo, 10, 0., 5.);
        let output = run(&config, reqs(&[(0., 0.), (0., 1.), (0., 0.)], 0.));
        let states: Vec<_> = output.requests.iter().map(Request::finish_state).collect();
        assert_eq!(
            states,
            vec![
                FinishState::FinishedSuccessfully,
                FinishState::FinishedAfterDeadline,
                FinishState::StarvedAtQueue,
            ]
        );
    }

    #[test]
    fn test_invalid_config_fails_before_running() {
        let config = SimulationConfig::new(SchedulerKind::Fifo, 0, 1.);
        assert!(matches!(simulate(&config), Err(SimError::Config(_))));
        assert!(simulate_round_robin(10, 1., -5.).is_err());
    }

    #[test]
    fn test_idle_step_below_clock_resolution_is_refused() {
        let config = SimulationConfig {
            idle_step: 1e-15,
            simulation_time: 100.,
            arrival_rate: 0.001,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            simulate(&config),
            Err(SimError::Config(ConfigError::IdleStep(_)))
        ));
    }
}
