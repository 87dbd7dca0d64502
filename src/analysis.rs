//! Aggregates over finished runs. Only the public record fields are used.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::config::SimulationConfig;
use crate::queues::request::{FinishState, Request};
use crate::simulation::SimulationOutput;

/// Successful requests over terminal requests. Requests still queued or in
/// service at the horizon do not count. Returns 0 when nothing terminated.
pub fn success_ratio(requests: &[Request]) -> f64 {
    let terminal = requests.iter().filter(|r| r.is_terminal()).count();
    if terminal == 0 {
        return 0.;
    }
    let successful = count_state(requests, FinishState::FinishedSuccessfully);
    successful as f64 / terminal as f64
}

fn successful_values<F>(requests: &[Request], value: F) -> Vec<f64>
where
    F: Fn(&Request) -> Option<f64>,
{
    requests
        .iter()
        .filter(|r| r.finish_state() == FinishState::FinishedSuccessfully)
        .filter_map(value)
        .collect()
}

/// Mean of `end - start` over successful requests.
pub fn average_processing_time(requests: &[Request]) -> f64 {
    let spans = successful_values(requests, Request::service_span);
    if spans.is_empty() {
        return 0.;
    }
    statistical::mean(&spans)
}

/// Mean of `end - arrival` over successful requests.
pub fn average_latency(requests: &[Request]) -> f64 {
    let latencies = successful_values(requests, Request::latency);
    if latencies.is_empty() {
        return 0.;
    }
    statistical::mean(&latencies)
}

pub fn latency_std_dev(requests: &[Request]) -> f64 {
    let latencies = successful_values(requests, Request::latency);
    if latencies.len() < 2 {
        return 0.;
    }
    statistical::standard_deviation(&latencies, None)
}

/// Arrival counts bucketed by the integer part of the arrival time.
pub fn requests_over_time(requests: &[Request]) -> BTreeMap<i64, usize> {
    let mut buckets = BTreeMap::new();
    for req in requests {
        *buckets.entry(req.arrival_time().trunc() as i64).or_insert(0) += 1;
    }
    buckets
}

pub fn count_state(requests: &[Request], state: FinishState) -> usize {
    requests.iter().filter(|r| r.finish_state() == state).count()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StateCounts {
    pub finished_successfully: usize,
    pub finished_after_deadline: usize,
    pub starved_at_queue: usize,
    pub rejected_at_admission: usize,
    pub incomplete: usize,
}

impl StateCounts {
    pub fn tally(requests: &[Request]) -> Self {
        let mut counts = StateCounts::default();
        for req in requests {
            let slot = match req.finish_state() {
                FinishState::FinishedSuccessfully => &mut counts.finished_successfully,
                FinishState::FinishedAfterDeadline => &mut counts.finished_after_deadline,
                FinishState::StarvedAtQueue => &mut counts.starved_at_queue,
                FinishState::RejectedAtAdmission => &mut counts.rejected_at_admission,
                FinishState::Incomplete => &mut counts.incomplete,
            };
            *slot += 1;
        }
        counts
    }

    pub fn terminal(&self) -> usize {
        self.finished_successfully + self.finished_after_deadline + self.starved_at_queue + self.rejected_at_admission
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub scheduler: &'static str,
    pub arrival_rate: f64,
    pub max_queue_size: usize,
    pub time_quantum: Option<f64>,
    pub total_requests: usize,
    pub counts: StateCounts,
    pub success_ratio: f64,
    pub average_processing_time: f64,
    pub average_latency: f64,
    pub latency_std_dev: f64,
    pub max_queue_len: usize,
    pub final_time: f64,
}

impl RunSummary {
    pub fn new(config: &SimulationConfig, output: &SimulationOutput) -> Self {
        let requests = &output.requests;
        RunSummary {
            scheduler: output.scheduler,
            arrival_rate: config.arrival_rate,
            max_queue_size: config.max_queue_size,
            time_quantum: config.scheduler.time_quantum(),
            total_requests: requests.len(),
            counts: StateCounts::tally(requests),
            success_ratio: success_ratio(requests),
            average_processing_time: average_processing_time(requests),
            average_latency: average_latency(requests),
            latency_std_dev: latency_std_dev(requests),
            max_queue_len: output.max_queue_len,
            final_time: output.final_time,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "arrival_rate={}, max_queue_size={}", self.arrival_rate, self.max_queue_size)?;
        if let Some(quantum) = self.time_quantum {
            write!(f, ", time_quantum={}", quantum)?;
        }
        write!(f, ": {:.2}%", self.success_ratio * 100.)
    }
}
