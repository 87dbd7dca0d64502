//! Deadline rules shared by every scheduler.

use crate::queues::request::{FinishState, Request};

/// A request has starved once its wait strictly exceeds its deadline. Only
/// evaluated when the request is considered for dequeue, regardless of how
/// much Round-Robin service it already received.
pub fn has_starved_at_queue(request: &Request, now: f64) -> bool {
    request.waiting_time(now) > request.deadline()
}

pub fn met_deadline(arrival_time: f64, end_time: f64, deadline: f64) -> bool {
    end_time - arrival_time <= deadline
}

pub fn classify_served(arrival_time: f64, end_time: f64, deadline: f64) -> FinishState {
    if met_deadline(arrival_time, end_time, deadline) {
        FinishState::FinishedSuccessfully
    } else {
        FinishState::FinishedAfterDeadline
    }
}
