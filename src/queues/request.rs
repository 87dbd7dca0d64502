use std::fmt;

use serde::{Deserialize, Serialize};

use crate::deadline;

pub type RequestId = u64;

/// Classification handed to analysis. `Incomplete` covers requests still
/// queued or mid-service when the horizon elapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishState {
    FinishedSuccessfully,
    FinishedAfterDeadline,
    StarvedAtQueue,
    RejectedAtAdmission,
    Incomplete,
}

impl FinishState {
    pub fn is_terminal(self) -> bool {
        self != FinishState::Incomplete
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FinishState::FinishedSuccessfully => "FINISHED_SUCCESSFULLY",
            FinishState::FinishedAfterDeadline => "FINISHED_AFTER_DEADLINE",
            FinishState::StarvedAtQueue => "STARVED_AT_QUEUE",
            FinishState::RejectedAtAdmission => "REJECTED_AT_ADMISSION",
            FinishState::Incomplete => "INCOMPLETE",
        }
    }
}

impl fmt::Display for FinishState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a request left the system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Completion {
    /// Fully serviced. `end` is the instant the last burst finished.
    Served { start: f64, end: f64 },
    /// Discarded because its wait exceeded the deadline. `start` is set when
    /// Round-Robin had already granted it some service.
    Starved { start: Option<f64> },
    /// Queue was full when it arrived.
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RequestState {
    Pending,
    InService { start: f64, remaining: f64 },
    Completed(Completion),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    id: RequestId,
    arrival_time: f64,
    processing_time: f64,
    deadline: f64,
    state: RequestState,
}

impl Request {
    pub fn new(id: RequestId, arrival_time: f64, processing_time: f64, deadline: f64) -> Self {
        Request {
            id,
            arrival_time,
            processing_time,
            deadline,
            state: RequestState::Pending,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    pub fn processing_time(&self) -> f64 {
        self.processing_time
    }

    pub fn deadline(&self) -> f64 {
        self.deadline
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn start_processing_time(&self) -> Option<f64> {
        match self.state {
            RequestState::Pending => None,
            RequestState::InService { start, .. } => Some(start),
            RequestState::Completed(Completion::Served { start, .. }) => Some(start),
            RequestState::Completed(Completion::Starved { start }) => start,
            RequestState::Completed(Completion::Rejected) => None,
        }
    }

    pub fn end_processing_time(&self) -> Option<f64> {
        match self.state {
            RequestState::Completed(Completion::Served { end, .. }) => Some(end),
            _ => None,
        }
    }

    /// Only meaningful between the first burst and completion.
    pub fn remaining_processing_time(&self) -> Option<f64> {
        match self.state {
            RequestState::InService { remaining, .. } => Some(remaining),
            _ => None,
        }
    }

    pub fn finish_state(&self) -> FinishState {
        match self.state {
            RequestState::Pending | RequestState::InService { .. } => FinishState::Incomplete,
            RequestState::Completed(Completion::Served { end, .. }) => {
                deadline::classify_served(self.arrival_time, end, self.deadline)
            }
            RequestState::Completed(Completion::Starved { .. }) => FinishState::StarvedAtQueue,
            RequestState::Completed(Completion::Rejected) => FinishState::RejectedAtAdmission,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, RequestState::Completed(_))
    }

    /// Arrival to completion, for served requests.
    pub fn latency(&self) -> Option<f64> {
        self.end_processing_time().map(|end| end - self.arrival_time)
    }

    /// First burst to completion, for served requests.
    pub fn service_span(&self) -> Option<f64> {
        match self.state {
            RequestState::Completed(Completion::Served { start, end }) => Some(end - start),
            _ => None,
        }
    }

    pub fn waiting_time(&self, now: f64) -> f64 {
        now - self.arrival_time
    }

    /// Moves a pending request into service at `now` and returns the
    /// service time still owed. Requests already in service keep their
    /// original start.
    pub fn begin_service(&mut self, now: f64) -> f64 {
        match self.state {
            RequestState::Pending => {
                self.state = RequestState::InService {
                    start: now,
                    remaining: self.processing_time,
                };
                self.processing_time
            }
            RequestState::InService { remaining, .. } => remaining,
            RequestState::Completed(_) => 0.,
        }
    }

    /// Renders `burst` of service starting at `now`. Returns true once the
    /// remaining time hits zero, at which point the request is served.
    pub fn apply_burst(&mut self, burst: f64, now: f64) -> bool {
        if let RequestState::InService { start, remaining } = self.state {
            let remaining = remaining - burst;
            if remaining == 0. {
                self.state = RequestState::Completed(Completion::Served {
                    start,
                    end: now + burst,
                });
                return true;
            }
            self.state = RequestState::InService { start, remaining };
        }
        false
    }

    pub fn mark_starved(&mut self) {
        let start = self.start_processing_time();
        self.state = RequestState::Completed(Completion::Starved { start });
    }

    pub fn mark_rejected(&mut self) {
        self.state = RequestState::Completed(Completion::Rejected);
    }
}
