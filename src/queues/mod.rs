pub mod bounded_queue;
pub mod poisson_generator;
pub mod request;

pub use self::bounded_queue::{BoundedQueue, Discipline};
pub use self::poisson_generator::PoissonGenerator;
pub use self::request::{Completion, FinishState, Request, RequestId, RequestState};
