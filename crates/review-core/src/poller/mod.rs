pub mod engine;
pub mod state;
pub mod status;
pub mod validate;

pub use engine::Poller;
pub use state::{failure_message, CycleOutcome, LoopState, PollPhase, NO_STATUS};
pub use status::{format_status, HomeworkRecord, HomeworkStatus};
pub use validate::{unwrap_list_wrapped, validate_response};
