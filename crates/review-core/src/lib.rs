#![forbid(unsafe_code)]

pub mod api;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod error;
pub mod notify;
pub mod poller;

pub use api::{build_client, HomeworkApi, HttpApi};
pub use clock::{Clock, SystemClock};
pub use config::PollerConfig;
pub use credentials::{check_credentials, Credentials};
pub use error::ReviewError;
pub use notify::{Notifier, NotifyError, TelegramNotifier};
pub use poller::{
    failure_message, format_status, validate_response, CycleOutcome, HomeworkRecord,
    HomeworkStatus, LoopState, PollPhase, Poller, NO_STATUS,
};
