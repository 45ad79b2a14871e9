use std::future::Future;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::api::HomeworkApi;
use crate::clock::{Clock, SystemClock};
use crate::config::PollerConfig;
use crate::error::ReviewError;
use crate::notify::Notifier;
use crate::poller::state::{failure_message, CycleOutcome, LoopState, PollPhase};
use crate::poller::status::{format_status, HomeworkRecord};
use crate::poller::validate::{unwrap_list_wrapped, validate_response};

/// Polls the review API and relays status changes to the chat.
///
/// Cycles run strictly one after another. Every failure inside a cycle is
/// caught, logged and relayed once; nothing escapes [`Poller::run`].
pub struct Poller {
    config: PollerConfig,
    api: Arc<dyn HomeworkApi>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    state: LoopState,
    phase: PollPhase,
    cycles: u64,
}

impl Poller {
    pub fn new(config: PollerConfig, api: Arc<dyn HomeworkApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            api,
            notifier,
            clock: Arc::new(SystemClock),
            state: LoopState::default(),
            phase: PollPhase::Idle,
            cycles: 0,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    /// Number of cycles started so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Polls forever, pausing `retry_interval` after every cycle, until
    /// `shutdown` resolves.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) {
        info!(
            endpoint = self.api.endpoint(),
            interval_secs = self.config.retry_interval.as_secs(),
            "Starting review poller"
        );
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = self.cycle_and_wait() => {}
            }
        }

        info!(cycles = self.cycles, "Review poller stopped");
    }

    async fn cycle_and_wait(&mut self) {
        let outcome = self.run_cycle().await;
        debug!(cycle = self.cycles, ?outcome, "Cycle finished");
        self.set_phase(PollPhase::Sleeping);
        self.clock.sleep(self.config.retry_interval).await;
    }

    /// Runs one fetch/validate/notify cycle without the trailing sleep.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.cycles += 1;
        match self.check_statuses().await {
            Ok(outcome) => outcome,
            Err(error) => self.report_failure(error).await,
        }
    }

    async fn check_statuses(&mut self) -> Result<CycleOutcome, ReviewError> {
        self.set_phase(PollPhase::Fetching);
        let from_date = self.clock.now_epoch();
        let raw = self.api.fetch_statuses(from_date).await?;

        self.set_phase(PollPhase::Validating);
        let payload = if self.config.accept_list_wrapped {
            unwrap_list_wrapped(&raw)
        } else {
            &raw
        };
        let homeworks = validate_response(payload)?;

        let Some(latest) = homeworks.first() else {
            debug!(from_date, "No new statuses");
            return Ok(CycleOutcome::NoNewStatuses);
        };
        let message = format_status(&HomeworkRecord::from_value(latest)?)?;

        if !self.state.is_new_status(&message) {
            debug!(text = %message, "Status unchanged");
            return Ok(CycleOutcome::Unchanged);
        }

        self.set_phase(PollPhase::Notifying);
        let delivered = self.deliver(&message).await;
        if delivered {
            self.state.last_status = message.clone();
        }
        Ok(CycleOutcome::Notified { message, delivered })
    }

    async fn report_failure(&mut self, error: ReviewError) -> CycleOutcome {
        let message = failure_message(&error);
        error!(cycle = self.cycles, error = %error, "{message}");

        if !self.state.is_new_error(&message) {
            debug!("Failure already reported, not relaying again");
            return CycleOutcome::Failed { error, reported: false };
        }

        self.set_phase(PollPhase::Notifying);
        let reported = self.deliver(&message).await;
        if reported {
            self.state.last_error = message;
        }
        CycleOutcome::Failed { error, reported }
    }

    async fn deliver(&self, text: &str) -> bool {
        match self.notifier.send_message(text).await {
            Ok(()) => {
                info!(text, "Message sent");
                true
            }
            Err(e) => {
                error!(error = %e, text, "Message not sent");
                false
            }
        }
    }

    fn set_phase(&mut self, next: PollPhase) {
        if !self.phase.can_transition_to(next) {
            warn!(from = %self.phase, to = %next, "Unexpected poller phase transition");
        }
        debug!(from = %self.phase, to = %next, "Poller phase");
        self.phase = next;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::notify::NotifyError;

    struct FixedApi(Value);

    #[async_trait]
    impl HomeworkApi for FixedApi {
        fn endpoint(&self) -> &str {
            "https://api.example.com/statuses/"
        }

        async fn fetch_statuses(&self, _from_date: i64) -> Result<Value, ReviewError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    #[async_trait]
    impl Notifier for Recorder {
        async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn poller(payload: Value, config: PollerConfig) -> (Poller, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let poller = Poller::new(config, Arc::new(FixedApi(payload)), recorder.clone());
        (poller, recorder)
    }

    #[tokio::test]
    async fn list_wrapped_payload_rejected_by_default() {
        let payload = json!([{"homeworks": [{"status": "approved", "homework_name": "p"}]}]);
        let (mut p, _) = poller(payload, PollerConfig::default());
        match p.run_cycle().await {
            CycleOutcome::Failed { error, reported } => {
                assert_eq!(error, ReviewError::schema("unexpected response type"));
                assert!(reported);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_wrapped_payload_accepted_when_enabled() {
        let payload = json!([{"homeworks": [{"status": "approved", "homework_name": "p"}]}]);
        let (mut p, recorder) = poller(payload, PollerConfig::default().with_list_wrapped(true));
        assert!(matches!(p.run_cycle().await, CycleOutcome::Notified { delivered: true, .. }));
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn phase_walks_through_cycle() {
        let (mut p, _) = poller(json!({"homeworks": []}), PollerConfig::default());
        assert_eq!(p.phase(), PollPhase::Idle);
        p.run_cycle().await;
        assert_eq!(p.phase(), PollPhase::Validating);
        assert_eq!(p.cycles(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_sleeps_retry_interval_between_cycles() {
        let config = PollerConfig::default().with_retry_interval(600);
        let (mut p, recorder) = poller(
            json!({"homeworks": [{"status": "reviewing", "homework_name": "p"}]}),
            config,
        );

        // Cycles start at t=0, 600 and 1200.
        p.run(tokio::time::sleep(Duration::from_secs(1250))).await;

        assert_eq!(p.cycles(), 3);
        assert_eq!(p.phase(), PollPhase::Sleeping);
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }
}
