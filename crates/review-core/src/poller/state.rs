use crate::error::ReviewError;

/// Placeholder status text meaning "nothing observed". Also stands for
/// "no new statuses" when the API returns an empty list, so an empty cycle
/// can never trigger a notification.
pub const NO_STATUS: &str = "Status has not been updated";

/// Prefix of the diagnostic text relayed to the chat when a cycle fails.
pub const FAILURE_PREFIX: &str = "Program failure";

pub fn failure_message(error: &ReviewError) -> String {
    format!("{FAILURE_PREFIX}: {error}")
}

/// Where the poller currently is within its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Fetching,
    Validating,
    Notifying,
    Sleeping,
}

impl PollPhase {
    pub fn can_transition_to(self, target: PollPhase) -> bool {
        matches!(
            (self, target),
            (PollPhase::Idle, PollPhase::Fetching)
                | (PollPhase::Fetching, PollPhase::Validating)
                | (PollPhase::Fetching, PollPhase::Notifying)
                | (PollPhase::Fetching, PollPhase::Sleeping)
                | (PollPhase::Validating, PollPhase::Notifying)
                | (PollPhase::Validating, PollPhase::Sleeping)
                | (PollPhase::Notifying, PollPhase::Sleeping)
                | (PollPhase::Sleeping, PollPhase::Fetching)
                // one-shot cycles run back to back without sleeping
                | (
                    PollPhase::Fetching | PollPhase::Validating | PollPhase::Notifying,
                    PollPhase::Fetching
                )
        )
    }
}

impl std::fmt::Display for PollPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Fetching => write!(f, "fetching"),
            Self::Validating => write!(f, "validating"),
            Self::Notifying => write!(f, "notifying"),
            Self::Sleeping => write!(f, "sleeping"),
        }
    }
}

/// Texts last relayed to the chat, used to suppress repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopState {
    pub last_status: String,
    pub last_error: String,
}

impl Default for LoopState {
    fn default() -> Self {
        Self {
            last_status: NO_STATUS.to_string(),
            last_error: NO_STATUS.to_string(),
        }
    }
}

impl LoopState {
    /// A status message is worth sending when it is real and differs from the
    /// last one delivered.
    pub fn is_new_status(&self, message: &str) -> bool {
        message != NO_STATUS && message != self.last_status
    }

    pub fn is_new_error(&self, message: &str) -> bool {
        message != self.last_error
    }
}

/// Result of a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The API returned an empty `homeworks` list.
    NoNewStatuses,
    /// The latest status matches what was last delivered.
    Unchanged,
    /// A new status message was produced; `delivered` is false when the bot
    /// call failed.
    Notified { message: String, delivered: bool },
    /// The cycle failed; `reported` is true when the diagnostic was relayed.
    Failed { error: ReviewError, reported: bool },
}

impl CycleOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// False when the cycle failed or a new status could not be delivered.
    pub fn is_success(&self) -> bool {
        !matches!(
            self,
            Self::Failed { .. } | Self::Notified { delivered: false, .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_starts_at_sentinel() {
        let state = LoopState::default();
        assert_eq!(state.last_status, NO_STATUS);
        assert_eq!(state.last_error, NO_STATUS);
    }

    #[test]
    fn sentinel_is_never_a_new_status() {
        let mut state = LoopState::default();
        assert!(!state.is_new_status(NO_STATUS));
        state.last_status = "Changed review status of \"p\". x".into();
        assert!(!state.is_new_status(NO_STATUS));
    }

    #[test]
    fn repeated_status_is_not_new() {
        let mut state = LoopState::default();
        assert!(state.is_new_status("a"));
        state.last_status = "a".into();
        assert!(!state.is_new_status("a"));
        assert!(state.is_new_status("b"));
    }

    #[test]
    fn failure_message_has_prefix() {
        let msg = failure_message(&ReviewError::schema("missing homeworks key"));
        assert_eq!(msg, "Program failure: invalid API response: missing homeworks key");
    }

    #[test]
    fn undelivered_status_is_not_a_success() {
        assert!(CycleOutcome::NoNewStatuses.is_success());
        assert!(CycleOutcome::Unchanged.is_success());
        let sent = CycleOutcome::Notified { message: "m".into(), delivered: true };
        assert!(sent.is_success());
        let unsent = CycleOutcome::Notified { message: "m".into(), delivered: false };
        assert!(!unsent.is_success());
        assert!(!unsent.is_failure());
        let failed = CycleOutcome::Failed { error: ReviewError::schema("x"), reported: true };
        assert!(!failed.is_success());
    }

    #[test]
    fn phase_transitions() {
        assert!(PollPhase::Idle.can_transition_to(PollPhase::Fetching));
        assert!(PollPhase::Sleeping.can_transition_to(PollPhase::Fetching));
        assert!(PollPhase::Fetching.can_transition_to(PollPhase::Notifying));
        assert!(!PollPhase::Idle.can_transition_to(PollPhase::Notifying));
        assert!(PollPhase::Notifying.can_transition_to(PollPhase::Fetching));
        assert!(!PollPhase::Sleeping.can_transition_to(PollPhase::Idle));
        assert!(!PollPhase::Notifying.can_transition_to(PollPhase::Validating));
    }
}
