//! Credential loading and the startup gate.

use std::fmt;

use tracing::error;

pub const API_TOKEN_VAR: &str = "PR_TOKEN";
pub const BOT_TOKEN_VAR: &str = "TG_TOKEN";
pub const CHAT_ID_VAR: &str = "TG_CHAT_ID";

/// The three secrets the poller needs. Missing values are stored as empty
/// strings so the gate can report every absent one at once.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_token: String,
    pub bot_token: String,
    pub chat_id: String,
}

impl Credentials {
    pub fn new(
        api_token: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            api_token: api_token.into(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Reads `PR_TOKEN`, `TG_TOKEN` and `TG_CHAT_ID` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).unwrap_or_default();
        Self {
            api_token: read(API_TOKEN_VAR),
            bot_token: read(BOT_TOKEN_VAR),
            chat_id: read(CHAT_ID_VAR),
        }
    }

    /// Names of the environment variables whose value is empty.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (API_TOKEN_VAR, &self.api_token),
            (BOT_TOKEN_VAR, &self.bot_token),
            (CHAT_ID_VAR, &self.chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

// Tokens never reach the logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_token", &redact(&self.api_token))
            .field("bot_token", &redact(&self.bot_token))
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<missing>"
    } else {
        "<redacted>"
    }
}

/// Returns true when every credential is present. Each missing one is logged
/// at the highest severity; callers must abort startup on `false`.
pub fn check_credentials(credentials: &Credentials) -> bool {
    let missing = credentials.missing();
    for name in &missing {
        error!(critical = true, variable = *name, "Required environment variable is missing");
    }
    missing.is_empty()
}
