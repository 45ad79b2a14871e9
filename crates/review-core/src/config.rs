use std::time::Duration;

use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

/// Configuration for a review poller instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PollerConfig {
    /// Homework statuses endpoint queried every cycle.
    pub endpoint: String,
    /// Fixed pause between cycles (default: 600s).
    pub retry_interval: Duration,
    /// HTTP request timeout for API calls and bot messages.
    pub request_timeout: Duration,
    /// Base URL of the Telegram Bot API.
    pub telegram_api: String,
    /// Unwrap `[{"homeworks": [...]}]` payloads before validation.
    pub accept_list_wrapped: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            retry_interval: Duration::from_secs(600),
            request_timeout: Duration::from_secs(10),
            telegram_api: DEFAULT_TELEGRAM_API.to_string(),
            accept_list_wrapped: false,
        }
    }
}

impl PollerConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_retry_interval(mut self, secs: u64) -> Self {
        self.retry_interval = Duration::from_secs(secs.max(1));
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout = Duration::from_secs(secs.max(1));
        self
    }

    pub fn with_telegram_api(mut self, base: impl Into<String>) -> Self {
        self.telegram_api = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_list_wrapped(mut self, enabled: bool) -> Self {
        self.accept_list_wrapped = enabled;
        self
    }

    /// Parses both configured URLs; only http(s) endpoints are accepted.
    pub fn validate(&self) -> Result<(), String> {
        for (name, raw) in [("endpoint", &self.endpoint), ("telegram_api", &self.telegram_api)] {
            let parsed = Url::parse(raw).map_err(|e| format!("invalid {name} URL '{raw}': {e}"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(format!("{name} URL '{raw}' must use http or https"));
            }
        }
        Ok(())
    }
}
