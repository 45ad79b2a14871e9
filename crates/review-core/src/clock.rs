use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

/// Source of wall-clock time and the pause between cycles.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current time as Unix epoch seconds.
    fn now_epoch(&self) -> i64;

    async fn sleep(&self, duration: Duration);
}

/// Real time: `chrono` for timestamps, the tokio timer for sleeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now_epoch(&self) -> i64 {
        Utc::now().timestamp()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
