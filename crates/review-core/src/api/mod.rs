mod http;

pub use http::{build_client, HttpApi};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ReviewError;

/// Trait for fetching homework statuses from the review service.
///
/// Implementations return the decoded JSON body untouched; shape checks are
/// left to the validator. Only `Transport`, `StatusCode` and (for undecodable
/// bodies) `Schema` errors come out of here.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Endpoint being polled, used in diagnostics.
    fn endpoint(&self) -> &str;

    async fn fetch_statuses(&self, from_date: i64) -> Result<Value, ReviewError>;
}
