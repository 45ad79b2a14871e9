use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::HomeworkApi;
use crate::config::PollerConfig;
use crate::error::{error_chain, ReviewError};

/// Shared HTTP client for the review API and the bot.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(5))
        .gzip(true)
        .build()
}

/// Review API client authenticated with an OAuth token.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    endpoint: String,
    token: String,
}

impl HttpApi {
    pub fn new(client: Client, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    pub fn from_config(config: &PollerConfig, client: Client, token: impl Into<String>) -> Self {
        Self::new(client, config.endpoint.clone(), token)
    }

    // The URL is reported separately; keep the query string out of the reason.
    fn transport_error(&self, e: reqwest::Error) -> ReviewError {
        ReviewError::Transport {
            url: self.endpoint.clone(),
            reason: error_chain(&e.without_url()),
        }
    }
}

#[async_trait]
impl HomeworkApi for HttpApi {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_statuses(&self, from_date: i64) -> Result<Value, ReviewError> {
        debug!(endpoint = %self.endpoint, from_date, "Requesting homework statuses");

        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %self.endpoint, error = %e, "Homework API request failed");
                self.transport_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, status = status.as_u16(), "Homework API returned error status");
            return Err(ReviewError::StatusCode {
                url: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&body)
            .map_err(|e| ReviewError::schema(format!("response body is not valid JSON ({e})")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> HttpApi {
        let client = build_client(Duration::from_secs(5)).unwrap();
        HttpApi::new(client, format!("{}/homework_statuses/", server.uri()), "pr-token")
    }

    #[tokio::test]
    async fn fetch_sends_oauth_header_and_from_date() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/homework_statuses/"))
            .and(header("Authorization", "OAuth pr-token"))
            .and(query_param("from_date", "1700000000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "homeworks": [{"status": "approved", "homework_name": "proj1"}],
                "current_date": 1700000100
            })))
            .expect(1)
            .mount(&server)
            .await;

        let body = api_for(&server).fetch_statuses(1_700_000_000).await.unwrap();
        assert_eq!(body["homeworks"][0]["homework_name"], "proj1");
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let api = api_for(&server);
        let err = api.fetch_statuses(0).await.unwrap_err();
        assert_eq!(err.status_code(), Some(503));
        assert!(err.to_string().contains(api.endpoint()));
    }

    #[tokio::test]
    async fn client_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let err = api_for(&server).fetch_statuses(0).await.unwrap_err();
        assert!(matches!(err, ReviewError::StatusCode { status: 401, .. }));
    }

    #[tokio::test]
    async fn garbage_body_is_a_schema_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = api_for(&server).fetch_statuses(0).await.unwrap_err();
        assert!(matches!(err, ReviewError::Schema(_)));
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_error() {
        // Nothing listens on the discard port.
        let client = build_client(Duration::from_secs(2)).unwrap();
        let api = HttpApi::new(client, "http://127.0.0.1:9/homework_statuses/", "pr-token");

        let err = api.fetch_statuses(0).await.unwrap_err();
        match err {
            ReviewError::Transport { url, reason } => {
                assert_eq!(url, "http://127.0.0.1:9/homework_statuses/");
                assert!(reason.starts_with("error sending request: "), "{reason}");
                assert!(reason.to_lowercase().contains("refused"), "{reason}");
                assert!(!reason.contains("from_date"));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connect_and_dns_failures_are_told_apart() {
        let client = build_client(Duration::from_secs(2)).unwrap();
        let refused = HttpApi::new(client.clone(), "http://127.0.0.1:9/homework_statuses/", "pr-token")
            .fetch_statuses(0)
            .await
            .unwrap_err();
        let unresolved = HttpApi::new(client, "http://nonexistent.invalid/homework_statuses/", "pr-token")
            .fetch_statuses(0)
            .await
            .unwrap_err();

        let reason = |err: &ReviewError| match err {
            ReviewError::Transport { reason, .. } => reason.clone(),
            other => panic!("expected transport error, got {other:?}"),
        };
        assert_ne!(reason(&refused), reason(&unresolved));
    }
}
