//! HTTP client with request timeout and retry/backoff.

mod user_agent;

pub use user_agent::{resolve_user_agent, USER_AGENT};

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::ScrapeError;

/// HTTP client used for both upstream sources.
///
/// Every request is bounded by the configured timeout. Transport failures,
/// timeouts and 5xx/429 responses are retried up to `retries` times, waiting
/// `backoff`, then twice that, and so on between attempts.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    retries: u32,
    backoff: Duration,
}

impl HttpClient {
    /// Create a new HTTP client with the default user agent.
    pub fn new(timeout: Duration, retries: u32, backoff: Duration) -> Result<Self, ScrapeError> {
        Self::with_user_agent(timeout, retries, backoff, None)
    }

    /// Create a new HTTP client with custom user agent configuration.
    pub fn with_user_agent(
        timeout: Duration,
        retries: u32,
        backoff: Duration,
        user_agent_config: Option<&str>,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .user_agent(resolve_user_agent(user_agent_config))
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            retries,
            backoff,
        })
    }

    /// GET a URL and return the body as text.
    pub async fn get_text(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self.get(url).await?;
        response.text().await.map_err(|e| classify(url, e))
    }

    /// GET a URL and decode the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ScrapeError> {
        let body = self.get_text(url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET with retries. Returns the first successful response, or the last
    /// error once attempts are exhausted. Non-retryable statuses fail at once.
    async fn get(&self, url: &str) -> Result<Response, ScrapeError> {
        let mut attempt = 0u32;
        loop {
            debug!("GET {} (attempt {})", url, attempt + 1);

            let result = match self.client.get(url).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let err = ScrapeError::UpstreamStatus {
                        url: url.to_string(),
                        status: status.as_u16(),
                    };
                    if !is_retryable_status(status) {
                        return Err(err);
                    }
                    err
                }
                Err(e) => classify(url, e),
            };

            if attempt >= self.retries {
                return Err(result);
            }

            let delay = backoff_delay(self.backoff, attempt);
            warn!("{}; retrying in {:?}", result, delay);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

fn classify(url: &str, e: reqwest::Error) -> ScrapeError {
    if e.is_timeout() {
        ScrapeError::Timeout {
            url: url.to_string(),
        }
    } else {
        ScrapeError::Http(e)
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Delay before retry number `attempt + 1`: `base * 2^attempt`.
pub(crate) fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{http::StatusCode as AxumStatus, routing::get, Router};

    #[test]
    fn test_backoff_doubles() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(100));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(200));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(800));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
    }

    /// Serve a route that fails with 503 for the first `failures` requests.
    async fn flaky_server(failures: usize) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/data",
            get(move || {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    if n < failures {
                        (AxumStatus::SERVICE_UNAVAILABLE, "busy".to_string())
                    } else {
                        (AxumStatus::OK, r#"{"ok":true}"#.to_string())
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/data", addr), hits)
    }

    fn client(retries: u32) -> HttpClient {
        HttpClient::new(Duration::from_secs(5), retries, Duration::from_millis(1)).unwrap()
    }

    #[tokio::test]
    async fn test_single_retry_recovers() {
        let (url, hits) = flaky_server(1).await;

        let body: serde_json::Value = client(1).get_json(&url).await.unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let (url, hits) = flaky_server(5).await;

        let err = client(1).get_text(&url).await.unwrap_err();
        assert!(matches!(err, ScrapeError::UpstreamStatus { status: 503, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let (url, hits) = flaky_server(0).await;
        let missing = url.replace("/data", "/missing");

        let err = client(3).get_text(&missing).await.unwrap_err();
        assert!(matches!(err, ScrapeError::UpstreamStatus { status: 404, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
