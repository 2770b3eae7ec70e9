//! Remote compile client: the optional first stage of the render pipeline.
//!
//! The service receives the markup source as the raw request body and answers with PDF
//! bytes. 429 and 5xx responses are retried once with a short backoff; the pipeline
//! wraps the whole exchange in its own stage timeout.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

const MAX_ATTEMPTS: u32 = 2;
const RETRY_BACKOFF_MS: u64 = 500;
const SOURCE_CONTENT_TYPE: &str = "application/x-latex";

#[derive(Debug, Error)]
pub enum ExternalServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Invalid response body: {0}")]
    InvalidBody(String),
}

/// A service that typesets markup source into a finished document.
#[async_trait]
pub trait RemoteCompiler: Send + Sync {
    async fn compile(&self, source: &str) -> Result<Bytes, ExternalServiceError>;

    /// Short label for logs.
    fn name(&self) -> &str;
}

/// HTTP implementation of `RemoteCompiler`.
#[derive(Clone)]
pub struct HttpCompileClient {
    client: Client,
    url: String,
}

impl HttpCompileClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ExternalServiceError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RemoteCompiler for HttpCompileClient {
    async fn compile(&self, source: &str) -> Result<Bytes, ExternalServiceError> {
        let mut last_error: Option<ExternalServiceError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = Duration::from_millis(RETRY_BACKOFF_MS * u64::from(attempt));
                warn!(
                    "Compile call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.url)
                .header("content-type", SOURCE_CONTENT_TYPE)
                .body(source.to_owned())
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(ExternalServiceError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if is_retryable(status.as_u16()) {
                let body = response.text().await.unwrap_or_default();
                warn!("Compile service returned {}: {}", status, body);
                last_error = Some(ExternalServiceError::Status {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(ExternalServiceError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.bytes().await?;
            debug!(bytes = body.len(), "Compile call succeeded");
            return Ok(body);
        }

        Err(last_error.unwrap_or(ExternalServiceError::Status {
            status: 0,
            message: "no attempt made".to_string(),
        }))
    }

    fn name(&self) -> &str {
        &self.url
    }
}

fn is_retryable(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}
