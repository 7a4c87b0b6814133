//! Posts rendered messages to the discord webhook.

use std::time::Duration;

use http::{header::CONTENT_TYPE, StatusCode};
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::metrics::Metrics;

/// Error occuring while relaying a message to the webhook
#[derive(Error, Debug)]
pub enum RelayError {
    /// the message couldn't be serialized, nothing was sent
    #[error("failed to marshal request body")]
    Marshal(#[source] serde_json::Error),
    /// the webhook couldn't be reached or didn't answer in time
    #[error("failed to send webhook request")]
    Transport(#[source] reqwest::Error),
    /// the webhook answered with something other than 204 No Content
    #[error("webhook rejected request: {status}")]
    Rejected { status: StatusCode, body: String },
}

#[derive(Debug, Clone)]
/// Client for a single discord webhook. Every message is sent exactly once.
pub struct WebhookRelay {
    client: reqwest::Client,
    webhook: Url,
    debug: bool,
    metrics: Metrics,
}

impl WebhookRelay {
    /// # Arguments
    ///
    /// * `webhook` - url of the discord webhook
    ///
    /// * `timeout` - upper bound for the whole request including reading the response
    ///
    /// * `debug` - log the outgoing request bodies
    pub fn new(
        webhook: Url,
        timeout: Duration,
        debug: bool,
        metrics: Metrics,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            webhook,
            debug,
            metrics,
        })
    }

    pub fn webhook(&self) -> &Url {
        &self.webhook
    }

    /// serialize `message` and post it to the webhook
    pub async fn send<T: Serialize + ?Sized>(&self, message: &T) -> Result<(), RelayError> {
        let body = serde_json::to_vec(message).map_err(RelayError::Marshal)?;

        if self.debug {
            tracing::debug!(
                body = %String::from_utf8_lossy(&body),
                "sending discord webhook request"
            );
        }

        let _timer = self.metrics.relay_duration().start_timer();

        let response = self
            .client
            .post(self.webhook.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(RelayError::Transport)?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            // the body only serves as a hint in the logs
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Rejected { status, body });
        }

        Ok(())
    }
}
