use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::BytesRejection, Extension},
    http::{header::HOST, HeaderMap, Method, StatusCode, Uri},
    routing::any,
    Router,
};
use bytes::Bytes;
use thiserror::Error;

use crate::{
    alert::AlertGroupNotification,
    alert_renderer,
    metrics::{Metrics, Outcome},
    relay::{RelayError, WebhookRelay},
};

/// Error caused by the request itself. Answered with 400 Bad Request.
#[derive(Error, Debug)]
pub enum ReceiveError {
    #[error("failed to read request body")]
    Read(#[source] BytesRejection),
    #[error("failed to unmarshal request body")]
    Decode(#[source] serde_json::Error),
}

/// read only state shared by all requests
pub struct State {
    relay: WebhookRelay,
    debug: bool,
    metrics: Metrics,
}

impl State {
    pub fn new(relay: WebhookRelay, debug: bool, metrics: Metrics) -> Self {
        Self {
            relay,
            debug,
            metrics,
        }
    }

    /// decode the raw request body
    fn decode(&self, body: Result<Bytes, BytesRejection>) -> Result<AlertGroupNotification, ReceiveError> {
        let body = body.map_err(ReceiveError::Read)?;

        if self.debug {
            tracing::debug!(body = %String::from_utf8_lossy(&body), "received");
        }

        serde_json::from_slice(&body).map_err(ReceiveError::Decode)
    }

    /// render the alert group and hand it to the relay
    async fn forward(&self, notification: &AlertGroupNotification) -> Result<(), RelayError> {
        let message = alert_renderer::render(notification);
        self.relay.send(&message).await
    }
}

async fn prometheus_receiver(
    Extension(state): Extension<Arc<State>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> StatusCode {
    let host = headers
        .get(HOST)
        .and_then(|host| host.to_str().ok())
        .unwrap_or_default();

    tracing::info!(%method, host, path = uri.path(), "received alert notification");

    let notification = match state.decode(body) {
        Ok(notification) => notification,
        Err(err) => {
            let err = anyhow::Error::from(err);
            tracing::warn!("rejecting alert notification: {err:#}");
            state.metrics.record_outcome(Outcome::BadRequest);
            return StatusCode::BAD_REQUEST;
        }
    };

    match state.forward(&notification).await {
        Ok(()) => {
            tracing::info!(
                group_key = notification.group_key.as_str(),
                "successfully processed alert"
            );
            state.metrics.record_outcome(Outcome::Relayed);
            StatusCode::NO_CONTENT
        }
        Err(err) => {
            if let RelayError::Rejected { body, .. } = &err {
                tracing::debug!(%body, "webhook response");
            }
            let err = anyhow::Error::from(err);
            tracing::error!("failed to process alert: {err:#}");
            state.metrics.record_outcome(Outcome::RelayFailed);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// accepts any method on any path
pub fn router(state: Arc<State>) -> Router {
    Router::new()
        .route("/", any(prometheus_receiver))
        .route("/*path", any(prometheus_receiver))
        .layer(Extension(state))
}

pub async fn run_prometheus_receiver(addr: SocketAddr, state: Arc<State>) -> Result<()> {
    let app = router(state);

    let server = axum::Server::try_bind(&addr)
        .context(format!("failed to bind alertmanager receiver to {addr}"))?
        .serve(app.into_make_service());

    tracing::info!("listening for alerts on {}", server.local_addr());

    server
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {err}");
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("alertmanager receiver crashed")?;

    tracing::info!("shutting down");

    Ok(())
}
