//! Here we expose prometheus metrics about the relay
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use prometheus::{Encoder, TextEncoder};

use crate::metrics::Metrics;

async fn metrics_handler(Extension(metrics): Extension<Metrics>) -> Response {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = metrics.registry().gather();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("failed to encode metrics: {err}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    ([(CONTENT_TYPE, encoder.format_type().to_owned())], buffer).into_response()
}

pub fn router(metrics: Metrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .layer(Extension(metrics))
}

pub async fn run_telemetry_endpoint(addr: SocketAddr, metrics: Metrics) -> Result<()> {
    tracing::info!("serving metrics on {addr}");

    axum::Server::try_bind(&addr)
        .context(format!("failed to bind telemetry endpoint to {addr}"))?
        .serve(router(metrics).into_make_service())
        .await
        .context("telemetry endpoint crashed")?;

    Ok(())
}
