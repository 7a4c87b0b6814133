//! prometheus alertmanager receiver that relays alert groups into a discord webhook
//!
//! Features:
//! - renders every alert group into a single discord embed, colored by status
//! - exactly one webhook request per alert group, failures are reported back to alertmanager
//! - optional prometheus telemetry endpoint

use std::sync::Arc;

use anyhow::{Context, Result};
use settings::Settings;

use crate::{alertmanager_webhook_receiver::State, metrics::Metrics, relay::WebhookRelay};

mod alert;
mod alert_renderer;
mod alertmanager_webhook_receiver;
mod discord;
mod log;
mod metrics;
mod relay;
mod settings;
mod telemetry_endpoint;

/// exit the complete program if one thread panics
fn setup_panic_handler() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_panic(info);
        std::process::exit(1);
    }));
}

/// the entry point of the program
#[tokio::main]
pub async fn main() -> Result<()> {
    setup_panic_handler();

    // tracing isn't set up before the settings are loaded, errors end up on stderr via main's result
    let settings = Settings::load().context("failed to load config and command line arguments")?;

    log::setup_logging(&settings).context("could not setup logging")?;

    let metrics = Metrics::new().context("failed to register metrics")?;

    let relay = WebhookRelay::new(
        settings.webhook.clone(),
        settings.timeout,
        settings.debug,
        metrics.clone(),
    )
    .context("failed to construct webhook client")?;

    tracing::info!(
        host = relay.webhook().host_str().unwrap_or_default(),
        timeout = ?settings.timeout,
        "relaying alerts to discord webhook"
    );

    if let Some(addr) = settings.metrics_listen {
        let metrics = metrics.clone();
        tokio::spawn(async move {
            #[allow(clippy::expect_used)]
            telemetry_endpoint::run_telemetry_endpoint(addr, metrics)
                .await
                .expect("telemetry endpoint failed to start or crashed");
        });
    }

    let state = Arc::new(State::new(relay, settings.debug, metrics));

    alertmanager_webhook_receiver::run_prometheus_receiver(settings.listen, state)
        .await
        .context("prometheus alertmanager receiver endpoint failed to start or crashed")
}
