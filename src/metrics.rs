//! prometheus meters for the receiver and the relay

use prometheus::{
	exponential_buckets, histogram_opts, opts, Histogram, IntCounterVec, Registry,
};

/// namespace of all meters
const NAMESPACE: &str = "alertmanager_discord";

/// final state of a received notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	/// body unreadable or not an alert group
	BadRequest,
	/// rendered but the relay failed
	RelayFailed,
	/// accepted by discord
	Relayed,
}

impl Outcome {
	fn as_str(self) -> &'static str {
		match self {
			Outcome::BadRequest => "bad_request",
			Outcome::RelayFailed => "relay_failed",
			Outcome::Relayed => "relayed",
		}
	}
}

#[derive(Debug, Clone)]
/// meters registered on a registry owned by the process
pub struct Metrics {
	registry: Registry,
	/// received notifications by outcome
	received: IntCounterVec,
	/// time spent waiting for discord
	relay_duration: Histogram,
}

impl Metrics {
	/// construct meters and register them on a fresh registry
	pub fn new() -> Result<Self, prometheus::Error> {
		let registry = Registry::new();

		let received = IntCounterVec::new(
			opts!("received_notifications_total", "total number of received alert group notifications")
				.namespace(NAMESPACE)
				.subsystem("alertmanager_webhook"),
			&["outcome"],
		)?;

		let relay_duration = Histogram::with_opts(
			histogram_opts!(
				"duration_seconds",
				"time of a discord webhook request in seconds",
				exponential_buckets(0.01, 2., 12)?
			)
			.namespace(NAMESPACE)
			.subsystem("relay"),
		)?;

		registry.register(Box::new(received.clone()))?;
		registry.register(Box::new(relay_duration.clone()))?;

		Ok(Self { registry, received, relay_duration })
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	pub fn record_outcome(&self, outcome: Outcome) {
		self.received.with_label_values(&[outcome.as_str()]).inc();
	}

	pub fn relay_duration(&self) -> &Histogram {
		&self.relay_duration
	}

	#[cfg(test)]
	pub fn outcome_count(&self, outcome: Outcome) -> u64 {
		self.received.with_label_values(&[outcome.as_str()]).get()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn outcomes_are_counted_separately() {
		let metrics = Metrics::new().unwrap();

		metrics.record_outcome(Outcome::Relayed);
		metrics.record_outcome(Outcome::Relayed);
		metrics.record_outcome(Outcome::BadRequest);

		assert_eq!(metrics.outcome_count(Outcome::Relayed), 2);
		assert_eq!(metrics.outcome_count(Outcome::BadRequest), 1);
		assert_eq!(metrics.outcome_count(Outcome::RelayFailed), 0);
	}

	#[test]
	fn registries_are_independent() {
		let first = Metrics::new().unwrap();
		let second = Metrics::new().unwrap();

		first.record_outcome(Outcome::RelayFailed);

		assert_eq!(second.outcome_count(Outcome::RelayFailed), 0);
		assert!(!first.registry().gather().is_empty());
	}
}
