//! data structures for deserializing incoming alert group notifications
//!
//! Every field defaults when missing or `null`. Alertmanager always sends the full
//! payload, but only the shape is checked here; the contents of single alerts
//! are never interpreted.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

/// label or annotation set, kept sorted by key
pub type KeyValues = BTreeMap<String, String>;

#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
/// alert group received by the alertmanager webhook receiver
#[allow(clippy::missing_docs_in_private_items)]
pub struct AlertGroupNotification {
	#[serde_as(as = "DefaultOnNull")]
	pub version: String,
	#[serde_as(as = "DefaultOnNull")]
	pub group_key: String,
	#[serde_as(as = "DefaultOnNull")]
	pub truncated_alerts: i64,

	#[serde_as(as = "DefaultOnNull")]
	pub status: String,
	#[serde_as(as = "DefaultOnNull")]
	pub receiver: String,
	#[serde_as(as = "DefaultOnNull")]
	pub group_labels: KeyValues,
	#[serde_as(as = "DefaultOnNull")]
	pub common_labels: KeyValues,
	#[serde_as(as = "DefaultOnNull")]
	pub common_annotations: KeyValues,
	#[serde(rename = "externalURL")]
	#[serde_as(as = "DefaultOnNull")]
	pub external_url: String,
	/// `null` entries count as empty alerts
	#[serde_as(as = "DefaultOnNull<Vec<DefaultOnNull>>")]
	pub alerts: Vec<Alert>,
}

impl AlertGroupNotification {
	/// severity derived from the group status
	pub fn severity(&self) -> Severity {
		Severity::from_status(&self.status)
	}

	/// the `alertname` common label, empty if the group has none
	pub fn alert_name(&self) -> &str {
		self.common_labels.get("alertname").map_or("", String::as_str)
	}
}

#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::missing_docs_in_private_items)]
pub struct Alert {
	#[serde_as(as = "DefaultOnNull")]
	pub status: String,
	#[serde_as(as = "DefaultOnNull")]
	pub labels: KeyValues,
	#[serde_as(as = "DefaultOnNull")]
	pub annotations: KeyValues,
	#[serde_as(as = "DefaultOnNull")]
	pub starts_at: String,
	#[serde_as(as = "DefaultOnNull")]
	pub ends_at: String,
	#[serde(rename = "generatorURL")]
	#[serde_as(as = "DefaultOnNull")]
	pub generator_url: String,
	#[serde_as(as = "DefaultOnNull")]
	pub fingerprint: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// visual severity of an alert group
pub enum Severity {
	/// status `firing`
	Firing,
	/// status `resolved`
	Resolved,
	/// any other status, including an empty one
	Unknown,
}

impl Severity {
	/// maps an alertmanager status string, never fails
	pub fn from_status(status: &str) -> Self {
		match status {
			"firing" => Self::Firing,
			"resolved" => Self::Resolved,
			_ => Self::Unknown,
		}
	}
}
