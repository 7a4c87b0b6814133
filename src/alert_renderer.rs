//! Renders alert groups into discord messages.
//!
//! Alerts are received from [alertmanager_webhook_receiver](crate::alertmanager_webhook_receiver)
//! Rendered messages are sent through [relay](crate::relay)

use crate::{
    alert::{AlertGroupNotification, KeyValues},
    discord::{self, Embed, EmbedField, Message},
};

/// Renders an alert group into a message with a single embed.
///
/// The title reads `<emoji> [<STATUS>:<number of alerts>] <alertname>`, followed by
/// a "Labels" and an "Annotations" field built from the common labels and annotations.
pub fn render(notification: &AlertGroupNotification) -> Message {
    let severity = notification.severity();

    let mut title = format!(
        "{} [{}:{}] {}",
        severity.emoji(),
        notification.status.to_uppercase(),
        notification.alerts.len(),
        notification.alert_name()
    );
    discord::truncate_chars(&mut title, discord::MAX_TITLE_LEN);

    let url = (!notification.external_url.is_empty()).then(|| notification.external_url.clone());

    let embed = Embed {
        title: Some(title),
        description: None,
        url,
        color: severity.color(),
        fields: vec![
            render_field("Labels", &notification.common_labels),
            render_field("Annotations", &notification.common_annotations),
        ],
    };

    Message {
        content: None,
        embeds: vec![embed],
    }
}

/// one ` - key = value` line per entry, in key order. An empty set yields an empty value.
///
/// Lines that don't fit into a field value anymore are dropped as a whole. Only a
/// first line that exceeds the limit on its own gets cut.
fn render_field(name: &str, entries: &KeyValues) -> EmbedField {
    let mut value = String::new();
    let mut len = 0;

    for (key, val) in entries {
        let line = format!(" - {key} = {val}\n");
        let line_len = line.chars().count();

        if len + line_len > discord::MAX_FIELD_VALUE_LEN {
            if value.is_empty() {
                value = line;
                discord::truncate_chars(&mut value, discord::MAX_FIELD_VALUE_LEN);
            }
            break;
        }

        value.push_str(&line);
        len += line_len;
    }

    EmbedField {
        name: name.to_string(),
        value,
        inline: true,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::discord::{COLOR_GREEN, COLOR_GREY, COLOR_RED};

    fn notification(value: serde_json::Value) -> AlertGroupNotification {
        serde_json::from_value(value).unwrap()
    }

    fn embed(message: &Message) -> &Embed {
        assert_eq!(message.embeds.len(), 1);
        &message.embeds[0]
    }

    #[test]
    fn firing_group() {
        let message = render(&notification(json!({
            "status": "firing",
            "commonLabels": { "alertname": "HighCPU" },
            "commonAnnotations": {},
            "alerts": [{}, {}],
            "externalURL": "http://x"
        })));

        let embed = embed(&message);
        let title = embed.title.as_deref().unwrap();

        assert!(title.contains(":bangbang:"));
        assert!(title.contains("FIRING"));
        assert!(title.contains(":2]"));
        assert!(title.contains("HighCPU"));
        assert_eq!(title, ":bangbang: [FIRING:2] HighCPU");
        assert_eq!(embed.color, COLOR_RED);
        assert_eq!(embed.url.as_deref(), Some("http://x"));
        assert!(message.content.is_none());
    }

    #[test]
    fn resolved_group_without_alerts() {
        let message = render(&notification(json!({
            "status": "resolved",
            "commonLabels": { "alertname": "DiskFull" },
            "alerts": []
        })));

        let embed = embed(&message);

        assert_eq!(embed.title.as_deref(), Some(":white_check_mark: [RESOLVED:0] DiskFull"));
        assert_eq!(embed.color, COLOR_GREEN);
        assert_eq!(embed.url, None);
    }

    #[test]
    fn unknown_status_falls_back_to_grey() {
        for status in ["", "pending", "Firing"] {
            let message = render(&notification(json!({ "status": status })));
            let embed = embed(&message);

            assert_eq!(embed.color, COLOR_GREY);
            assert!(embed.title.as_deref().unwrap().starts_with(":grey_question: ["));
        }
    }

    #[test]
    fn missing_alertname_renders_empty_segment() {
        let message = render(&notification(json!({
            "status": "firing",
            "commonLabels": { "severity": "page" },
            "alerts": [{}]
        })));

        assert_eq!(embed(&message).title.as_deref(), Some(":bangbang: [FIRING:1] "));
    }

    #[test]
    fn alert_count_ignores_alert_contents() {
        let message = render(&notification(json!({
            "status": "firing",
            "alerts": [{}, { "status": "resolved" }, { "labels": { "a": "b" } }]
        })));

        assert!(embed(&message).title.as_deref().unwrap().contains("[FIRING:3]"));
    }

    #[test]
    fn fields_are_sorted_and_inline() {
        let message = render(&notification(json!({
            "status": "firing",
            "commonLabels": { "severity": "critical", "alertname": "HighCPU", "job": "node" },
            "commonAnnotations": { "summary": "cpu is busy", "runbook": "http://runbook" }
        })));

        let fields = &embed(&message).fields;

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "Labels");
        assert_eq!(
            fields[0].value,
            " - alertname = HighCPU\n - job = node\n - severity = critical\n"
        );
        assert_eq!(fields[1].name, "Annotations");
        assert_eq!(fields[1].value, " - runbook = http://runbook\n - summary = cpu is busy\n");
        assert!(fields.iter().all(|field| field.inline));
    }

    #[test]
    fn empty_sets_still_emit_fields() {
        let message = render(&notification(json!({ "status": "resolved" })));
        let fields = &embed(&message).fields;

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "Labels");
        assert_eq!(fields[0].value, "");
        assert_eq!(fields[1].name, "Annotations");
        assert_eq!(fields[1].value, "");
        assert!(fields.iter().all(|field| field.inline));
    }

    #[test]
    fn oversized_parts_are_truncated() {
        let message = render(&notification(json!({
            "status": "firing",
            "commonLabels": { "alertname": "x".repeat(400) },
            "commonAnnotations": { "description": "ü".repeat(2000) }
        })));

        let embed = embed(&message);

        assert_eq!(embed.title.as_deref().unwrap().chars().count(), discord::MAX_TITLE_LEN);
        assert_eq!(embed.fields[1].value.chars().count(), discord::MAX_FIELD_VALUE_LEN);
    }

    #[test]
    fn field_values_are_cut_between_lines() {
        // 40 lines of 38 characters each, only 26 of them fit
        let labels: serde_json::Map<_, _> = (0..40)
            .map(|i| (format!("label{i:02}"), json!("v".repeat(24))))
            .collect();

        let message = render(&notification(json!({
            "status": "firing",
            "commonLabels": labels
        })));

        let value = &embed(&message).fields[0].value;

        assert!(value.chars().count() <= discord::MAX_FIELD_VALUE_LEN);
        assert!(value.ends_with('\n'));
        assert_eq!(value.lines().count(), 26);
        assert!(value
            .lines()
            .all(|line| line.starts_with(" - label") && line.ends_with(&"v".repeat(24))));
        assert!(value.ends_with(&format!(" - label25 = {}\n", "v".repeat(24))));
    }

    #[test]
    fn rendered_message_round_trips_in_order() {
        let message = render(&notification(json!({
            "status": "firing",
            "commonLabels": { "alertname": "HighCPU" },
            "externalURL": "http://x",
            "alerts": [{}]
        })));

        let parsed: Message = serde_json::from_str(&serde_json::to_string(&message).unwrap()).unwrap();

        assert_eq!(parsed, message);
        let names: Vec<_> = parsed.embeds[0].fields.iter().map(|field| field.name.as_str()).collect();
        assert_eq!(names, ["Labels", "Annotations"]);
    }
}
