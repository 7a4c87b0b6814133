//! Discord webhook payload. Only the parts of the execute-webhook body we
//! actually fill are modelled.

use serde::{Deserialize, Serialize};

use crate::alert::Severity;

/// color of firing alert groups
pub const COLOR_RED: u32 = 0x992D22;
/// color of resolved alert groups
pub const COLOR_GREEN: u32 = 0x2ECC71;
/// color of alert groups with an unknown status
pub const COLOR_GREY: u32 = 0x95A5A6;

pub const EMOJI_FIRING: &str = ":bangbang:";
pub const EMOJI_RESOLVED: &str = ":white_check_mark:";
pub const EMOJI_UNKNOWN: &str = ":grey_question:";

/// maximum number of characters discord accepts in an embed title
pub const MAX_TITLE_LEN: usize = 256;
/// maximum number of characters discord accepts in an embed field value
pub const MAX_FIELD_VALUE_LEN: usize = 1024;

impl Severity {
    pub fn color(self) -> u32 {
        match self {
            Severity::Firing => COLOR_RED,
            Severity::Resolved => COLOR_GREEN,
            Severity::Unknown => COLOR_GREY,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Severity::Firing => EMOJI_FIRING,
            Severity::Resolved => EMOJI_RESOLVED,
            Severity::Unknown => EMOJI_UNKNOWN,
        }
    }
}

/// body of a discord execute-webhook request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub color: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// truncate `text` to at most `max` characters, never splitting a code point
pub fn truncate_chars(text: &mut String, max: usize) {
    if let Some((idx, _)) = text.char_indices().nth(max) {
        text.truncate(idx);
    }
}
