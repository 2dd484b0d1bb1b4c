//! Maps the sparse text fields of a [`SessionConfig`] onto the update sent to Discord.

use serde::Serialize;

use crate::config::{non_blank, SessionConfig, TimestampMode};
use crate::error::{Error, Result};

/// Discord cuts button labels off past this many characters.
pub const BUTTON_LABEL_MAX_CHARS: usize = 32;

/// Distance of the countdown target in remaining mode. Not user-configurable.
pub const REMAINING_HORIZON_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceButton {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PresencePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_text: Option<String>,
    /// `[current, max]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_size: Option<[u32; 2]>,
    /// Unix seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    /// Unix seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<PresenceButton>,
}

impl PresencePayload {
    /// Builds the payload for `config`.
    ///
    /// `session_start` is when the session connected and `now` is the current
    /// time, both in unix seconds. Fails without producing anything if the
    /// party fields are unusable.
    pub fn build(config: &SessionConfig, session_start: i64, now: i64) -> Result<Self> {
        let mut payload = Self {
            details: owned(&config.details),
            state: owned(&config.state),
            ..Self::default()
        };

        (payload.large_image, payload.large_text) =
            image_pair(&config.large_image_key, &config.large_text);
        (payload.small_image, payload.small_text) =
            image_pair(&config.small_image_key, &config.small_text);

        payload.party_size = party(&config.party_size, &config.party_max)?;

        if config.show_timestamp {
            match config.timestamp_mode {
                TimestampMode::Elapsed => payload.start = Some(session_start),
                TimestampMode::Remaining => {
                    payload.end = Some(now.saturating_add(REMAINING_HORIZON_SECS));
                }
            }
        }

        payload.buttons = [
            (&config.button1_label, &config.button1_url),
            (&config.button2_label, &config.button2_url),
        ]
        .into_iter()
        .filter_map(|(label, url)| button(label, url))
        .collect();

        Ok(payload)
    }
}

fn owned(value: &str) -> Option<String> {
    non_blank(value).map(str::to_string)
}

/// The text only goes out alongside its image key.
fn image_pair(key: &str, text: &str) -> (Option<String>, Option<String>) {
    match owned(key) {
        Some(key) => (Some(key), owned(text)),
        None => (None, None),
    }
}

fn party(size: &str, max: &str) -> Result<Option<[u32; 2]>> {
    match (non_blank(size), non_blank(max)) {
        (None, None) => Ok(None),
        (Some(size), Some(max)) => match (size.parse::<u32>(), max.parse::<u32>()) {
            (Ok(size), Ok(max)) => Ok(Some([size, max])),
            _ => Err(Error::validation("Party size must be numbers!")),
        },
        _ => Err(Error::validation(
            "Party size needs both the current and the max value.",
        )),
    }
}

fn button(label: &str, url: &str) -> Option<PresenceButton> {
    let label = non_blank(label)?;
    let url = non_blank(url)?;
    Some(PresenceButton {
        label: label.chars().take(BUTTON_LABEL_MAX_CHARS).collect(),
        url: url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: i64 = 1_700_000_000;
    const NOW: i64 = 1_700_000_500;

    fn build(config: &SessionConfig) -> Result<PresencePayload> {
        PresencePayload::build(config, START, NOW)
    }

    #[test]
    fn test_empty_config_is_empty_payload() {
        let payload = build(&SessionConfig::default()).unwrap();
        assert_eq!(payload, PresencePayload::default());
        assert_eq!(serde_json::to_string(&payload).unwrap(), "{}");
    }

    #[test]
    fn test_details_state_and_party() {
        let config = SessionConfig {
            details: "Playing".to_string(),
            state: "Solo".to_string(),
            party_size: "2".to_string(),
            party_max: "5".to_string(),
            ..SessionConfig::default()
        };

        let payload = build(&config).unwrap();
        assert_eq!(payload.details.as_deref(), Some("Playing"));
        assert_eq!(payload.state.as_deref(), Some("Solo"));
        assert_eq!(payload.party_size, Some([2, 5]));

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["party_size"], serde_json::json!([2, 5]));
    }

    #[test]
    fn test_blank_fields_omitted() {
        let config = SessionConfig {
            details: "   ".to_string(),
            state: "\t".to_string(),
            ..SessionConfig::default()
        };
        let payload = build(&config).unwrap();
        assert!(payload.details.is_none());
        assert!(payload.state.is_none());
    }

    #[test]
    fn test_image_text_never_without_key() {
        let cases = [
            ("", "", None, None),
            ("", "caption", None, None),
            ("  ", "caption", None, None),
            ("logo", "", Some("logo"), None),
            ("logo", "caption", Some("logo"), Some("caption")),
        ];

        for (key, text, want_key, want_text) in cases {
            let config = SessionConfig {
                large_image_key: key.to_string(),
                large_text: text.to_string(),
                small_image_key: key.to_string(),
                small_text: text.to_string(),
                ..SessionConfig::default()
            };
            let payload = build(&config).unwrap();
            assert_eq!(payload.large_image.as_deref(), want_key);
            assert_eq!(payload.large_text.as_deref(), want_text);
            assert_eq!(payload.small_image.as_deref(), want_key);
            assert_eq!(payload.small_text.as_deref(), want_text);
        }
    }

    #[test]
    fn test_image_pairs_independent() {
        let config = SessionConfig {
            large_text: "orphan".to_string(),
            small_image_key: "icon".to_string(),
            small_text: "tip".to_string(),
            ..SessionConfig::default()
        };
        let payload = build(&config).unwrap();
        assert!(payload.large_image.is_none());
        assert!(payload.large_text.is_none());
        assert_eq!(payload.small_image.as_deref(), Some("icon"));
        assert_eq!(payload.small_text.as_deref(), Some("tip"));
    }

    #[test]
    fn test_one_sided_party_rejected() {
        for (size, max) in [("2", ""), ("", "5"), ("3", "  ")] {
            let config = SessionConfig {
                party_size: size.to_string(),
                party_max: max.to_string(),
                ..SessionConfig::default()
            };
            assert!(build(&config).unwrap_err().is_validation());
        }
    }

    #[test]
    fn test_non_numeric_party_rejected() {
        let config = SessionConfig {
            party_size: "two".to_string(),
            party_max: "5".to_string(),
            ..SessionConfig::default()
        };
        assert!(build(&config).unwrap_err().is_validation());
    }

    #[test]
    fn test_timestamps() {
        let mut config = SessionConfig {
            show_timestamp: true,
            ..SessionConfig::default()
        };

        let payload = build(&config).unwrap();
        assert_eq!(payload.start, Some(START));
        assert_eq!(payload.end, None);

        config.timestamp_mode = TimestampMode::Remaining;
        let payload = build(&config).unwrap();
        assert_eq!(payload.start, None);
        assert_eq!(payload.end, Some(NOW + 3600));

        config.show_timestamp = false;
        let payload = build(&config).unwrap();
        assert_eq!((payload.start, payload.end), (None, None));
    }

    #[test]
    fn test_button_label_truncated() {
        let long = "x".repeat(40);
        let short = "y".repeat(32);
        let config = SessionConfig {
            button1_label: long,
            button1_url: "https://one.example".to_string(),
            button2_label: short.clone(),
            button2_url: "https://two.example".to_string(),
            ..SessionConfig::default()
        };

        let payload = build(&config).unwrap();
        assert_eq!(payload.buttons.len(), 2);
        assert_eq!(payload.buttons[0].label.chars().count(), 32);
        assert_eq!(payload.buttons[1].label, short);
    }

    #[test]
    fn test_truncation_counts_characters() {
        let config = SessionConfig {
            button1_label: "é".repeat(40),
            button1_url: "https://example.com".to_string(),
            ..SessionConfig::default()
        };
        let payload = build(&config).unwrap();
        assert_eq!(payload.buttons[0].label, "é".repeat(32));
    }

    #[test]
    fn test_incomplete_buttons_dropped() {
        let config = SessionConfig {
            button1_label: "Only label".to_string(),
            button2_url: "https://only-url.example".to_string(),
            ..SessionConfig::default()
        };
        let payload = build(&config).unwrap();
        assert!(payload.buttons.is_empty());
        assert!(serde_json::to_value(&payload)
            .unwrap()
            .get("buttons")
            .is_none());
    }

    #[test]
    fn test_second_button_alone() {
        let config = SessionConfig {
            button2_label: "Docs".to_string(),
            button2_url: "https://docs.example".to_string(),
            ..SessionConfig::default()
        };
        let payload = build(&config).unwrap();
        assert_eq!(
            payload.buttons,
            vec![PresenceButton {
                label: "Docs".to_string(),
                url: "https://docs.example".to_string(),
            }]
        );
    }
}
