//! User-editable presence fields, stored the way the text inputs hold them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimestampMode {
    /// Counts up from the moment the session connected
    #[default]
    Elapsed,
    /// Counts down to a fixed horizon
    Remaining,
}

/// Every field the user can edit. Values are kept as raw text so a preset
/// reproduces exactly what was typed, including unparsed party sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub client_id: String,
    pub details: String,
    pub state: String,
    #[serde(rename = "large_key")]
    pub large_image_key: String,
    pub large_text: String,
    #[serde(rename = "small_key")]
    pub small_image_key: String,
    pub small_text: String,
    #[serde(rename = "button1_text")]
    pub button1_label: String,
    pub button1_url: String,
    #[serde(rename = "button2_text")]
    pub button2_label: String,
    pub button2_url: String,
    pub party_size: String,
    pub party_max: String,
    pub show_timestamp: bool,
    #[serde(rename = "timestamp_type")]
    pub timestamp_mode: TimestampMode,
}

impl SessionConfig {
    /// Trimmed client id, or `None` when blank.
    pub fn client_id(&self) -> Option<&str> {
        non_blank(&self.client_id)
    }

    /// Empties the text fields and hides the timestamp. The client id and the
    /// chosen timestamp mode survive.
    pub fn clear(&mut self) {
        *self = Self {
            client_id: std::mem::take(&mut self.client_id),
            timestamp_mode: self.timestamp_mode,
            ..Self::default()
        };
    }
}

/// Returns the trimmed value if anything is left after trimming.
pub(crate) fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_uses_stored_key_names() {
        let config = SessionConfig {
            client_id: "123".to_string(),
            large_image_key: "logo".to_string(),
            button1_label: "Site".to_string(),
            timestamp_mode: TimestampMode::Remaining,
            ..SessionConfig::default()
        };

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["client_id"], "123");
        assert_eq!(value["large_key"], "logo");
        assert_eq!(value["button1_text"], "Site");
        assert_eq!(value["timestamp_type"], "remaining");
        assert_eq!(value["show_timestamp"], false);
    }

    #[test]
    fn test_missing_keys_default() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"details": "Playing", "party_size": "2"}"#).unwrap();

        assert_eq!(config.details, "Playing");
        assert_eq!(config.party_size, "2");
        assert_eq!(config.state, "");
        assert!(!config.show_timestamp);
        assert_eq!(config.timestamp_mode, TimestampMode::Elapsed);
    }

    #[test]
    fn test_clear_keeps_client_id_and_mode() {
        let mut config = SessionConfig {
            client_id: "42".to_string(),
            details: "Busy".to_string(),
            party_max: "5".to_string(),
            show_timestamp: true,
            timestamp_mode: TimestampMode::Remaining,
            ..SessionConfig::default()
        };

        config.clear();

        assert_eq!(
            config,
            SessionConfig {
                client_id: "42".to_string(),
                timestamp_mode: TimestampMode::Remaining,
                ..SessionConfig::default()
            }
        );
        assert!(!config.show_timestamp);
    }

    #[test]
    fn test_client_id_blank() {
        let mut config = SessionConfig::default();
        assert_eq!(config.client_id(), None);
        config.client_id = "   ".to_string();
        assert_eq!(config.client_id(), None);
        config.client_id = " 99 ".to_string();
        assert_eq!(config.client_id(), Some("99"));
    }
}
