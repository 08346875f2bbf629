use serde::Deserialize;

use crate::error::ProtocolError;

/// Exclusive upper bound for randomly drawn message ids.
pub const DEFAULT_MESSAGE_ID_UPPER_BOUND: u64 = 1_000_000_000;

/// Prefix of the text shown in place of a message that could not be read.
pub const DEFAULT_FAILURE_PLACEHOLDER: &str = "[Failed to decrypt message]";

/// Settings for building and reading chat envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvelopeConfig {
    /// Message ids are drawn uniformly from `0..message_id_upper_bound`.
    pub message_id_upper_bound: u64,
    pub failure_placeholder: String,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            message_id_upper_bound: DEFAULT_MESSAGE_ID_UPPER_BOUND,
            failure_placeholder: DEFAULT_FAILURE_PLACEHOLDER.to_string(),
        }
    }
}

impl EnvelopeConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ProtocolError::Deserialization(format!("envelope config: {e}")))?;
        if config.message_id_upper_bound == 0 {
            return Err(ProtocolError::Deserialization(
                "messageIdUpperBound must be greater than zero".into(),
            ));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = EnvelopeConfig::from_json(r#"{"failurePlaceholder": "<unreadable>"}"#).unwrap();
        assert_eq!(config.failure_placeholder, "<unreadable>");
        assert_eq!(config.message_id_upper_bound, DEFAULT_MESSAGE_ID_UPPER_BOUND);
    }

    #[test]
    fn rejects_zero_id_bound() {
        assert!(EnvelopeConfig::from_json(r#"{"messageIdUpperBound": 0}"#).is_err());
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            EnvelopeConfig::from_json("not json"),
            Err(ProtocolError::Deserialization(_))
        ));
    }
}
