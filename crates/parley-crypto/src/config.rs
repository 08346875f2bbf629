use serde::Deserialize;

use crate::CryptoError;

/// Exclusive upper bound for randomly drawn prekey / signed-prekey ids.
pub const DEFAULT_KEY_ID_UPPER_BOUND: u32 = 10_000;

/// Settings for creating a new local identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProvisioningConfig {
    /// Key ids are drawn uniformly from `0..key_id_upper_bound`.
    pub key_id_upper_bound: u32,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            key_id_upper_bound: DEFAULT_KEY_ID_UPPER_BOUND,
        }
    }
}

impl ProvisioningConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CryptoError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CryptoError::Config(format!("provisioning config: {e}")))?;
        if config.key_id_upper_bound == 0 {
            return Err(CryptoError::Config(
                "keyIdUpperBound must be greater than zero".into(),
            ));
        }
        Ok(config)
    }
}
