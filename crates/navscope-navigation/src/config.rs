use serde::{Deserialize, Serialize};

use crate::NavError;

pub const DEFAULT_METADATA_KEY: &str = "nestedMetaDataKey";

/// Settings for [`SharedStoreDecorator`](crate::SharedStoreDecorator).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedStoreConfig {
    /// Entry metadata key whose value names the entry's store group.
    pub metadata_key: String,
}

impl Default for SharedStoreConfig {
    fn default() -> Self {
        Self {
            metadata_key: DEFAULT_METADATA_KEY.to_string(),
        }
    }
}

impl SharedStoreConfig {
    pub fn with_metadata_key(key: impl Into<String>) -> Self {
        Self {
            metadata_key: key.into(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, NavError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg = SharedStoreConfig::from_json("{}").unwrap();
        assert_eq!(cfg, SharedStoreConfig::default());
        assert_eq!(cfg.metadata_key, "nestedMetaDataKey");
    }

    #[test]
    fn metadata_key_is_read() {
        let cfg = SharedStoreConfig::from_json(r#"{ "metadata_key": "checkout" }"#).unwrap();
        assert_eq!(cfg, SharedStoreConfig::with_metadata_key("checkout"));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = SharedStoreConfig::from_json("{ metadata_key").unwrap_err();
        assert!(matches!(err, NavError::Config(_)));
    }
}
