//! On-disk form of settings overrides
//!
//! Only overrides are written; defaults always come from code. The file is
//! pretty JSON with keys in sorted order and a format version.

use crate::{SettingKey, SettingValue, SettingsError, SettingsRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// Versioned overrides document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsOverridesData {
    pub version: u32,
    pub overrides: BTreeMap<String, SettingValue>,
}

impl SettingsOverridesData {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            overrides: BTreeMap::new(),
        }
    }

    /// Snapshot of the overrides currently set on `registry`
    pub fn from_registry(registry: &SettingsRegistry) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            overrides: registry
                .export_overrides()
                .into_iter()
                .map(|(key, value)| (key.as_str().to_string(), value))
                .collect(),
        }
    }

    pub fn to_overrides(&self) -> BTreeMap<SettingKey, SettingValue> {
        self.overrides
            .iter()
            .map(|(key, value)| (SettingKey::new(key.as_str()), value.clone()))
            .collect()
    }

    /// Validates and installs every override on `registry`
    pub fn apply_to(&self, registry: &mut SettingsRegistry) -> Result<(), SettingsError> {
        registry.import_overrides(self.to_overrides())
    }
}

impl Default for SettingsOverridesData {
    fn default() -> Self {
        Self::new()
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Cannot encode settings overrides: {0}")]
    SerializationFailed(String),

    #[error("Cannot decode settings overrides: {0}")]
    DeserializationFailed(String),

    #[error("Settings file version {0} is not supported")]
    UnsupportedVersion(u32),
}

pub fn serialize_overrides(data: &SettingsOverridesData) -> PersistenceResult<Vec<u8>> {
    serde_json::to_vec_pretty(data).map_err(|e| PersistenceError::SerializationFailed(e.to_string()))
}

pub fn deserialize_overrides(bytes: &[u8]) -> PersistenceResult<SettingsOverridesData> {
    let data = serde_json::from_slice::<SettingsOverridesData>(bytes)
        .map_err(|e| PersistenceError::DeserializationFailed(e.to_string()))?;
    match data.version {
        SettingsOverridesData::CURRENT_VERSION => Ok(data),
        other => Err(PersistenceError::UnsupportedVersion(other)),
    }
}

/// Like [`deserialize_overrides`], but an unreadable file yields no overrides
pub fn load_overrides_safe(bytes: &[u8]) -> SettingsOverridesData {
    match deserialize_overrides(bytes) {
        Ok(data) => data,
        Err(err) => {
            warn!(%err, "ignoring unreadable settings overrides");
            SettingsOverridesData::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_default_registry, keys, SessionConfig};

    #[test]
    fn test_empty_document() {
        let data = SettingsOverridesData::default();
        assert_eq!(data.version, 1);
        assert!(data.overrides.is_empty());
    }

    #[test]
    fn test_snapshot_contains_only_overrides() {
        let mut registry = create_default_registry();
        registry
            .set_override(keys::TABS_NEW_STEM, SettingValue::String("scratch".into()))
            .unwrap();

        let data = SettingsOverridesData::from_registry(&registry);
        assert_eq!(data.overrides.len(), 1);
        assert_eq!(
            data.overrides.get(keys::TABS_NEW_STEM),
            Some(&SettingValue::String("scratch".into()))
        );
    }

    #[test]
    fn test_file_reapplies_to_fresh_registry() {
        let mut data = SettingsOverridesData::new();
        data.overrides
            .insert(keys::TABS_EXTENSION.to_string(), SettingValue::String(".txt".into()));
        let bytes = serialize_overrides(&data).unwrap();

        let mut registry = create_default_registry();
        deserialize_overrides(&bytes)
            .unwrap()
            .apply_to(&mut registry)
            .unwrap();

        let config = SessionConfig::from_registry(&registry).unwrap();
        assert_eq!(config.candidate_name(1), "new1.txt");
    }

    #[test]
    fn test_keys_written_in_sorted_order() {
        let mut data = SettingsOverridesData::new();
        data.overrides.insert("tabs.z".to_string(), SettingValue::Integer(1));
        data.overrides.insert("storage.a".to_string(), SettingValue::Integer(2));

        let json = String::from_utf8(serialize_overrides(&data).unwrap()).unwrap();
        assert!(json.find("storage.a").unwrap() < json.find("tabs.z").unwrap());
        assert_eq!(serialize_overrides(&data).unwrap(), json.into_bytes());
    }

    #[test]
    fn test_rejects_garbage_and_future_versions() {
        assert!(matches!(
            deserialize_overrides(b"not json"),
            Err(PersistenceError::DeserializationFailed(_))
        ));
        assert_eq!(
            deserialize_overrides(br#"{ "version": 7, "overrides": {} }"#),
            Err(PersistenceError::UnsupportedVersion(7))
        );
    }

    #[test]
    fn test_safe_load_falls_back_to_empty() {
        assert_eq!(load_overrides_safe(b"{{"), SettingsOverridesData::new());
    }

    #[test]
    fn test_mistyped_override_rejected_on_apply() {
        let mut data = SettingsOverridesData::new();
        data.overrides
            .insert(keys::TABS_CLOSE_SELECTION.to_string(), SettingValue::Integer(1));

        let mut registry = create_default_registry();
        assert!(matches!(
            data.apply_to(&mut registry),
            Err(SettingsError::TypeMismatch { .. })
        ));
    }
}
