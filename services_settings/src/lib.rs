//! # Settings Registry Service
//!
//! A typed settings system for the tab shell.
//!
//! ## Philosophy
//!
//! - **Typed settings**: every setting has a default, and overrides must
//!   match the default's type
//! - **Layered**: read-only defaults + overrides
//! - **Deterministic**: overrides serialize to stable, versioned JSON
//! - **No environment variables**: configuration is explicit data
//!
//! ## Example
//!
//! ```
//! use services_settings::{create_default_registry, keys, SessionConfig, SettingValue};
//!
//! let mut registry = create_default_registry();
//! registry
//!     .set_override(keys::TABS_EXTENSION, SettingValue::String(".txt".into()))
//!     .unwrap();
//!
//! let config = SessionConfig::from_registry(&registry).unwrap();
//! assert_eq!(config.candidate_name(0), "new.txt");
//! ```

pub mod persistence;
pub mod session_config;

pub use persistence::{
    deserialize_overrides, load_overrides_safe, serialize_overrides, PersistenceError,
    SettingsOverridesData,
};
pub use session_config::{ClosePolicy, SessionConfig};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Setting key (path-like identifier)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SettingKey(String);

impl SettingKey {
    /// Creates a new setting key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks if this key starts with the given prefix
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SettingKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Setting value (strongly typed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingValue {
    /// Integer value
    Integer(i64),
    /// String value
    String(String),
}

impl SettingValue {
    /// Name of the value's type, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Integer(_) => "integer",
            SettingValue::String(_) => "string",
        }
    }

    /// Tries to get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Tries to get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            SettingValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    fn same_type(&self, other: &SettingValue) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Integer(v) => write!(f, "{}", v),
            SettingValue::String(v) => write!(f, "{:?}", v),
        }
    }
}

/// Settings errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Unknown setting: {0}")]
    UnknownKey(SettingKey),

    #[error("Setting {key} expects a {expected} value, got {actual}")]
    TypeMismatch {
        key: SettingKey,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: SettingKey, reason: String },
}

/// Settings registry
#[derive(Debug, Clone, Default)]
pub struct SettingsRegistry {
    /// Default settings (read-only)
    defaults: BTreeMap<SettingKey, SettingValue>,
    /// Overrides on top of the defaults
    overrides: BTreeMap<SettingKey, SettingValue>,
}

impl SettingsRegistry {
    /// Creates an empty settings registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a default setting
    pub fn register_default(&mut self, key: impl Into<SettingKey>, value: SettingValue) {
        self.defaults.insert(key.into(), value);
    }

    /// Sets an override; the key must have a default of the same type
    pub fn set_override(
        &mut self,
        key: impl Into<SettingKey>,
        value: SettingValue,
    ) -> Result<(), SettingsError> {
        let key = key.into();
        let default = self
            .defaults
            .get(&key)
            .ok_or_else(|| SettingsError::UnknownKey(key.clone()))?;
        if !default.same_type(&value) {
            return Err(SettingsError::TypeMismatch {
                expected: default.type_name(),
                actual: value.type_name(),
                key,
            });
        }
        self.overrides.insert(key, value);
        Ok(())
    }

    /// Removes an override
    pub fn remove_override(&mut self, key: &SettingKey) -> bool {
        self.overrides.remove(key).is_some()
    }

    /// Gets the effective setting value (override or default)
    pub fn get(&self, key: &SettingKey) -> Option<&SettingValue> {
        self.overrides.get(key).or_else(|| self.defaults.get(key))
    }

    /// Gets the default value for a setting
    pub fn get_default(&self, key: &SettingKey) -> Option<&SettingValue> {
        self.defaults.get(key)
    }

    /// Gets the effective string value of a setting
    pub fn get_string(&self, key: &str) -> Result<&str, SettingsError> {
        let key = SettingKey::new(key);
        match self.get(&key) {
            Some(SettingValue::String(v)) => Ok(v),
            Some(other) => Err(SettingsError::TypeMismatch {
                key,
                expected: "string",
                actual: other.type_name(),
            }),
            None => Err(SettingsError::UnknownKey(key)),
        }
    }

    /// Returns all effective settings with a given prefix
    pub fn list_with_prefix(&self, prefix: &str) -> Vec<(SettingKey, SettingValue)> {
        self.defaults
            .keys()
            .filter(|key| key.starts_with(prefix))
            .filter_map(|key| self.get(key).map(|value| (key.clone(), value.clone())))
            .collect()
    }

    /// Exports overrides for persistence
    pub fn export_overrides(&self) -> BTreeMap<SettingKey, SettingValue> {
        self.overrides.clone()
    }

    /// Imports overrides, validating each one; stops at the first bad entry
    pub fn import_overrides(
        &mut self,
        overrides: BTreeMap<SettingKey, SettingValue>,
    ) -> Result<(), SettingsError> {
        for (key, value) in overrides {
            self.set_override(key, value)?;
        }
        Ok(())
    }
}

/// Setting keys understood by the tab shell
pub mod keys {
    pub const TABS_NEW_STEM: &str = "tabs.new_stem";
    pub const TABS_EXTENSION: &str = "tabs.extension";
    pub const TABS_DEFAULT_NAME: &str = "tabs.default_name";
    pub const TABS_DEFAULT_BODY: &str = "tabs.default_body";
    pub const TABS_CLOSE_SELECTION: &str = "tabs.close_selection";
    pub const STORAGE_CONTENT_PREFIX: &str = "storage.content_prefix";
    pub const STORAGE_INDEX_KEY: &str = "storage.index_key";
    pub const STORAGE_ACTIVE_KEY: &str = "storage.active_key";
}

/// Body of the buffer created when the store holds no session
pub const DEFAULT_BODY: &str = "--[[\n  https://discord.gg/kraH4XfuPs\n]]";

/// Creates a settings registry with default settings
pub fn create_default_registry() -> SettingsRegistry {
    let mut registry = SettingsRegistry::new();
    let string = |s: &str| SettingValue::String(s.to_string());

    // Tab naming
    registry.register_default(keys::TABS_NEW_STEM, string("new"));
    registry.register_default(keys::TABS_EXTENSION, string(".lua"));
    registry.register_default(keys::TABS_DEFAULT_NAME, string("main.lua"));
    registry.register_default(keys::TABS_DEFAULT_BODY, string(DEFAULT_BODY));
    registry.register_default(keys::TABS_CLOSE_SELECTION, string("left"));

    // Store layout
    registry.register_default(keys::STORAGE_CONTENT_PREFIX, string("tab:"));
    registry.register_default(keys::STORAGE_INDEX_KEY, string("tabList"));
    registry.register_default(keys::STORAGE_ACTIVE_KEY, string("lastTab"));

    registry
}
