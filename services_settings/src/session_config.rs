//! Typed session configuration built from the settings registry

use crate::{keys, SettingKey, SettingsError, SettingsRegistry};
use services_storage::StoreLayout;
use std::fmt;

/// Which tab becomes active when the active tab is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosePolicy {
    /// The tab immediately to the left in display order, else the new first tab
    #[default]
    PreferLeft,
    /// The first remaining tab in display order
    First,
}

impl ClosePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "left" => Some(ClosePolicy::PreferLeft),
            "first" => Some(ClosePolicy::First),
            _ => None,
        }
    }

    /// Picks the replacement for a tab that sat at `closed_index` in a strip
    /// that now has `remaining` tabs
    pub fn select(self, closed_index: usize, remaining: usize) -> Option<usize> {
        if remaining == 0 {
            return None;
        }
        match self {
            ClosePolicy::PreferLeft => Some(closed_index.saturating_sub(1).min(remaining - 1)),
            ClosePolicy::First => Some(0),
        }
    }
}

impl fmt::Display for ClosePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClosePolicy::PreferLeft => write!(f, "left"),
            ClosePolicy::First => write!(f, "first"),
        }
    }
}

/// Everything the session controller needs to know about naming and storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub new_stem: String,
    pub extension: String,
    pub default_name: String,
    pub default_body: String,
    pub close_policy: ClosePolicy,
    pub layout: StoreLayout,
}

impl SessionConfig {
    /// Reads the effective settings out of `registry`
    pub fn from_registry(registry: &SettingsRegistry) -> Result<Self, SettingsError> {
        let close_raw = registry.get_string(keys::TABS_CLOSE_SELECTION)?;
        let close_policy =
            ClosePolicy::parse(close_raw).ok_or_else(|| SettingsError::InvalidValue {
                key: SettingKey::new(keys::TABS_CLOSE_SELECTION),
                reason: format!("expected \"left\" or \"first\", got {:?}", close_raw),
            })?;

        let default_name = registry.get_string(keys::TABS_DEFAULT_NAME)?;
        if default_name.trim().is_empty() {
            return Err(SettingsError::InvalidValue {
                key: SettingKey::new(keys::TABS_DEFAULT_NAME),
                reason: "name must not be blank".to_string(),
            });
        }
        let new_stem = registry.get_string(keys::TABS_NEW_STEM)?;
        let extension = registry.get_string(keys::TABS_EXTENSION)?;
        if format!("{}{}", new_stem, extension).trim().is_empty() {
            return Err(SettingsError::InvalidValue {
                key: SettingKey::new(keys::TABS_NEW_STEM),
                reason: "generated names would be blank".to_string(),
            });
        }

        Ok(Self {
            new_stem: new_stem.to_string(),
            extension: extension.to_string(),
            default_name: default_name.trim().to_string(),
            default_body: registry.get_string(keys::TABS_DEFAULT_BODY)?.to_string(),
            close_policy,
            layout: StoreLayout::new(
                registry.get_string(keys::STORAGE_CONTENT_PREFIX)?,
                registry.get_string(keys::STORAGE_INDEX_KEY)?,
                registry.get_string(keys::STORAGE_ACTIVE_KEY)?,
            ),
        })
    }

    /// The `attempt`-th name probed by "new tab": `new.lua`, `new1.lua`, ...
    pub fn candidate_name(&self, attempt: usize) -> String {
        if attempt == 0 {
            format!("{}{}", self.new_stem, self.extension)
        } else {
            format!("{}{}{}", self.new_stem, attempt, self.extension)
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            new_stem: "new".to_string(),
            extension: ".lua".to_string(),
            default_name: "main.lua".to_string(),
            default_body: crate::DEFAULT_BODY.to_string(),
            close_policy: ClosePolicy::default(),
            layout: StoreLayout::default(),
        }
    }
}
