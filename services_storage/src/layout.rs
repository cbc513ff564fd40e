//! Durable store layout
//!
//! Three kinds of records live in the store:
//! - `<content_prefix><name>`: raw buffer content
//! - `<index_key>`: JSON array of buffer names in tab order
//! - `<active_key>`: name of the last active buffer

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while decoding the tab index
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Failed to decode tab index: {0}")]
    Decode(String),
}

/// Key names used in the durable store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLayout {
    content_prefix: String,
    index_key: String,
    active_key: String,
}

impl StoreLayout {
    pub const DEFAULT_CONTENT_PREFIX: &'static str = "tab:";
    pub const DEFAULT_INDEX_KEY: &'static str = "tabList";
    pub const DEFAULT_ACTIVE_KEY: &'static str = "lastTab";

    pub fn new(
        content_prefix: impl Into<String>,
        index_key: impl Into<String>,
        active_key: impl Into<String>,
    ) -> Self {
        Self {
            content_prefix: content_prefix.into(),
            index_key: index_key.into(),
            active_key: active_key.into(),
        }
    }

    /// Key holding the content of buffer `name`
    pub fn content_key(&self, name: &str) -> String {
        format!("{}{}", self.content_prefix, name)
    }

    /// Buffer name encoded in a content key, if `key` is one
    pub fn name_from_content_key<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.content_prefix.as_str())
    }

    pub fn index_key(&self) -> &str {
        &self.index_key
    }

    pub fn active_key(&self) -> &str {
        &self.active_key
    }

    pub fn content_prefix(&self) -> &str {
        &self.content_prefix
    }

    /// Encodes the ordered tab index
    pub fn encode_index<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> String {
        let names = names
            .into_iter()
            .map(|name| serde_json::Value::String(name.to_string()))
            .collect();
        serde_json::Value::Array(names).to_string()
    }

    /// Decodes the ordered tab index
    pub fn decode_index(&self, raw: &str) -> Result<Vec<String>, LayoutError> {
        serde_json::from_str(raw).map_err(|e| LayoutError::Decode(e.to_string()))
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_CONTENT_PREFIX,
            Self::DEFAULT_INDEX_KEY,
            Self::DEFAULT_ACTIVE_KEY,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys() {
        let layout = StoreLayout::default();
        assert_eq!(layout.content_key("main.lua"), "tab:main.lua");
        assert_eq!(layout.index_key(), "tabList");
        assert_eq!(layout.active_key(), "lastTab");
    }

    #[test]
    fn test_name_from_content_key() {
        let layout = StoreLayout::default();
        assert_eq!(layout.name_from_content_key("tab:a b.lua"), Some("a b.lua"));
        assert_eq!(layout.name_from_content_key("tabList"), None);
    }

    #[test]
    fn test_index_is_json_array() {
        let layout = StoreLayout::default();
        let raw = layout.encode_index(["main.lua", "new.lua"]);
        assert_eq!(raw, r#"["main.lua","new.lua"]"#);
        assert_eq!(
            layout.decode_index(&raw).unwrap(),
            vec!["main.lua".to_string(), "new.lua".to_string()]
        );
    }

    #[test]
    fn test_empty_index() {
        let layout = StoreLayout::default();
        assert_eq!(layout.encode_index([]), "[]");
        assert!(layout.decode_index("[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_non_array() {
        let layout = StoreLayout::default();
        assert!(matches!(
            layout.decode_index("{\"a\":1}"),
            Err(LayoutError::Decode(_))
        ));
    }
}
