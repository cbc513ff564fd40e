//! Buffer names
//!
//! A buffer name is the tab title and the suffix of the buffer's storage key.
//! Names are compared case-sensitively and never carry surrounding whitespace.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

/// Reasons a raw string cannot become a buffer name
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("Buffer name is empty")]
    Empty,
}

/// Validated buffer name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BufferName(String);

impl BufferName {
    /// Trims `raw` and accepts it if anything is left
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NameError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the name and returns the owned string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BufferName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BufferName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for BufferName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for BufferName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BufferName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl TryFrom<String> for BufferName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for BufferName {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<BufferName> for String {
    fn from(name: BufferName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let name = BufferName::parse("  main.lua \t").unwrap();
        assert_eq!(name.as_str(), "main.lua");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(BufferName::parse(""), Err(NameError::Empty));
        assert_eq!(BufferName::parse("   "), Err(NameError::Empty));
    }

    #[test]
    fn test_case_sensitive() {
        let lower = BufferName::parse("a.lua").unwrap();
        let upper = BufferName::parse("A.lua").unwrap();
        assert_ne!(lower, upper);
    }

    #[test]
    fn test_inner_whitespace_kept() {
        let name = BufferName::parse(" my file.lua ").unwrap();
        assert_eq!(name, "my file.lua");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: BufferName = serde_json::from_str("\"x.lua\"").unwrap();
        assert_eq!(ok, "x.lua");
        assert!(serde_json::from_str::<BufferName>("\"  \"").is_err());
    }
}
