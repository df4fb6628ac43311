//! Platform identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a test configuration taking part in fallback chains.
///
/// The empty identifier is the default platform: the most generic
/// configuration, implicitly at the end of every chain. `Platform::default()`
/// returns it.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Platform(String);

impl Platform {
    pub fn new(id: impl Into<String>) -> Self {
        Platform(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            f.write_str("<default>")
        } else {
            write!(f, "{:?}", self.0)
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Platform {
    fn from(s: &str) -> Self {
        Platform(s.to_string())
    }
}

impl From<String> for Platform {
    fn from(s: String) -> Self {
        Platform(s)
    }
}

impl From<&Platform> for Platform {
    fn from(p: &Platform) -> Self {
        p.clone()
    }
}

impl AsRef<str> for Platform {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_platform_is_empty() {
        assert!(Platform::default().is_default());
        assert!(Platform::from("").is_default());
        assert!(Platform::new(String::new()).is_default());
        assert_eq!(Platform::new("platform/mac").as_str(), "platform/mac");
        assert!(!Platform::from("platform/mac").is_default());
        assert_eq!(format!("{:?}", Platform::default()), "<default>");
    }

    #[test]
    fn test_default_sorts_first() {
        let mut platforms = vec![Platform::from("platform/wk2"), Platform::default()];
        platforms.sort();
        assert!(platforms[0].is_default());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&Platform::from("platform/gtk")).unwrap();
        assert_eq!(json, "\"platform/gtk\"");
    }
}
