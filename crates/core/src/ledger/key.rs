use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one alert: `"{date}:{movie}:{theatre_code}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertKey(String);

impl AlertKey {
    pub fn new(date: &str, movie_name: &str, theatre_code: &str) -> Self {
        Self(format!("{}:{}:{}", date, movie_name, theatre_code))
    }

    /// Wrap an already-serialized key, as read back from the ledger file.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let key = AlertKey::new("2025-06-01", "Dune", "C1");
        assert_eq!(key.as_str(), "2025-06-01:Dune:C1");
        assert_eq!(key.to_string(), "2025-06-01:Dune:C1");
    }

    #[test]
    fn test_same_parts_same_key() {
        assert_eq!(
            AlertKey::new("20250601", "Dune", "C1"),
            AlertKey::from_raw("20250601:Dune:C1")
        );
        assert_ne!(
            AlertKey::new("20250601", "Dune", "C1"),
            AlertKey::new("20250601", "Dune", "C2")
        );
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let key = AlertKey::new("20250601", "Dune", "C1");
        assert_eq!(serde_json::to_string(&key).unwrap(), r#""20250601:Dune:C1""#);
    }
}
