use std::fmt;

use serde::{Deserialize, Serialize};

/// An account identifier as returned by the wallet provider (e.g. `0xabc...`).
///
/// Stored verbatim; the board never validates checksums or key material.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short display form: first 6 characters, `...`, last 4.
    ///
    /// Addresses too short to shorten are returned as-is.
    pub fn truncated(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 10 {
            return self.0.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for Address {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_full_length_address() {
        let addr = Address::new("0xABCDef0123456789abcdef0123456789ABCD1234");
        assert_eq!(addr.truncated(), "0xABCD...1234");
    }

    #[test]
    fn short_address_is_not_truncated() {
        assert_eq!(Address::new("0x12345678").truncated(), "0x12345678");
        assert_eq!(Address::new("").truncated(), "");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&Address::new("0xabc")).unwrap();
        assert_eq!(json, "\"0xabc\"");
    }
}
