//! Digests: a fast fingerprint for source text and a stable SHA-256 for logic.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// 128-bit XXH3 fingerprint of a source file's bytes.
///
/// Not stable across tool versions and never written to golden files; it only
/// tells whether a loaded file changed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Fingerprints `data` with XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data).to_le_bytes())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// SHA-256 digest of a canonical logic expression string.
///
/// Equal hashes mean equal Boolean functions over the same variables. The
/// digest displays and serializes as 64 lowercase hex characters, which is
/// the form stored in golden files.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogicHash([u8; 32]);

impl LogicHash {
    /// Hashes the UTF-8 bytes of a canonical expression.
    pub fn of_str(canonical: &str) -> Self {
        let digest = Sha256::digest(canonical.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parses a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, ParseHashError> {
        let hex = hex.trim();
        if hex.len() != 64 {
            return Err(ParseHashError::Length(hex.len()));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let hi = hex_value(chunk[0])?;
            let lo = hex_value(chunk[1])?;
            bytes[i] = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

fn hex_value(c: u8) -> Result<u8, ParseHashError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(ParseHashError::Digit(c as char)),
    }
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for byte in bytes {
        write!(f, "{byte:02x}")?;
    }
    Ok(())
}

/// Failure to parse a [`LogicHash`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseHashError {
    /// The string was not 64 characters long.
    #[error("expected 64 hex digits, found {0}")]
    Length(usize),
    /// A character outside `[0-9a-fA-F]`.
    #[error("invalid hex digit `{0}`")]
    Digit(char),
}

impl FromStr for LogicHash {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for LogicHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

impl fmt::Debug for LogicHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LogicHash({:02x}{:02x}{:02x}{:02x}..)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

impl Serialize for LogicHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for LogicHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        LogicHash::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_deterministic() {
        assert_eq!(
            ContentHash::from_bytes(b"module m; endmodule"),
            ContentHash::from_bytes(b"module m; endmodule")
        );
        assert_ne!(ContentHash::from_bytes(b"a"), ContentHash::from_bytes(b"b"));
    }

    #[test]
    fn content_hash_display_is_hex() {
        let s = ContentHash::from_bytes(b"x").to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn logic_hash_matches_known_sha256() {
        // sha256("") is a well-known constant.
        let h = LogicHash::of_str("");
        assert_eq!(
            h.to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn logic_hash_hex_roundtrip() {
        let h = LogicHash::of_str("ite(a, b, FALSE)");
        let parsed: LogicHash = h.to_string().parse().unwrap();
        assert_eq!(parsed, h);
    }

    #[test]
    fn logic_hash_rejects_bad_hex() {
        assert_eq!(LogicHash::from_hex("abc"), Err(ParseHashError::Length(3)));
        let bad = "g".repeat(64);
        assert_eq!(LogicHash::from_hex(&bad), Err(ParseHashError::Digit('g')));
    }

    #[test]
    fn logic_hash_serializes_as_string() {
        let h = LogicHash::of_str("TRUE");
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{h}\""));
        let back: LogicHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn debug_is_abbreviated() {
        let h = LogicHash::of_str("TRUE");
        let dbg = format!("{h:?}");
        assert!(dbg.starts_with("LogicHash("));
        assert!(dbg.len() < 30);
    }
}
