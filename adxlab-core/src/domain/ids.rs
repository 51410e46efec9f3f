use serde::{Deserialize, Serialize};
use std::fmt;

/// Position ID, assigned by the execution side when an order fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionId(pub u64);

impl From<u64> for PositionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Deterministic configuration fingerprint (BLAKE3 hex of the canonical config JSON).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl ConfigHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    /// First 12 hex chars, enough to tell runs apart in log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_hash_is_deterministic() {
        let a = ConfigHash::from_bytes(b"label=ADXAlgo");
        let b = ConfigHash::from_bytes(b"label=ADXAlgo");
        assert_eq!(a, b);
        assert_eq!(a.0.len(), 64);
    }

    #[test]
    fn config_hash_differs_on_content() {
        let a = ConfigHash::from_bytes(b"label=ADXAlgo");
        let b = ConfigHash::from_bytes(b"label=Other");
        assert_ne!(a, b);
    }

    #[test]
    fn short_hash_prefix() {
        let h = ConfigHash::from_bytes(b"x");
        assert_eq!(h.short().len(), 12);
        assert!(h.0.starts_with(h.short()));
    }

    #[test]
    fn position_id_display() {
        assert_eq!(PositionId(42).to_string(), "#42");
    }
}
