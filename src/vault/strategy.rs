//! Lookup and write strategies
//!
//! The read path tries each [`ReadStrategy`] in [`READ_ORDER`] until one
//! produces a [`Lookup::Hit`] or [`Lookup::Expired`].

use serde::Serialize;

// == Namespace ==
/// Maps caller keys onto backend keys.
///
/// Managed entries live under `<prefix>:enc:` and `<prefix>:plain:`. Legacy
/// entries written by the previous plain-storage scheme use the bare key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn encrypted_key(&self, key: &str) -> String {
        format!("{}:enc:{}", self.prefix, key)
    }

    pub fn plaintext_key(&self, key: &str) -> String {
        format!("{}:plain:{}", self.prefix, key)
    }

    pub fn legacy_key(&self, key: &str) -> String {
        key.to_string()
    }

    /// Whether `storage_key` lies under the managed prefix.
    pub fn owns(&self, storage_key: &str) -> bool {
        storage_key
            .strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.starts_with(':'))
    }
}

// == Read Strategies ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStrategy {
    /// Encrypted record in the managed namespace
    Encrypted,
    /// Plaintext record written while encryption was unavailable
    Degraded,
    /// Bare value written by the previous plain-storage scheme
    Legacy,
}

/// Lookup precedence.
pub const READ_ORDER: [ReadStrategy; 3] = [
    ReadStrategy::Encrypted,
    ReadStrategy::Degraded,
    ReadStrategy::Legacy,
];

impl ReadStrategy {
    pub fn storage_key(&self, namespace: &Namespace, key: &str) -> String {
        match self {
            ReadStrategy::Encrypted => namespace.encrypted_key(key),
            ReadStrategy::Degraded => namespace.plaintext_key(key),
            ReadStrategy::Legacy => namespace.legacy_key(key),
        }
    }

    pub fn is_plaintext(&self) -> bool {
        !matches!(self, ReadStrategy::Encrypted)
    }
}

/// Outcome of one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Hit(String),
    Miss,
    /// The record existed but had expired and was deleted
    Expired,
}

// == Write Mode ==
/// How a write ended up persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    Encrypted,
    /// Degraded mode: stored without encryption
    Plaintext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_keys() {
        let ns = Namespace::new("credvault");

        assert_eq!(ReadStrategy::Encrypted.storage_key(&ns, "token"), "credvault:enc:token");
        assert_eq!(ReadStrategy::Degraded.storage_key(&ns, "token"), "credvault:plain:token");
        assert_eq!(ReadStrategy::Legacy.storage_key(&ns, "token"), "token");
    }

    #[test]
    fn test_owns_requires_separator() {
        let ns = Namespace::new("credvault");

        assert!(ns.owns("credvault:enc:token"));
        assert!(ns.owns("credvault:plain:token"));
        assert!(!ns.owns("credvaultx:enc:token"));
        assert!(!ns.owns("token"));
        assert!(!ns.owns("credvault"));
    }

    #[test]
    fn test_read_order_starts_encrypted() {
        assert_eq!(READ_ORDER[0], ReadStrategy::Encrypted);
        assert!(READ_ORDER[1..].iter().all(|s| s.is_plaintext()));
    }

    #[test]
    fn test_write_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&WriteMode::Plaintext).unwrap(), r#""plaintext""#);
    }
}
