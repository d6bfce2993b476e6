//! Vault Statistics Module
//!
//! Tracks lookup outcomes, write modes, and key derivations.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Vault Stats ==
/// Lock-free counters shared by every vault operation.
#[derive(Debug, Default)]
pub struct VaultStats {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    corrupt_records: AtomicU64,
    encrypted_writes: AtomicU64,
    plaintext_writes: AtomicU64,
    migrations: AtomicU64,
    key_derivations: AtomicU64,
}

/// Point-in-time copy of [`VaultStats`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Reads that returned a value
    pub hits: u64,
    /// Reads that returned nothing (not found or expired)
    pub misses: u64,
    /// Records deleted because their expiry had passed
    pub expired: u64,
    /// Encrypted records that failed to decrypt or parse
    pub corrupt_records: u64,
    /// Writes stored encrypted
    pub encrypted_writes: u64,
    /// Writes stored as plaintext because encryption was unavailable
    pub plaintext_writes: u64,
    /// Plaintext entries re-written into the encrypted namespace
    pub migrations: u64,
    /// Key derivations started
    pub key_derivations: u64,
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl VaultStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts an expired record; the read also counts as a miss.
    pub fn record_expired(&self) {
        self.expired.fetch_add(1, Ordering::Relaxed);
        self.record_miss();
    }

    pub fn record_corrupt(&self) {
        self.corrupt_records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_encrypted_write(&self) {
        self.encrypted_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_plaintext_write(&self) {
        self.plaintext_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_migration(&self) {
        self.migrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_derivation(&self) {
        self.key_derivations.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            corrupt_records: self.corrupt_records.load(Ordering::Relaxed),
            encrypted_writes: self.encrypted_writes.load(Ordering::Relaxed),
            plaintext_writes: self.plaintext_writes.load(Ordering::Relaxed),
            migrations: self.migrations.load(Ordering::Relaxed),
            key_derivations: self.key_derivations.load(Ordering::Relaxed),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = VaultStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(VaultStats::new().snapshot().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = VaultStats::new();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.snapshot().hit_rate(), 0.5);
    }

    #[test]
    fn test_expired_counts_as_miss() {
        let stats = VaultStats::new();
        stats.record_expired();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.expired, 1);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.hits, 0);
    }

    #[test]
    fn test_write_counters() {
        let stats = VaultStats::new();
        stats.record_encrypted_write();
        stats.record_encrypted_write();
        stats.record_plaintext_write();
        stats.record_migration();
        stats.record_derivation();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.encrypted_writes, 2);
        assert_eq!(snapshot.plaintext_writes, 1);
        assert_eq!(snapshot.migrations, 1);
        assert_eq!(snapshot.key_derivations, 1);
    }
}
