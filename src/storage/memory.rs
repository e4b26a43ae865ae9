//! In-memory storage

use rustc_hash::FxHashMap;

use super::{Storage, StorageError};

/// Storage held in process memory, with an optional byte quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: FxHashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Creates an empty, unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that refuses to hold more than `quota` bytes of keys and values.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            values: FxHashMap::default(),
            quota: Some(quota),
        }
    }

    /// Seeds a value directly, bypassing the quota.
    #[must_use]
    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    /// Bytes currently used, excluding the entry under `skip`.
    fn used_except(&self, skip: &str) -> usize {
        self.values
            .iter()
            .filter(|(key, _)| key.as_str() != skip)
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let needed = self.used_except(key) + key.len() + value.len();

            if needed > quota {
                return Err(StorageError::QuotaExceeded(needed, quota));
            }
        }

        self.values.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn missing_key_reads_as_none() -> TestResult {
        let storage = MemoryStorage::new();

        assert_eq!(storage.get("cartItems")?, None);

        Ok(())
    }

    #[test]
    fn set_then_get_returns_value() -> TestResult {
        let mut storage = MemoryStorage::new();

        storage.set("k", "v1")?;
        storage.set("k", "v2")?;

        assert_eq!(storage.get("k")?.as_deref(), Some("v2"));

        Ok(())
    }

    #[test]
    fn remove_is_idempotent() -> TestResult {
        let mut storage = MemoryStorage::new().with_value("k", "v");

        storage.remove("k")?;
        storage.remove("k")?;

        assert_eq!(storage.get("k")?, None);

        Ok(())
    }

    #[test]
    fn quota_rejects_oversized_writes_and_keeps_old_value() -> TestResult {
        let mut storage = MemoryStorage::with_quota(8);

        storage.set("k", "1234")?;

        let result = storage.set("k", "123456789");

        assert!(matches!(result, Err(StorageError::QuotaExceeded(10, 8))));
        assert_eq!(storage.get("k")?.as_deref(), Some("1234"));

        Ok(())
    }

    #[test]
    fn quota_counts_replacement_not_accumulation() -> TestResult {
        let mut storage = MemoryStorage::with_quota(6);

        storage.set("k", "12345")?;
        storage.set("k", "54321")?;

        Ok(())
    }
}
