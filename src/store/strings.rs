//! String namespace with lazy expiry.

use std::collections::HashMap;

use tokio::time::Instant;

use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub struct StringEntry {
    pub value: String,
    pub expires_at: Option<Instant>,
}

/// Keys are never swept proactively; any read that touches an expired entry
/// deletes it before answering.
#[derive(Debug, Default)]
pub struct StringStore {
    entries: HashMap<String, StringEntry>,
}

impl StringStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, key: &str) -> Option<&str> {
        self.purge_if_expired(key);
        self.entries.get(key).map(|entry| entry.value.as_str())
    }

    /// Stores `value` under `key`. Setting without an expiry clears any
    /// previous expiry for the key.
    pub fn set(&mut self, key: String, value: String, expires_at: Option<Instant>) {
        self.entries.insert(key, StringEntry { value, expires_at });
    }

    /// Increments the integer stored at `key`, initializing an absent key to 1.
    pub fn incr(&mut self, key: &str) -> Result<i64, StoreError> {
        self.purge_if_expired(key);

        let Some(entry) = self.entries.get_mut(key) else {
            self.entries.insert(
                key.to_string(),
                StringEntry {
                    value: "1".to_string(),
                    expires_at: None,
                },
            );
            return Ok(1);
        };

        let current = entry
            .value
            .parse::<i64>()
            .map_err(|_| StoreError::NotAnInteger)?;
        let incremented = current.checked_add(1).ok_or(StoreError::NotAnInteger)?;
        entry.value = incremented.to_string();

        Ok(incremented)
    }

    pub fn contains_live(&mut self, key: &str) -> bool {
        self.purge_if_expired(key);
        self.entries.contains_key(key)
    }

    fn purge_if_expired(&mut self, key: &str) {
        let expired = self
            .entries
            .get(key)
            .and_then(|entry| entry.expires_at)
            .map_or(false, |expires_at| Instant::now() >= expires_at);

        if expired {
            self.entries.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::StringStore;
    use crate::store::StoreError;

    #[test]
    fn test_set_and_get() {
        let mut store = StringStore::new();

        store.set("fruit".to_string(), "mango".to_string(), None);

        assert_eq!(store.get("fruit"), Some("mango"));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_get_removes_expired_entry() {
        let mut store = StringStore::new();

        store.set(
            "fruit".to_string(),
            "mango".to_string(),
            Some(Instant::now()),
        );

        assert_eq!(store.get("fruit"), None);
        assert_eq!(store.contains_live("fruit"), false);
    }

    #[test]
    fn test_set_without_expiry_clears_previous_expiry() {
        let mut store = StringStore::new();

        store.set(
            "fruit".to_string(),
            "mango".to_string(),
            Some(Instant::now() + Duration::from_secs(60)),
        );
        store.set("fruit".to_string(), "pear".to_string(), None);

        assert_eq!(store.get("fruit"), Some("pear"));
    }

    #[test]
    fn test_incr() {
        let mut store = StringStore::new();
        store.set("count".to_string(), "41".to_string(), None);
        store.set("word".to_string(), "mango".to_string(), None);
        store.set("huge".to_string(), i64::MAX.to_string(), None);

        let test_cases = vec![
            ("missing", Ok(1)),
            ("count", Ok(42)),
            ("word", Err(StoreError::NotAnInteger)),
            ("huge", Err(StoreError::NotAnInteger)),
        ];

        for (key, expected) in test_cases {
            assert_eq!(store.incr(key), expected, "incrementing {:?}", key);
        }

        assert_eq!(store.get("count"), Some("42"));
        assert_eq!(store.get("missing"), Some("1"));
    }

    #[test]
    fn test_incr_on_expired_key_restarts_from_one() {
        let mut store = StringStore::new();

        store.set("count".to_string(), "41".to_string(), Some(Instant::now()));

        assert_eq!(store.incr("count"), Ok(1));
    }
}
