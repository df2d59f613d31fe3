//! List namespace.
//!
//! Lists are double-ended so pushes and pops at either end stay O(1). An
//! empty list is indistinguishable from an absent key and is removed from the
//! namespace as soon as it drains.

use std::collections::{HashMap, VecDeque};

#[derive(Debug, Default)]
pub struct ListStore {
    entries: HashMap<String, VecDeque<String>>,
}

impl ListStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Appends each value in argument order. Returns the new length.
    pub fn push_back(&mut self, key: &str, values: &[String]) -> usize {
        let list = self.entries.entry(key.to_string()).or_default();

        for value in values {
            list.push_back(value.clone());
        }

        list.len()
    }

    /// Prepends each value one at a time, so the final head order is the
    /// reverse of the argument order. Returns the new length.
    pub fn push_front(&mut self, key: &str, values: &[String]) -> usize {
        let list = self.entries.entry(key.to_string()).or_default();

        for value in values {
            list.push_front(value.clone());
        }

        list.len()
    }

    pub fn pop_front(&mut self, key: &str) -> Option<String> {
        let list = self.entries.get_mut(key)?;
        let value = list.pop_front();

        if list.is_empty() {
            self.entries.remove(key);
        }

        value
    }

    /// Pops up to `count` values from the head.
    pub fn pop_front_many(&mut self, key: &str, count: usize) -> Vec<String> {
        let Some(list) = self.entries.get_mut(key) else {
            return Vec::new();
        };

        let mut values = Vec::new();

        for _ in 0..count {
            match list.pop_front() {
                Some(value) => values.push(value),
                None => break,
            }
        }

        if list.is_empty() {
            self.entries.remove(key);
        }

        values
    }

    pub fn len(&self, key: &str) -> usize {
        self.entries.get(key).map_or(0, |list| list.len())
    }

    /// Returns the elements between `start` and `end` inclusive. Negative
    /// indices count from the end; out-of-bounds indices are clamped and an
    /// inverted range yields an empty result.
    pub fn range(&self, key: &str, start: isize, end: isize) -> Vec<String> {
        let Some(list) = self.entries.get(key) else {
            return Vec::new();
        };

        let len = list.len() as isize;

        let mut start = if start < 0 { len + start } else { start };
        let mut end = if end < 0 { len + end } else { end };

        start = start.max(0);
        end = end.min(len - 1);

        if start >= len || start > end {
            return Vec::new();
        }

        list.range(start as usize..=end as usize).cloned().collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::ListStore;

    fn values(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn test_push_back_keeps_argument_order() {
        let mut store = ListStore::new();

        assert_eq!(store.push_back("fruits", &values(&["apple", "pear"])), 2);
        assert_eq!(store.push_back("fruits", &values(&["mango"])), 3);

        assert_eq!(
            store.range("fruits", 0, -1),
            values(&["apple", "pear", "mango"])
        );
    }

    #[test]
    fn test_push_front_reverses_argument_order() {
        let mut store = ListStore::new();

        assert_eq!(store.push_front("fruits", &values(&["a", "b", "c"])), 3);

        assert_eq!(store.range("fruits", 0, -1), values(&["c", "b", "a"]));
    }

    #[test]
    fn test_range_index_handling() {
        let mut store = ListStore::new();
        store.push_back("fruits", &values(&["a", "b", "c", "d", "e"]));

        let test_cases = vec![
            ((0, 4), values(&["a", "b", "c", "d", "e"])),
            ((0, -1), values(&["a", "b", "c", "d", "e"])),
            ((1, 3), values(&["b", "c", "d"])),
            ((-2, -1), values(&["d", "e"])),
            ((-100, 100), values(&["a", "b", "c", "d", "e"])),
            ((3, 1), Vec::new()),
            ((5, 9), Vec::new()),
            ((0, 0), values(&["a"])),
        ];

        for ((start, end), expected) in test_cases {
            assert_eq!(
                store.range("fruits", start, end),
                expected,
                "range {}..={}",
                start,
                end
            );
        }

        assert_eq!(store.range("missing", 0, -1), Vec::<String>::new());
    }

    #[test]
    fn test_pop_front_removes_drained_list() {
        let mut store = ListStore::new();
        store.push_back("fruits", &values(&["apple"]));

        assert_eq!(store.pop_front("fruits"), Some("apple".to_string()));
        assert_eq!(store.contains_key("fruits"), false);
        assert_eq!(store.pop_front("fruits"), None);
    }

    #[test]
    fn test_pop_front_many() {
        let mut store = ListStore::new();
        store.push_back("fruits", &values(&["a", "b", "c"]));

        assert_eq!(store.pop_front_many("fruits", 2), values(&["a", "b"]));
        assert_eq!(store.len("fruits"), 1);

        // Asking for more than remains drains the list and removes the key.
        assert_eq!(store.pop_front_many("fruits", 5), values(&["c"]));
        assert_eq!(store.contains_key("fruits"), false);

        assert_eq!(store.pop_front_many("missing", 3), Vec::<String>::new());
    }

    #[test]
    fn test_len() {
        let mut store = ListStore::new();
        store.push_back("fruits", &values(&["a", "b"]));

        assert_eq!(store.len("fruits"), 2);
        assert_eq!(store.len("missing"), 0);
    }
}
