//! The shared keyspace.
//!
//! Three independent namespaces (strings, lists, streams), each behind its own
//! lock so operations on one namespace never block the others. Callers only
//! ever see the synchronized [`Keyspace`] methods; the raw containers are
//! private to this module.
//!
//! Writes that create or update a key validate that the key is not live in
//! another namespace and fail with [`StoreError::WrongType`] otherwise. The
//! validating writes take the namespace locks in the fixed order strings →
//! lists → streams.

mod lists;
mod signal;
mod streams;
mod strings;

use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub use signal::{ChangeListener, ChangeSignal};
pub use streams::{IdSpec, Stream, StreamEntry, StreamId, StreamStore};
pub use strings::{StringEntry, StringStore};

pub use lists::ListStore;

/// Keyspace-level failures. Converted into protocol error responses by the
/// command layer.
#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("value is not an integer or out of range")]
    NotAnInteger,
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("{0}")]
    InvalidStreamId(String),
}

#[derive(Debug)]
pub struct Keyspace {
    strings: Mutex<StringStore>,
    lists: Mutex<ListStore>,
    streams: Mutex<StreamStore>,
    list_changes: ChangeSignal,
    stream_changes: ChangeSignal,
}

impl Keyspace {
    pub fn new() -> Self {
        Self {
            strings: Mutex::new(StringStore::new()),
            lists: Mutex::new(ListStore::new()),
            streams: Mutex::new(StreamStore::new()),
            list_changes: ChangeSignal::new(),
            stream_changes: ChangeSignal::new(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.strings
            .lock()
            .await
            .get(key)
            .map(|value| value.to_string())
    }

    pub async fn set(
        &self,
        key: &str,
        value: &str,
        expires_at: Option<Instant>,
    ) -> Result<(), StoreError> {
        let mut strings = self.strings.lock().await;
        {
            let lists = self.lists.lock().await;
            let streams = self.streams.lock().await;

            if lists.contains_key(key) || streams.contains_key(key) {
                return Err(StoreError::WrongType);
            }
        }

        strings.set(key.to_string(), value.to_string(), expires_at);

        Ok(())
    }

    pub async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut strings = self.strings.lock().await;
        {
            let lists = self.lists.lock().await;
            let streams = self.streams.lock().await;

            if lists.contains_key(key) || streams.contains_key(key) {
                return Err(StoreError::WrongType);
            }
        }

        strings.incr(key)
    }

    pub async fn rpush(&self, key: &str, values: &[String]) -> Result<usize, StoreError> {
        let length = {
            let mut strings = self.strings.lock().await;
            let mut lists = self.lists.lock().await;

            if strings.contains_live(key) || self.streams.lock().await.contains_key(key) {
                return Err(StoreError::WrongType);
            }

            lists.push_back(key, values)
        };

        self.list_changes.broadcast();

        Ok(length)
    }

    pub async fn lpush(&self, key: &str, values: &[String]) -> Result<usize, StoreError> {
        let length = {
            let mut strings = self.strings.lock().await;
            let mut lists = self.lists.lock().await;

            if strings.contains_live(key) || self.streams.lock().await.contains_key(key) {
                return Err(StoreError::WrongType);
            }

            lists.push_front(key, values)
        };

        self.list_changes.broadcast();

        Ok(length)
    }

    pub async fn lrange(&self, key: &str, start: isize, end: isize) -> Vec<String> {
        self.lists.lock().await.range(key, start, end)
    }

    pub async fn lpop(&self, key: &str) -> Option<String> {
        self.lists.lock().await.pop_front(key)
    }

    pub async fn lpop_many(&self, key: &str, count: usize) -> Vec<String> {
        self.lists.lock().await.pop_front_many(key, count)
    }

    pub async fn llen(&self, key: &str) -> usize {
        self.lists.lock().await.len(key)
    }

    /// Pops the head of `key`, waiting for a producer when the list is empty.
    ///
    /// `timeout` of `None` waits forever; the deadline is computed once at
    /// entry and re-applied on every wake. Returns `None` on timeout.
    pub async fn blpop(&self, key: &str, timeout: Option<Duration>) -> Option<String> {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let mut listener = self.list_changes.subscribe();

        loop {
            if let Some(value) = self.lists.lock().await.pop_front(key) {
                return Some(value);
            }

            // Woken by any list mutation; the pop above re-checks our key.
            if !listener.wait(deadline).await {
                return None;
            }
        }
    }

    pub async fn xadd(
        &self,
        key: &str,
        spec: IdSpec,
        fields: BTreeMap<String, String>,
    ) -> Result<StreamId, StoreError> {
        let id = {
            let mut strings = self.strings.lock().await;
            let lists = self.lists.lock().await;
            let mut streams = self.streams.lock().await;

            if strings.contains_live(key) || lists.contains_key(key) {
                return Err(StoreError::WrongType);
            }

            streams.append(key, spec, fields)?
        };

        self.stream_changes.broadcast();

        Ok(id)
    }

    pub async fn last_stream_id(&self, key: &str) -> Option<StreamId> {
        self.streams.lock().await.last_id(key)
    }

    pub async fn xrange(&self, key: &str, start: StreamId, end: StreamId) -> Vec<StreamEntry> {
        self.streams.lock().await.range(key, start, end)
    }

    /// Returns, for each requested stream, the entries strictly after the
    /// paired ID. Streams without matches are omitted.
    pub async fn xread(&self, pairs: &[(String, StreamId)]) -> Vec<(String, Vec<StreamEntry>)> {
        let streams = self.streams.lock().await;
        let mut matches = Vec::new();

        for (key, after) in pairs {
            let entries = streams.entries_after(key, *after);

            if !entries.is_empty() {
                matches.push((key.clone(), entries));
            }
        }

        matches
    }

    /// Like [`Keyspace::xread`], but waits for matching entries to be appended
    /// when none exist yet. Returns an empty result on deadline expiry.
    pub async fn xread_block(
        &self,
        pairs: &[(String, StreamId)],
        deadline: Option<Instant>,
    ) -> Vec<(String, Vec<StreamEntry>)> {
        let mut listener = self.stream_changes.subscribe();

        loop {
            let matches = self.xread(pairs).await;

            if !matches.is_empty() {
                return matches;
            }

            if !listener.wait(deadline).await {
                return Vec::new();
            }
        }
    }

    /// Reports the namespace holding `key`: first match across strings,
    /// lists, streams, or `none`.
    pub async fn type_of(&self, key: &str) -> &'static str {
        if self.strings.lock().await.contains_live(key) {
            return "string";
        }

        if self.lists.lock().await.contains_key(key) {
            return "list";
        }

        if self.streams.lock().await.contains_key(key) {
            return "stream";
        }

        "none"
    }
}

impl Default for Keyspace {
    fn default() -> Self {
        Self::new()
    }
}
