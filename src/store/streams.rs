//! Stream namespace.
//!
//! A stream is an append-only sequence of entries ordered by a
//! `millisecond-sequence` ID. IDs are strictly increasing; once appended an
//! entry is never mutated or removed.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::store::StoreError;

const ID_FORMAT: &str = "Invalid stream ID format";
const ID_ZERO: &str = "The ID specified in XADD must be greater than 0-0";
const ID_NOT_GREATER: &str =
    "The ID specified in XADD is equal or smaller than the target stream top item";

/// A `millisecond-sequence` pair providing a strict total order over the
/// entries of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StreamId {
    pub ms: u64,
    pub seq: u64,
}

impl StreamId {
    pub const MIN: StreamId = StreamId { ms: 0, seq: 0 };
    pub const MAX: StreamId = StreamId {
        ms: u64::MAX,
        seq: u64::MAX,
    };

    /// Parses `<ms>` or `<ms>-<seq>`, filling a missing sequence part with
    /// `default_seq`.
    pub fn parse(input: &str, default_seq: u64) -> Result<StreamId, StoreError> {
        match input.split_once('-') {
            None => {
                let ms = parse_part(input)?;
                Ok(StreamId {
                    ms,
                    seq: default_seq,
                })
            }
            Some((ms, seq)) => Ok(StreamId {
                ms: parse_part(ms)?,
                seq: parse_part(seq)?,
            }),
        }
    }

    /// Parses an XRANGE start bound; `-` is the lowest possible ID and a
    /// missing sequence part defaults to 0.
    pub fn parse_range_start(input: &str) -> Result<StreamId, StoreError> {
        if input == "-" {
            return Ok(StreamId::MIN);
        }

        StreamId::parse(input, 0)
    }

    /// Parses an XRANGE end bound; `+` is the highest possible ID and a
    /// missing sequence part defaults to the maximum.
    pub fn parse_range_end(input: &str) -> Result<StreamId, StoreError> {
        if input == "+" {
            return Ok(StreamId::MAX);
        }

        StreamId::parse(input, u64::MAX)
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.ms, self.seq)
    }
}

fn parse_part(input: &str) -> Result<u64, StoreError> {
    input
        .parse::<u64>()
        .map_err(|_| StoreError::InvalidStreamId(ID_FORMAT.to_string()))
}

/// The entry ID requested by an XADD.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum IdSpec {
    /// `*` — wall-clock milliseconds with an auto-generated sequence.
    Auto,
    /// `<ms>-*` — fixed milliseconds with an auto-generated sequence.
    AutoSequence(u64),
    /// `<ms>-<seq>`.
    Explicit(StreamId),
}

impl IdSpec {
    pub fn parse(input: &str) -> Result<IdSpec, StoreError> {
        if input == "*" {
            return Ok(IdSpec::Auto);
        }

        let Some((ms, seq)) = input.split_once('-') else {
            return Err(StoreError::InvalidStreamId(ID_FORMAT.to_string()));
        };

        let ms = parse_part(ms)?;

        if seq == "*" {
            Ok(IdSpec::AutoSequence(ms))
        } else {
            Ok(IdSpec::Explicit(StreamId {
                ms,
                seq: parse_part(seq)?,
            }))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamEntry {
    pub id: StreamId,
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
pub struct Stream {
    entries: Vec<StreamEntry>,
}

impl Stream {
    pub fn last_id(&self) -> Option<StreamId> {
        self.entries.last().map(|entry| entry.id)
    }

    /// Resolves `spec` against the current last entry and appends. The
    /// resolved ID must be strictly greater than every existing entry; `0-0`
    /// is rejected outright.
    pub fn append(
        &mut self,
        spec: IdSpec,
        fields: BTreeMap<String, String>,
    ) -> Result<StreamId, StoreError> {
        let id = self.resolve(spec)?;

        if id == StreamId::MIN {
            return Err(StoreError::InvalidStreamId(ID_ZERO.to_string()));
        }

        if let Some(last) = self.last_id() {
            if id <= last {
                return Err(StoreError::InvalidStreamId(ID_NOT_GREATER.to_string()));
            }
        }

        self.entries.push(StreamEntry { id, fields });

        Ok(id)
    }

    fn resolve(&self, spec: IdSpec) -> Result<StreamId, StoreError> {
        match spec {
            IdSpec::Explicit(id) => Ok(id),
            IdSpec::AutoSequence(ms) => Ok(StreamId {
                ms,
                seq: self.next_sequence(ms)?,
            }),
            IdSpec::Auto => {
                let ms = unix_time_millis()?;

                Ok(StreamId {
                    ms,
                    seq: self.next_sequence(ms)?,
                })
            }
        }
    }

    fn next_sequence(&self, ms: u64) -> Result<u64, StoreError> {
        match self.last_id() {
            Some(last) if last.ms == ms => last
                .seq
                .checked_add(1)
                .ok_or_else(|| StoreError::InvalidStreamId(ID_NOT_GREATER.to_string())),
            // 0-0 is never a valid entry, so an auto sequence at time 0
            // starts at 1.
            None if ms == 0 => Ok(1),
            _ => Ok(0),
        }
    }

    /// Returns the entries with `start <= id <= end`, in stream order.
    pub fn range(&self, start: StreamId, end: StreamId) -> Vec<StreamEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.id >= start && entry.id <= end)
            .cloned()
            .collect()
    }

    /// Returns the entries with `id > after`, in stream order.
    pub fn entries_after(&self, after: StreamId) -> Vec<StreamEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.id > after)
            .cloned()
            .collect()
    }
}

fn unix_time_millis() -> Result<u64, StoreError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .map_err(|_| StoreError::InvalidStreamId("System time is before unix epoch".to_string()))
}

#[derive(Debug, Default)]
pub struct StreamStore {
    entries: HashMap<String, Stream>,
}

impl StreamStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn append(
        &mut self,
        key: &str,
        spec: IdSpec,
        fields: BTreeMap<String, String>,
    ) -> Result<StreamId, StoreError> {
        self.entries
            .entry(key.to_string())
            .or_default()
            .append(spec, fields)
    }

    pub fn last_id(&self, key: &str) -> Option<StreamId> {
        self.entries.get(key).and_then(|stream| stream.last_id())
    }

    pub fn range(&self, key: &str, start: StreamId, end: StreamId) -> Vec<StreamEntry> {
        self.entries
            .get(key)
            .map_or(Vec::new(), |stream| stream.range(start, end))
    }

    pub fn entries_after(&self, key: &str, after: StreamId) -> Vec<StreamEntry> {
        self.entries
            .get(key)
            .map_or(Vec::new(), |stream| stream.entries_after(after))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{IdSpec, Stream, StreamId};
    use crate::store::StoreError;

    fn id(ms: u64, seq: u64) -> StreamId {
        StreamId { ms, seq }
    }

    fn invalid(message: &str) -> StoreError {
        StoreError::InvalidStreamId(message.to_string())
    }

    #[test]
    fn test_stream_id_parse() {
        let test_cases = vec![
            ("5-3", 0, Ok(id(5, 3))),
            ("5", 0, Ok(id(5, 0))),
            ("5", u64::MAX, Ok(id(5, u64::MAX))),
            ("1526919030474-0", 0, Ok(id(1526919030474, 0))),
            ("invalid", 0, Err(invalid("Invalid stream ID format"))),
            ("5-x", 0, Err(invalid("Invalid stream ID format"))),
            ("-1-1", 0, Err(invalid("Invalid stream ID format"))),
        ];

        for (input, default_seq, expected) in test_cases {
            assert_eq!(
                StreamId::parse(input, default_seq),
                expected,
                "parsing {:?}",
                input
            );
        }
    }

    #[test]
    fn test_range_bound_parse() {
        assert_eq!(StreamId::parse_range_start("-"), Ok(StreamId::MIN));
        assert_eq!(StreamId::parse_range_start("7"), Ok(id(7, 0)));
        assert_eq!(StreamId::parse_range_end("+"), Ok(StreamId::MAX));
        assert_eq!(StreamId::parse_range_end("7"), Ok(id(7, u64::MAX)));
        assert_eq!(StreamId::parse_range_end("7-2"), Ok(id(7, 2)));
    }

    #[test]
    fn test_id_spec_parse() {
        let test_cases = vec![
            ("*", Ok(IdSpec::Auto)),
            ("5-*", Ok(IdSpec::AutoSequence(5))),
            ("5-3", Ok(IdSpec::Explicit(id(5, 3)))),
            ("invalid", Err(invalid("Invalid stream ID format"))),
            ("x-*", Err(invalid("Invalid stream ID format"))),
            ("5-x", Err(invalid("Invalid stream ID format"))),
        ];

        for (input, expected) in test_cases {
            assert_eq!(IdSpec::parse(input), expected, "parsing {:?}", input);
        }
    }

    #[test]
    fn test_append_id_validation() {
        let mut stream = Stream::default();
        stream
            .append(IdSpec::Explicit(id(1526919030474, 0)), BTreeMap::new())
            .unwrap();

        let test_cases = vec![
            (
                IdSpec::Explicit(id(0, 0)),
                Err(invalid("The ID specified in XADD must be greater than 0-0")),
            ),
            (
                IdSpec::Explicit(id(1526919030474, 0)),
                Err(invalid(
                    "The ID specified in XADD is equal or smaller than the target stream top item",
                )),
            ),
            (
                IdSpec::Explicit(id(1526919030473, 9)),
                Err(invalid(
                    "The ID specified in XADD is equal or smaller than the target stream top item",
                )),
            ),
            (IdSpec::AutoSequence(1526919030474), Ok(id(1526919030474, 1))),
            (IdSpec::Explicit(id(1526919030474, 2)), Ok(id(1526919030474, 2))),
            (IdSpec::AutoSequence(1526919030484), Ok(id(1526919030484, 0))),
            (IdSpec::Explicit(id(1526919030484, 5)), Ok(id(1526919030484, 5))),
        ];

        for (spec, expected) in test_cases {
            assert_eq!(
                stream.append(spec, BTreeMap::new()),
                expected,
                "appending {:?}",
                spec
            );
        }
    }

    #[test]
    fn test_append_rejects_zero_id_on_empty_stream() {
        let mut stream = Stream::default();

        assert_eq!(
            stream.append(IdSpec::Explicit(id(0, 0)), BTreeMap::new()),
            Err(invalid("The ID specified in XADD must be greater than 0-0"))
        );
    }

    #[test]
    fn test_auto_sequence_on_empty_stream_at_time_zero_starts_at_one() {
        let mut stream = Stream::default();

        assert_eq!(
            stream.append(IdSpec::AutoSequence(0), BTreeMap::new()),
            Ok(id(0, 1))
        );
    }

    #[test]
    fn test_auto_id_is_strictly_increasing() {
        let mut stream = Stream::default();

        let first = stream.append(IdSpec::Auto, BTreeMap::new()).unwrap();
        let second = stream.append(IdSpec::Auto, BTreeMap::new()).unwrap();

        assert!(second > first);
    }

    #[test]
    fn test_range_and_entries_after() {
        let mut stream = Stream::default();

        for seq in 0..3 {
            stream
                .append(
                    IdSpec::Explicit(id(1000, seq + 1)),
                    BTreeMap::from([("n".to_string(), seq.to_string())]),
                )
                .unwrap();
        }
        stream
            .append(IdSpec::Explicit(id(2000, 0)), BTreeMap::new())
            .unwrap();

        let ids = |entries: Vec<super::StreamEntry>| {
            entries
                .into_iter()
                .map(|entry| entry.id)
                .collect::<Vec<_>>()
        };

        assert_eq!(
            ids(stream.range(StreamId::MIN, StreamId::MAX)),
            vec![id(1000, 1), id(1000, 2), id(1000, 3), id(2000, 0)]
        );
        assert_eq!(
            ids(stream.range(id(1000, 2), id(1000, 3))),
            vec![id(1000, 2), id(1000, 3)]
        );
        assert_eq!(
            ids(stream.entries_after(id(1000, 2))),
            vec![id(1000, 3), id(2000, 0)]
        );
        assert_eq!(ids(stream.entries_after(id(2000, 0))), Vec::<StreamId>::new());
    }
}
