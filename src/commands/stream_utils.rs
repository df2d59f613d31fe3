//! RESP encoding shared by the stream read commands.

use crate::resp::RespValue;
use crate::store::StreamEntry;

/// Encodes one entry as `[id, [field, value, ...]]`.
pub fn encode_stream_entry(entry: &StreamEntry) -> RespValue {
    let mut fields = Vec::with_capacity(entry.fields.len() * 2);

    for (name, value) in &entry.fields {
        fields.push(RespValue::BulkString(name.clone()));
        fields.push(RespValue::BulkString(value.clone()));
    }

    RespValue::Array(vec![
        RespValue::BulkString(entry.id.to_string()),
        RespValue::Array(fields),
    ])
}

/// Encodes a run of entries in stream order.
pub fn encode_stream_entries(entries: &[StreamEntry]) -> RespValue {
    RespValue::Array(entries.iter().map(encode_stream_entry).collect())
}
