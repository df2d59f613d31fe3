use std::time::Duration;

use tokio::time::Instant;

use crate::commands::command_error::CommandError;
use crate::commands::stream_utils::encode_stream_entries;
use crate::resp::RespValue;
use crate::store::{Keyspace, StreamEntry, StreamId};

/// Parsed arguments for the XREAD command.
///
/// Format: `XREAD [BLOCK milliseconds] STREAMS key1 key2 ... id1 id2 ...` —
/// the keys and IDs are two parallel runs of equal length.
pub struct XreadArguments {
    /// Blocking duration in milliseconds; `None` for a non-blocking read and
    /// `Some(0)` to block until data arrives.
    block: Option<u64>,
    /// `(key, id)` pairs; each ID is an exclusive lower bound, or `$` for
    /// "whatever the stream's last ID is".
    key_id_pairs: Vec<(String, String)>,
}

impl XreadArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() < 3 {
            return Err(CommandError::WrongNumberOfArguments("xread"));
        }

        let (block, pairs_start) = match arguments[0].to_lowercase().as_str() {
            "block" => {
                let milliseconds = arguments[1]
                    .parse::<i64>()
                    .map_err(|_| CommandError::InvalidTimeout)?;

                if milliseconds < 0 {
                    return Err(CommandError::NegativeTimeout);
                }

                if !arguments[2].eq_ignore_ascii_case("streams") {
                    return Err(CommandError::SyntaxError);
                }

                (Some(milliseconds as u64), 3)
            }
            "streams" => (None, 1),
            _ => return Err(CommandError::SyntaxError),
        };

        let data = &arguments[pairs_start..];

        if data.is_empty() || data.len() % 2 != 0 {
            return Err(CommandError::WrongNumberOfArguments("xread"));
        }

        let split = data.len() / 2;
        let mut key_id_pairs = Vec::with_capacity(split);

        for i in 0..split {
            key_id_pairs.push((data[i].clone(), data[split + i].clone()));
        }

        Ok(Self {
            block,
            key_id_pairs,
        })
    }
}

/// Handles XREAD.
///
/// Non-blocking reads answer immediately: streams with entries after the
/// requested ID are returned as `[key, [entries...]]`, and a read with no
/// matches anywhere answers null. With BLOCK, an empty first check parks the
/// connection until a matching append or the deadline. `$` bounds are
/// re-resolved at the moment blocking begins, so only entries appended after
/// that point can satisfy the read.
pub async fn xread(keyspace: &Keyspace, arguments: &[String]) -> Result<RespValue, CommandError> {
    let xread_arguments = XreadArguments::parse(arguments)?;

    let resolved = resolve_start_ids(keyspace, &xread_arguments.key_id_pairs).await?;
    let matches = keyspace.xread(&resolved).await;

    if !matches.is_empty() {
        return Ok(encode_matches(matches));
    }

    let Some(block_ms) = xread_arguments.block else {
        return Ok(RespValue::NullBulkString);
    };

    let deadline = (block_ms > 0).then(|| Instant::now() + Duration::from_millis(block_ms));

    let resolved = resolve_start_ids(keyspace, &xread_arguments.key_id_pairs).await?;
    let matches = keyspace.xread_block(&resolved, deadline).await;

    if matches.is_empty() {
        return Ok(RespValue::NullBulkString);
    }

    Ok(encode_matches(matches))
}

/// Resolves each requested ID to the concrete exclusive lower bound. `$`
/// becomes the stream's current last ID (`0-0` when the stream is absent or
/// empty); anything else must parse as `ms[-seq]`.
async fn resolve_start_ids(
    keyspace: &Keyspace,
    key_id_pairs: &[(String, String)],
) -> Result<Vec<(String, StreamId)>, CommandError> {
    let mut resolved = Vec::with_capacity(key_id_pairs.len());

    for (key, id) in key_id_pairs {
        let start = if id == "$" {
            keyspace
                .last_stream_id(key)
                .await
                .unwrap_or(StreamId::MIN)
        } else {
            StreamId::parse(id, 0)?
        };

        resolved.push((key.clone(), start));
    }

    Ok(resolved)
}

fn encode_matches(matches: Vec<(String, Vec<StreamEntry>)>) -> RespValue {
    RespValue::Array(
        matches
            .into_iter()
            .map(|(key, entries)| {
                RespValue::Array(vec![
                    RespValue::BulkString(key),
                    encode_stream_entries(&entries),
                ])
            })
            .collect(),
    )
}
