use std::time::Duration;

use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::Keyspace;

pub struct BlpopArguments {
    key: String,
    timeout: Option<Duration>,
}

impl BlpopArguments {
    /// Parses `BLPOP key timeoutSeconds`. The timeout is a float number of
    /// seconds; `0` means block until a value arrives.
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 2 {
            return Err(CommandError::WrongNumberOfArguments("blpop"));
        }

        let seconds = arguments[1]
            .parse::<f64>()
            .map_err(|_| CommandError::InvalidTimeout)?;

        if !seconds.is_finite() {
            return Err(CommandError::InvalidTimeout);
        }

        if seconds < 0.0 {
            return Err(CommandError::NegativeTimeout);
        }

        let timeout = if seconds == 0.0 {
            None
        } else {
            Some(Duration::from_secs_f64(seconds))
        };

        Ok(Self {
            key: arguments[0].clone(),
            timeout,
        })
    }
}

/// Handles BLPOP. Pops immediately when the list has a head; otherwise the
/// calling connection's task waits for a push to the key, bounded by the
/// timeout. On success the reply is `[key, value]`; on timeout a null array.
pub async fn blpop(keyspace: &Keyspace, arguments: &[String]) -> Result<RespValue, CommandError> {
    let blpop_arguments = BlpopArguments::parse(arguments)?;

    match keyspace
        .blpop(&blpop_arguments.key, blpop_arguments.timeout)
        .await
    {
        Some(value) => Ok(RespValue::Array(vec![
            RespValue::BulkString(blpop_arguments.key),
            RespValue::BulkString(value),
        ])),
        None => Ok(RespValue::NullArray),
    }
}
