use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::Keyspace;

pub struct LpopArguments {
    key: String,
    count: Option<usize>,
}

impl LpopArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.is_empty() || arguments.len() > 2 {
            return Err(CommandError::WrongNumberOfArguments("lpop"));
        }

        let count = match arguments.get(1) {
            None => None,
            Some(raw) => {
                let count = raw
                    .parse::<i64>()
                    .map_err(|_| CommandError::NotAnInteger)?;

                if count < 0 {
                    return Err(CommandError::NegativeCount);
                }

                Some(count as usize)
            }
        };

        Ok(Self {
            key: arguments[0].clone(),
            count,
        })
    }
}

/// Handles LPOP. Without a count the reply is a single bulk value (null when
/// the key is absent or empty); with an explicit count it is an array of up
/// to `count` popped values (a null array when nothing was popped).
pub async fn lpop(keyspace: &Keyspace, arguments: &[String]) -> Result<RespValue, CommandError> {
    let lpop_arguments = LpopArguments::parse(arguments)?;

    match lpop_arguments.count {
        None => match keyspace.lpop(&lpop_arguments.key).await {
            Some(value) => Ok(RespValue::BulkString(value)),
            None => Ok(RespValue::NullBulkString),
        },
        Some(count) => {
            let popped = keyspace.lpop_many(&lpop_arguments.key, count).await;

            if popped.is_empty() {
                return Ok(RespValue::NullArray);
            }

            Ok(RespValue::Array(
                popped.into_iter().map(RespValue::BulkString).collect(),
            ))
        }
    }
}
