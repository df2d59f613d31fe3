use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::Keyspace;

pub struct PushArguments {
    key: String,
    values: Vec<String>,
}

impl PushArguments {
    pub fn parse(arguments: &[String], prepend: bool) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::WrongNumberOfArguments(if prepend {
                "lpush"
            } else {
                "rpush"
            }));
        }

        Ok(Self {
            key: arguments[0].clone(),
            values: arguments[1..].to_vec(),
        })
    }
}

/// Handles RPUSH: appends each value in argument order and returns the new
/// length. Every push wakes blocked list readers.
pub async fn rpush(keyspace: &Keyspace, arguments: &[String]) -> Result<RespValue, CommandError> {
    let push_arguments = PushArguments::parse(arguments, false)?;

    let length = keyspace
        .rpush(&push_arguments.key, &push_arguments.values)
        .await?;

    Ok(RespValue::Integer(length as i64))
}

/// Handles LPUSH: prepends each value one at a time, so `LPUSH k v1 v2`
/// leaves the list head as `v2 v1`. Every push wakes blocked list readers.
pub async fn lpush(keyspace: &Keyspace, arguments: &[String]) -> Result<RespValue, CommandError> {
    let push_arguments = PushArguments::parse(arguments, true)?;

    let length = keyspace
        .lpush(&push_arguments.key, &push_arguments.values)
        .await?;

    Ok(RespValue::Integer(length as i64))
}
