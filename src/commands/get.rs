use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::Keyspace;

pub struct GetArguments {
    key: String,
}

impl GetArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::WrongNumberOfArguments("get"));
        }

        Ok(Self {
            key: arguments[0].clone(),
        })
    }
}

/// Handles the GET command. Expired keys are deleted on read, so a GET after
/// the expiry answers null even though no sweeper ran.
pub async fn get(keyspace: &Keyspace, arguments: &[String]) -> Result<RespValue, CommandError> {
    let get_arguments = GetArguments::parse(arguments)?;

    match keyspace.get(&get_arguments.key).await {
        Some(value) => Ok(RespValue::BulkString(value)),
        None => Ok(RespValue::NullBulkString),
    }
}
