use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::Keyspace;

pub struct IncrArguments {
    key: String,
}

impl IncrArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::WrongNumberOfArguments("incr"));
        }

        Ok(Self {
            key: arguments[0].clone(),
        })
    }
}

/// Handles the INCR command. An absent key is initialized to 1; a value that
/// does not parse as a 64-bit integer, or an increment past `i64::MAX`, fails
/// without modifying the key.
pub async fn incr(keyspace: &Keyspace, arguments: &[String]) -> Result<RespValue, CommandError> {
    let incr_arguments = IncrArguments::parse(arguments)?;

    let incremented = keyspace.incr(&incr_arguments.key).await?;

    Ok(RespValue::Integer(incremented))
}
