use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::Keyspace;

pub struct LlenArguments {
    key: String,
}

impl LlenArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::WrongNumberOfArguments("llen"));
        }

        Ok(Self {
            key: arguments[0].clone(),
        })
    }
}

pub async fn llen(keyspace: &Keyspace, arguments: &[String]) -> Result<RespValue, CommandError> {
    let llen_arguments = LlenArguments::parse(arguments)?;

    let length = keyspace.llen(&llen_arguments.key).await;

    Ok(RespValue::Integer(length as i64))
}
