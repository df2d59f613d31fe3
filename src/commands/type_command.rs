use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::Keyspace;

pub struct TypeArguments {
    key: String,
}

impl TypeArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::WrongNumberOfArguments("type"));
        }

        Ok(Self {
            key: arguments[0].clone(),
        })
    }
}

/// Handles TYPE: inspects all three namespaces and reports the first match,
/// or `none` when the key is absent everywhere.
pub async fn type_command(
    keyspace: &Keyspace,
    arguments: &[String],
) -> Result<RespValue, CommandError> {
    let type_arguments = TypeArguments::parse(arguments)?;

    let name = keyspace.type_of(&type_arguments.key).await;

    Ok(RespValue::SimpleString(name.to_string()))
}
