use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::Keyspace;

pub struct LrangeArguments {
    key: String,
    start: isize,
    end: isize,
}

impl LrangeArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 3 {
            return Err(CommandError::WrongNumberOfArguments("lrange"));
        }

        let start = arguments[1]
            .parse::<isize>()
            .map_err(|_| CommandError::NotAnInteger)?;
        let end = arguments[2]
            .parse::<isize>()
            .map_err(|_| CommandError::NotAnInteger)?;

        Ok(Self {
            key: arguments[0].clone(),
            start,
            end,
        })
    }
}

/// Handles LRANGE. Negative indices count from the tail; an empty or inverted
/// range yields an empty array, never an error.
pub async fn lrange(keyspace: &Keyspace, arguments: &[String]) -> Result<RespValue, CommandError> {
    let lrange_arguments = LrangeArguments::parse(arguments)?;

    let elements = keyspace
        .lrange(
            &lrange_arguments.key,
            lrange_arguments.start,
            lrange_arguments.end,
        )
        .await;

    Ok(RespValue::Array(
        elements.into_iter().map(RespValue::BulkString).collect(),
    ))
}
