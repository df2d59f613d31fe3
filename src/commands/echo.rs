use crate::commands::command_error::CommandError;
use crate::resp::RespValue;

pub struct EchoArguments {
    message: String,
}

impl EchoArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 1 {
            return Err(CommandError::WrongNumberOfArguments("echo"));
        }

        Ok(Self {
            message: arguments[0].clone(),
        })
    }
}

pub fn echo(arguments: &[String]) -> Result<RespValue, CommandError> {
    let echo_arguments = EchoArguments::parse(arguments)?;

    Ok(RespValue::BulkString(echo_arguments.message))
}

#[cfg(test)]
mod tests {
    use super::echo;
    use crate::commands::command_error::CommandError;
    use crate::resp::RespValue;

    #[test]
    fn test_echo() {
        assert_eq!(
            echo(&["strawberry".to_string()]),
            Ok(RespValue::BulkString("strawberry".to_string()))
        );
        assert_eq!(
            echo(&[]),
            Err(CommandError::WrongNumberOfArguments("echo"))
        );
    }
}
