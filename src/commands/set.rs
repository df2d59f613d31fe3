use std::time::Duration;

use tokio::time::Instant;

use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::store::Keyspace;

pub struct SetArguments {
    key: String,
    value: String,
    expires_at: Option<Instant>,
}

impl SetArguments {
    /// Parses `SET key value [PX milliseconds]`. The PX option name is
    /// case-insensitive; a non-integer PX value is rejected before anything
    /// is stored.
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 2 && arguments.len() != 4 {
            return Err(CommandError::WrongNumberOfArguments("set"));
        }

        let mut expires_at: Option<Instant> = None;

        if arguments.len() == 4 {
            if !arguments[2].eq_ignore_ascii_case("px") {
                return Err(CommandError::SyntaxError);
            }

            let milliseconds = arguments[3]
                .parse::<u64>()
                .map_err(|_| CommandError::InvalidExpiry)?;

            expires_at = Some(Instant::now() + Duration::from_millis(milliseconds));
        }

        Ok(Self {
            key: arguments[0].clone(),
            value: arguments[1].clone(),
            expires_at,
        })
    }
}

pub async fn set(keyspace: &Keyspace, arguments: &[String]) -> Result<RespValue, CommandError> {
    let set_arguments = SetArguments::parse(arguments)?;

    keyspace
        .set(
            &set_arguments.key,
            &set_arguments.value,
            set_arguments.expires_at,
        )
        .await?;

    Ok(RespValue::SimpleString("OK".to_string()))
}

#[cfg(test)]
mod tests {
    use super::SetArguments;
    use crate::commands::command_error::CommandError;

    fn arguments(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn test_parse() {
        let test_cases = vec![
            (arguments(&["key", "value"]), None),
            (arguments(&["key", "value", "PX", "100"]), None),
            (arguments(&["key", "value", "px", "100"]), None),
            (arguments(&["key", "value", "PX", "0"]), None),
            (
                arguments(&["key"]),
                Some(CommandError::WrongNumberOfArguments("set")),
            ),
            (
                arguments(&["key", "value", "PX"]),
                Some(CommandError::WrongNumberOfArguments("set")),
            ),
            (
                arguments(&["key", "value", "EX", "100"]),
                Some(CommandError::SyntaxError),
            ),
            (
                arguments(&["key", "value", "PX", "soon"]),
                Some(CommandError::InvalidExpiry),
            ),
            (
                arguments(&["key", "value", "PX", "-5"]),
                Some(CommandError::InvalidExpiry),
            ),
        ];

        for (input, expected_error) in test_cases {
            assert_eq!(
                SetArguments::parse(&input).err(),
                expected_error,
                "parsing {:?}",
                input
            );
        }
    }
}
