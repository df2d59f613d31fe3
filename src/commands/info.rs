use tokio::sync::RwLock;

use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::server::ServerInfo;

pub struct InfoArguments {}

impl InfoArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() > 1 {
            return Err(CommandError::WrongNumberOfArguments("info"));
        }

        if let Some(section) = arguments.first() {
            if !section.eq_ignore_ascii_case("replication") {
                return Err(CommandError::SyntaxError);
            }
        }

        Ok(Self {})
    }
}

/// Handles INFO: a bulk string of `key:value` lines under a `# Replication`
/// header reporting the role and replication identity.
pub async fn info(
    server: &RwLock<ServerInfo>,
    arguments: &[String],
) -> Result<RespValue, CommandError> {
    InfoArguments::parse(arguments)?;

    let server = server.read().await;
    let body = [
        "# Replication".to_string(),
        format!("role:{}", server.role.name()),
        format!("master_replid:{}", server.repl_id),
        format!("master_repl_offset:{}", server.repl_offset),
    ]
    .join("\r\n");

    Ok(RespValue::BulkString(body))
}
