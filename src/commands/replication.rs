//! Handshake-side commands. The handshake itself lives in
//! [`crate::replication`]; these handlers only produce the replies the
//! dispatcher owes a connecting replica.

use tokio::sync::RwLock;

use crate::commands::command_error::CommandError;
use crate::resp::RespValue;
use crate::server::ServerInfo;

/// Handles REPLCONF. The configuration a replica announces
/// (listening-port, capabilities) is acknowledged but not recorded.
pub fn replconf(arguments: &[String]) -> Result<RespValue, CommandError> {
    if arguments.is_empty() {
        return Err(CommandError::WrongNumberOfArguments("replconf"));
    }

    Ok(RespValue::SimpleString("OK".to_string()))
}

pub struct PsyncArguments {}

impl PsyncArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        if arguments.len() != 2 {
            return Err(CommandError::WrongNumberOfArguments("psync"));
        }

        // Only the initial full-sync request is supported.
        if arguments[0] != "?" || arguments[1] != "-1" {
            return Err(CommandError::SyntaxError);
        }

        Ok(Self {})
    }
}

/// Handles PSYNC: replies `FULLRESYNC <replid> 0`. The transport follows up
/// with the snapshot payload.
pub async fn psync(
    server: &RwLock<ServerInfo>,
    arguments: &[String],
) -> Result<RespValue, CommandError> {
    PsyncArguments::parse(arguments)?;

    let server = server.read().await;

    Ok(RespValue::SimpleString(format!(
        "FULLRESYNC {} 0",
        server.repl_id
    )))
}
