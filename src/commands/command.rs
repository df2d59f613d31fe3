use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commands::command_error::CommandError;
use crate::commands::{
    blpop, echo, get, incr, info, llen, lpop, lrange, ping, replication, rpush_and_lpush, set,
    type_command, xadd, xrange, xread,
};
use crate::resp::RespValue;
use crate::server::ServerInfo;
use crate::store::Keyspace;

/// Shared state handed to every command handler.
#[derive(Debug, Clone)]
pub struct Context {
    pub keyspace: Arc<Keyspace>,
    pub server: Arc<RwLock<ServerInfo>>,
}

/// One decoded client request: the case-normalized command name and its
/// arguments.
#[derive(Debug, PartialEq, Clone)]
pub struct Command {
    pub name: String,
    pub arguments: Vec<String>,
}

impl Command {
    /// Builds a command from a decoded frame. A request is always an array of
    /// bulk strings whose first element is the command name.
    pub fn from_resp(input: RespValue) -> Result<Self, CommandError> {
        let RespValue::Array(elements) = input else {
            return Err(CommandError::InvalidFrame);
        };

        let name = match elements.first() {
            Some(RespValue::BulkString(name)) => name.to_uppercase(),
            _ => return Err(CommandError::InvalidFrame),
        };

        let mut arguments = Vec::with_capacity(elements.len() - 1);

        for element in &elements[1..] {
            let RespValue::BulkString(argument) = element else {
                return Err(CommandError::InvalidFrame);
            };

            arguments.push(argument.clone());
        }

        Ok(Self { name, arguments })
    }

    /// Checks arity and argument shape without executing. Used before a
    /// command is queued inside a transaction, so malformed commands are
    /// rejected instead of queued.
    pub fn validate_arguments(&self) -> Option<CommandError> {
        match self.name.as_str() {
            "PING" => ping::PingArguments::parse(&self.arguments).err(),
            "ECHO" => echo::EchoArguments::parse(&self.arguments).err(),
            "GET" => get::GetArguments::parse(&self.arguments).err(),
            "SET" => set::SetArguments::parse(&self.arguments).err(),
            "INCR" => incr::IncrArguments::parse(&self.arguments).err(),
            "RPUSH" => rpush_and_lpush::PushArguments::parse(&self.arguments, false).err(),
            "LPUSH" => rpush_and_lpush::PushArguments::parse(&self.arguments, true).err(),
            "LRANGE" => lrange::LrangeArguments::parse(&self.arguments).err(),
            "LPOP" => lpop::LpopArguments::parse(&self.arguments).err(),
            "LLEN" => llen::LlenArguments::parse(&self.arguments).err(),
            "BLPOP" => blpop::BlpopArguments::parse(&self.arguments).err(),
            "TYPE" => type_command::TypeArguments::parse(&self.arguments).err(),
            "XADD" => xadd::XaddArguments::parse(&self.arguments).err(),
            "XRANGE" => xrange::XrangeArguments::parse(&self.arguments).err(),
            "XREAD" => xread::XreadArguments::parse(&self.arguments).err(),
            "INFO" => info::InfoArguments::parse(&self.arguments).err(),
            "REPLCONF" => replication::replconf(&self.arguments).err(),
            "PSYNC" => replication::PsyncArguments::parse(&self.arguments).err(),
            "MULTI" | "EXEC" | "DISCARD" => None,
            _ => Some(CommandError::UnknownCommand(self.name.clone())),
        }
    }

    /// Executes the command against the shared state.
    ///
    /// MULTI/EXEC/DISCARD never reach this point; the dispatcher intercepts
    /// them before execution.
    pub async fn execute(&self, context: &Context) -> Result<RespValue, CommandError> {
        match self.name.as_str() {
            "PING" => ping::ping(&self.arguments),
            "ECHO" => echo::echo(&self.arguments),
            "GET" => get::get(&context.keyspace, &self.arguments).await,
            "SET" => set::set(&context.keyspace, &self.arguments).await,
            "INCR" => incr::incr(&context.keyspace, &self.arguments).await,
            "RPUSH" => rpush_and_lpush::rpush(&context.keyspace, &self.arguments).await,
            "LPUSH" => rpush_and_lpush::lpush(&context.keyspace, &self.arguments).await,
            "LRANGE" => lrange::lrange(&context.keyspace, &self.arguments).await,
            "LPOP" => lpop::lpop(&context.keyspace, &self.arguments).await,
            "LLEN" => llen::llen(&context.keyspace, &self.arguments).await,
            "BLPOP" => blpop::blpop(&context.keyspace, &self.arguments).await,
            "TYPE" => type_command::type_command(&context.keyspace, &self.arguments).await,
            "XADD" => xadd::xadd(&context.keyspace, &self.arguments).await,
            "XRANGE" => xrange::xrange(&context.keyspace, &self.arguments).await,
            "XREAD" => xread::xread(&context.keyspace, &self.arguments).await,
            "INFO" => info::info(&context.server, &self.arguments).await,
            "REPLCONF" => replication::replconf(&self.arguments),
            "PSYNC" => replication::psync(&context.server, &self.arguments).await,
            _ => Err(CommandError::UnknownCommand(self.name.clone())),
        }
    }
}
