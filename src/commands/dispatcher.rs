//! Command dispatch and the per-connection transaction state machine.
//!
//! Each connection runs `Idle → (MULTI) → Queuing → (EXEC|DISCARD) → Idle`.
//! While queuing, every command except MULTI/EXEC/DISCARD is validated,
//! recorded verbatim, and acknowledged with `QUEUED` instead of executing.
//! EXEC detaches the queue and runs the commands through the same execution
//! path as direct dispatch.

use crate::commands::command::{Command, Context};
use crate::commands::command_error::CommandError;
use crate::resp::RespValue;

/// Connection-scoped dispatch state.
///
/// The transaction queue lives here, owned by the connection's task, so a
/// client that disconnects mid-transaction takes its queue with it. Commands
/// replayed from a primary run under the replication session, which has no
/// client to answer.
#[derive(Debug)]
pub struct Session {
    peer: Option<String>,
    transaction: Option<Vec<Command>>,
}

impl Session {
    pub fn client(peer: impl Into<String>) -> Self {
        Self {
            peer: Some(peer.into()),
            transaction: None,
        }
    }

    /// The sentinel identity for commands replayed from the primary stream.
    pub fn replication() -> Self {
        Self {
            peer: None,
            transaction: None,
        }
    }

    pub fn is_replication(&self) -> bool {
        self.peer.is_none()
    }

    pub fn peer(&self) -> Option<&str> {
        self.peer.as_deref()
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// The commands queued so far, when a transaction is open.
    pub fn queued(&self) -> Option<&[Command]> {
        self.transaction.as_deref()
    }
}

/// What the transport should do with a dispatched command's outcome.
#[derive(Debug, PartialEq)]
pub enum Dispatched {
    /// Encoded response bytes to write back to the client.
    Reply(String),
    /// The FULLRESYNC reply; the transport must follow it with the snapshot
    /// payload.
    FullResync(String),
    /// Replayed commands produce no wire response.
    NoResponse,
}

pub struct Dispatcher {
    context: Context,
}

impl Dispatcher {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Routes one decoded frame: transaction control commands manage the
    /// session state machine, everything else is queued or executed.
    pub async fn dispatch(&self, session: &mut Session, input: RespValue) -> Dispatched {
        let command = match Command::from_resp(input) {
            Ok(command) => command,
            Err(err) => return self.finish(session, err.to_resp(), false),
        };

        let name = command.name.clone();
        let is_psync = name == "PSYNC";

        let response = match name.as_str() {
            "MULTI" => multi(session, &command),
            "EXEC" => self.exec(session, &command).await,
            "DISCARD" => discard(session, &command),
            _ => match session.transaction.as_mut() {
                Some(queue) => match command.validate_arguments() {
                    // Arity failures never queue.
                    Some(err) => err.to_resp(),
                    None => {
                        queue.push(command);
                        RespValue::SimpleString("QUEUED".to_string())
                    }
                },
                None => match command.execute(&self.context).await {
                    Ok(value) => value,
                    Err(err) => err.to_resp(),
                },
            },
        };

        self.finish(session, response, is_psync)
    }

    fn finish(&self, session: &Session, response: RespValue, is_psync: bool) -> Dispatched {
        if session.is_replication() {
            return Dispatched::NoResponse;
        }

        if is_psync && !matches!(response, RespValue::Error(_)) {
            return Dispatched::FullResync(response.encode());
        }

        Dispatched::Reply(response.encode())
    }

    /// Detaches the queue and executes it in order, one response element per
    /// queued command. Errors become error elements; they do not abort the
    /// rest of the batch. A queued blocking command blocks here, with its
    /// normal semantics.
    async fn exec(&self, session: &mut Session, command: &Command) -> RespValue {
        if !command.arguments.is_empty() {
            return CommandError::WrongNumberOfArguments("exec").to_resp();
        }

        let Some(queued) = session.transaction.take() else {
            return CommandError::ExecWithoutMulti.to_resp();
        };

        let mut results = Vec::with_capacity(queued.len());

        for queued_command in &queued {
            match queued_command.execute(&self.context).await {
                Ok(value) => results.push(value),
                Err(err) => results.push(err.to_resp()),
            }
        }

        RespValue::Array(results)
    }
}

fn multi(session: &mut Session, command: &Command) -> RespValue {
    if !command.arguments.is_empty() {
        return CommandError::WrongNumberOfArguments("multi").to_resp();
    }

    if session.transaction.is_some() {
        return CommandError::NestedMulti.to_resp();
    }

    session.transaction = Some(Vec::new());

    RespValue::SimpleString("OK".to_string())
}

fn discard(session: &mut Session, command: &Command) -> RespValue {
    if !command.arguments.is_empty() {
        return CommandError::WrongNumberOfArguments("discard").to_resp();
    }

    if session.transaction.take().is_none() {
        return CommandError::DiscardWithoutMulti.to_resp();
    }

    RespValue::SimpleString("OK".to_string())
}
