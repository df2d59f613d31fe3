use thiserror::Error;

use crate::resp::RespValue;
use crate::store::StoreError;

/// Recoverable per-command failures. Each converts into a protocol error
/// response for the issuing connection; none of them aborts other connections
/// or touches shared state (validation happens before mutation).
#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("invalid command frame")]
    InvalidFrame,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("wrong number of arguments for '{0}'")]
    WrongNumberOfArguments(&'static str),
    #[error("syntax error")]
    SyntaxError,
    #[error("PX value is not a valid integer")]
    InvalidExpiry,
    #[error("timeout is not a float or out of range")]
    InvalidTimeout,
    #[error("timeout is negative")]
    NegativeTimeout,
    #[error("value is out of range, must be positive")]
    NegativeCount,
    #[error("value is not an integer or out of range")]
    NotAnInteger,
    #[error("MULTI calls can not be nested")]
    NestedMulti,
    #[error("EXEC without MULTI")]
    ExecWithoutMulti,
    #[error("DISCARD without MULTI")]
    DiscardWithoutMulti,
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl CommandError {
    /// Converts the error into the RESP error value sent to the client.
    pub fn to_resp(&self) -> RespValue {
        match self {
            // WRONGTYPE carries its own error code instead of the generic ERR.
            CommandError::Store(StoreError::WrongType) => RespValue::Error(self.to_string()),
            _ => RespValue::Error(format!("ERR {}", self)),
        }
    }

    pub fn as_string(&self) -> String {
        self.to_resp().encode()
    }
}
