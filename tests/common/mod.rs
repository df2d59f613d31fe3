//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use ember::commands::{Context, Dispatched, Dispatcher, Session};
use ember::config::ServerConfig;
use ember::resp::RespValue;
use ember::server::ServerInfo;
use ember::store::Keyspace;
use tokio::sync::RwLock;

/// A dispatcher wired to a fresh keyspace and a primary server identity.
pub struct TestEnv {
    pub dispatcher: Arc<Dispatcher>,
}

impl TestEnv {
    pub fn new() -> Self {
        let config = ServerConfig {
            port: 6379,
            replica_of: None,
        };

        Self {
            dispatcher: Arc::new(Dispatcher::new(Context {
                keyspace: Arc::new(Keyspace::new()),
                server: Arc::new(RwLock::new(ServerInfo::new(&config))),
            })),
        }
    }

    pub fn session(&self) -> Session {
        Session::client("127.0.0.1:41844")
    }

    pub fn keyspace(&self) -> Arc<Keyspace> {
        Arc::clone(&self.dispatcher.context().keyspace)
    }

    /// Dispatches one command for `session` and returns the encoded reply.
    pub async fn dispatch(&self, session: &mut Session, parts: &[&str]) -> String {
        match self.dispatcher.dispatch(session, command(parts)).await {
            Dispatched::Reply(response) => response,
            other => panic!("expected a plain reply, got {:?}", other),
        }
    }
}

/// Builds the RESP frame a client would send for `parts`.
pub fn command(parts: &[&str]) -> RespValue {
    RespValue::Array(
        parts
            .iter()
            .map(|part| RespValue::BulkString(part.to_string()))
            .collect(),
    )
}

pub fn simple(value: &str) -> String {
    RespValue::SimpleString(value.to_string()).encode()
}

pub fn bulk(value: &str) -> String {
    RespValue::BulkString(value.to_string()).encode()
}

pub fn integer(value: i64) -> String {
    RespValue::Integer(value).encode()
}

pub fn bulk_array(items: &[&str]) -> String {
    RespValue::Array(
        items
            .iter()
            .map(|item| RespValue::BulkString(item.to_string()))
            .collect(),
    )
    .encode()
}

pub fn error(message: &str) -> String {
    RespValue::Error(message.to_string()).encode()
}
