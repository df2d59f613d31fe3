//! An in-memory data-structure server speaking a Redis-compatible wire
//! protocol.
//!
//! Supported functionality:
//!
//! - String operations with lazy expiry (GET, SET with PX, INCR)
//! - List operations (RPUSH, LPUSH, LPOP, BLPOP, LRANGE, LLEN)
//! - Append-only stream operations (XADD, XRANGE, XREAD with BLOCK)
//! - Client-side transactions (MULTI, EXEC, DISCARD)
//! - Server commands (PING, ECHO, TYPE, INFO)
//! - A minimal primary/replica handshake (REPLCONF, PSYNC)
//!
//! Clients speak RESP over TCP; each connection runs on its own tokio task,
//! and blocking reads park only the task that issued them.

pub mod commands;
pub mod config;
pub mod connection;
pub mod replication;
pub mod resp;
pub mod server;
pub mod store;
