//! Server identity and the TCP accept loop.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::commands::{Context, Dispatcher};
use crate::config::ServerConfig;
use crate::connection;
use crate::replication;
use crate::store::Keyspace;

#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    Primary,
    Replica { host: String, port: u16 },
}

impl Role {
    /// The role name as reported by INFO.
    pub fn name(&self) -> &'static str {
        match self {
            Role::Primary => "master",
            Role::Replica { .. } => "slave",
        }
    }
}

#[derive(Debug)]
pub struct ServerInfo {
    pub port: u16,
    pub role: Role,
    pub repl_id: String,
    pub repl_offset: u64,
}

impl ServerInfo {
    pub fn new(config: &ServerConfig) -> Self {
        let role = match &config.replica_of {
            Some((host, port)) => Role::Replica {
                host: host.clone(),
                port: *port,
            },
            None => Role::Primary,
        };

        Self {
            port: config.port,
            role,
            repl_id: generate_replication_id(),
            repl_offset: 0,
        }
    }
}

/// A fresh 40-character hex replication ID for this process.
pub fn generate_replication_id() -> String {
    let bytes: [u8; 20] = rand::random();

    hex::encode(bytes)
}

/// Binds the listener, connects the replication link when configured, and
/// accepts clients forever.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(port = config.port, "listening");

    let server = Arc::new(RwLock::new(ServerInfo::new(&config)));
    let dispatcher = Arc::new(Dispatcher::new(Context {
        keyspace: Arc::new(Keyspace::new()),
        server,
    }));

    if let Some((host, port)) = config.replica_of.clone() {
        let dispatcher = Arc::clone(&dispatcher);
        let listening_port = config.port;

        tokio::spawn(async move {
            if let Err(err) =
                replication::run_replica(&host, port, listening_port, dispatcher).await
            {
                warn!(error = %err, "replication link failed");
            }
        });
    }

    serve(listener, dispatcher).await
}

/// Accept loop: one task per client connection.
pub async fn serve(listener: TcpListener, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!(%peer, "client connected");

        let dispatcher = Arc::clone(&dispatcher);

        tokio::spawn(async move {
            connection::handle_client(stream, dispatcher, peer.to_string()).await;
        });
    }
}
