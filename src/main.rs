use ember::config::ServerConfig;
use ember::server;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_args(std::env::args())?;
    info!(
        port = config.port,
        replica = config.replica_of.is_some(),
        "starting ember"
    );

    server::run(config).await
}
