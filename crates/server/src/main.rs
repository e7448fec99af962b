//! mcsrv - Minecraft protocol server
//!
//! Main server binary. Usage: `mcsrv [path/to/server.properties]`

use mcsrv_config::{ServerConfig as FileConfig, DEFAULT_CONFIG_FILE};
use mcsrv_network::{PlaySettings, Server, ServerConfig as NetworkConfig};
use mcsrv_protocol::{BufferPool, PoolConfig, StatusInfo};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("mcsrv {} starting up", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let file_config = FileConfig::load_or_default(&config_path)?;
    file_config.display();

    // Built once, reused for every status request
    let status = build_status(&file_config).to_response()?;

    let network_config = NetworkConfig {
        bind_address: file_config.bind_address(),
        max_connections: file_config.max_connections,
        read_timeout: file_config.read_timeout(),
        write_timeout: file_config.write_timeout(),
        disconnect_on_error: file_config.disconnect_on_error,
        brand: file_config.brand.clone(),
        play: PlaySettings {
            max_players: file_config.max_players,
            enforces_secure_chat: file_config.enforce_secure_chat,
            ..Default::default()
        },
        ..Default::default()
    };

    let pool = BufferPool::new(PoolConfig::default());
    let server = Server::new(network_config, pool.clone(), status).await?;
    let registry = server.registry();

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, initiating shutdown"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
        }
        shutdown.cancel();
    });

    info!("Server is ready to accept connections");

    if let Err(e) = server.run(cancel).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    let stats = pool.stats();
    info!(
        open_connections = registry.len(),
        buffers_in_use = ?stats.in_use,
        oversized = stats.oversized,
        "Server stopped"
    );
    Ok(())
}

fn build_status(config: &FileConfig) -> StatusInfo {
    let mut status = StatusInfo::new(
        config.version_name.clone(),
        config.protocol_version,
        config.max_players,
        config.motd.clone(),
    );
    status.enforces_secure_chat = config.enforce_secure_chat;

    match &config.favicon {
        Some(path) => match status.clone().with_favicon_file(path) {
            Ok(with_icon) => with_icon,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load favicon, continuing without one");
                status
            }
        },
        None => status,
    }
}
