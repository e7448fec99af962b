//! # Connection Acceptor
//!
//! Owns the listening socket and spawns one [`Session`] per accepted
//! connection.
//!
//! # Architecture
//!
//! 1. **TCP Listener** - Accepts incoming connections
//! 2. **Connection Registry** - Observation-only map of live connections
//!    (`DashMap`), used for the connection limit and for stats
//! 3. **ID Generator** - Assigns unique connection IDs
//!
//! The accept loop only ever waits on "next connection" or cancellation.
//! Each session runs in its own task under a supervisor task that awaits its
//! join handle, so a session that errors or panics is logged and contained
//! to its own connection.
//!
//! # Shutdown
//!
//! Cancelling the token stops the accept loop and drops the listener.
//! In-flight sessions are left to finish on their own.
//!
//! # Example
//!
//! ```rust,no_run
//! use mcsrv_network::{Server, ServerConfig};
//! use mcsrv_protocol::{BufferPool, StatusInfo};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> mcsrv_core::Result<()> {
//!     let status = StatusInfo::default().to_response()?;
//!     let server = Server::new(ServerConfig::default(), BufferPool::default(), status).await?;
//!
//!     let cancel = CancellationToken::new();
//!     server.run(cancel).await
//! }
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use dashmap::DashMap;
use mcsrv_core::{ConnectionId, IdGenerator, Result, ServerError};
use mcsrv_protocol::{BufferPool, StatusResponse};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::ServerConfig;
use crate::session::{Session, SessionContext};

/// Live connections, keyed by connection ID
///
/// Cheap to clone; every clone observes the same map. Sessions never see it.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<DashMap<ConnectionId, SocketAddr>>,
}

impl ConnectionRegistry {
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn peer(&self, id: ConnectionId) -> Option<SocketAddr> {
        self.inner.get(&id).map(|entry| *entry.value())
    }

    /// Copy of the current entries
    pub fn snapshot(&self) -> Vec<(ConnectionId, SocketAddr)> {
        self.inner.iter().map(|entry| (*entry.key(), *entry.value())).collect()
    }

    fn insert(&self, id: ConnectionId, addr: SocketAddr) {
        self.inner.insert(id, addr);
    }

    fn remove(&self, id: ConnectionId) {
        self.inner.remove(&id);
    }
}

/// Main server instance
pub struct Server {
    config: Arc<ServerConfig>,

    /// TCP listener for accepting connections
    listener: TcpListener,

    /// Shared with every session
    ctx: SessionContext,

    connections: ConnectionRegistry,

    id_generator: IdGenerator,
}

impl Server {
    /// Create a new server instance and bind its listener
    ///
    /// # Errors
    /// Returns an error if:
    /// - Configuration is invalid
    /// - TCP listener cannot be bound to the specified address
    pub async fn new(config: ServerConfig, pool: BufferPool, status: StatusResponse) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ServerError::Config(format!("Invalid configuration: {}", e)))?;

        let listener = TcpListener::bind(config.bind_address).await.map_err(|e| {
            ServerError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to bind to {}: {}", config.bind_address, e),
            ))
        })?;

        let local_addr = listener.local_addr()?;
        tracing::info!(
            addr = %local_addr,
            max_connections = config.max_connections,
            "Server listening"
        );

        let config = Arc::new(config);
        Ok(Self {
            ctx: SessionContext::new(Arc::clone(&config), pool, status),
            config,
            listener,
            connections: ConnectionRegistry::default(),
            id_generator: IdGenerator::new(),
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for observing live connections, usable after `run` takes the server
    pub fn registry(&self) -> ConnectionRegistry {
        self.connections.clone()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Run the accept loop until `cancel` fires
    ///
    /// # Lifecycle
    ///
    /// ```text
    /// 1. Accept incoming connection
    /// 2. Check connection limit
    /// 3. Assign connection ID
    /// 4. Spawn supervised session task
    /// 5. Repeat until cancelled
    /// ```
    ///
    /// The listener is dropped when this returns.
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        tracing::info!("Accept loop started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Shutdown requested, no longer accepting connections");
                    break;
                }

                result = self.listener.accept() => {
                    match result {
                        Ok((mut socket, addr)) => {
                            if self.connections.len() >= self.config.max_connections {
                                tracing::warn!(
                                    peer = %addr,
                                    connections = self.connections.len(),
                                    "Connection rejected: server full"
                                );
                                let _ = socket.shutdown().await;
                                continue;
                            }
                            self.spawn_session(socket, addr);
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Error accepting connection");
                        }
                    }
                }
            }
        }

        tracing::info!(active = self.connections.len(), "Accept loop ended");
        Ok(())
    }

    fn spawn_session(&self, socket: TcpStream, addr: SocketAddr) {
        let id = self.id_generator.next_id();

        if let Err(e) = socket.set_nodelay(true) {
            tracing::debug!(conn = %id, error = %e, "Failed to set TCP_NODELAY");
        }

        self.connections.insert(id, addr);

        let span = tracing::info_span!("session", conn = %id, peer = %addr);
        let session = Session::new(id, socket, self.ctx.clone());
        let connections = self.connections.clone();

        tokio::spawn(async move {
            tracing::debug!(parent: &span, "Connection accepted");
            let task = tokio::spawn(session.run().instrument(span.clone()));
            let result = task.await;

            connections.remove(id);

            match result {
                Ok(Ok(outcome)) => {
                    tracing::info!(parent: &span, ?outcome, "Connection closed");
                }
                Ok(Err(e)) if e.is_protocol_violation() => {
                    tracing::warn!(parent: &span, error = %e, "Connection closed after protocol error");
                }
                Ok(Err(e)) => {
                    tracing::info!(parent: &span, error = %e, "Connection closed with error");
                }
                Err(e) if e.is_panic() => {
                    tracing::error!(parent: &span, "Session task panicked");
                }
                Err(_) => {
                    tracing::warn!(parent: &span, "Session task cancelled");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcsrv_core::NextState;
    use mcsrv_protocol::{
        read_frame, write_frame, write_packet, EmptyPacket, Handshake, PacketWithData, MAX_FRAME_LEN,
    };
    use std::time::Duration;
    use tokio::io::AsyncReadExt;
    use tokio::task::JoinHandle;

    async fn start(config: ServerConfig) -> (SocketAddr, ConnectionRegistry, CancellationToken, JoinHandle<Result<()>>) {
        let config = ServerConfig {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 0)),
            ..config
        };
        let status = StatusResponse {
            json: r#"{"description":{"text":"hello"}}"#.to_string(),
        };
        let server = Server::new(config, BufferPool::default(), status).await.unwrap();
        let addr = server.local_addr().unwrap();
        let registry = server.registry();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(server.run(cancel.clone()));
        (addr, registry, cancel, handle)
    }

    async fn wait_for_len(registry: &ConnectionRegistry, len: usize) {
        for _ in 0..200 {
            if registry.len() == len {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("registry never reached {} entries (has {})", len, registry.len());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = ServerConfig {
            max_connections: 0,
            bind_address: SocketAddr::from(([127, 0, 0, 1], 0)),
            ..Default::default()
        };
        let status = StatusResponse { json: "{}".into() };
        let result = Server::new(config, BufferPool::default(), status).await;
        assert!(matches!(result, Err(ServerError::Config(_))));
    }

    #[tokio::test]
    async fn test_status_over_tcp() {
        let (addr, registry, cancel, handle) = start(ServerConfig::default()).await;
        let pool = BufferPool::default();
        let mut stream = TcpStream::connect(addr).await.unwrap();

        let handshake = Handshake {
            protocol_version: 769,
            server_address: "127.0.0.1".into(),
            server_port: addr.port(),
            next_state: NextState::Status,
        };
        write_packet(&mut stream, &pool, 0x00, &handshake).await.unwrap();
        write_packet(&mut stream, &pool, 0x00, &EmptyPacket).await.unwrap();

        let response = read_frame(&mut stream, &pool, MAX_FRAME_LEN).await.unwrap();
        assert_eq!(response.id(), 0x00);
        assert_eq!(registry.len(), 1);

        let ping = PacketWithData::new(1_700_000_000_000i64.to_be_bytes());
        write_packet(&mut stream, &pool, 0x01, &ping).await.unwrap();
        let pong = read_frame(&mut stream, &pool, MAX_FRAME_LEN).await.unwrap();
        assert_eq!(pong.id(), 0x01);
        assert_eq!(pong.payload(), &ping.data[..]);

        // Session ends after the pong and leaves the registry
        wait_for_len(&registry, 0).await;

        cancel.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_bad_session_does_not_stop_acceptor() {
        let (addr, registry, cancel, handle) = start(ServerConfig::default()).await;
        let pool = BufferPool::default();

        let mut bad = TcpStream::connect(addr).await.unwrap();
        write_frame(&mut bad, &pool, 0x7F, &[]).await.unwrap();
        let mut buf = [0u8; 16];
        let n = bad.read(&mut buf).await.unwrap_or(0);
        assert_eq!(n, 0);

        let mut good = TcpStream::connect(addr).await.unwrap();
        let handshake = Handshake {
            protocol_version: 769,
            server_address: "127.0.0.1".into(),
            server_port: addr.port(),
            next_state: NextState::Status,
        };
        write_packet(&mut good, &pool, 0x00, &handshake).await.unwrap();
        write_packet(&mut good, &pool, 0x00, &EmptyPacket).await.unwrap();
        let response = read_frame(&mut good, &pool, MAX_FRAME_LEN).await.unwrap();
        assert_eq!(response.id(), 0x00);

        drop(good);
        wait_for_len(&registry, 0).await;
        cancel.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let config = ServerConfig {
            max_connections: 1,
            ..Default::default()
        };
        let (addr, registry, cancel, handle) = start(config).await;

        let _first = TcpStream::connect(addr).await.unwrap();
        wait_for_len(&registry, 1).await;

        let mut second = TcpStream::connect(addr).await.unwrap();
        let mut buf = [0u8; 16];
        let n = second.read(&mut buf).await.unwrap_or(0);
        assert_eq!(n, 0);
        assert_eq!(registry.len(), 1);

        cancel.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_cancel_releases_listener() {
        let (addr, _registry, cancel, handle) = start(ServerConfig::default()).await;

        cancel.cancel();
        handle.await.unwrap().unwrap();

        assert!(TcpStream::connect(addr).await.is_err());
    }
}
