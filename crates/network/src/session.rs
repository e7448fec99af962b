//! # Session State Machine
//!
//! Drives one client connection through the protocol:
//!
//! ```text
//! Handshake ─┬─> Status                        (request, response, ping, pong)
//!            └─> Login ─> Configuration ─> Play (login play packet)
//! ```
//!
//! Every inbound frame is checked against the one packet id legal at that
//! step. Any failure (malformed frame, unexpected id, I/O error, deadline)
//! ends the session; nothing is retried.
//!
//! The session exclusively owns its stream. The only state shared with other
//! connections is the buffer pool and the read-only [`SessionContext`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use mcsrv_core::{ConnectionId, NextState, ProtocolState, Result, ServerError};
use mcsrv_protocol::{
    read_frame, read_string, write_packet, write_string, BufferPool, ClientInformation,
    ClientboundPacket, Decode, Disconnect, EmptyPacket, Encode, FeatureFlags, Frame, Handshake,
    KnownPacks, LoginStart, LoginSuccess, PacketWithData, PluginMessage, ServerboundPacket,
    StatusResponse,
};
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use uuid::Uuid;

use crate::config::ServerConfig;

/// Channel on which client and server exchange their brand names
pub const BRAND_CHANNEL: &str = "minecraft:brand";

/// Read-only state every session needs
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub config: Arc<ServerConfig>,
    pub pool: BufferPool,
    /// Rendered once at startup and sent to every status request
    pub status: Arc<StatusResponse>,
}

impl SessionContext {
    pub fn new(config: Arc<ServerConfig>, pool: BufferPool, status: StatusResponse) -> Self {
        Self {
            config,
            pool,
            status: Arc::new(status),
        }
    }
}

/// How a session ended when it ended cleanly
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Status exchange completed
    StatusServed,
    /// Client reached the play state
    EnteredPlay { username: String, uuid: Uuid },
}

/// One client connection
pub struct Session<S> {
    id: ConnectionId,
    stream: BufReader<S>,
    state: ProtocolState,
    ctx: SessionContext,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(id: ConnectionId, stream: S, ctx: SessionContext) -> Self {
        Self {
            id,
            stream: BufReader::new(stream),
            state: ProtocolState::Handshake,
            ctx,
        }
    }

    #[inline]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    #[inline]
    pub fn state(&self) -> ProtocolState {
        self.state
    }

    /// Run the session to completion
    ///
    /// # Errors
    /// The first error hit at any step. When `disconnect_on_error` is set and
    /// the error is a protocol violation during login, a disconnect packet is
    /// sent before the error is returned.
    pub async fn run(mut self) -> Result<SessionOutcome> {
        let result = self.drive().await;
        if let Err(e) = &result {
            self.on_error(e).await;
        }
        result
    }

    async fn drive(&mut self) -> Result<SessionOutcome> {
        let handshake: Handshake = self.read_packet(ServerboundPacket::Handshake).await?;
        tracing::debug!(
            protocol = handshake.protocol_version,
            address = %handshake.server_address,
            port = handshake.server_port,
            next = ?handshake.next_state,
            "Handshake received"
        );

        self.transition(handshake.next_state.state())?;

        match handshake.next_state {
            NextState::Status => {
                self.status().await?;
                Ok(SessionOutcome::StatusServed)
            }
            NextState::Login => {
                let start = self.login().await?;
                self.transition(ProtocolState::Configuration)?;
                self.configuration().await?;
                self.transition(ProtocolState::Play)?;
                self.play().await?;
                Ok(SessionOutcome::EnteredPlay {
                    username: start.name,
                    uuid: start.uuid,
                })
            }
        }
    }

    //=== Branches ===//

    async fn status(&mut self) -> Result<()> {
        let _: EmptyPacket = self.read_packet(ServerboundPacket::StatusRequest).await?;

        let status = Arc::clone(&self.ctx.status);
        self.write_packet(ClientboundPacket::StatusResponse, &*status).await?;

        // Echo the ping body untouched
        let ping: PacketWithData = self.read_packet(ServerboundPacket::PingRequest).await?;
        self.write_packet(ClientboundPacket::PongResponse, &ping).await?;

        tracing::debug!("Status served");
        Ok(())
    }

    async fn login(&mut self) -> Result<LoginStart> {
        let start: LoginStart = self.read_packet(ServerboundPacket::LoginStart).await?;
        tracing::info!(player = %start.name, uuid = %start.uuid, "Login started");

        self.negotiate_encryption_and_compression().await?;

        let success = LoginSuccess::new(start.uuid, start.name.clone(), Vec::new());
        self.write_packet(ClientboundPacket::LoginSuccess, &success).await?;

        let _: EmptyPacket = self.read_packet(ServerboundPacket::LoginAcknowledged).await?;
        tracing::debug!(player = %start.name, "Login acknowledged");

        Ok(start)
    }

    /// Extension point for online-mode encryption and packet compression.
    /// Both are disabled, so the connection stays plain.
    async fn negotiate_encryption_and_compression(&mut self) -> Result<()> {
        tracing::trace!("Encryption and compression disabled");
        Ok(())
    }

    async fn configuration(&mut self) -> Result<()> {
        let message: PluginMessage = self.read_packet(ServerboundPacket::PluginMessage).await?;
        let reply = self.plugin_reply(message)?;
        self.write_packet(ClientboundPacket::PluginMessage, &reply).await?;

        let info: ClientInformation = self.read_packet(ServerboundPacket::ClientInformation).await?;
        tracing::debug!(
            locale = %info.locale,
            view_distance = info.view_distance,
            "Client information received"
        );

        let flags = FeatureFlags::new(self.ctx.config.feature_flags.clone());
        self.write_packet(ClientboundPacket::FeatureFlags, &flags).await?;

        let packs = KnownPacks::new(self.ctx.config.known_packs.clone());
        self.write_packet(ClientboundPacket::KnownPacks, &packs).await?;

        let client_packs: KnownPacks = self.read_packet(ServerboundPacket::KnownPacks).await?;
        tracing::debug!(count = client_packs.packs.len(), "Client known packs received");

        self.write_packet(ClientboundPacket::FinishConfiguration, &EmptyPacket).await?;
        let _: EmptyPacket = self
            .read_packet(ServerboundPacket::AcknowledgeFinishConfiguration)
            .await?;

        Ok(())
    }

    /// Answer a brand message with our own brand; echo anything else
    fn plugin_reply(&self, message: PluginMessage) -> Result<PluginMessage> {
        if message.channel != BRAND_CHANNEL {
            return Ok(message);
        }

        let client_brand = read_string(&mut &message.data[..]).ok();
        tracing::debug!(brand = ?client_brand, "Client brand");

        let mut data = BytesMut::new();
        write_string(&mut data, &self.ctx.config.brand)?;
        Ok(PluginMessage {
            channel: message.channel,
            data: data.to_vec(),
        })
    }

    async fn play(&mut self) -> Result<()> {
        let entity_id = (self.id.get() & i32::MAX as u64) as i32;
        let login = self.ctx.config.play.login_play(entity_id);
        self.write_packet(ClientboundPacket::LoginPlay, &login).await?;
        tracing::info!(entity_id, "Entered play");
        Ok(())
    }

    //=== Plumbing ===//

    /// Move to `next`, failing if the protocol forbids it
    fn transition(&mut self, next: ProtocolState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(ServerError::IllegalTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(from = %self.state, to = %next, "State transition");
        self.state = next;
        Ok(())
    }

    async fn read_packet<P: Decode>(&mut self, packet: ServerboundPacket) -> Result<P> {
        let frame = self.read_frame().await?;
        frame.expect(packet)?;
        tracing::trace!(state = %self.state, packet = ?packet, len = frame.header.length, "Packet received");
        frame.decode()
    }

    async fn read_frame(&mut self) -> Result<Frame> {
        let max_len = self.ctx.config.max_frame_len;
        let limit = self.ctx.config.read_timeout;
        let read = read_frame(&mut self.stream, &self.ctx.pool, max_len);
        with_deadline(limit, "read", read).await
    }

    async fn write_packet<P: Encode>(&mut self, packet: ClientboundPacket, body: &P) -> Result<()> {
        let limit = self.ctx.config.write_timeout;
        let write = write_packet(&mut self.stream, &self.ctx.pool, packet.id(), body);
        let len = with_deadline(limit, "write", write).await?;
        tracing::trace!(state = %self.state, packet = ?packet, len, "Packet sent");
        Ok(())
    }

    async fn on_error(&mut self, error: &ServerError) {
        if error.is_protocol_violation() {
            tracing::warn!(state = %self.state, error = %error, "Protocol violation");
        } else {
            tracing::debug!(state = %self.state, error = %error, "Session aborted");
        }

        if !self.ctx.config.disconnect_on_error
            || self.state != ProtocolState::Login
            || !error.is_protocol_violation()
        {
            return;
        }

        let packet = Disconnect::from_text(&error.to_string());
        if let Err(e) = self.write_packet(ClientboundPacket::LoginDisconnect, &packet).await {
            tracing::debug!(error = %e, "Failed to send disconnect");
        }
    }
}

async fn with_deadline<T>(
    limit: Option<Duration>,
    what: &'static str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| ServerError::Timeout(what))?,
        None => fut.await,
    }
}
