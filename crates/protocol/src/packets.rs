//! # Packet Id Table
//!
//! Packet ids are only unique within one protocol state and one direction, so
//! every id here is tied to the state it is legal in.
//!
//! ## Packet Naming Convention
//!
//! - [`ServerboundPacket`] = client to server
//! - [`ClientboundPacket`] = server to client
//!
//! Ids follow the 767 protocol family. Several distinct packets share an id
//! across states (`0x03` is both "login acknowledged" and "acknowledge finish
//! configuration"); the state disambiguates them.

use mcsrv_core::ProtocolState;

/// Packets sent from the client to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerboundPacket {
    //=== Handshake ===//
    /// First packet on every connection; selects status or login
    Handshake,

    //=== Status ===//
    StatusRequest,
    /// Opaque 8-byte payload the server echoes back
    PingRequest,

    //=== Login ===//
    LoginStart,
    LoginAcknowledged,

    //=== Configuration ===//
    ClientInformation,
    PluginMessage,
    AcknowledgeFinishConfiguration,
    KnownPacks,
}

impl ServerboundPacket {
    pub const fn id(self) -> i32 {
        match self {
            Self::Handshake => 0x00,
            Self::StatusRequest => 0x00,
            Self::PingRequest => 0x01,
            Self::LoginStart => 0x00,
            Self::LoginAcknowledged => 0x03,
            Self::ClientInformation => 0x00,
            Self::PluginMessage => 0x02,
            Self::AcknowledgeFinishConfiguration => 0x03,
            Self::KnownPacks => 0x07,
        }
    }

    /// State in which the packet is legal
    pub const fn state(self) -> ProtocolState {
        match self {
            Self::Handshake => ProtocolState::Handshake,
            Self::StatusRequest | Self::PingRequest => ProtocolState::Status,
            Self::LoginStart | Self::LoginAcknowledged => ProtocolState::Login,
            Self::ClientInformation
            | Self::PluginMessage
            | Self::AcknowledgeFinishConfiguration
            | Self::KnownPacks => ProtocolState::Configuration,
        }
    }

    /// Look up a packet by state and id
    pub fn from_id(state: ProtocolState, id: i32) -> Option<Self> {
        const ALL: [ServerboundPacket; 9] = [
            ServerboundPacket::Handshake,
            ServerboundPacket::StatusRequest,
            ServerboundPacket::PingRequest,
            ServerboundPacket::LoginStart,
            ServerboundPacket::LoginAcknowledged,
            ServerboundPacket::ClientInformation,
            ServerboundPacket::PluginMessage,
            ServerboundPacket::AcknowledgeFinishConfiguration,
            ServerboundPacket::KnownPacks,
        ];
        ALL.into_iter().find(|p| p.state() == state && p.id() == id)
    }
}

/// Packets sent from the server to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientboundPacket {
    //=== Status ===//
    StatusResponse,
    PongResponse,

    //=== Login ===//
    /// Login-state disconnect carrying a JSON text component
    LoginDisconnect,
    LoginSuccess,

    //=== Configuration ===//
    PluginMessage,
    FinishConfiguration,
    FeatureFlags,
    KnownPacks,

    //=== Play ===//
    LoginPlay,
}

impl ClientboundPacket {
    pub const fn id(self) -> i32 {
        match self {
            Self::StatusResponse => 0x00,
            Self::PongResponse => 0x01,
            Self::LoginDisconnect => 0x00,
            Self::LoginSuccess => 0x02,
            Self::PluginMessage => 0x01,
            Self::FinishConfiguration => 0x03,
            Self::FeatureFlags => 0x0C,
            Self::KnownPacks => 0x0E,
            Self::LoginPlay => 0x2B,
        }
    }

    pub const fn state(self) -> ProtocolState {
        match self {
            Self::StatusResponse | Self::PongResponse => ProtocolState::Status,
            Self::LoginDisconnect | Self::LoginSuccess => ProtocolState::Login,
            Self::PluginMessage | Self::FinishConfiguration | Self::FeatureFlags | Self::KnownPacks => {
                ProtocolState::Configuration
            }
            Self::LoginPlay => ProtocolState::Play,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_ids() {
        assert_eq!(ClientboundPacket::StatusResponse.id(), 0x00);
        assert_eq!(ClientboundPacket::LoginSuccess.id(), 0x02);
        assert_eq!(ClientboundPacket::FeatureFlags.id(), 0x0C);
        assert_eq!(ClientboundPacket::KnownPacks.id(), 0x0E);
        assert_eq!(ClientboundPacket::LoginPlay.id(), 0x2B);
        assert_eq!(ServerboundPacket::LoginAcknowledged.id(), 0x03);
        assert_eq!(ServerboundPacket::AcknowledgeFinishConfiguration.id(), 0x03);
    }

    #[test]
    fn test_lookup_is_scoped_by_state() {
        assert_eq!(
            ServerboundPacket::from_id(ProtocolState::Login, 0x03),
            Some(ServerboundPacket::LoginAcknowledged)
        );
        assert_eq!(
            ServerboundPacket::from_id(ProtocolState::Configuration, 0x03),
            Some(ServerboundPacket::AcknowledgeFinishConfiguration)
        );
        assert_eq!(
            ServerboundPacket::from_id(ProtocolState::Status, 0x00),
            Some(ServerboundPacket::StatusRequest)
        );
        assert_eq!(ServerboundPacket::from_id(ProtocolState::Status, 0x03), None);
        assert_eq!(ServerboundPacket::from_id(ProtocolState::Play, 0x00), None);
    }
}
