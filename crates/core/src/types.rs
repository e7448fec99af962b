//! Core type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection ID assigned by the acceptor (64-bit unsigned)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ConnectionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Protocol state of a session
///
/// ```text
/// Handshake → Status
///           → Login → Configuration → Play
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolState {
    Handshake,
    Status,
    Login,
    Configuration,
    Play,
}

impl ProtocolState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Handshake => "handshake",
            Self::Status => "status",
            Self::Login => "login",
            Self::Configuration => "configuration",
            Self::Play => "play",
        }
    }

    /// Whether a session in this state may move to `next`
    pub fn can_transition_to(&self, next: ProtocolState) -> bool {
        matches!(
            (self, next),
            (Self::Handshake, Self::Status)
                | (Self::Handshake, Self::Login)
                | (Self::Login, Self::Configuration)
                | (Self::Configuration, Self::Play)
        )
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Status | Self::Play)
    }
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `next_state` field of the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextState {
    Status = 1,
    Login = 2,
}

impl NextState {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Status),
            2 => Some(Self::Login),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn state(&self) -> ProtocolState {
        match self {
            Self::Status => ProtocolState::Status,
            Self::Login => ProtocolState::Login,
        }
    }
}

/// Game mode byte sent in play login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    Survival = 0,
    Creative = 1,
    Adventure = 2,
    Spectator = 3,
}

impl GameMode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Survival),
            1 => Some(Self::Creative),
            2 => Some(Self::Adventure),
            3 => Some(Self::Spectator),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        use ProtocolState::*;
        assert!(Handshake.can_transition_to(Status));
        assert!(Handshake.can_transition_to(Login));
        assert!(Login.can_transition_to(Configuration));
        assert!(Configuration.can_transition_to(Play));

        assert!(!Handshake.can_transition_to(Play));
        assert!(!Status.can_transition_to(Login));
        assert!(!Login.can_transition_to(Play));
        assert!(!Play.can_transition_to(Configuration));
    }

    #[test]
    fn test_next_state_parsing() {
        assert_eq!(NextState::from_i32(1), Some(NextState::Status));
        assert_eq!(NextState::from_i32(2), Some(NextState::Login));
        assert_eq!(NextState::from_i32(3), None);
        assert_eq!(NextState::from_i32(-1), None);
        assert_eq!(NextState::Login.state(), ProtocolState::Login);
    }

    #[test]
    fn test_game_mode_roundtrip() {
        for mode in [GameMode::Survival, GameMode::Creative, GameMode::Adventure, GameMode::Spectator] {
            assert_eq!(GameMode::from_u8(mode.as_u8()), Some(mode));
        }
        assert_eq!(GameMode::from_u8(4), None);
    }
}
