//! # Server Configuration
//!
//! Configuration options for the mcsrv networking layer.
//!
//! # Example
//!
//! ```rust
//! use mcsrv_network::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig {
//!     bind_address: ([127, 0, 0, 1], 25565).into(),
//!     max_connections: 200,
//!     read_timeout: Some(Duration::from_secs(30)),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use mcsrv_core::GameMode;
use mcsrv_protocol::{KnownPack, LoginPlay, MAX_FRAME_LEN};
use std::net::SocketAddr;
use std::time::Duration;

/// World context announced to a client entering play
///
/// # Default Values
/// Survival in `minecraft:overworld`, view and simulation distance 10,
/// 100 max players, respawn screen enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaySettings {
    pub is_hardcore: bool,
    pub dimension_names: Vec<String>,
    pub max_players: i32,
    pub view_distance: i32,
    pub simulation_distance: i32,
    pub reduced_debug_info: bool,
    pub enable_respawn_screen: bool,
    pub dimension_type: i32,
    pub dimension_name: String,
    pub hashed_seed: i64,
    pub game_mode: GameMode,
    pub is_flat: bool,
    pub enforces_secure_chat: bool,
}

impl Default for PlaySettings {
    fn default() -> Self {
        Self {
            is_hardcore: false,
            dimension_names: vec!["minecraft:overworld".to_string()],
            max_players: 100,
            view_distance: 10,
            simulation_distance: 10,
            reduced_debug_info: false,
            enable_respawn_screen: true,
            dimension_type: 0,
            dimension_name: "minecraft:overworld".to_string(),
            hashed_seed: 0,
            game_mode: GameMode::Survival,
            is_flat: false,
            enforces_secure_chat: false,
        }
    }
}

impl PlaySettings {
    /// Build the play login packet for one player
    pub fn login_play(&self, entity_id: i32) -> LoginPlay {
        LoginPlay {
            entity_id,
            is_hardcore: self.is_hardcore,
            dimension_count: self.dimension_names.len() as i32,
            dimension_names: self.dimension_names.clone(),
            max_players: self.max_players,
            view_distance: self.view_distance,
            simulation_distance: self.simulation_distance,
            reduced_debug_info: self.reduced_debug_info,
            enable_respawn_screen: self.enable_respawn_screen,
            do_limited_crafting: false,
            dimension_type: self.dimension_type,
            dimension_name: self.dimension_name.clone(),
            hashed_seed: self.hashed_seed,
            game_mode: self.game_mode,
            previous_game_mode: -1,
            is_debug: false,
            is_flat: self.is_flat,
            death_location: None,
            portal_cooldown: 0,
            enforces_secure_chat: self.enforces_secure_chat,
        }
    }
}

/// Server configuration options
///
/// # Default Values
///
/// - Port 8080 on all interfaces
/// - 1000 max connections
/// - Frames up to 2097151 bytes
/// - No read or write deadlines
/// - Abrupt close on protocol errors
///
/// # Fields
///
/// - `bind_address`: Address and port to listen on
/// - `max_connections`: Maximum concurrent connections
/// - `max_frame_len`: Largest accepted frame body
/// - `read_timeout` / `write_timeout`: Optional per-packet deadlines
/// - `disconnect_on_error`: Send a login disconnect before closing on protocol errors
/// - `brand`: Server brand answered on the `minecraft:brand` channel
/// - `known_packs` / `feature_flags`: Sent during configuration
/// - `play`: World context for the play login packet
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address and port to bind the TCP listener to
    ///
    /// # Examples
    /// - `0.0.0.0:8080` - Listen on all interfaces
    /// - `127.0.0.1:25565` - Listen only on localhost
    pub bind_address: SocketAddr,

    /// Maximum number of concurrent connections allowed
    ///
    /// Connections past the limit are closed right after accept.
    pub max_connections: usize,

    /// Largest frame body (id + payload) accepted from a client
    pub max_frame_len: usize,

    /// Deadline for each inbound packet, `None` to wait forever
    pub read_timeout: Option<Duration>,

    /// Deadline for each outbound packet, `None` to wait forever
    pub write_timeout: Option<Duration>,

    /// Send a login disconnect packet before closing on a protocol violation
    ///
    /// Only applies while the session is in the login state, the only state
    /// in which this core defines a disconnect packet.
    pub disconnect_on_error: bool,

    pub brand: String,

    pub known_packs: Vec<KnownPack>,

    pub feature_flags: Vec<String>,

    pub play: PlaySettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_connections: 1000,
            max_frame_len: MAX_FRAME_LEN,
            read_timeout: None,
            write_timeout: None,
            disconnect_on_error: false,
            brand: "mcsrv".to_string(),
            known_packs: vec![KnownPack::new("minecraft:core", "0", "1.21")],
            feature_flags: Vec::new(),
            play: PlaySettings::default(),
        }
    }
}

impl ServerConfig {
    /// Validate the configuration
    ///
    /// # Checks
    /// - `max_connections` must be > 0
    /// - `max_frame_len` must be > 0 and fit a signed 32-bit length
    /// - Deadlines, when set, must be non-zero
    /// - View and simulation distance must be > 0
    pub fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("max_connections must be > 0".to_string());
        }

        if self.max_frame_len == 0 || self.max_frame_len > i32::MAX as usize {
            return Err("max_frame_len must be between 1 and 2147483647".to_string());
        }

        if self.read_timeout.is_some_and(|t| t.is_zero()) {
            return Err("read_timeout must be > 0 when set".to_string());
        }

        if self.write_timeout.is_some_and(|t| t.is_zero()) {
            return Err("write_timeout must be > 0 when set".to_string());
        }

        if self.play.view_distance <= 0 || self.play.simulation_distance <= 0 {
            return Err("view_distance and simulation_distance must be > 0".to_string());
        }

        if self.max_frame_len > MAX_FRAME_LEN {
            tracing::warn!(
                max_frame_len = self.max_frame_len,
                "max_frame_len exceeds the protocol's 3-byte length prefix"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.max_connections, 1000);
        assert_eq!(config.max_frame_len, 2_097_151);
        assert_eq!(config.read_timeout, None);
        assert!(!config.disconnect_on_error);
        assert_eq!(config.known_packs, vec![KnownPack::new("minecraft:core", "0", "1.21")]);
    }

    #[test]
    fn test_config_validation() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_max_connections() {
        let mut config = ServerConfig::default();
        config.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_frame_len() {
        let mut config = ServerConfig::default();
        config.max_frame_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ServerConfig::default();
        config.read_timeout = Some(Duration::ZERO);
        assert!(config.validate().is_err());

        config.read_timeout = Some(Duration::from_secs(5));
        config.write_timeout = Some(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_login_play_from_settings() {
        let settings = PlaySettings::default();
        let packet = settings.login_play(7);
        assert_eq!(packet.entity_id, 7);
        assert_eq!(packet.dimension_count, 1);
        assert_eq!(packet.dimension_names, settings.dimension_names);
        assert_eq!(packet.previous_game_mode, -1);
        assert!(packet.death_location.is_none());
    }
}
