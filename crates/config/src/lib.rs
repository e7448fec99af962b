//! mcsrv Configuration Management
//!
//! Loads server configuration from a `server.properties` file.
//!
//! # Format
//!
//! ```text
//! # comment
//! server-port=25565
//! motd=Hello world
//! ```
//!
//! One `key=value` per line; whitespace around keys and values is trimmed.
//! Unknown keys are ignored and malformed values keep their defaults, both
//! with a warning.

use std::fs;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use mcsrv_core::{Result, ServerError};

/// Default file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "server.properties";

/// Server configuration from `server.properties`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    // Network
    /// Listen address (from "server-ip", empty = all interfaces)
    pub server_ip: String,
    /// Listen port (from "server-port", default: 8080)
    pub server_port: u16,
    /// Connection limit (from "max-connections")
    pub max_connections: usize,
    /// Per-packet read deadline (from "read-timeout-secs", 0 = none)
    pub read_timeout_secs: u64,
    /// Per-packet write deadline (from "write-timeout-secs", 0 = none)
    pub write_timeout_secs: u64,
    /// Send a disconnect packet on login errors (from "disconnect-on-error")
    pub disconnect_on_error: bool,

    // Server list
    /// Advertised player limit (from "max-players")
    pub max_players: i32,
    /// Server list description (from "motd")
    pub motd: String,
    /// Advertised version name (from "version-name")
    pub version_name: String,
    /// Advertised protocol number (from "protocol-version")
    pub protocol_version: i32,
    /// PNG icon path (from "favicon")
    pub favicon: Option<PathBuf>,
    /// From "enforce-secure-chat"
    pub enforce_secure_chat: bool,

    /// Brand sent on the brand channel (from "brand")
    pub brand: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_ip: String::new(),
            server_port: 8080,
            max_connections: 1000,
            read_timeout_secs: 0,
            write_timeout_secs: 0,
            disconnect_on_error: false,

            max_players: 100,
            motd: "A Minecraft Server".to_string(),
            version_name: "1.21".to_string(),
            protocol_version: 767,
            favicon: None,
            enforce_secure_chat: false,

            brand: "mcsrv".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a properties file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Load a properties file, falling back to defaults when it does not exist
    ///
    /// Any other I/O error (permissions, invalid UTF-8) is returned.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => {
                tracing::info!(path = %path.display(), "Loaded configuration");
                Ok(Self::parse(&content))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ServerError::Config(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Parse properties content
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                config.parse_option(key.trim(), value.trim());
            } else {
                tracing::warn!(line, "Ignoring line without '='");
            }
        }

        config
    }

    fn parse_option(&mut self, key: &str, value: &str) {
        match key {
            "server-ip" => self.server_ip = value.into(),
            "server-port" => parse_into(key, value, &mut self.server_port),
            "max-connections" => parse_into(key, value, &mut self.max_connections),
            "read-timeout-secs" => parse_into(key, value, &mut self.read_timeout_secs),
            "write-timeout-secs" => parse_into(key, value, &mut self.write_timeout_secs),
            "disconnect-on-error" => parse_into(key, value, &mut self.disconnect_on_error),
            "max-players" => parse_into(key, value, &mut self.max_players),
            "motd" => self.motd = value.into(),
            "version-name" => self.version_name = value.into(),
            "protocol-version" => parse_into(key, value, &mut self.protocol_version),
            "favicon" => {
                self.favicon = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "enforce-secure-chat" => parse_into(key, value, &mut self.enforce_secure_chat),
            "brand" => self.brand = value.into(),
            _ => tracing::warn!(key, "Ignoring unknown option"),
        }
    }

    /// Get the bind address for the TCP listener
    pub fn bind_address(&self) -> SocketAddr {
        let ip = if self.server_ip.is_empty() {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            self.server_ip.parse().unwrap_or_else(|_| {
                tracing::warn!(server_ip = %self.server_ip, "Invalid server-ip, binding all interfaces");
                IpAddr::V4(Ipv4Addr::UNSPECIFIED)
            })
        };
        SocketAddr::new(ip, self.server_port)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        secs_to_duration(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        secs_to_duration(self.write_timeout_secs)
    }

    /// Display configuration summary
    pub fn display(&self) {
        tracing::info!("Server configuration:");
        tracing::info!("  Bind: {}", self.bind_address());
        tracing::info!("  Max connections: {}", self.max_connections);
        tracing::info!("  MOTD: {}", self.motd);
        tracing::info!("  Version: {} (protocol {})", self.version_name, self.protocol_version);
        tracing::info!("  Max players: {}", self.max_players);
        match &self.favicon {
            Some(path) => tracing::info!("  Favicon: {}", path.display()),
            None => tracing::info!("  Favicon: (none)"),
        }
        tracing::info!(
            "  Timeouts: read={}s write={}s (0 = none)",
            self.read_timeout_secs,
            self.write_timeout_secs
        );
        tracing::info!("  Disconnect on error: {}", self.disconnect_on_error);
    }
}

fn parse_into<T: std::str::FromStr>(key: &str, value: &str, target: &mut T) {
    match value.parse() {
        Ok(parsed) => *target = parsed,
        Err(_) => tracing::warn!(key, value, "Invalid value, keeping default"),
    }
}

fn secs_to_duration(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
