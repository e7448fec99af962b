//! Server list status payload
//!
//! Builds the JSON document carried by [`StatusResponse`]. The document is
//! rendered once at startup and reused for every status request.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use mcsrv_core::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::packet_types::StatusResponse;

const FAVICON_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub name: String,
    pub protocol: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSample {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayersInfo {
    pub max: i32,
    pub online: i32,
    #[serde(default)]
    pub sample: Vec<PlayerSample>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub text: String,
}

/// Status document shown in the client's server list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    pub version: VersionInfo,
    pub players: PlayersInfo,
    pub description: Description,
    /// `data:image/png;base64,...`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    pub enforces_secure_chat: bool,
}

impl StatusInfo {
    pub fn new(version_name: impl Into<String>, protocol: i32, max_players: i32, motd: impl Into<String>) -> Self {
        Self {
            version: VersionInfo {
                name: version_name.into(),
                protocol,
            },
            players: PlayersInfo {
                max: max_players,
                online: 0,
                sample: Vec::new(),
            },
            description: Description { text: motd.into() },
            favicon: None,
            enforces_secure_chat: false,
        }
    }

    /// Attach PNG bytes as the favicon
    pub fn with_favicon_png(mut self, png: &[u8]) -> Self {
        self.favicon = Some(format!("{}{}", FAVICON_PREFIX, BASE64.encode(png)));
        self
    }

    /// Read a PNG file and attach it as the favicon
    pub fn with_favicon_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let png = std::fs::read(path)?;
        tracing::debug!(path = %path.display(), bytes = png.len(), "Loaded favicon");
        Ok(self.with_favicon_png(&png))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ServerError::InvalidData(format!("Failed to render status JSON: {}", e)))
    }

    /// Render into a ready-to-send packet body
    pub fn to_response(&self) -> Result<StatusResponse> {
        Ok(StatusResponse { json: self.to_json()? })
    }
}

impl Default for StatusInfo {
    fn default() -> Self {
        Self::new("1.21", 767, 100, "A Minecraft Server")
    }
}
