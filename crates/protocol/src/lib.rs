//! # mcsrv Protocol Library
//!
//! Wire protocol for the handshake, status, login, configuration and play
//! login exchange of a Minecraft-style server.
//!
//! ## Architecture
//!
//! ### 1. Codecs Layer ([`codecs`])
//! Primitive encoding/decoding:
//! - VarInt: 1 to 5 byte LEB128-style 32-bit signed integer
//! - String: VarInt byte length + UTF-8
//! - Big-endian fixed-width integers, lenient booleans, raw UUIDs
//! - Packed block positions
//!
//! ### 2. Buffer Pool ([`pool`])
//! Tiered reusable byte buffers (1 KiB / 10 KiB / 1 MiB) shared by every
//! connection.
//!
//! ### 3. Framing ([`framing`])
//! `{VarInt length}{VarInt id}{payload}` frames read from and written to
//! async streams.
//!
//! ### 4. Packet Ids ([`packets`])
//! Serverbound and clientbound ids, scoped by protocol state.
//!
//! ### 5. Packet Structures ([`packet_types`])
//! Typed packet bodies implementing [`Encode`] / [`Decode`].
//!
//! ### 6. Status ([`status`])
//! The server list JSON document.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use mcsrv_protocol::{write_packet, BufferPool, ClientboundPacket, StatusInfo};
//!
//! # async fn run(stream: &mut tokio::net::TcpStream) -> mcsrv_core::Result<()> {
//! let pool = BufferPool::default();
//! let response = StatusInfo::default().to_response()?;
//! write_packet(stream, &pool, ClientboundPacket::StatusResponse.id(), &response).await?;
//! # Ok(())
//! # }
//! ```

pub mod codecs;
pub mod framing;
pub mod packet_types;
pub mod packets;
pub mod pool;
pub mod status;

// Re-export commonly used items
pub use codecs::*;
pub use framing::*;
pub use packet_types::*;
pub use packets::*;
pub use pool::*;
pub use status::*;
