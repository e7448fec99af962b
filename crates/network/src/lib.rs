//! # mcsrv Networking Layer
//!
//! Tokio-based networking for the protocol core.
//!
//! ## Modules
//!
//! - [`config`] - Network configuration options
//! - [`session`] - Per-connection protocol state machine
//! - [`server`] - Connection acceptor

pub mod config;
pub mod server;
pub mod session;

// Re-export commonly used items
pub use config::{PlaySettings, ServerConfig};
pub use server::{ConnectionRegistry, Server};
pub use session::{Session, SessionContext, SessionOutcome, BRAND_CHANNEL};
