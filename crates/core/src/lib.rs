//! mcsrv Core - Fundamental types and utilities

mod error;
mod types;
mod idgen;
mod positions;

pub use error::*;
pub use types::*;
pub use idgen::*;
pub use positions::*;
