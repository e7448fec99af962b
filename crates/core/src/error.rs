//! Core error types for mcsrv

use crate::ProtocolState;

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A VarInt ran past five bytes without a terminating byte
    #[error("Invalid VarInt: more than 5 bytes")]
    InvalidVarInt,

    /// The input ended before a value was complete
    #[error("Unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Declared and actual sizes of a frame disagree
    #[error("Length mismatch: declared {declared} bytes, got {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("Frame too large: {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },

    /// A count field does not match the list it describes
    #[error("Count mismatch for {field}: declared {declared}, list has {actual}")]
    CountMismatch {
        field: &'static str,
        declared: i32,
        actual: usize,
    },

    #[error("Invalid next state in handshake: {0}")]
    InvalidNextState(i32),

    #[error("Unexpected packet in {state} state: expected id 0x{expected:02X}, got 0x{actual:02X}")]
    UnexpectedPacket {
        state: ProtocolState,
        expected: i32,
        actual: i32,
    },

    #[error("Illegal state transition: {from} -> {to}")]
    IllegalTransition { from: ProtocolState, to: ProtocolState },

    #[error("Timed out during {0}")]
    Timeout(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ServerError {
    /// Whether the error was caused by the peer sending something the protocol forbids.
    ///
    /// I/O failures, timeouts and local configuration problems are not violations.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidVarInt
                | Self::UnexpectedEof { .. }
                | Self::InvalidData(_)
                | Self::LengthMismatch { .. }
                | Self::FrameTooLarge { .. }
                | Self::InvalidNextState(_)
                | Self::UnexpectedPacket { .. }
                | Self::IllegalTransition { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
