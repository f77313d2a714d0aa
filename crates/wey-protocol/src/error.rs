//! Protocol error types.

use thiserror::Error;

/// Errors raised while validating or decoding device replies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Reply is too short to hold the expected header or record.
    #[error("{operation}: reply too short: expected at least {expected} bytes, got {actual}")]
    ReplyTooShort {
        /// Operation that produced the reply.
        operation: &'static str,
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Reply has a fixed size and the received total differs.
    #[error("{operation}: reply length mismatch: expected {expected} bytes, got {actual}")]
    ReplyLengthMismatch {
        /// Operation that produced the reply.
        operation: &'static str,
        /// Expected exact length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// The echoed command byte does not match the command sent.
    #[error("{operation}: command echo mismatch: sent 0x{sent:02x}, reply carries 0x{got:02x}")]
    EchoMismatch {
        /// Operation that produced the reply.
        operation: &'static str,
        /// Command byte that was sent.
        sent: u8,
        /// Command byte found in the reply.
        got: u8,
    },

    /// A fixed magic sequence is missing from the reply.
    #[error("{operation}: reply magic mismatch")]
    BadMagic {
        /// Operation that produced the reply.
        operation: &'static str,
    },

    /// The reply status word does not satisfy the command-specific rule.
    #[error("{operation}: unexpected status 0x{status:04x}")]
    UnexpectedStatus {
        /// Operation that produced the reply.
        operation: &'static str,
        /// Status word found in the reply.
        status: u16,
    },

    /// A payload stream ended before the declared length was satisfied.
    #[error("{operation}: truncated payload: declared {expected} bytes, received {actual}")]
    TruncatedPayload {
        /// Operation that produced the reply.
        operation: &'static str,
        /// Length declared by the reply.
        expected: usize,
        /// Bytes actually received.
        actual: usize,
    },
}
