//! Engine error types.

use thiserror::Error;
use wey_protocol::ProtocolError;
use wey_transport::TransportError;

/// Errors surfaced at the protocol engine boundary.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The underlying channel failed; the operation and the run are over.
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    /// The device's reply failed validation.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A device-declared length exceeds the absolute transfer cap. The
    /// request is rejected before any buffer is sized from it.
    #[error("{operation}: declared size {requested} exceeds the {max} byte cap")]
    SizeLimit {
        /// Operation that carried the length field.
        operation: &'static str,
        /// Length the device (or caller) declared.
        requested: usize,
        /// The enforced cap.
        max: usize,
    },

    /// The device reported that the addressed file does not exist.
    #[error("file {index},{subindex} not found on device")]
    NotFound {
        /// File index.
        index: u16,
        /// File subindex.
        subindex: u16,
    },
}
