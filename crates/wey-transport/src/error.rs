//! Transport error types.

use thiserror::Error;

/// Errors raised while opening a channel or moving bytes over it.
#[derive(Error, Debug)]
pub enum TransportError {
    /// No USB device with the expected identity is attached.
    #[error("device {vid:04x}:{pid:04x} not found")]
    DeviceNotFound {
        /// Vendor id searched for.
        vid: u16,
        /// Product id searched for.
        pid: u16,
    },

    /// The per-call timeout elapsed before the operation completed.
    #[error("operation timed out")]
    Timeout,

    /// The channel accepted fewer bytes than requested.
    #[error("short write: sent {sent} of {expected} bytes")]
    ShortWrite {
        /// Bytes actually sent.
        sent: usize,
        /// Bytes requested.
        expected: usize,
    },

    /// The channel ended before an exact read could be satisfied.
    #[error("unexpected end of stream: got {actual} of {expected} bytes")]
    UnexpectedEof {
        /// Bytes requested.
        expected: usize,
        /// Bytes available before the end.
        actual: usize,
    },

    /// USB stack error.
    #[error("usb: {0}")]
    Usb(#[from] rusb::Error),

    /// Serial port configuration or open error.
    #[error("serial port: {0}")]
    Serial(#[from] serialport::Error),

    /// Underlying stream I/O error.
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
}
