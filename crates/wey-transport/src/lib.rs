//! Byte transports for WEY keyboards.
//!
//! The protocol engine drives exactly one of two channels: a raw serial
//! byte stream or a pair of USB bulk endpoints. Both expose the same
//! blocking send/receive semantics through the [`Transport`] trait; the
//! differences (packetization, end-of-transfer signaling) stay inside the
//! implementations.
//!
//! A scripted [`MockTransport`] is exported for tests; it replays replies
//! in packet-sized bursts so the USB short-packet rule can be exercised
//! without hardware.

mod error;
mod mock;
mod serial;
mod usb;

pub use error::TransportError;
pub use mock::MockTransport;
pub use serial::SerialTransport;
pub use usb::UsbTransport;

/// A blocking byte channel to the device.
///
/// Every call is bounded by the transport's per-operation timeout. The
/// three methods fail distinguishably: a timeout, a short write and a
/// broken channel are separate [`TransportError`] variants because the
/// protocol engine reacts to them differently.
pub trait Transport {
    /// Send the whole buffer. Anything less than a complete send is an
    /// error: a partially transmitted command leaves the device in an
    /// undefined state.
    fn send(&mut self, buf: &[u8]) -> Result<(), TransportError>;

    /// Fill the buffer completely, blocking until enough bytes arrived.
    fn receive_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError>;

    /// Receive up to `buf.len()` bytes, returning how many were placed at
    /// the front of the buffer.
    ///
    /// Implementations may return fewer bytes than requested only when
    /// the channel itself signals the end of a logical transfer (a USB
    /// bulk packet shorter than the maximum packet size). The serial
    /// stream has no such marker and always fills the buffer. A return
    /// value of 0 means the transfer ended before any byte; callers must
    /// treat it as an end marker, never retry in a loop.
    fn receive_stream(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;
}

impl Transport for Box<dyn Transport> {
    fn send(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        (**self).send(buf)
    }

    fn receive_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        (**self).receive_exact(buf)
    }

    fn receive_stream(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        (**self).receive_stream(buf)
    }
}
