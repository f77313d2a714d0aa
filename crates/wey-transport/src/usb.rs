//! USB bulk transport.
//!
//! Bytes move over a fixed pair of bulk endpoints. Writes are split into
//! max-packet-size chunks; reads accumulate packet bursts in a staging
//! buffer until the caller's count is available. A packet shorter than
//! the maximum packet size is the device's end-of-transfer marker and
//! stops accumulation, which is how streamed transfers (memory dumps,
//! padded replies) terminate.

use std::time::Duration;

use bytes::BytesMut;
use rusb::{Context, DeviceHandle, UsbContext};

use wey_protocol::{
    ENDPOINT_IN, ENDPOINT_OUT, MEMORY_CHUNK_SIZE, USB_CONFIGURATION, USB_INTERFACE,
    USB_MAX_PACKET_SIZE,
};

use crate::{Transport, TransportError};

/// Transport over the keyboard's bulk endpoints.
///
/// Opening claims the protocol interface; dropping the transport releases
/// it again.
pub struct UsbTransport {
    handle: DeviceHandle<Context>,
    staged: BytesMut,
    timeout: Duration,
}

impl UsbTransport {
    /// Open the device with the given identity and claim its protocol
    /// interface.
    pub fn open(vid: u16, pid: u16, timeout: Duration) -> Result<Self, TransportError> {
        let context = Context::new()?;
        let mut handle = context
            .open_device_with_vid_pid(vid, pid)
            .ok_or(TransportError::DeviceNotFound { vid, pid })?;

        // The device may already be in the right configuration
        if let Err(err) = handle.set_active_configuration(USB_CONFIGURATION) {
            log::debug!("set_configuration: {err}");
        }
        handle.claim_interface(USB_INTERFACE)?;
        log::debug!("claimed interface {USB_INTERFACE} on {vid:04x}:{pid:04x}");

        Ok(UsbTransport {
            handle,
            staged: BytesMut::with_capacity(MEMORY_CHUNK_SIZE),
            timeout,
        })
    }
}

impl Transport for UsbTransport {
    fn send(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        let mut total = 0;
        for chunk in buf.chunks(USB_MAX_PACKET_SIZE) {
            let sent = self
                .handle
                .write_bulk(ENDPOINT_OUT, chunk, self.timeout)
                .map_err(map_usb)?;
            total += sent;
            if sent != chunk.len() {
                return Err(TransportError::ShortWrite {
                    sent: total,
                    expected: buf.len(),
                });
            }
        }
        Ok(())
    }

    fn receive_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        let n = self.receive_stream(buf)?;
        if n < buf.len() {
            return Err(TransportError::UnexpectedEof {
                expected: buf.len(),
                actual: n,
            });
        }
        Ok(())
    }

    fn receive_stream(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let want = buf.len();
        let mut scratch = [0u8; MEMORY_CHUNK_SIZE];

        while self.staged.len() < want {
            let n = self
                .handle
                .read_bulk(ENDPOINT_IN, &mut scratch, self.timeout)
                .map_err(map_usb)?;
            self.staged.extend_from_slice(&scratch[..n]);
            if n < USB_MAX_PACKET_SIZE {
                // Short packet: this logical transfer is over
                break;
            }
        }

        let n = want.min(self.staged.len());
        buf[..n].copy_from_slice(&self.staged.split_to(n));
        Ok(n)
    }
}

fn map_usb(err: rusb::Error) -> TransportError {
    match err {
        rusb::Error::Timeout => TransportError::Timeout,
        other => TransportError::Usb(other),
    }
}
