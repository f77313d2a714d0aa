//! Scripted transport for tests.

use std::collections::VecDeque;

use bytes::BytesMut;

use wey_protocol::USB_MAX_PACKET_SIZE;

use crate::{Transport, TransportError};

/// A transport that replays scripted replies and records every sent
/// frame.
///
/// Replies are delivered burst by burst, mimicking bulk packetization: a
/// queued packet shorter than the configured max packet size ends the
/// current logical transfer exactly like a short USB bulk packet does.
/// Asking for bytes that were never scripted fails with
/// [`TransportError::Timeout`].
#[derive(Debug)]
pub struct MockTransport {
    /// Device-to-host packets still to be delivered.
    rx: VecDeque<Vec<u8>>,
    /// Every buffer handed to `send`, in order.
    pub sent: Vec<Vec<u8>>,
    staged: BytesMut,
    max_packet: usize,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a mock with the real USB max packet size.
    pub fn new() -> Self {
        Self::with_max_packet(USB_MAX_PACKET_SIZE)
    }

    /// Create a mock with a custom max packet size.
    pub fn with_max_packet(max_packet: usize) -> Self {
        MockTransport {
            rx: VecDeque::new(),
            sent: Vec::new(),
            staged: BytesMut::new(),
            max_packet,
        }
    }

    /// Queue one reply packet, delivered as a single burst.
    pub fn queue_packet(&mut self, packet: impl Into<Vec<u8>>) {
        self.rx.push_back(packet.into());
    }

    /// Queue a complete reply, split into max-packet-size bursts the way
    /// the device would send it. A reply whose length is an exact packet
    /// multiple gets a trailing zero-length packet as its end marker.
    pub fn queue_reply(&mut self, reply: &[u8]) {
        for chunk in reply.chunks(self.max_packet) {
            self.rx.push_back(chunk.to_vec());
        }
        if reply.is_empty() || reply.len() % self.max_packet == 0 {
            self.rx.push_back(Vec::new());
        }
    }

    /// All sent frames flattened into one byte sequence.
    pub fn sent_bytes(&self) -> Vec<u8> {
        self.sent.concat()
    }
}

impl Transport for MockTransport {
    fn send(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        self.sent.push(buf.to_vec());
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

        while self.staged.len() < want {
            let Some(packet) = self.rx.pop_front() else {
                if self.staged.is_empty() {
                    return Err(TransportError::Timeout);
                }
                break;
            };
            let short = packet.len() < self.max_packet;
            self.staged.extend_from_slice(&packet);
            if short {
                break;
            }
        }

        let n = want.min(self.staged.len());
        buf[..n].copy_from_slice(&self.staged.split_to(n));
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_packet_ends_stream() {
        let mut mock = MockTransport::new();
        mock.queue_packet(vec![0xaa; USB_MAX_PACKET_SIZE]);
        mock.queue_packet(vec![0xbb; 10]);

        let mut buf = [0u8; 256];
        let n = mock.receive_stream(&mut buf).expect("stream read");
        assert_eq!(n, USB_MAX_PACKET_SIZE + 10);
        assert_eq!(buf[USB_MAX_PACKET_SIZE], 0xbb);
    }

    #[test]
    fn test_exact_read_across_bursts() {
        let mut mock = MockTransport::new();
        mock.queue_reply(&[0x11; 100]);

        let mut head = [0u8; 30];
        mock.receive_exact(&mut head).expect("first part");
        let mut rest = [0u8; 70];
        mock.receive_exact(&mut rest).expect("leftover stays staged");
    }

    #[test]
    fn test_missing_data_times_out() {
        let mut mock = MockTransport::new();
        let mut buf = [0u8; 4];
        assert!(matches!(
            mock.receive_stream(&mut buf),
            Err(TransportError::Timeout)
        ));
    }
}
