//! Serial transport.
//!
//! A plain byte stream at a caller-supplied device path and baud rate,
//! configured 8N1 with no flow control. The stream carries no inherent
//! end-of-transfer marker, so reads always loop until the requested count
//! is complete; protocol callers know the exact length they expect.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::{Transport, TransportError};

/// Transport over a serial line.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open and configure the serial device.
    pub fn open(path: &str, baud: u32, timeout: Duration) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()?;
        log::debug!("opened serial port {path} at {baud} baud");
        Ok(SerialTransport { port })
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        let sent = self.port.write(buf).map_err(map_io)?;
        if sent != buf.len() {
            return Err(TransportError::ShortWrite {
                sent,
                expected: buf.len(),
            });
        }
        Ok(())
    }

    fn receive_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.port.read(&mut buf[filled..]).map_err(map_io)?;
            if n == 0 {
                return Err(TransportError::UnexpectedEof {
                    expected: buf.len(),
                    actual: filled,
                });
            }
            filled += n;
        }
        Ok(())
    }

    fn receive_stream(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        // No short-read termination on a serial line
        self.receive_exact(buf)?;
        Ok(buf.len())
    }
}

fn map_io(err: io::Error) -> TransportError {
    if err.kind() == io::ErrorKind::TimedOut {
        TransportError::Timeout
    } else {
        TransportError::Io(err)
    }
}
