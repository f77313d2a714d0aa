//! USB mode handshake.
//!
//! The keyboard enumerates under its regular product id. Bootloader
//! operations require a mode switch: the switch request goes out under
//! the regular identity, the device falls off the bus, and after a
//! settle delay it re-enumerates under the bootloader product id, where
//! the interface is claimed again. Serial sessions skip all of this;
//! the operator is assumed to already be addressing the right mode.

use std::thread;
use std::time::Duration;

use wey_protocol::{Command, PRODUCT_ID_BOOTLOADER, PRODUCT_ID_KEYBOARD, VENDOR_ID};
use wey_transport::{Transport, UsbTransport};

use crate::ClientError;

/// Device identity to address over USB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbMode {
    /// Regular keyboard operation (file commands).
    Keyboard,
    /// Bootloader mode (module introspection, memory reads).
    Bootloader,
}

/// Delay between the mode-switch request and re-enumeration.
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Open the USB transport in the requested mode.
///
/// For [`UsbMode::Bootloader`] this performs the two-phase handshake;
/// a failure to open or claim at either phase is fatal to the run, there
/// is no retry.
pub fn open_usb(mode: UsbMode, timeout: Duration) -> Result<UsbTransport, ClientError> {
    match mode {
        UsbMode::Keyboard => Ok(UsbTransport::open(VENDOR_ID, PRODUCT_ID_KEYBOARD, timeout)?),
        UsbMode::Bootloader => {
            let mut transport = UsbTransport::open(VENDOR_ID, PRODUCT_ID_KEYBOARD, timeout)?;
            transport.send(&Command::EnterBootloader.encode())?;
            // Dropping the handle releases the claimed interface before
            // the device re-enumerates
            drop(transport);

            log::debug!("waiting for the bootloader to come up");
            thread::sleep(SETTLE_DELAY);

            Ok(UsbTransport::open(
                VENDOR_ID,
                PRODUCT_ID_BOOTLOADER,
                timeout,
            )?)
        }
    }
}
