//! Requests that can be sent to the keyboard.

use crate::constants::*;
use crate::types::*;

/// Requests understood by the keyboard firmware.
///
/// `encode` produces the exact wire bytes: the command identifier first,
/// then the command-specific fields in declared order, multi-byte integers
/// big-endian, fixed-width names zero-padded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch the keyboard into bootloader mode. The device re-enumerates
    /// under its bootloader product id afterwards.
    EnterBootloader,

    /// Restart the device into the given firmware mode.
    Restart {
        /// Target mode.
        mode: u8,
    },

    /// Unlock the bootloader command set.
    Unlock,

    /// Query the human-readable keyboard id.
    Identify,

    /// Read a memory range from the device.
    ReadMemory {
        /// First address to read.
        base: u32,
        /// Number of bytes to read.
        len: u32,
    },

    /// Query one firmware module slot.
    ModuleInfo {
        /// Slot index (0-63).
        index: u8,
    },

    /// Enumerate stored files.
    ListFiles,

    /// Download a file.
    ReadFile {
        /// File index.
        index: u16,
        /// File subindex.
        subindex: u16,
    },

    /// Download a graph resource.
    ReadGraph {
        /// Resource family.
        kind: GraphKind,
        /// Resource subindex (transformed per family on the wire).
        subindex: u16,
    },

    /// Upload a file. The payload body follows the request frame.
    WriteFile {
        /// File index.
        index: u16,
        /// File subindex.
        subindex: u16,
        /// File name, truncated to the 32-byte wire slot.
        name: String,
        /// Payload size in bytes.
        size: u32,
    },

    /// Delete a file.
    DeleteFile {
        /// File index.
        index: u16,
        /// File subindex.
        subindex: u16,
    },
}

impl Command {
    /// First wire byte of this command. For the file command family this
    /// is the identifier echoed back in replies.
    pub fn code(&self) -> u8 {
        match self {
            Command::EnterBootloader | Command::Unlock => 0x7f,
            Command::Restart { .. }
            | Command::Identify
            | Command::ReadMemory { .. }
            | Command::ModuleInfo { .. } => CMD_TAG,
            Command::ListFiles => CMD_LIST_FILES,
            Command::ReadFile { .. } => CMD_READ_FILE,
            Command::ReadGraph { .. } => CMD_READ_GRAPH,
            Command::WriteFile { .. } => CMD_WRITE_FILE,
            Command::DeleteFile { .. } => CMD_DELETE_FILE,
        }
    }

    /// Encode the command to wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(48);

        match self {
            Command::EnterBootloader => {
                buf.extend_from_slice(ENTER_BOOTLOADER);
            }

            Command::Restart { mode } => {
                buf.push(CMD_TAG);
                buf.push(RESTART_TAG);
                buf.extend_from_slice(&[0, 0, 0]);
                buf.push(*mode);
            }

            Command::Unlock => {
                buf.extend_from_slice(UNLOCK_CHALLENGE);
            }

            Command::Identify => {
                buf.extend_from_slice(IDENTIFY_QUERY);
            }

            Command::ReadMemory { base, len } => {
                buf.push(CMD_TAG);
                buf.extend_from_slice(READ_MEMORY_TAG);
                buf.extend_from_slice(&base.to_be_bytes());
                buf.extend_from_slice(&len.to_be_bytes());
            }

            Command::ModuleInfo { index } => {
                buf.push(CMD_TAG);
                buf.push(MODULE_INFO_TAG);
                buf.extend_from_slice(&[0, 0, 0]);
                buf.push(*index);
            }

            Command::ListFiles => {
                buf.push(CMD_LIST_FILES);
                buf.extend_from_slice(&[0, 0, 0]);
            }

            Command::ReadFile { index, subindex } => {
                buf.push(CMD_READ_FILE);
                buf.extend_from_slice(&index.to_be_bytes());
                buf.extend_from_slice(&subindex.to_be_bytes());
            }

            Command::ReadGraph { kind, subindex } => {
                buf.push(CMD_READ_GRAPH);
                buf.extend_from_slice(&kind.request_magic().to_be_bytes());
                buf.extend_from_slice(&kind.wire_subindex(*subindex).to_be_bytes());
                buf.extend_from_slice(&GRAPH_MAX_SIZE.to_be_bytes());
            }

            Command::WriteFile {
                index,
                subindex,
                name,
                size,
            } => {
                buf.push(CMD_WRITE_FILE);
                buf.extend_from_slice(&index.to_be_bytes());
                buf.extend_from_slice(&subindex.to_be_bytes());
                buf.extend_from_slice(&pack_name(name));
                buf.extend_from_slice(&size.to_be_bytes());
            }

            Command::DeleteFile { index, subindex } => {
                buf.push(CMD_DELETE_FILE);
                buf.extend_from_slice(&index.to_be_bytes());
                buf.extend_from_slice(&subindex.to_be_bytes());
            }
        }

        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_bootloader_bytes() {
        let frame = Command::EnterBootloader.encode();
        assert_eq!(frame, [0x7f, 0xee, b'g', b'o', b'-', b'D', b'y', b'n', b'B', b'l']);
    }

    #[test]
    fn test_restart_bytes() {
        let frame = Command::Restart { mode: 5 }.encode();
        assert_eq!(frame, [0xa0, b's', 0, 0, 0, 5]);
    }

    #[test]
    fn test_unlock_and_identify_include_terminator() {
        // The original firmware expects the C string terminator on the wire.
        assert_eq!(Command::Unlock.encode().len(), 35);
        assert_eq!(*Command::Unlock.encode().last().expect("non-empty"), 0);
        assert_eq!(Command::Identify.encode().len(), 9);
    }

    #[test]
    fn test_read_memory_layout() {
        let frame = Command::ReadMemory {
            base: 0x0800_1000,
            len: 256,
        }
        .encode();
        assert_eq!(frame.len(), 16);
        assert_eq!(&frame[..8], b"\xa0pREAD  ");
        assert_eq!(&frame[8..12], &0x0800_1000u32.to_be_bytes());
        assert_eq!(&frame[12..16], &256u32.to_be_bytes());
    }

    #[test]
    fn test_module_info_bytes() {
        let frame = Command::ModuleInfo { index: 7 }.encode();
        assert_eq!(frame, [0xa0, b'q', 0, 0, 0, 7]);
    }

    #[test]
    fn test_list_files_bytes() {
        assert_eq!(Command::ListFiles.encode(), [CMD_LIST_FILES, 0, 0, 0]);
    }

    #[test]
    fn test_read_file_layout() {
        let frame = Command::ReadFile {
            index: 0x0102,
            subindex: 0x0304,
        }
        .encode();
        assert_eq!(frame, [CMD_READ_FILE, 0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_read_graph_layout() {
        let frame = Command::ReadGraph {
            kind: GraphKind::Bitmap,
            subindex: 1,
        }
        .encode();
        assert_eq!(frame.len(), 9);
        assert_eq!(frame[0], CMD_READ_GRAPH);
        assert_eq!(&frame[1..3], &0xa054u16.to_be_bytes());
        assert_eq!(&frame[3..5], &0x7100u16.to_be_bytes());
        assert_eq!(&frame[5..9], &GRAPH_MAX_SIZE.to_be_bytes());
    }

    #[test]
    fn test_write_file_layout() {
        let frame = Command::WriteFile {
            index: 9,
            subindex: 2,
            name: "LAYER02.LAY".to_string(),
            size: 1280,
        }
        .encode();
        assert_eq!(frame.len(), 41);
        assert_eq!(frame[0], CMD_WRITE_FILE);
        assert_eq!(&frame[1..3], &9u16.to_be_bytes());
        assert_eq!(&frame[3..5], &2u16.to_be_bytes());
        assert_eq!(&frame[5..16], b"LAYER02.LAY");
        assert!(frame[16..37].iter().all(|&b| b == 0));
        assert_eq!(&frame[37..41], &1280u32.to_be_bytes());
    }

    #[test]
    fn test_delete_file_layout() {
        let frame = Command::DeleteFile {
            index: 1,
            subindex: 65535,
        }
        .encode();
        assert_eq!(frame, [CMD_DELETE_FILE, 0x00, 0x01, 0xff, 0xff]);
    }
}
