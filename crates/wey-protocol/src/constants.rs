//! Protocol constants
//!
//! These constants define the command identifier bytes, magic sequences,
//! fixed record sizes and device identity used by the WEY keyboard
//! protocol. All multi-byte wire integers are big-endian.

// ============================================================================
// Device identity
// ============================================================================

/// USB vendor ID of the keyboard.
pub const VENDOR_ID: u16 = 0x0744;
/// USB product ID in regular keyboard mode.
pub const PRODUCT_ID_KEYBOARD: u16 = 0x003f;
/// USB product ID after the enter-bootloader handshake.
pub const PRODUCT_ID_BOOTLOADER: u16 = 0x003e;

/// Bulk-out endpoint address (host to device).
pub const ENDPOINT_OUT: u8 = 0x06;
/// Bulk-in endpoint address (device to host).
pub const ENDPOINT_IN: u8 = 0x85;
/// USB configuration value to select.
pub const USB_CONFIGURATION: u8 = 1;
/// USB interface number carrying the bulk endpoints.
pub const USB_INTERFACE: u8 = 1;
/// Maximum bulk packet size; a shorter packet ends a transfer.
pub const USB_MAX_PACKET_SIZE: usize = 64;

// ============================================================================
// Bootloader commands
// ============================================================================

/// Mode-switch request: leaves keyboard mode for the bootloader.
pub const ENTER_BOOTLOADER: &[u8] = &[0x7f, 0xee, b'g', b'o', b'-', b'D', b'y', b'n', b'B', b'l'];

/// Unlock challenge sent before identification and memory reads.
/// The trailing NUL is part of the frame.
pub const UNLOCK_CHALLENGE: &[u8] = b"\x7f\xe0gMk_eLeCtRoNiC-DeSiGn_gMbH-WeRnB\x00";
/// Expected unlock reply, exactly these five bytes.
pub const UNLOCK_ECHO: &[u8] = b"\x7f\xe0GMK";

/// Identification query. The trailing NUL is part of the frame.
pub const IDENTIFY_QUERY: &[u8] = b"\xa0pID    \x00";
/// An identification reply must start with this prefix; the rest is the
/// human-readable keyboard id.
pub const IDENTIFY_ECHO: &[u8] = b"\xa0pID    ";

/// Tag byte opening every `0xa0`-family bootloader request.
pub const CMD_TAG: u8 = 0xa0;
/// Sub-command letter for memory reads, padded to seven bytes.
pub const READ_MEMORY_TAG: &[u8; 7] = b"pREAD  ";
/// Sub-command letter for restart requests.
pub const RESTART_TAG: u8 = b's';
/// Sub-command letter for module-info requests.
pub const MODULE_INFO_TAG: u8 = b'q';

/// Number of module slots a bootloader-mode device reports.
pub const MODULE_SLOTS: u8 = 64;
/// Magic opening a module record.
pub const MODULE_MAGIC: &[u8; 4] = b"MK06";
/// Total module-info reply length: two echo bytes plus a 256-byte
/// zero-padded body holding the record.
pub const MODULE_INFO_REPLY_SIZE: usize = 258;
/// Size of the module record itself (magic through checksum).
pub const MODULE_RECORD_SIZE: usize = 98;

// ============================================================================
// File commands
// ============================================================================

/// Upload a graph resource (declared by the firmware, unused here).
pub const CMD_WRITE_GRAPH: u8 = 0xa2;
/// Download a graph resource (bitmap or color parameters).
pub const CMD_READ_GRAPH: u8 = 0xa3;
/// Upload a file.
pub const CMD_WRITE_FILE: u8 = 0xa5;
/// Download a file.
pub const CMD_READ_FILE: u8 = 0xa6;
/// Delete a file.
pub const CMD_DELETE_FILE: u8 = 0xa8;
/// Enumerate stored files.
pub const CMD_LIST_FILES: u8 = 0xa9;

/// Width of a file name slot on the wire, including the NUL terminator.
pub const FILE_NAME_SIZE: usize = 32;
/// Size of one listing entry: index, subindex, name slot.
pub const FILE_ENTRY_SIZE: usize = 36;
/// Size of the listing reply header.
pub const LIST_HEADER_SIZE: usize = 11;
/// Size of the common file-operation reply.
pub const FILE_OP_REPLY_SIZE: usize = 7;
/// Bytes following a read-file reply header: the remaining 30 name bytes
/// and the 4-byte payload size.
pub const READ_FILE_TAIL_SIZE: usize = 34;
/// Bytes the firmware inserts between the graph status byte and the
/// payload size field.
pub const GRAPH_HEADER_SKIP: usize = 4;
/// `maxsize` field value sent with every graph request.
pub const GRAPH_MAX_SIZE: u32 = 1_000_000;

/// Status word reported for a successful write or delete.
pub const STATUS_SUCCESS: u16 = 0xd000;
/// High status byte reported when a requested file does not exist.
pub const STATUS_MISSING: u8 = 0xd0;

// ============================================================================
// Limits
// ============================================================================

/// Absolute cap applied to every device-declared length before a buffer is
/// sized from it.
pub const MAX_TRANSFER_SIZE: usize = 1024 * 1024;
/// Chunk size for file payload transfers.
pub const FILE_CHUNK_SIZE: usize = 512;
/// Chunk size for streamed memory reads.
pub const MEMORY_CHUNK_SIZE: usize = 4096;
