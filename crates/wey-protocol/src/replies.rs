//! Reply decoding and validation.
//!
//! Each decode function takes the raw reply bytes together with the
//! operation context and either returns typed fields or a
//! [`ProtocolError`]. Nothing here performs I/O; chunked payload transfer
//! is driven by the protocol engine on top of these validators.

use crate::constants::*;
use crate::error::ProtocolError;
use crate::types::*;

/// Check the five-byte unlock echo.
pub fn check_unlock_reply(reply: &[u8]) -> Result<(), ProtocolError> {
    if reply != UNLOCK_ECHO {
        log::trace!("unlock reply was {reply:02x?}");
        return Err(ProtocolError::BadMagic { operation: "unlock" });
    }
    Ok(())
}

/// Extract the keyboard id from an identification reply.
///
/// The reply must start with the eight query bytes; the remainder is the
/// human-readable id.
pub fn decode_identify_reply(reply: &[u8]) -> Result<String, ProtocolError> {
    if reply.len() < IDENTIFY_ECHO.len() {
        return Err(ProtocolError::ReplyTooShort {
            operation: "identify",
            expected: IDENTIFY_ECHO.len(),
            actual: reply.len(),
        });
    }
    if &reply[..IDENTIFY_ECHO.len()] != IDENTIFY_ECHO {
        return Err(ProtocolError::BadMagic {
            operation: "identify",
        });
    }
    Ok(string_from_padded(&reply[IDENTIFY_ECHO.len()..]))
}

/// Decode a complete module-info reply.
///
/// The device pads every reply to the fixed 258-byte total; anything else
/// is rejected. The record starts after the two echo bytes with the
/// `"MK06"` magic.
pub fn decode_module_info(reply: &[u8]) -> Result<ModuleInfo, ProtocolError> {
    if reply.len() != MODULE_INFO_REPLY_SIZE {
        return Err(ProtocolError::ReplyLengthMismatch {
            operation: "module-info",
            expected: MODULE_INFO_REPLY_SIZE,
            actual: reply.len(),
        });
    }
    if reply[0] != CMD_TAG || reply[1] != MODULE_INFO_TAG {
        return Err(ProtocolError::EchoMismatch {
            operation: "module-info",
            sent: CMD_TAG,
            got: reply[0],
        });
    }

    let record = &reply[2..2 + MODULE_RECORD_SIZE];
    if &record[0..4] != MODULE_MAGIC {
        return Err(ProtocolError::BadMagic {
            operation: "module-info",
        });
    }

    Ok(ModuleInfo {
        number: u32::from_be_bytes([record[4], record[5], record[6], record[7]]),
        name: string_from_padded(&record[8..72]),
        date: string_from_padded(&record[72..84]),
        unknown: [record[84], record[85]],
        base: u32::from_be_bytes([record[86], record[87], record[88], record[89]]),
        end: u32::from_be_bytes([record[90], record[91], record[92], record[93]]),
        checksum: u32::from_be_bytes([record[94], record[95], record[96], record[97]]),
    })
}

/// Header of a file-listing reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListReplyHeader {
    /// Total payload length declared by the firmware.
    pub length: u32,
    /// Number of file entries that follow.
    pub count: u32,
}

/// Decode and validate the file-listing reply header.
pub fn decode_list_header(reply: &[u8]) -> Result<ListReplyHeader, ProtocolError> {
    if reply.len() < LIST_HEADER_SIZE {
        return Err(ProtocolError::ReplyTooShort {
            operation: "list-files",
            expected: LIST_HEADER_SIZE,
            actual: reply.len(),
        });
    }
    if reply[0] != CMD_LIST_FILES {
        return Err(ProtocolError::EchoMismatch {
            operation: "list-files",
            sent: CMD_LIST_FILES,
            got: reply[0],
        });
    }
    Ok(ListReplyHeader {
        length: u32::from_be_bytes([reply[3], reply[4], reply[5], reply[6]]),
        count: u32::from_be_bytes([reply[7], reply[8], reply[9], reply[10]]),
    })
}

/// Decode `count` file entries from a listing payload.
pub fn decode_file_entries(payload: &[u8], count: usize) -> Result<Vec<FileEntry>, ProtocolError> {
    if payload.len() < count * FILE_ENTRY_SIZE {
        return Err(ProtocolError::ReplyTooShort {
            operation: "list-files",
            expected: count * FILE_ENTRY_SIZE,
            actual: payload.len(),
        });
    }
    Ok(payload
        .chunks_exact(FILE_ENTRY_SIZE)
        .take(count)
        .filter_map(FileEntry::from_slice)
        .collect())
}

/// Common reply header shared by the file operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOpReply {
    /// Echoed command byte.
    pub cmd: u8,
    /// Echoed file index.
    pub index: u16,
    /// Echoed file subindex.
    pub subindex: u16,
    /// Status word. For read-file replies this field holds the first two
    /// file name bytes instead (see [`assemble_read_file_header`]).
    pub status: u16,
}

impl FileOpReply {
    /// Decode the seven-byte reply header.
    pub fn decode(reply: &[u8], operation: &'static str) -> Result<Self, ProtocolError> {
        if reply.len() < FILE_OP_REPLY_SIZE {
            return Err(ProtocolError::ReplyTooShort {
                operation,
                expected: FILE_OP_REPLY_SIZE,
                actual: reply.len(),
            });
        }
        Ok(FileOpReply {
            cmd: reply[0],
            index: u16::from_be_bytes([reply[1], reply[2]]),
            subindex: u16::from_be_bytes([reply[3], reply[4]]),
            status: u16::from_be_bytes([reply[5], reply[6]]),
        })
    }

    /// Reject the reply unless it echoes the command that was sent.
    pub fn expect_command(&self, cmd: u8, operation: &'static str) -> Result<(), ProtocolError> {
        if self.cmd != cmd {
            return Err(ProtocolError::EchoMismatch {
                operation,
                sent: cmd,
                got: self.cmd,
            });
        }
        Ok(())
    }

    /// Reject the reply unless the status word equals the success code.
    pub fn expect_success(&self, operation: &'static str) -> Result<(), ProtocolError> {
        if self.status != STATUS_SUCCESS {
            return Err(ProtocolError::UnexpectedStatus {
                operation,
                status: self.status,
            });
        }
        Ok(())
    }

    /// Whether the status word reports a missing file.
    pub fn is_missing(&self) -> bool {
        (self.status >> 8) as u8 == STATUS_MISSING
    }

    /// The status field in wire byte order. For read-file replies these
    /// are the first two file name bytes.
    pub fn status_bytes(&self) -> [u8; 2] {
        self.status.to_be_bytes()
    }
}

/// Name and size of a file about to be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadFileHeader {
    /// File name as stored on the device.
    pub name: String,
    /// Payload size in bytes.
    pub size: u32,
}

/// Reassemble the read-file header from its two wire pieces.
///
/// The firmware overloads the status field of the read-file reply with the
/// first two bytes of the file name; the remaining 30 name bytes and the
/// payload size arrive separately. This splice is the one place where that
/// quirk is handled.
pub fn assemble_read_file_header(
    status_bytes: [u8; 2],
    tail: &[u8],
) -> Result<ReadFileHeader, ProtocolError> {
    if tail.len() < READ_FILE_TAIL_SIZE {
        return Err(ProtocolError::ReplyTooShort {
            operation: "read-file",
            expected: READ_FILE_TAIL_SIZE,
            actual: tail.len(),
        });
    }

    let mut name = [0u8; FILE_NAME_SIZE];
    name[0] = status_bytes[0];
    name[1] = status_bytes[1];
    name[2..].copy_from_slice(&tail[..FILE_NAME_SIZE - 2]);

    let size = u32::from_be_bytes([tail[30], tail[31], tail[32], tail[33]]);

    Ok(ReadFileHeader {
        name: string_from_padded(&name),
        size,
    })
}

/// Check the single status byte opening a graph reply.
pub fn check_graph_status(status: u8) -> Result<(), ProtocolError> {
    if status != CMD_READ_GRAPH {
        return Err(ProtocolError::UnexpectedStatus {
            operation: "read-graph",
            status: status as u16,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a padded module-info reply around the given record fields.
    fn module_reply(number: u32, name: &str, base: u32, end: u32, csum: u32) -> Vec<u8> {
        let mut reply = vec![0u8; MODULE_INFO_REPLY_SIZE];
        reply[0] = CMD_TAG;
        reply[1] = MODULE_INFO_TAG;
        reply[2..6].copy_from_slice(MODULE_MAGIC);
        reply[6..10].copy_from_slice(&number.to_be_bytes());
        reply[10..10 + name.len()].copy_from_slice(name.as_bytes());
        reply[74..86].copy_from_slice(b"2019-03-11\0\0");
        reply[88..92].copy_from_slice(&base.to_be_bytes());
        reply[92..96].copy_from_slice(&end.to_be_bytes());
        reply[96..100].copy_from_slice(&csum.to_be_bytes());
        reply
    }

    #[test]
    fn test_unlock_reply_validation() {
        assert!(check_unlock_reply(b"\x7f\xe0GMK").is_ok());
        assert!(check_unlock_reply(b"\x7f\xe0GMK\0").is_err());
        assert!(check_unlock_reply(b"\x7f\xe0gmk").is_err());
    }

    #[test]
    fn test_identify_reply_decoding() {
        let id = decode_identify_reply(b"\xa0pID    WEY-MK06").expect("valid reply");
        assert_eq!(id, "WEY-MK06");

        // Bare echo means an empty id, not an error
        let id = decode_identify_reply(IDENTIFY_ECHO).expect("bare echo is valid");
        assert_eq!(id, "");

        assert!(matches!(
            decode_identify_reply(b"\xa0pID"),
            Err(ProtocolError::ReplyTooShort { .. })
        ));
        assert!(matches!(
            decode_identify_reply(b"\xa0pXX    WEY"),
            Err(ProtocolError::BadMagic { .. })
        ));
    }

    #[test]
    fn test_module_info_round_trip() {
        let reply = module_reply(3, "BOOT", 0, 0x1000, 0xdead_beef);
        let info = decode_module_info(&reply).expect("valid record");
        assert_eq!(info.number, 3);
        assert_eq!(info.name, "BOOT");
        assert_eq!(info.date, "2019-03-11");
        assert_eq!(info.base, 0);
        assert_eq!(info.end, 0x1000);
        assert_eq!(info.checksum, 0xdead_beef);
    }

    #[test]
    fn test_module_info_rejects_bad_replies() {
        let reply = module_reply(0, "BOOT", 0, 0, 0);

        assert!(matches!(
            decode_module_info(&reply[..200]),
            Err(ProtocolError::ReplyLengthMismatch { .. })
        ));

        let mut bad_echo = reply.clone();
        bad_echo[1] = b'r';
        assert!(matches!(
            decode_module_info(&bad_echo),
            Err(ProtocolError::EchoMismatch { .. })
        ));

        let mut bad_magic = reply;
        bad_magic[2..6].copy_from_slice(b"MK05");
        assert!(matches!(
            decode_module_info(&bad_magic),
            Err(ProtocolError::BadMagic { .. })
        ));
    }

    #[test]
    fn test_list_header_round_trip() {
        let mut reply = vec![0u8; LIST_HEADER_SIZE];
        reply[0] = CMD_LIST_FILES;
        reply[3..7].copy_from_slice(&72u32.to_be_bytes());
        reply[7..11].copy_from_slice(&2u32.to_be_bytes());

        let header = decode_list_header(&reply).expect("valid header");
        assert_eq!(header.length, 72);
        assert_eq!(header.count, 2);

        reply[0] = CMD_READ_FILE;
        assert!(matches!(
            decode_list_header(&reply),
            Err(ProtocolError::EchoMismatch { .. })
        ));
    }

    #[test]
    fn test_file_entries_decoding() {
        let mut payload = vec![0u8; 2 * FILE_ENTRY_SIZE];
        payload[0..2].copy_from_slice(&1u16.to_be_bytes());
        payload[2..4].copy_from_slice(&0u16.to_be_bytes());
        payload[4..12].copy_from_slice(b"CONF.BIN");
        payload[36..38].copy_from_slice(&9u16.to_be_bytes());
        payload[38..40].copy_from_slice(&4u16.to_be_bytes());
        payload[40..51].copy_from_slice(b"LAYER04.LAY");

        let entries = decode_file_entries(&payload, 2).expect("two entries");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "CONF.BIN");
        assert_eq!(entries[1].index, 9);
        assert_eq!(entries[1].subindex, 4);
        assert_eq!(entries[1].name, "LAYER04.LAY");

        assert!(decode_file_entries(&payload, 3).is_err());
    }

    #[test]
    fn test_file_op_reply_checks() {
        let wire = [CMD_DELETE_FILE, 0x00, 0x01, 0x00, 0x02, 0xd0, 0x00];
        let reply = FileOpReply::decode(&wire, "delete-file").expect("valid header");
        assert_eq!(reply.index, 1);
        assert_eq!(reply.subindex, 2);
        assert!(reply.expect_command(CMD_DELETE_FILE, "delete-file").is_ok());
        assert!(reply.expect_command(CMD_WRITE_FILE, "delete-file").is_err());
        assert!(reply.expect_success("delete-file").is_ok());

        let wire = [CMD_DELETE_FILE, 0, 1, 0, 2, 0xd0, 0x01];
        let reply = FileOpReply::decode(&wire, "delete-file").expect("valid header");
        assert!(reply.expect_success("delete-file").is_err());
        assert!(reply.is_missing());
    }

    #[test]
    fn test_read_file_header_splice() {
        // First two name bytes travel inside the status field
        let status = [b'f', b'o'];
        let mut tail = vec![0u8; READ_FILE_TAIL_SIZE];
        tail[..6].copy_from_slice(b"o.bin\0");
        tail[30..34].copy_from_slice(&512u32.to_be_bytes());

        let header = assemble_read_file_header(status, &tail).expect("valid tail");
        assert_eq!(header.name, "foo.bin");
        assert_eq!(header.size, 512);

        assert!(assemble_read_file_header(status, &tail[..20]).is_err());
    }

    #[test]
    fn test_graph_status_check() {
        assert!(check_graph_status(CMD_READ_GRAPH).is_ok());
        assert!(matches!(
            check_graph_status(0x00),
            Err(ProtocolError::UnexpectedStatus { .. })
        ));
    }
}
