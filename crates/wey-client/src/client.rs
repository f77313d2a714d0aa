//! Protocol operations.
//!
//! Every operation follows the same pattern: encode the request, send it
//! completely, receive the reply, validate it against the command that
//! was sent, then run the chunked payload loop where the command has one.
//! Device-declared lengths are checked against [`MAX_TRANSFER_SIZE`]
//! before any buffer is sized from them.

use wey_protocol::{
    assemble_read_file_header, check_graph_status, check_unlock_reply, decode_file_entries,
    decode_identify_reply, decode_list_header, decode_module_info, Command, FileEntry, FileOpReply,
    GraphKind, ModuleInfo, ProtocolError, CMD_DELETE_FILE, CMD_READ_FILE, CMD_WRITE_FILE,
    FILE_CHUNK_SIZE, FILE_ENTRY_SIZE, FILE_OP_REPLY_SIZE, GRAPH_HEADER_SKIP, LIST_HEADER_SIZE,
    MAX_TRANSFER_SIZE, MEMORY_CHUNK_SIZE, MODULE_INFO_REPLY_SIZE, MODULE_SLOTS,
    READ_FILE_TAIL_SIZE, STATUS_SUCCESS,
};
use wey_transport::{Transport, TransportError};

use crate::ClientError;

/// Reply buffer size for the variable-length bootloader replies (unlock
/// echo, identification string).
const SHORT_REPLY_SIZE: usize = 256;

/// A file downloaded from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFile {
    /// Name reported by the device, or derived from the graph family.
    pub name: String,
    /// File contents.
    pub data: Vec<u8>,
}

/// Protocol engine over an owned transport.
pub struct Client<T: Transport> {
    transport: T,
}

impl<T: Transport> Client<T> {
    /// Create an engine driving the given transport.
    pub fn new(transport: T) -> Self {
        Client { transport }
    }

    /// Consume the engine and hand the transport back.
    pub fn into_transport(self) -> T {
        self.transport
    }

    // ========================================================================
    // Bootloader operations
    // ========================================================================

    /// Unlock the bootloader command set.
    pub fn unlock(&mut self) -> Result<(), ClientError> {
        self.send(&Command::Unlock)?;
        let reply = self.receive_until_short(SHORT_REPLY_SIZE)?;
        check_unlock_reply(&reply)?;
        Ok(())
    }

    /// Query the human-readable keyboard id. Requires a prior
    /// [`unlock`](Self::unlock).
    pub fn identify(&mut self) -> Result<String, ClientError> {
        self.send(&Command::Identify)?;
        let reply = self.receive_until_short(SHORT_REPLY_SIZE)?;
        Ok(decode_identify_reply(&reply)?)
    }

    /// Read a memory range from the device.
    ///
    /// The dump streams in bounded chunks and ends when the requested
    /// length is exhausted or the transport signals end-of-transfer, so
    /// the returned buffer may be shorter than `len`.
    pub fn read_memory(&mut self, base: u32, len: u32) -> Result<Vec<u8>, ClientError> {
        self.send(&Command::ReadMemory { base, len })?;
        let data = self.receive_until_short(len as usize)?;
        if data.len() < len as usize {
            log::debug!(
                "memory read ended after {} of {len} bytes",
                data.len()
            );
        }
        Ok(data)
    }

    /// Query one firmware module slot.
    pub fn module_info(&mut self, index: u8) -> Result<ModuleInfo, ClientError> {
        self.send(&Command::ModuleInfo { index })?;
        let reply = self.receive_until_short(MODULE_INFO_REPLY_SIZE)?;
        Ok(decode_module_info(&reply)?)
    }

    /// Walk all module slots, returning the ones that hold a valid
    /// record. Empty slots answer with garbage or nothing at all and are
    /// skipped.
    pub fn list_modules(&mut self) -> Result<Vec<ModuleInfo>, ClientError> {
        let mut modules = Vec::new();
        for index in 0..MODULE_SLOTS {
            match self.module_info(index) {
                Ok(info) => modules.push(info),
                Err(ClientError::Protocol(err)) => {
                    log::debug!("module slot {index}: {err}");
                }
                Err(ClientError::Transport(TransportError::Timeout)) => {
                    log::debug!("module slot {index}: no reply");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(modules)
    }

    /// Restart the device into the given firmware mode. Fire-and-forget:
    /// the device drops off the bus, so no reply is read.
    pub fn restart(&mut self, mode: u8) -> Result<(), ClientError> {
        self.send(&Command::Restart { mode })
    }

    // ========================================================================
    // File operations
    // ========================================================================

    /// Enumerate the files stored on the device.
    pub fn list_files(&mut self) -> Result<Vec<FileEntry>, ClientError> {
        const OP: &str = "list-files";

        self.send(&Command::ListFiles)?;

        let mut header = [0u8; LIST_HEADER_SIZE];
        self.transport.receive_exact(&mut header)?;
        let header = decode_list_header(&header)?;

        let count = header.count as usize;
        let payload_len = count.saturating_mul(FILE_ENTRY_SIZE);
        if payload_len == 0 || payload_len > MAX_TRANSFER_SIZE {
            return Err(ClientError::SizeLimit {
                operation: OP,
                requested: payload_len,
                max: MAX_TRANSFER_SIZE,
            });
        }

        let mut payload = vec![0u8; payload_len];
        self.transport.receive_exact(&mut payload)?;
        Ok(decode_file_entries(&payload, count)?)
    }

    /// Download a file addressed by index and subindex.
    pub fn read_file(&mut self, index: u16, subindex: u16) -> Result<DeviceFile, ClientError> {
        const OP: &str = "read-file";

        self.send(&Command::ReadFile { index, subindex })?;

        let mut header = [0u8; FILE_OP_REPLY_SIZE];
        self.transport.receive_exact(&mut header)?;
        let reply = FileOpReply::decode(&header, OP)?;
        reply.expect_command(CMD_READ_FILE, OP)?;
        if reply.is_missing() {
            return Err(ClientError::NotFound { index, subindex });
        }

        // The firmware smuggles the first two file name bytes inside the
        // status field of this reply; splice them back in front of the
        // remaining name bytes and the size field.
        let mut tail = [0u8; READ_FILE_TAIL_SIZE];
        self.transport.receive_exact(&mut tail)?;
        let head = assemble_read_file_header(reply.status_bytes(), &tail)?;

        let size = head.size as usize;
        self.check_size(OP, size)?;
        log::debug!("{},{}: {} ({size} bytes)", reply.index, reply.subindex, head.name);

        let data = self.receive_payload(OP, size)?;
        Ok(DeviceFile {
            name: head.name,
            data,
        })
    }

    /// Download a graph resource (bitmap or color parameter block).
    pub fn read_graph(&mut self, kind: GraphKind, subindex: u16) -> Result<DeviceFile, ClientError> {
        const OP: &str = "read-graph";

        self.send(&Command::ReadGraph { kind, subindex })?;

        let mut status = [0u8; 1];
        self.transport.receive_exact(&mut status)?;
        check_graph_status(status[0])?;

        let mut skipped = [0u8; GRAPH_HEADER_SKIP];
        self.transport.receive_exact(&mut skipped)?;

        let mut size = [0u8; 4];
        self.transport.receive_exact(&mut size)?;
        let size = u32::from_be_bytes(size) as usize;
        self.check_size(OP, size)?;

        let name = kind.artifact_name(subindex);
        log::debug!("{name}: {size} bytes");

        let data = self.receive_payload(OP, size)?;
        Ok(DeviceFile { name, data })
    }

    /// Upload a file. The 32-byte name slot truncates longer names.
    pub fn write_file(
        &mut self,
        index: u16,
        subindex: u16,
        name: &str,
        data: &[u8],
    ) -> Result<(), ClientError> {
        const OP: &str = "write-file";

        let size = u32::try_from(data.len()).map_err(|_| ClientError::SizeLimit {
            operation: OP,
            requested: data.len(),
            max: u32::MAX as usize,
        })?;

        self.send(&Command::WriteFile {
            index,
            subindex,
            name: name.to_string(),
            size,
        })?;

        let mut sent = 0;
        for chunk in data.chunks(FILE_CHUNK_SIZE) {
            self.transport.send(chunk)?;
            sent += chunk.len();
            log::debug!("sent {} bytes, {} remaining", chunk.len(), data.len() - sent);
        }

        let mut header = [0u8; FILE_OP_REPLY_SIZE];
        self.transport.receive_exact(&mut header)?;
        let reply = FileOpReply::decode(&header, OP)?;
        reply.expect_command(CMD_WRITE_FILE, OP)?;
        reply.expect_success(OP)?;
        Ok(())
    }

    /// Delete a file addressed by index and subindex.
    pub fn delete_file(&mut self, index: u16, subindex: u16) -> Result<(), ClientError> {
        const OP: &str = "delete-file";

        self.send(&Command::DeleteFile { index, subindex })?;

        let mut header = [0u8; FILE_OP_REPLY_SIZE];
        self.transport.receive_exact(&mut header)?;
        let reply = FileOpReply::decode(&header, OP)?;
        reply.expect_command(CMD_DELETE_FILE, OP)?;
        match reply.status {
            STATUS_SUCCESS => Ok(()),
            _ if reply.is_missing() => Err(ClientError::NotFound { index, subindex }),
            status => Err(ProtocolError::UnexpectedStatus {
                operation: OP,
                status,
            }
            .into()),
        }
    }

    // ========================================================================
    // Passthrough
    // ========================================================================

    /// Send raw bytes and read back up to `rx_len` bytes. No validation
    /// is applied; the receive length is capped like any other transfer.
    pub fn raw(&mut self, tx: &[u8], rx_len: usize) -> Result<Vec<u8>, ClientError> {
        self.check_size("raw", rx_len)?;
        log::trace!("tx {tx:02x?}");
        self.transport.send(tx)?;
        if rx_len == 0 {
            return Ok(Vec::new());
        }
        self.receive_until_short(rx_len)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn send(&mut self, command: &Command) -> Result<(), ClientError> {
        let frame = command.encode();
        log::trace!("tx {frame:02x?}");
        self.transport.send(&frame)?;
        Ok(())
    }

    fn check_size(&self, operation: &'static str, requested: usize) -> Result<(), ClientError> {
        if requested > MAX_TRANSFER_SIZE {
            return Err(ClientError::SizeLimit {
                operation,
                requested,
                max: MAX_TRANSFER_SIZE,
            });
        }
        Ok(())
    }

    /// Receive exactly `size` payload bytes in bounded chunks. An early
    /// end-of-transfer is an error here: a declared length that the
    /// transport cannot satisfy is never truncated to a partial result.
    fn receive_payload(
        &mut self,
        operation: &'static str,
        size: usize,
    ) -> Result<Vec<u8>, ClientError> {
        let mut data = vec![0u8; size];
        let mut filled = 0;
        while filled < size {
            let want = FILE_CHUNK_SIZE.min(size - filled);
            let n = self.transport.receive_stream(&mut data[filled..filled + want])?;
            filled += n;
            if n < want {
                return Err(ProtocolError::TruncatedPayload {
                    operation,
                    expected: size,
                    actual: filled,
                }
                .into());
            }
        }
        Ok(data)
    }

    /// Receive up to `len` bytes in bounded chunks, stopping early when
    /// the transport signals end-of-transfer. Each iteration must make
    /// forward progress; a zero-byte result ends the loop.
    fn receive_until_short(&mut self, len: usize) -> Result<Vec<u8>, ClientError> {
        let mut data = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            let want = MEMORY_CHUNK_SIZE.min(len - filled);
            let n = self.transport.receive_stream(&mut data[filled..filled + want])?;
            filled += n;
            if n < want {
                break;
            }
        }
        data.truncate(filled);
        Ok(data)
    }
}
