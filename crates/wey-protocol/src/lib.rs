//! WEY keyboard firmware protocol
//!
//! This crate provides types and utilities for talking to WEY keyboard
//! peripherals, both in regular operation (file storage commands) and in
//! bootloader mode (module introspection, memory reads). Every message
//! starts with a command identifier byte; multi-byte fields are big-endian.
//!
//! # Protocol Overview
//!
//! The firmware exposes two command families:
//!
//! - **Bootloader commands** (`0xa0`-tagged, plus the `0x7f` mode/unlock
//!   opcodes): module slot introspection, memory reads, identification and
//!   restart. Reachable after the enter-bootloader handshake.
//! - **File commands** (`0xa2`..`0xa9`): list, read, write and delete files
//!   and graph resources held by the keyboard.
//!
//! This crate is pure transformation: encoding produces the exact wire
//! bytes, decoding validates the echoed command byte and status fields
//! before any payload is trusted. Moving those bytes is the job of the
//! `wey-transport` crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use wey_protocol::{Command, FileOpReply, CMD_READ_FILE};
//!
//! // Build a request
//! let frame = Command::ReadFile { index: 9, subindex: 1 }.encode();
//!
//! // Validate a reply header
//! let reply = FileOpReply::decode(&received)?;
//! reply.expect_command(CMD_READ_FILE)?;
//! ```

mod commands;
mod constants;
mod error;
mod replies;
mod types;

pub use commands::*;
pub use constants::*;
pub use error::*;
pub use replies::*;
pub use types::*;
