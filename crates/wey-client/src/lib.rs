//! Request/response engine for WEY keyboards.
//!
//! [`Client`] owns a transport and drives the protocol over it: every
//! operation encodes one request, sends it completely, receives and
//! validates the reply, and runs the chunked payload loop where the
//! command has one. Operations never retry: the protocol gives no
//! idempotency guarantee for writes and deletes, so a failed operation
//! surfaces as an error instead of being replayed.
//!
//! The [`session`] module performs the USB mode handshake that decides
//! which device identity the transport is opened under.

mod client;
mod error;
pub mod session;

pub use client::{Client, DeviceFile};
pub use error::ClientError;
