//! Shared wire types for regstore IPC.
//!
//! This crate defines the messages exchanged between clients and the register store
//! daemon over Unix domain sockets. Every frame is a little-endian `u32` length prefix
//! followed by a postcard-encoded [`IpcFrame`].

#![warn(missing_docs)]

pub mod codec;
pub mod paths;
pub mod types;

pub use codec::{MAX_FRAME_LEN, encode_frame, read_frame, write_frame};
pub use types::*;
