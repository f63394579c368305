//! Register array store library.
//!
//! Hosts the [`RegisterStore`](core::RegisterStore) registry, the request service that
//! maps wire requests onto it, the Unix socket server, and a small client used by the
//! command line tool.

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod core;
pub mod ipc;
pub mod service;

pub use regstore_proto as proto;
