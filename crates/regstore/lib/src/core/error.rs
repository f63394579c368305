//! Error types for store operations.

use std::fmt;

use regstore_proto::{ErrorCode, ErrorStatus};
use thiserror::Error;

/// Store operation that produced a lookup or bounds error, rendered as the message tag.
///
/// `CreateArray` can only fail with [`StoreError::AlreadyExists`], which carries its own tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
	/// `DeleteArray`.
	Delete,
	/// `GetArray`.
	Get,
	/// `ReadValue`.
	Read,
	/// `WriteValue`.
	Write,
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Delete => "[DELETE]",
			Self::Get => "[GET]",
			Self::Read => "[READ]",
			Self::Write => "[WRITE]",
		})
	}
}

/// `GET` messages omit the colon after `Register`.
fn name_separator(op: &Operation) -> &'static str {
	if *op == Operation::Get { "" } else { ":" }
}

/// Errors returned by [`RegisterStore`](super::RegisterStore) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
	/// The named array is not registered.
	#[error("{op} Register{sep} {name} doesn't exist", sep = name_separator(.op))]
	NotFound {
		/// Operation that failed.
		op: Operation,
		/// Name that was looked up.
		name: String,
	},

	/// An array with this name already exists.
	#[error("[CREATE] Register: {name} already exists")]
	AlreadyExists {
		/// Conflicting name.
		name: String,
	},

	/// The index is not below the array capacity.
	#[error("{op} Register: {name}, Index: {index} invalid")]
	OutOfRange {
		/// Operation that failed.
		op: Operation,
		/// Array name.
		name: String,
		/// Rejected index.
		index: u32,
	},
}

impl StoreError {
	/// Wire error code for this error.
	#[must_use]
	pub fn code(&self) -> ErrorCode {
		match self {
			Self::NotFound { .. } => ErrorCode::NotFound,
			Self::AlreadyExists { .. } => ErrorCode::AlreadyExists,
			Self::OutOfRange { .. } => ErrorCode::OutOfRange,
		}
	}
}

impl From<StoreError> for ErrorStatus {
	fn from(err: StoreError) -> Self {
		ErrorStatus::new(err.code(), err.to_string())
	}
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
