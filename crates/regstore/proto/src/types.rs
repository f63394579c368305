//! Wire types for the register store protocol.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for requests and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

/// A single IPC frame between a client and the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpcFrame {
	/// A request from a client to the store.
	Request(Request),
	/// A response from the store to a client.
	Response(Response),
}

/// A request from a client to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
	/// Unique identifier for this request.
	pub id: RequestId,
	/// The request payload.
	pub payload: RequestPayload,
}

/// Request payload variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestPayload {
	/// Simple ping for connectivity check.
	Ping,
	/// Create a zeroed register array.
	CreateArray {
		/// Name of the new array.
		name: String,
		/// Number of addressable slots.
		capacity: u32,
	},
	/// Remove a register array.
	DeleteArray {
		/// Name of the array to remove.
		name: String,
	},
	/// Fetch a snapshot of one register array.
	GetArray {
		/// Name of the array.
		name: String,
	},
	/// Fetch snapshots of every register array.
	GetAllArrays,
	/// Read one slot.
	ReadValue {
		/// Name of the array.
		name: String,
		/// Slot index.
		index: u32,
	},
	/// Overwrite one slot.
	WriteValue {
		/// Name of the array.
		name: String,
		/// Slot index.
		index: u32,
		/// Value to store.
		value: u32,
	},
}

impl RequestPayload {
	/// Short operation tag used in log fields.
	#[must_use]
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Ping => "ping",
			Self::CreateArray { .. } => "create",
			Self::DeleteArray { .. } => "delete",
			Self::GetArray { .. } => "get",
			Self::GetAllArrays => "get_all",
			Self::ReadValue { .. } => "read",
			Self::WriteValue { .. } => "write",
		}
	}
}

/// A response from the store to a client.
///
/// Exactly one of `payload` and `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
	/// The request this responds to.
	pub request_id: RequestId,
	/// The response payload when successful.
	pub payload: Option<ResponsePayload>,
	/// The error status when the request failed.
	pub error: Option<ErrorStatus>,
}

impl Response {
	/// Builds a successful response.
	#[must_use]
	pub fn ok(request_id: RequestId, payload: ResponsePayload) -> Self {
		Self {
			request_id,
			payload: Some(payload),
			error: None,
		}
	}

	/// Builds a failed response.
	#[must_use]
	pub fn err(request_id: RequestId, error: ErrorStatus) -> Self {
		Self {
			request_id,
			payload: None,
			error: Some(error),
		}
	}

	/// Collapses the response into a `Result`.
	///
	/// A response carrying neither field is reported as [`ErrorCode::Internal`].
	pub fn into_result(self) -> Result<ResponsePayload, ErrorStatus> {
		match (self.payload, self.error) {
			(_, Some(error)) => Err(error),
			(Some(payload), None) => Ok(payload),
			(None, None) => Err(ErrorStatus::new(ErrorCode::Internal, "empty response")),
		}
	}
}

/// Response payload variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponsePayload {
	/// Simple pong response.
	Pong,
	/// Array created.
	Created,
	/// Array deleted.
	Deleted,
	/// One or more array snapshots.
	Arrays(Vec<RegisterArraySnapshot>),
	/// Value of a single slot.
	Value(u32),
	/// Echo of a successful write.
	Written {
		/// Name of the array written.
		name: String,
		/// Slot index written.
		index: u32,
		/// Value stored.
		value: u32,
	},
}

/// Immutable copy of a register array at the time of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterArraySnapshot {
	/// Array name.
	pub name: String,
	/// Number of addressable slots.
	pub capacity: u32,
	/// Number of distinct slots written at least once.
	pub size: u32,
	/// Slot values in index order.
	pub items: Vec<u32>,
}

/// Error codes for store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
	/// Referenced array does not exist.
	NotFound,
	/// Array name already in use.
	AlreadyExists,
	/// Slot index is not below the array capacity.
	OutOfRange,
	/// Malformed arguments.
	InvalidArgs,
	/// Frame kind the store does not accept.
	UnknownRequest,
	/// Generic internal error.
	Internal,
}

impl ErrorCode {
	/// Numeric status, compatible with gRPC status codes.
	#[must_use]
	pub const fn status(self) -> u32 {
		match self {
			Self::InvalidArgs => 3,
			Self::NotFound => 5,
			Self::AlreadyExists => 6,
			Self::OutOfRange => 11,
			Self::UnknownRequest => 12,
			Self::Internal => 13,
		}
	}

	/// Canonical upper-case name.
	#[must_use]
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::InvalidArgs => "INVALID_ARGUMENT",
			Self::NotFound => "NOT_FOUND",
			Self::AlreadyExists => "ALREADY_EXISTS",
			Self::OutOfRange => "OUT_OF_RANGE",
			Self::UnknownRequest => "UNIMPLEMENTED",
			Self::Internal => "INTERNAL",
		}
	}
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorStatus {
	/// Machine-readable kind.
	pub code: ErrorCode,
	/// Message naming the offending array and index.
	pub message: String,
}

impl ErrorStatus {
	/// Creates a new error status.
	pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
		}
	}
}

impl fmt::Display for ErrorStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.code, self.message)
	}
}

impl std::error::Error for ErrorStatus {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_codes_are_stable() {
		assert_eq!(ErrorCode::NotFound.status(), 5);
		assert_eq!(ErrorCode::AlreadyExists.status(), 6);
		assert_eq!(ErrorCode::OutOfRange.status(), 11);
		assert_eq!(ErrorCode::InvalidArgs.status(), 3);
	}

	#[test]
	fn into_result_prefers_error() {
		let resp = Response {
			request_id: RequestId(1),
			payload: Some(ResponsePayload::Created),
			error: Some(ErrorStatus::new(ErrorCode::NotFound, "gone")),
		};
		assert_eq!(resp.into_result().unwrap_err().code, ErrorCode::NotFound);
	}

	#[test]
	fn into_result_empty_is_internal() {
		let resp = Response {
			request_id: RequestId(1),
			payload: None,
			error: None,
		};
		assert_eq!(resp.into_result().unwrap_err().code, ErrorCode::Internal);
	}
}
