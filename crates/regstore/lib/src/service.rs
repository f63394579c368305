//! Store service implementation.

use std::future::{Ready, ready};
use std::sync::Arc;
use std::task::{Context, Poll};

use regstore_proto::{
	ErrorCode, ErrorStatus, MAX_FRAME_LEN, Request, RequestPayload, ResponsePayload,
};
use tower_service::Service;

use crate::core::RegisterStore;

/// Hard upper bound on `CreateArray` capacity.
///
/// A slot encodes to at most five bytes, so the items of an array this large take well
/// under one frame.
pub const CAPACITY_CEILING: u32 = MAX_FRAME_LEN / 8;

/// Capacity limit used when none is configured.
pub const DEFAULT_MAX_CAPACITY: u32 = 1 << 20;

/// Request-level limits applied before a request reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
	max_capacity: u32,
}

impl Limits {
	/// Limits accepting capacities up to `max_capacity`, clamped to [`CAPACITY_CEILING`].
	#[must_use]
	pub fn with_max_capacity(max_capacity: u32) -> Self {
		Self {
			max_capacity: max_capacity.min(CAPACITY_CEILING),
		}
	}

	/// Largest capacity accepted by `CreateArray`.
	#[must_use]
	pub fn max_capacity(&self) -> u32 {
		self.max_capacity
	}
}

impl Default for Limits {
	fn default() -> Self {
		Self::with_max_capacity(DEFAULT_MAX_CAPACITY)
	}
}

/// Store service state and request handlers.
///
/// Each IPC connection is handled by its own instance; all instances share one
/// [`RegisterStore`].
#[derive(Debug, Clone)]
pub struct StoreService {
	store: Arc<RegisterStore>,
	limits: Limits,
}

impl StoreService {
	/// Create a new service over `store`.
	#[must_use]
	pub fn new(store: Arc<RegisterStore>, limits: Limits) -> Self {
		Self { store, limits }
	}

	/// Shared store handle.
	#[must_use]
	pub fn store(&self) -> &Arc<RegisterStore> {
		&self.store
	}

	/// Validate `payload` and run it against the store.
	///
	/// # Errors
	///
	/// Returns [`ErrorCode::InvalidArgs`] for malformed arguments, otherwise the store
	/// error mapped to its wire status.
	pub fn handle(&self, payload: RequestPayload) -> Result<ResponsePayload, ErrorStatus> {
		self.validate(&payload)?;

		let store = &self.store;
		let resp = match payload {
			RequestPayload::Ping => ResponsePayload::Pong,
			RequestPayload::CreateArray { name, capacity } => {
				store.create_array(&name, capacity)?;
				ResponsePayload::Created
			}
			RequestPayload::DeleteArray { name } => {
				store.delete_array(&name)?;
				ResponsePayload::Deleted
			}
			RequestPayload::GetArray { name } => {
				ResponsePayload::Arrays(vec![store.get_array(&name)?])
			}
			RequestPayload::GetAllArrays => ResponsePayload::Arrays(store.get_all_arrays()),
			RequestPayload::ReadValue { name, index } => {
				ResponsePayload::Value(store.read_value(&name, index)?)
			}
			RequestPayload::WriteValue { name, index, value } => {
				store.write_value(&name, index, value)?;
				ResponsePayload::Written { name, index, value }
			}
		};
		Ok(resp)
	}

	fn validate(&self, payload: &RequestPayload) -> Result<(), ErrorStatus> {
		let name = match payload {
			RequestPayload::Ping | RequestPayload::GetAllArrays => return Ok(()),
			RequestPayload::CreateArray { name, .. }
			| RequestPayload::DeleteArray { name }
			| RequestPayload::GetArray { name }
			| RequestPayload::ReadValue { name, .. }
			| RequestPayload::WriteValue { name, .. } => name,
		};

		if name.is_empty() {
			return Err(ErrorStatus::new(
				ErrorCode::InvalidArgs,
				"register name must not be empty",
			));
		}

		if let RequestPayload::CreateArray { name, capacity } = payload
			&& *capacity > self.limits.max_capacity
		{
			let max = self.limits.max_capacity;
			return Err(ErrorStatus::new(
				ErrorCode::InvalidArgs,
				format!("[CREATE] Register: {name}, Capacity: {capacity} exceeds limit {max}"),
			));
		}

		Ok(())
	}
}

impl Service<Request> for StoreService {
	type Response = ResponsePayload;
	type Error = ErrorStatus;
	type Future = Ready<Result<Self::Response, Self::Error>>;

	fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		Poll::Ready(Ok(()))
	}

	/// Handle one client request.
	///
	/// Store operations are bounded in-memory work, so the result is ready immediately.
	fn call(&mut self, req: Request) -> Self::Future {
		let kind = req.payload.kind();
		let result = self.handle(req.payload);
		match &result {
			Ok(_) => tracing::debug!(request_id = req.id.0, kind, "request handled"),
			Err(e) => tracing::warn!(
				request_id = req.id.0,
				kind,
				code = %e.code,
				message = %e.message,
				"request rejected"
			),
		}
		ready(result)
	}
}
