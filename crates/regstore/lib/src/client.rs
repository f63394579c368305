//! Register store client and human-readable output.
//!
//! [`RegisterClient`] issues one request per call over a connected socket and reports
//! every outcome the store sends back, success or failure, as a line on its output sink.
//! Transport failures are only returned.

use std::io::Write;
use std::path::Path;

use regstore_proto::{
	ErrorStatus, IpcFrame, RegisterArraySnapshot, Request, RequestId, RequestPayload,
	ResponsePayload, read_frame, write_frame,
};
use thiserror::Error;
use tokio::net::UnixStream;

/// Errors returned by [`RegisterClient`] calls.
#[derive(Debug, Error)]
pub enum ClientError {
	/// The store rejected the request.
	#[error("{}", render_remote(.0))]
	Remote(ErrorStatus),

	/// Socket or output failure.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// The store closed the connection before answering.
	#[error("connection closed by register store")]
	Disconnected,

	/// The store answered with a payload that does not match the request.
	#[error("unexpected response: {0:?}")]
	UnexpectedResponse(ResponsePayload),

	/// The store answered a different request id.
	#[error("response for request {got} while waiting for {expected}")]
	MismatchedId {
		/// Id of the request in flight.
		expected: u64,
		/// Id carried by the response.
		got: u64,
	},
}

/// Renders a remote failure as `[Error:<status>] <message>`.
fn render_remote(status: &ErrorStatus) -> String {
	format!("[Error:{}] {}", status.code.status(), status.message)
}

impl ClientError {
	/// Whether the failure came from the store rather than the transport.
	#[must_use]
	pub fn is_remote(&self) -> bool {
		matches!(self, Self::Remote(_))
	}
}

/// Result type for client calls.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client for the register store daemon.
pub struct RegisterClient<W> {
	stream: UnixStream,
	out: W,
	next_id: u64,
}

impl<W> std::fmt::Debug for RegisterClient<W> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RegisterClient")
			.field("stream", &self.stream)
			.field("out", &"<output>")
			.field("next_id", &self.next_id)
			.finish()
	}
}

impl<W: Write> RegisterClient<W> {
	/// Connect to the store listening on `socket_path`.
	///
	/// # Errors
	///
	/// Returns an I/O error if the socket cannot be reached.
	pub async fn connect(socket_path: impl AsRef<Path>, out: W) -> std::io::Result<Self> {
		Ok(Self::from_stream(crate::ipc::connect(socket_path).await?, out))
	}

	/// Wrap an already connected stream.
	pub fn from_stream(stream: UnixStream, out: W) -> Self {
		Self {
			stream,
			out,
			next_id: 0,
		}
	}

	/// Consume the client, returning its output sink.
	pub fn into_output(self) -> W {
		self.out
	}

	/// Check connectivity.
	///
	/// # Errors
	///
	/// See [`ClientError`].
	pub async fn ping(&mut self) -> Result<()> {
		match self.call(RequestPayload::Ping).await? {
			ResponsePayload::Pong => self.line(format_args!("[PING] OK")),
			other => Err(ClientError::UnexpectedResponse(other)),
		}
	}

	/// Create an array of `capacity` zeroed slots.
	///
	/// # Errors
	///
	/// See [`ClientError`].
	pub async fn create_register_array(&mut self, name: &str, capacity: u32) -> Result<()> {
		let payload = RequestPayload::CreateArray {
			name: name.to_owned(),
			capacity,
		};
		self.call(payload).await?;
		self.line(format_args!("[CREATE] OK"))
	}

	/// Delete an array.
	///
	/// # Errors
	///
	/// See [`ClientError`].
	pub async fn delete_register_array(&mut self, name: &str) -> Result<()> {
		let payload = RequestPayload::DeleteArray {
			name: name.to_owned(),
		};
		self.call(payload).await?;
		self.line(format_args!("[DELETE] OK"))
	}

	/// Fetch and print one array.
	///
	/// # Errors
	///
	/// See [`ClientError`].
	pub async fn get_register_array(&mut self, name: &str) -> Result<RegisterArraySnapshot> {
		let payload = RequestPayload::GetArray {
			name: name.to_owned(),
		};
		let arrays = self.expect_arrays("GET", payload).await?;
		let snapshot = match <[RegisterArraySnapshot; 1]>::try_from(arrays) {
			Ok([snapshot]) => snapshot,
			Err(arrays) => {
				self.line(format_args!("[Error] [GET] Invalid response"))?;
				return Err(ClientError::UnexpectedResponse(ResponsePayload::Arrays(arrays)));
			}
		};
		self.print_array(&snapshot)?;
		Ok(snapshot)
	}

	/// Fetch and print every array.
	///
	/// # Errors
	///
	/// See [`ClientError`].
	pub async fn get_all_register_arrays(&mut self) -> Result<Vec<RegisterArraySnapshot>> {
		let arrays = self.expect_arrays("GET", RequestPayload::GetAllArrays).await?;
		if arrays.is_empty() {
			self.line(format_args!("[GET] Empty response"))?;
		}
		for snapshot in &arrays {
			self.print_array(snapshot)?;
		}
		Ok(arrays)
	}

	/// Read and print one slot.
	///
	/// # Errors
	///
	/// See [`ClientError`].
	pub async fn read_value(&mut self, name: &str, index: u32) -> Result<u32> {
		let payload = RequestPayload::ReadValue {
			name: name.to_owned(),
			index,
		};
		match self.call(payload).await? {
			ResponsePayload::Value(value) => {
				self.line(format_args!(
					"[READ] Register: {name}, Index: {index}, Value: {value}"
				))?;
				Ok(value)
			}
			other => {
				self.line(format_args!("[Error] [READ] Invalid response"))?;
				Err(ClientError::UnexpectedResponse(other))
			}
		}
	}

	/// Write one slot and print the echo.
	///
	/// # Errors
	///
	/// See [`ClientError`].
	pub async fn write_value(&mut self, name: &str, index: u32, value: u32) -> Result<()> {
		let payload = RequestPayload::WriteValue {
			name: name.to_owned(),
			index,
			value,
		};
		match self.call(payload).await? {
			ResponsePayload::Written { name, index, value } => self.line(format_args!(
				"[WRITE] Register: {name}, Index: {index}, Value: {value}"
			)),
			other => {
				self.line(format_args!("[Error] [WRITE] Invalid response"))?;
				Err(ClientError::UnexpectedResponse(other))
			}
		}
	}

	async fn expect_arrays(
		&mut self,
		tag: &str,
		payload: RequestPayload,
	) -> Result<Vec<RegisterArraySnapshot>> {
		match self.call(payload).await? {
			ResponsePayload::Arrays(arrays) => Ok(arrays),
			other => {
				self.line(format_args!("[Error] [{tag}] Invalid response"))?;
				Err(ClientError::UnexpectedResponse(other))
			}
		}
	}

	/// Send one request and wait for its response, printing remote errors.
	async fn call(&mut self, payload: RequestPayload) -> Result<ResponsePayload> {
		let result = self.roundtrip(payload).await;
		if let Err(ClientError::Remote(status)) = &result {
			self.line(format_args!("{}", render_remote(status)))?;
		}
		result
	}

	async fn roundtrip(&mut self, payload: RequestPayload) -> Result<ResponsePayload> {
		let id = RequestId(self.next_id);
		self.next_id += 1;

		write_frame(&mut self.stream, &IpcFrame::Request(Request { id, payload })).await?;

		let response = match read_frame(&mut self.stream).await? {
			Some(IpcFrame::Response(response)) => response,
			Some(IpcFrame::Request(req)) => {
				return Err(ClientError::MismatchedId {
					expected: id.0,
					got: req.id.0,
				});
			}
			None => return Err(ClientError::Disconnected),
		};

		if response.request_id != id {
			return Err(ClientError::MismatchedId {
				expected: id.0,
				got: response.request_id.0,
			});
		}

		response.into_result().map_err(ClientError::Remote)
	}

	fn print_array(&mut self, snapshot: &RegisterArraySnapshot) -> Result<()> {
		write_array(&mut self.out, snapshot)?;
		Ok(())
	}

	fn line(&mut self, args: std::fmt::Arguments<'_>) -> Result<()> {
		writeln!(self.out, "{args}")?;
		Ok(())
	}
}

/// Write `snapshot` as a `name capacity size` header followed by one line per slot.
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn write_array(out: &mut impl Write, snapshot: &RegisterArraySnapshot) -> std::io::Result<()> {
	writeln!(out, "{} {} {}", snapshot.name, snapshot.capacity, snapshot.size)?;
	for (index, value) in snapshot.items.iter().enumerate() {
		writeln!(out, "Index: {index}, Value: {value}")?;
	}
	Ok(())
}

/// Replays the reference session against a fresh store.
///
/// Remote errors are printed by the client and do not stop the session.
///
/// # Errors
///
/// Stops at the first transport failure.
pub async fn sample_session<W: Write>(client: &mut RegisterClient<W>) -> Result<()> {
	fn tolerate<T>(result: Result<T>) -> Result<()> {
		match result {
			Ok(_) | Err(ClientError::Remote(_)) => Ok(()),
			Err(e) => Err(e),
		}
	}

	tolerate(client.create_register_array("pktsCount", 16).await)?;
	tolerate(client.create_register_array("pktsCount", 10).await)?;
	tolerate(client.create_register_array("bytesCount", 16).await)?;
	tolerate(client.create_register_array("flowCount", 4).await)?;
	tolerate(client.write_value("flowCount", 2, 100).await)?;
	tolerate(client.read_value("flowCount", 0).await)?;
	tolerate(client.read_value("flowCount", 2).await)?;
	tolerate(client.read_value("flowCount", 4).await)?;
	tolerate(client.create_register_array("meterRate", 4).await)?;
	tolerate(client.write_value("meterRate", 0, 10).await)?;
	tolerate(client.write_value("meterRate", 2, 50).await)?;
	tolerate(client.get_register_array("meterRate").await)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use regstore_proto::ErrorCode;
	use tokio_util::sync::CancellationToken;

	use super::*;
	use crate::core::RegisterStore;
	use crate::ipc::handle_connection;
	use crate::service::{Limits, StoreService};

	fn connected() -> std::io::Result<(RegisterClient<Vec<u8>>, tokio::task::JoinHandle<()>)> {
		let (client, server) = UnixStream::pair()?;
		let service = StoreService::new(RegisterStore::new(), Limits::default());
		let task = tokio::spawn(handle_connection(server, service, CancellationToken::new()));
		Ok((RegisterClient::from_stream(client, Vec::new()), task))
	}

	fn output(client: RegisterClient<Vec<u8>>) -> String {
		String::from_utf8(client.into_output()).expect("client output is utf-8")
	}

	#[tokio::test(flavor = "current_thread")]
	async fn sample_session_output() -> std::io::Result<()> {
		let (mut client, task) = connected()?;
		sample_session(&mut client).await.expect("transport stays up");

		let expected = "\
[CREATE] OK
[Error:6] [CREATE] Register: pktsCount already exists
[CREATE] OK
[CREATE] OK
[WRITE] Register: flowCount, Index: 2, Value: 100
[READ] Register: flowCount, Index: 0, Value: 0
[READ] Register: flowCount, Index: 2, Value: 100
[Error:11] [READ] Register: flowCount, Index: 4 invalid
[CREATE] OK
[WRITE] Register: meterRate, Index: 0, Value: 10
[WRITE] Register: meterRate, Index: 2, Value: 50
meterRate 4 2
Index: 0, Value: 10
Index: 1, Value: 0
Index: 2, Value: 50
Index: 3, Value: 0
";
		assert_eq!(output(client), expected);
		task.await.expect("server task panicked");
		Ok(())
	}

	#[tokio::test(flavor = "current_thread")]
	async fn get_all_on_empty_store_prints_empty_response() -> std::io::Result<()> {
		let (mut client, task) = connected()?;
		let arrays = client.get_all_register_arrays().await.expect("empty list is a success");
		assert!(arrays.is_empty());
		assert_eq!(output(client), "[GET] Empty response\n");
		task.await.expect("server task panicked");
		Ok(())
	}

	#[tokio::test(flavor = "current_thread")]
	async fn delete_then_get_reports_not_found() -> std::io::Result<()> {
		let (mut client, task) = connected()?;
		client.create_register_array("x", 1).await.expect("create succeeds");
		client.delete_register_array("x").await.expect("delete succeeds");

		let err = client.get_register_array("x").await.unwrap_err();
		assert!(matches!(&err, ClientError::Remote(s) if s.code == ErrorCode::NotFound));
		assert!(err.is_remote());

		let err = client.delete_register_array("absent").await.unwrap_err();
		assert!(err.is_remote());

		assert_eq!(
			output(client),
			"[CREATE] OK\n[DELETE] OK\n[Error:5] [GET] Register x doesn't exist\n\
			 [Error:5] [DELETE] Register: absent doesn't exist\n"
		);
		task.await.expect("server task panicked");
		Ok(())
	}

	#[tokio::test(flavor = "current_thread")]
	async fn overwrite_keeps_size() -> std::io::Result<()> {
		let (mut client, task) = connected()?;
		client.create_register_array("t", 2).await.expect("create succeeds");
		client.write_value("t", 0, 1).await.expect("write succeeds");
		client.write_value("t", 0, 2).await.expect("write succeeds");
		assert_eq!(client.read_value("t", 0).await.expect("read succeeds"), 2);

		let arrays = client.get_all_register_arrays().await.expect("list succeeds");
		assert_eq!(arrays.len(), 1);
		assert_eq!(arrays[0].size, 1);
		drop(client);
		task.await.expect("server task panicked");
		Ok(())
	}

	#[tokio::test(flavor = "current_thread")]
	async fn closed_server_is_disconnected() -> std::io::Result<()> {
		let (client, server) = UnixStream::pair()?;
		drop(server);
		let mut client = RegisterClient::from_stream(client, Vec::new());
		let err = client.ping().await.unwrap_err();
		assert!(matches!(err, ClientError::Disconnected));
		assert_eq!(output(client), "");
		Ok(())
	}

	#[test]
	fn write_array_formats_items() {
		let mut out = Vec::new();
		write_array(
			&mut out,
			&RegisterArraySnapshot {
				name: "r".to_string(),
				capacity: 2,
				size: 1,
				items: vec![0, 9],
			},
		)
		.unwrap();
		assert_eq!(
			String::from_utf8(out).unwrap(),
			"r 2 1\nIndex: 0, Value: 0\nIndex: 1, Value: 9\n"
		);
	}
}
