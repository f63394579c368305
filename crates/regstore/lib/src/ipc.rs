//! IPC server and client connection for the register store.

use std::future::poll_fn;
use std::path::Path;

use regstore_proto::{ErrorCode, ErrorStatus, IpcFrame, Response, encode_frame, read_frame};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;
use tower_service::Service;

use crate::service::StoreService;

/// Start the register store IPC server on a Unix domain socket.
///
/// Every accepted connection is served on its own task by a clone of `service`, so all
/// connections share the same store. Returns once `shutdown` is cancelled.
///
/// # Errors
///
/// Returns an error if the socket cannot be bound or if filesystem operations
/// on the socket path fail.
pub async fn serve(
	socket_path: impl AsRef<Path>,
	service: StoreService,
	shutdown: CancellationToken,
) -> std::io::Result<()> {
	let path = socket_path.as_ref();
	if path.exists() {
		tokio::fs::remove_file(path).await?;
	}

	let listener = UnixListener::bind(path)?;
	tracing::info!(path = %path.display(), "register store listening");

	loop {
		tokio::select! {
			_ = shutdown.cancelled() => {
				tracing::info!(arrays = service.store().len(), "register store shutting down");
				break;
			}
			res = listener.accept() => {
				match res {
					Ok((stream, _addr)) => {
						tokio::spawn(handle_connection(stream, service.clone(), shutdown.clone()));
					}
					Err(e) => {
						tracing::error!(error = %e, "failed to accept connection");
					}
				}
			}
		}
	}

	if let Err(e) = tokio::fs::remove_file(path).await {
		tracing::debug!(error = %e, "socket file already gone");
	}
	Ok(())
}

/// Handle a single client connection until it closes or `shutdown` fires.
pub(crate) async fn handle_connection(
	stream: UnixStream,
	service: StoreService,
	shutdown: CancellationToken,
) {
	tracing::info!("new client connection");

	let (reader, writer) = stream.into_split();
	let result = tokio::select! {
		res = run_connection(BufReader::new(reader), BufWriter::new(writer), service) => res,
		_ = shutdown.cancelled() => Ok(()),
	};

	if let Err(e) = result {
		tracing::error!(error = %e, "client connection error");
	}

	tracing::info!("client connection closed");
}

/// Request/response pump for one connection.
///
/// Each request frame yields exactly one response frame, in arrival order.
async fn run_connection(
	mut input: impl AsyncRead + Unpin,
	mut output: impl AsyncWrite + Unpin,
	mut service: StoreService,
) -> std::io::Result<()> {
	while let Some(frame) = read_frame(&mut input).await? {
		let response = match frame {
			IpcFrame::Request(req) => {
				let request_id = req.id;
				let result = match poll_fn(|cx| service.poll_ready(cx)).await {
					Ok(()) => service.call(req).await,
					Err(e) => Err(e),
				};
				match result {
					Ok(payload) => Response::ok(request_id, payload),
					Err(error) => Response::err(request_id, error),
				}
			}
			IpcFrame::Response(resp) => {
				tracing::warn!(request_id = resp.request_id.0, "client sent a response frame");
				Response::err(
					resp.request_id,
					ErrorStatus::new(ErrorCode::UnknownRequest, "expected a request frame"),
				)
			}
		};

		let buf = encode_response(response)?;
		let sent = async {
			output.write_all(&buf).await?;
			output.flush().await
		}
		.await;
		if let Err(e) = sent {
			if matches!(
				e.kind(),
				std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset
			) {
				tracing::debug!(error = %e, "client went away before response");
				return Ok(());
			}
			return Err(e);
		}
	}
	Ok(())
}

/// Encode `response`, replacing it with an `Internal` error when it cannot be framed.
fn encode_response(response: Response) -> std::io::Result<Vec<u8>> {
	let request_id = response.request_id;
	match encode_frame(&IpcFrame::Response(response)) {
		Ok(buf) => Ok(buf),
		Err(e) => {
			tracing::warn!(request_id = request_id.0, error = %e, "response dropped");
			let status = ErrorStatus::new(
				ErrorCode::Internal,
				format!("response could not be sent: {e}"),
			);
			encode_frame(&IpcFrame::Response(Response::err(request_id, status)))
		}
	}
}

/// Connect to the register store as a client.
///
/// # Errors
///
/// Returns an error if nothing is listening on `socket_path`.
pub async fn connect(socket_path: impl AsRef<Path>) -> std::io::Result<UnixStream> {
	UnixStream::connect(socket_path).await
}
