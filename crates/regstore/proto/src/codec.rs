//! Length-prefixed postcard framing.

use std::io::{Error as IoError, ErrorKind};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::types::IpcFrame;

/// Largest accepted frame payload, in bytes.
pub const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

/// Read one frame from `input`.
///
/// Returns `Ok(None)` when the peer closed the stream cleanly before a new frame began.
///
/// # Errors
///
/// Returns an I/O error if the stream fails mid-frame, the length prefix exceeds
/// [`MAX_FRAME_LEN`], or the payload is not a valid [`IpcFrame`].
pub async fn read_frame(
	input: &mut (impl AsyncRead + Unpin),
) -> std::io::Result<Option<IpcFrame>> {
	let first = match input.read_u8().await {
		Ok(byte) => byte,
		Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
		Err(e) => return Err(e),
	};
	let mut rest = [0u8; 3];
	input.read_exact(&mut rest).await?;
	let len = u32::from_le_bytes([first, rest[0], rest[1], rest[2]]);

	if len > MAX_FRAME_LEN {
		return Err(IoError::new(
			ErrorKind::InvalidData,
			format!("frame of {len} bytes exceeds limit of {MAX_FRAME_LEN}"),
		));
	}

	let mut buf = vec![0u8; len as usize];
	input.read_exact(&mut buf).await?;
	postcard::from_bytes(&buf)
		.map(Some)
		.map_err(|e| IoError::new(ErrorKind::InvalidData, e.to_string()))
}

/// Encode `frame` with its length prefix.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidData`] if encoding fails or the payload exceeds
/// [`MAX_FRAME_LEN`].
pub fn encode_frame(frame: &IpcFrame) -> std::io::Result<Vec<u8>> {
	let mut buf = postcard::to_extend(frame, vec![0u8; 4])
		.map_err(|e| IoError::new(ErrorKind::InvalidData, e.to_string()))?;
	let payload_len = buf.len() - 4;
	let len = u32::try_from(payload_len)
		.ok()
		.filter(|len| *len <= MAX_FRAME_LEN)
		.ok_or_else(|| {
			IoError::new(
				ErrorKind::InvalidData,
				format!("frame of {payload_len} bytes exceeds limit of {MAX_FRAME_LEN}"),
			)
		})?;
	buf[..4].copy_from_slice(&len.to_le_bytes());
	Ok(buf)
}

/// Write one frame to `output` and flush it.
///
/// # Errors
///
/// Returns an I/O error if [`encode_frame`] fails or the stream rejects the write.
pub async fn write_frame(
	output: &mut (impl AsyncWrite + Unpin),
	frame: &IpcFrame,
) -> std::io::Result<()> {
	let buf = encode_frame(frame)?;
	output.write_all(&buf).await?;
	output.flush().await
}
