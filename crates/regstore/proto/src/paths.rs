//! Utilities for regstore file paths and socket resolution.

use std::path::PathBuf;

/// Environment variable overriding the default socket location.
pub const SOCKET_ENV: &str = "REGSTORE_SOCKET";

/// File name of the daemon socket inside the runtime directory.
pub const SOCKET_FILE_NAME: &str = "regstore.sock";

/// Returns the default socket path for the regstore daemon.
///
/// # Resolution Order
///
/// 1. `REGSTORE_SOCKET` environment variable.
/// 2. System runtime directory (e.g., `$XDG_RUNTIME_DIR`).
/// 3. System temp directory (e.g., `/tmp`).
#[must_use]
pub fn default_socket_path() -> PathBuf {
	if let Ok(p) = std::env::var(SOCKET_ENV) {
		return PathBuf::from(p);
	}

	dirs::runtime_dir()
		.filter(|p| std::fs::create_dir_all(p).is_ok())
		.unwrap_or_else(std::env::temp_dir)
		.join(SOCKET_FILE_NAME)
}
