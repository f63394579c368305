//! Server configuration.
//!
//! The daemon reads an optional TOML file:
//!
//! ```toml
//! socket = "/run/user/1000/regstore.sock"
//! log_filter = "regstore=debug,info"
//! max_capacity = 1048576
//! ```
//!
//! Lookup order for the file is an explicit `--config` path, then
//! `$XDG_CONFIG_HOME/regstore/config.toml`; a missing default file yields defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::service::Limits;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or an unknown key.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Parsed daemon configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
	/// Socket path to bind.
	pub socket: Option<PathBuf>,
	/// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
	pub log_filter: Option<String>,
	/// Largest capacity accepted by `CreateArray`; clamped to
	/// [`CAPACITY_CEILING`](crate::service::CAPACITY_CEILING).
	pub max_capacity: Option<u32>,
}

impl ServerConfig {
	/// Parse configuration from a TOML string.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys.
	pub fn parse(input: &str) -> Result<Self> {
		Ok(toml::from_str(input)?)
	}

	/// Load configuration from `path`.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::Io`] if the file cannot be read, or
	/// [`ConfigError::Parse`] if it is invalid.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::parse(&input)
	}

	/// Load from `explicit` if given, else from the default location if that file exists.
	///
	/// # Errors
	///
	/// Propagates errors from [`ServerConfig::load`]. A missing default file is not
	/// an error.
	pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
		if let Some(path) = explicit {
			return Self::load(path);
		}
		match default_config_path() {
			Some(path) if path.is_file() => Self::load(path),
			_ => Ok(Self::default()),
		}
	}

	/// Socket to bind: `cli` override, then this config, then the protocol default.
	#[must_use]
	pub fn socket_path(&self, cli: Option<PathBuf>) -> PathBuf {
		cli.or_else(|| self.socket.clone())
			.unwrap_or_else(regstore_proto::paths::default_socket_path)
	}

	/// Request limits derived from this config.
	#[must_use]
	pub fn limits(&self) -> Limits {
		self.max_capacity
			.map_or_else(Limits::default, Limits::with_max_capacity)
	}
}

/// `$XDG_CONFIG_HOME/regstore/config.toml`, when a config directory is known.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("regstore").join("config.toml"))
}
