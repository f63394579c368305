//! Register store daemon.
//!
//! Owns a single in-memory [`RegisterStore`] for its whole lifetime and serves it to
//! clients over a Unix domain socket. State is lost on exit.

use std::path::PathBuf;

use clap::Parser;
use regstore::config::ServerConfig;
use regstore::core::RegisterStore;
use regstore::service::StoreService;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Daemon command line arguments.
#[derive(Parser, Debug)]
#[command(name = "regstore-server")]
#[command(about = "In-memory register array store")]
struct Args {
	/// Socket path for IPC
	#[arg(short, long, value_name = "PATH")]
	socket: Option<PathBuf>,

	/// Configuration file (TOML)
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();
	let config = ServerConfig::resolve(args.config.as_deref())?;

	setup_tracing(args.verbose, config.log_filter.as_deref());

	info!("starting regstore-server");

	let socket_path = config.socket_path(args.socket);
	if let Some(parent) = socket_path.parent()
		&& !parent.exists()
	{
		std::fs::create_dir_all(parent)?;
	}

	info!(socket = %socket_path.display(), "IPC socket path");

	let shutdown = CancellationToken::new();
	let signal_token = shutdown.clone();
	tokio::spawn(async move {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "failed to listen for ctrl-c");
			return;
		}
		info!("interrupt received");
		signal_token.cancel();
	});

	let service = StoreService::new(RegisterStore::new(), config.limits());
	regstore::ipc::serve(&socket_path, service, shutdown).await?;

	Ok(())
}

fn setup_tracing(verbose: bool, configured: Option<&str>) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::fmt::format::FmtSpan;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| match configured {
			Some(directive) => EnvFilter::new(directive),
			None if verbose => EnvFilter::new("regstore=trace,debug"),
			None => EnvFilter::new("regstore=debug,info"),
		})
	};

	if let Some(log_dir) = std::env::var("REGSTORE_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let pid = std::process::id();
		let log_path = log_dir.join(format!("regstore-server.{pid}.log"));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_span_events(FmtSpan::CLOSE)
				.with_target(true);

			tracing_subscriber::registry()
				.with(filter())
				.with(file_layer)
				.init();

			tracing::info!(path = ?log_path, "tracing initialized");
			return;
		}
	}

	// Fallback to stderr-only logging
	let fallback = match configured {
		Some(_) => filter(),
		None => EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			EnvFilter::new(if verbose { "debug" } else { "info" })
		}),
	};
	tracing_subscriber::fmt()
		.with_env_filter(fallback)
		.with_writer(std::io::stderr)
		.init();
}
