//! Command line client for the register store daemon.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use regstore::client::{ClientError, RegisterClient, sample_session};

/// Client command line arguments.
#[derive(Parser, Debug)]
#[command(name = "regstore-cli")]
#[command(about = "Create, inspect, read and write register arrays")]
struct Args {
	/// Socket path of the running daemon
	#[arg(short, long, value_name = "PATH")]
	socket: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Check that the daemon answers
	Ping,
	/// Create a zeroed register array
	Create {
		/// Array name
		name: String,
		/// Number of slots
		capacity: u32,
	},
	/// Delete a register array
	Delete {
		/// Array name
		name: String,
	},
	/// Print one register array
	Get {
		/// Array name
		name: String,
	},
	/// Print every register array
	List,
	/// Read one slot
	Read {
		/// Array name
		name: String,
		/// Slot index
		index: u32,
	},
	/// Write one slot
	Write {
		/// Array name
		name: String,
		/// Slot index
		index: u32,
		/// Value to store
		value: u32,
	},
	/// Run the reference session against the daemon
	Demo,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	let args = Args::parse();
	let socket_path = args
		.socket
		.unwrap_or_else(regstore::proto::paths::default_socket_path);

	let mut client = match RegisterClient::connect(&socket_path, std::io::stdout()).await {
		Ok(client) => client,
		Err(e) => {
			eprintln!(
				"failed to connect to register store at {}: {e}",
				socket_path.display()
			);
			return ExitCode::FAILURE;
		}
	};

	match run(&mut client, args.command).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(ClientError::Remote(_)) => ExitCode::FAILURE,
		Err(e) => {
			eprintln!("{e}");
			ExitCode::FAILURE
		}
	}
}

async fn run(
	client: &mut RegisterClient<std::io::Stdout>,
	command: Command,
) -> Result<(), ClientError> {
	match command {
		Command::Ping => client.ping().await,
		Command::Create { name, capacity } => client.create_register_array(&name, capacity).await,
		Command::Delete { name } => client.delete_register_array(&name).await,
		Command::Get { name } => client.get_register_array(&name).await.map(drop),
		Command::List => client.get_all_register_arrays().await.map(drop),
		Command::Read { name, index } => client.read_value(&name, index).await.map(drop),
		Command::Write { name, index, value } => client.write_value(&name, index, value).await,
		Command::Demo => sample_session(client).await,
	}
}
