#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "pytree", about = "Inspect and transform JSON-encoded pytrees")]
struct Cli {
	/// Log at debug level unless PYTREE_LOG says otherwise.
	#[arg(short, long, global = true)]
	verbose: bool,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// List leaves and the tree definition.
	Flatten(cmd::flatten::Args),
	/// Show the tree definition only.
	Structure(cmd::structure::Args),
	/// List leaves with their key paths.
	Paths(cmd::paths::Args),
	/// Select a subtree by key path.
	Get(cmd::get::Args),
	/// Compare the structures of two trees.
	Diff(cmd::diff::Args),
	/// Apply an affine map to numeric leaves.
	Map(cmd::map::Args),
	/// Transpose a list of same-shaped trees.
	Transpose(cmd::transpose::Args),
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> cmd::Result<()> {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	match cli.command {
		Commands::Flatten(args) => cmd::flatten::run(args),
		Commands::Structure(args) => cmd::structure::run(args),
		Commands::Paths(args) => cmd::paths::run(args),
		Commands::Get(args) => cmd::get::run(args),
		Commands::Diff(args) => cmd::diff::run(args),
		Commands::Map(args) => cmd::map::run(args),
		Commands::Transpose(args) => cmd::transpose::run(args),
	}
}

fn init_tracing(verbose: bool) {
	let default = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_env("PYTREE_LOG").unwrap_or_else(|_| EnvFilter::new(default));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.with_writer(std::io::stderr)
		.try_init();
}
