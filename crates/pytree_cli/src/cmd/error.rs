use std::path::PathBuf;

use pytree::tree::TreeError;
use thiserror::Error;

/// CLI result type.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors produced while reading tree files and running subcommands.
#[derive(Debug, Error)]
pub enum CliError {
	/// Input file could not be read.
	#[error("io: {}: {source}", path.display())]
	Io {
		/// File being read.
		path: PathBuf,
		/// Underlying failure.
		source: std::io::Error,
	},
	/// Input file is not valid JSON.
	#[error("invalid json in {}: {source}", path.display())]
	Json {
		/// File being parsed.
		path: PathBuf,
		/// Parser error with line and column.
		source: serde_json::Error,
	},
	/// JSON is valid but does not follow the tagged tree encoding.
	#[error("invalid tree encoding at {at}: {reason}")]
	Encoding {
		/// JSON pointer to the offending value.
		at: String,
		/// What was wrong with it.
		reason: String,
	},
	/// A subcommand was given arguments it cannot use.
	#[error("invalid arguments: {reason}")]
	InvalidArgs {
		/// Human-readable description.
		reason: String,
	},
	/// Output serialization failed.
	#[error("output: {0}")]
	Output(#[from] serde_json::Error),
	/// Tree operation failed.
	#[error(transparent)]
	Tree(#[from] TreeError),
}
