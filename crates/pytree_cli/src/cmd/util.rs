use std::path::Path;

use pytree::tree::Value;

use crate::cmd::codec::value_from_json;
use crate::cmd::error::{CliError, Result};

/// Read and decode one JSON tree file.
pub(crate) fn read_tree(path: &Path) -> Result<Value> {
	let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
		path: path.to_owned(),
		source,
	})?;
	let json: serde_json::Value = serde_json::from_str(&text).map_err(|source| CliError::Json {
		path: path.to_owned(),
		source,
	})?;
	tracing::debug!(path = %path.display(), "read tree file");
	value_from_json(&json)
}

/// Print a pretty JSON payload on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(payload)?);
	Ok(())
}
