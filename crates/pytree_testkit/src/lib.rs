//! Fixture access for workspace tests.

use std::path::{Path, PathBuf};

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	let workspace = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
	workspace.canonicalize().unwrap_or(workspace).join("fixtures").join(name)
}

/// Read and parse a JSON fixture.
///
/// Panics when the fixture is missing or malformed; fixtures are checked in.
pub fn fixture_json(name: &str) -> serde_json::Value {
	let path = fixture_path(name);
	let text = std::fs::read_to_string(&path).unwrap_or_else(|err| panic!("fixture {} is readable: {err}", path.display()));
	serde_json::from_str(&text).unwrap_or_else(|err| panic!("fixture {} is valid json: {err}", path.display()))
}
