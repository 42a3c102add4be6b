use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;

use pytree_testkit::fixture_path;

static PYTREE_BIN: OnceLock<PathBuf> = OnceLock::new();

pub(crate) fn fixture_arg(name: &str) -> String {
	fixture_path(name).to_string_lossy().into_owned()
}

pub(crate) fn run_pytree(args: &[&str]) -> Output {
	Command::new(pytree_bin()).args(args).output().expect("pytree command executes")
}

pub(crate) fn run_pytree_json(args: &[&str]) -> serde_json::Value {
	let output = run_pytree(args);
	assert!(
		output.status.success(),
		"pytree command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

/// Run a command expected to fail and return its stderr.
pub(crate) fn run_pytree_err(args: &[&str]) -> String {
	let output = run_pytree(args);
	assert_eq!(output.status.code(), Some(1), "expected exit status 1, stdout: {}", String::from_utf8_lossy(&output.stdout));
	String::from_utf8_lossy(&output.stderr).into_owned()
}

fn pytree_bin() -> &'static PathBuf {
	PYTREE_BIN.get_or_init(resolve_pytree_bin)
}

/// Unit tests run from `target/<profile>/deps`; the binary sits one level up.
fn resolve_pytree_bin() -> PathBuf {
	let exe = std::env::current_exe().expect("test executable path");
	let profile_dir = exe.parent().and_then(Path::parent).expect("test executable lives under target/<profile>/deps");
	profile_dir.join(format!("pytree{}", std::env::consts::EXE_SUFFIX))
}
