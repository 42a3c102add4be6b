#![allow(missing_docs)]

use std::process::{Command, Output};

use pytree_testkit::fixture_path;
use serde_json::{Value, json};

#[test]
fn structure_json_reports_counts_and_layout() {
	let json = run_json(&["structure", &fixture("params.json"), "--json"]);

	assert_eq!(json["num_leaves"], 10);
	assert_eq!(json["num_nodes"], 20);
	assert_eq!(json["structure"]["children"][1]["node"], "record");
	assert_eq!(json["structure"]["children"][1]["type"], "Adam");
	assert_eq!(json["structure"]["children"][1]["fields"], json!(["lr", "betas"]));
}

#[test]
fn paths_json_addresses_every_leaf() {
	let json = run_json(&["paths", &fixture("params.json"), "--json"]);
	let paths: Vec<&str> = json["leaves"]
		.as_array()
		.expect("leaves array")
		.iter()
		.filter_map(|item| item["path"].as_str())
		.collect();

	assert_eq!(paths.len(), 10);
	assert_eq!(paths[0], "['layers'][0]['b']");
	assert_eq!(paths[1], "['layers'][0]['w'][0]");
	assert_eq!(paths[7], "['opt'].betas[0]");
	assert_eq!(paths[9], "['step'][0]");
}

#[test]
fn printed_paths_select_their_leaves() {
	for name in ["params.json", "awkward_keys.json"] {
		let json = run_json(&["paths", &fixture(name), "--json"]);
		for item in json["leaves"].as_array().expect("leaves array") {
			let path = item["path"].as_str().expect("path string");
			let selected = run_json(&["get", &fixture(name), "--path", path, "--json"]);
			assert_eq!(selected["value"], item["value"], "{name} path {path}");
			assert_eq!(selected["structure"], "*");
		}
	}
}

#[test]
fn awkward_keys_are_quoted_in_paths() {
	let json = run_json(&["paths", &fixture("awkward_keys.json"), "--json"]);
	let paths: Vec<&str> = json["leaves"]
		.as_array()
		.expect("leaves array")
		.iter()
		.filter_map(|item| item["path"].as_str())
		.collect();

	assert_eq!(paths, ["['a]b']", "['cfg'].'my-field'", "['cfg'].ok", "['it\\'s'][0]", "['it\\'s'][1]"]);
}

#[test]
fn get_json_returns_subtrees_in_tagged_encoding() {
	let json = run_json(&["get", &fixture("params.json"), "--path", "['opt'].betas", "--json"]);

	assert_eq!(json["value"], json!({ "$tuple": [0.9, 0.999] }));
	assert_eq!(json["structure"], json!({ "node": "tuple", "children": ["*", "*"] }));
}

#[test]
fn get_reports_the_failing_step() {
	let output = run(&["get", &fixture("params.json"), "--path", "['layers'][5].w"]);
	assert_eq!(output.status.code(), Some(1));
	assert_eq!(
		String::from_utf8_lossy(&output.stderr).trim_end(),
		"error: key path not found: ['layers'][5].w (failed at step 1)"
	);
}

#[test]
fn malformed_path_is_rejected() {
	let output = run(&["get", &fixture("params.json"), "--path", "['layers'"]);
	assert_eq!(output.status.code(), Some(1));
	assert!(String::from_utf8_lossy(&output.stderr).starts_with("error: invalid key path: ['layers'"));
}

#[test]
fn missing_file_is_an_io_error() {
	let output = run(&["structure", &fixture("does_not_exist.json")]);
	assert_eq!(output.status.code(), Some(1));
	assert!(String::from_utf8_lossy(&output.stderr).starts_with("error: io: "));
}

fn run_json(args: &[&str]) -> Value {
	let output = run(args);

	assert!(output.status.success(), "command should succeed: {}", String::from_utf8_lossy(&output.stderr));
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

fn run(args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_pytree")).args(args).output().expect("command executes")
}

fn fixture(name: &str) -> String {
	fixture_path(name).display().to_string()
}
