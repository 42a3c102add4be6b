use crate::cmd::test_support::{fixture_arg, run_pytree, run_pytree_json};

#[test]
fn flatten_json_lists_leaves_in_key_order() {
	let json = run_pytree_json(&["flatten", &fixture_arg("params.json"), "--json"]);

	assert_eq!(json["num_leaves"], 10);
	assert_eq!(json["leaves"][0], 0.5, "layers[0].b sorts before layers[0].w");
	assert_eq!(json["leaves"].as_array().map(Vec::len), Some(10));
	assert_eq!(json["structure"]["node"], "dict");
	assert_eq!(json["structure"]["keys"], serde_json::json!(["layers", "opt", "step"]));
	assert!(
		json["treedef"].as_str().is_some_and(|item| item.ends_with("'step': (*, None)}")),
		"None stays a childless node: {}",
		json["treedef"]
	);
}

#[test]
fn none_is_leaf_flag_counts_none() {
	let json = run_pytree_json(&["flatten", &fixture_arg("params.json"), "--none-is-leaf", "--json"]);
	assert_eq!(json["num_leaves"], 11);
	assert_eq!(json["leaves"][10], serde_json::Value::Null);
}

#[test]
fn depth_limit_flag_is_enforced() {
	let output = run_pytree(&["flatten", &fixture_arg("params.json"), "--max-depth", "1"]);
	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.starts_with("error: tree depth exceeded (max=1)"), "unexpected stderr: {stderr}");
}

#[test]
fn text_output_prints_one_leaf_per_line() {
	let output = run_pytree(&["flatten", &fixture_arg("step_a.json")]);
	assert!(output.status.success());
	let stdout = String::from_utf8_lossy(&output.stdout);
	let lines: Vec<&str> = stdout.lines().collect();
	assert_eq!(lines[1], "treedef: {'obs': *, 't': *}");
	assert_eq!(lines[2], "leaves: 2");
	assert_eq!(&lines[3..], ["0\t3", "1\t1"]);
}
