use crate::tree::{Key, PathStep, Record, Registry, TreeError, Value};

fn add_one(value: Value) -> Value {
	match value {
		Value::Int(v) => Value::Int(v + 1),
		Value::Float(v) => Value::Float(v + 1.0),
		other => other,
	}
}

fn sum(values: &[Value]) -> Value {
	Value::Int(values.iter().filter_map(Value::as_i64).sum())
}

#[test]
fn map_keeps_structure_and_replaces_leaves() {
	let registry = Registry::with_builtins();
	let tree = Value::dict([("a", Value::list([Value::Int(1), Value::None])), ("b", Value::tuple([Value::Float(0.5)]))]);

	let out = registry.map(&tree, add_one).expect("map succeeds");
	assert_eq!(out, Value::dict([("a", Value::list([Value::Int(2), Value::None])), ("b", Value::tuple([Value::Float(1.5)]))]));
	assert_eq!(registry.structure(&out).expect("flatten succeeds"), registry.structure(&tree).expect("flatten succeeds"));
}

#[test]
fn map_visits_leaves_in_traversal_order() {
	let registry = Registry::with_builtins();
	let tree = Value::tuple([Value::Int(10), Value::list([Value::Int(20), Value::Int(30)])]);
	let mut seen = Vec::new();
	registry
		.map(&tree, |leaf| {
			seen.push(leaf.clone());
			leaf
		})
		.expect("map succeeds");
	assert_eq!(seen, vec![Value::Int(10), Value::Int(20), Value::Int(30)]);
}

#[test]
fn try_map_propagates_first_error() {
	let registry = Registry::with_builtins();
	let tree = Value::list([Value::Int(1), Value::str("x"), Value::Int(3)]);
	let err = registry
		.try_map(&tree, |leaf| leaf.as_i64().map(Value::Int).ok_or_else(|| TreeError::custom(format!("not an int: {leaf}"))))
		.expect_err("string leaf rejected");
	assert_eq!(err.to_string(), "not an int: 'x'");
}

#[test]
fn map_multi_combines_matching_leaves() {
	let registry = Registry::with_builtins();
	let a = Value::list([Value::Int(1), Value::tuple([Value::Int(2)])]);
	let b = Value::list([Value::Int(10), Value::tuple([Value::Int(20)])]);
	let c = Value::list([Value::Int(100), Value::tuple([Value::Int(200)])]);

	let out = registry.map_multi(&[&a, &b, &c], sum).expect("map succeeds");
	assert_eq!(out, Value::list([Value::Int(111), Value::tuple([Value::Int(222)])]));
}

#[test]
fn map_multi_rejects_different_shapes_without_truncating() {
	let registry = Registry::with_builtins();
	let a = Value::list([Value::Int(1), Value::Int(2), Value::Int(3)]);
	let b = Value::list([Value::Int(1), Value::Int(2)]);

	let mut calls = 0;
	let err = registry
		.map_multi(&[&a, &b], |args| {
			calls += 1;
			sum(args)
		})
		.expect_err("arity differs");
	assert!(matches!(err, TreeError::StructureMismatch { ref expected, ref got, .. } if expected == "list node with 3 children" && got == "list node with 2 children"));
	assert_eq!(calls, 0, "no partial mapping happens");
}

#[test]
fn map_multi_reports_nested_divergence_path() {
	let registry = Registry::with_builtins();
	let a = Value::dict([("w", Value::list([Value::Int(1)])), ("b", Value::Int(0))]);
	let b = Value::dict([("w", Value::tuple([Value::Int(1)])), ("b", Value::Int(0))]);

	let err = registry.map_multi(&[&a, &b], sum).expect_err("list differs from tuple");
	let TreeError::StructureMismatch { path, .. } = &err else {
		panic!("expected structure mismatch, got {err}");
	};
	assert_eq!(path.steps, vec![PathStep::Key(Key::from("w"))]);
	assert!(err.to_string().starts_with("structure mismatch at root['w']"));
}

#[test]
fn map_multi_needs_a_tree() {
	let err = Registry::with_builtins().map_multi(&[], sum).expect_err("no trees");
	assert!(matches!(err, TreeError::EmptyInput { op: "map_multi" }));
}

#[test]
fn map_with_path_sees_leaf_paths() {
	let registry = Registry::with_builtins();
	let tree = Value::from(Record::new("Layer").with("w", 1).with("b", 2));
	let out = registry.map_with_path(&tree, |path, _| Value::from(path.to_string())).expect("map succeeds");
	assert_eq!(out, Value::from(Record::new("Layer").with("w", ".w").with("b", ".b")));
}

#[test]
fn reduce_and_predicates_fold_over_leaves() {
	let registry = Registry::with_builtins();
	let tree = Value::list([Value::Int(1), Value::tuple([Value::Int(2), Value::Int(3)]), Value::None]);

	let total = registry.reduce(&tree, 0, |acc, leaf| acc + leaf.as_i64().unwrap_or(0)).expect("reduce succeeds");
	assert_eq!(total, 6);
	assert!(registry.all_leaves(&tree, |leaf| leaf.as_i64().is_some()).expect("flatten succeeds"));
	assert!(!registry.any_leaf(&tree, |leaf| leaf.as_i64() == Some(7)).expect("flatten succeeds"));
	assert!(registry.all_leaves(&Value::None, |_| false).expect("flatten succeeds"), "vacuously true without leaves");
}
