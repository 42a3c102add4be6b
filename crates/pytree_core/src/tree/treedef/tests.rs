use std::sync::Arc;

use crate::tree::{AuxData, Key, NodeType, PathStep, Record, Registry, TreeDef, TreeError, Value};

fn structure(value: &Value) -> TreeDef {
	Registry::with_builtins().structure(value).expect("flatten succeeds")
}

#[test]
fn counts_leaves_and_nodes() {
	let def = structure(&Value::tuple([Value::Int(1), Value::tuple([Value::Int(2), Value::Int(3)]), Value::tuple([])]));
	assert_eq!(def.num_leaves(), 3);
	assert_eq!(def.num_nodes(), 6);
	assert_eq!(def.children().len(), 3);
	assert_eq!(def.node_type(), Some(&NodeType::Tuple));
	assert!(TreeDef::leaf().is_leaf());
	assert_eq!(TreeDef::leaf().num_leaves(), 1);
}

#[test]
fn display_renders_compact_structure() {
	let value = Value::dict([
		("a", Value::tuple([Value::Int(1)])),
		("b", Value::list([Value::None, Value::Int(2)])),
		("c", Value::from(Record::new("Point").with("x", 1).with("y", 2))),
	]);
	assert_eq!(structure(&value).to_string(), "{'a': (*,), 'b': [None, *], 'c': Point(x=*, y=*)}");
}

#[test]
fn equality_covers_type_aux_and_shape() {
	let list = structure(&Value::list([Value::Int(1), Value::Int(2)]));
	let tuple = structure(&Value::tuple([Value::Int(1), Value::Int(2)]));
	let other_leaves = structure(&Value::list([Value::str("x"), Value::Float(0.5)]));
	assert_ne!(list, tuple);
	assert_eq!(list, other_leaves, "leaf payloads do not affect structure");

	let keys_ab = structure(&Value::dict([("a", Value::Int(1)), ("b", Value::Int(2))]));
	let keys_ac = structure(&Value::dict([("a", Value::Int(1)), ("c", Value::Int(2))]));
	assert_ne!(keys_ab, keys_ac);
}

#[test]
fn diff_reports_first_divergent_path() {
	let expected = structure(&Value::dict([("a", Value::list([Value::Int(1), Value::Int(2)])), ("b", Value::Int(0))]));
	let actual = structure(&Value::dict([("a", Value::list([Value::Int(1)])), ("b", Value::list([]))]));

	let divergence = expected.diff(&actual).expect("structures differ");
	assert_eq!(divergence.path.steps, vec![PathStep::Key(Key::from("a"))]);
	assert_eq!(divergence.expected, "list node with 2 children");
	assert_eq!(divergence.got, "list node with 1 child");
	assert!(expected.diff(&expected.clone()).is_none());
}

#[test]
fn diff_distinguishes_leaf_from_empty_node() {
	let leaf = TreeDef::leaf();
	let none = structure(&Value::None);
	let divergence = leaf.diff(&none).expect("leaf differs from None");
	assert!(divergence.path.is_root());
	assert_eq!(divergence.expected, "leaf");
	assert_eq!(divergence.got, "None node with 0 children");
}

#[test]
fn ensure_same_returns_structure_mismatch() {
	let a = structure(&Value::list([Value::Int(1)]));
	let b = structure(&Value::tuple([Value::Int(1)]));
	let err = a.ensure_same(&b).expect_err("list differs from tuple");
	assert!(matches!(err, TreeError::StructureMismatch { .. }));
	assert_eq!(err.to_string(), "structure mismatch at root: expected list node with 1 child, got tuple node with 1 child");
}

#[test]
fn compose_replaces_each_leaf() {
	let outer = structure(&Value::list([Value::Int(0), Value::Int(0)]));
	let inner = structure(&Value::tuple([Value::Int(0), Value::None]));
	let composed = outer.compose(&inner);
	assert_eq!(composed.to_string(), "[(*, None), (*, None)]");
	assert_eq!(composed.num_leaves(), outer.num_leaves() * inner.num_leaves());
}

#[test]
fn child_steps_follow_node_kind() {
	let record = structure(&Value::from(Record::new("P").with("x", 1)));
	assert_eq!(record.child_steps(), vec![PathStep::Attr(Arc::from("x"))]);

	let custom = TreeDef::node(NodeType::Custom("box".into()), AuxData::Custom(Value::None), vec![TreeDef::leaf(), TreeDef::leaf()]);
	assert_eq!(custom.child_steps(), vec![PathStep::Flat(0), PathStep::Flat(1)]);
	assert_eq!(custom.to_string(), "CustomNode(box[None], [*, *])");
}
