use std::collections::BTreeMap;

use crate::tree::treedef::plural;
use crate::tree::{AuxData, Field, KeyPath, NodeDef, NodeEntry, NodeType, PathStep, Record, Registry, Result, TreeDef, TreeError, Value, global};

impl Registry {
	/// Rebuild a value from `treedef` and leaves in traversal order.
	pub fn unflatten(&self, treedef: &TreeDef, leaves: impl IntoIterator<Item = Value>) -> Result<Value> {
		let leaves: Vec<Value> = leaves.into_iter().collect();
		let expected = treedef.num_leaves();
		if leaves.len() != expected {
			return Err(TreeError::LeafCountMismatch { expected, got: leaves.len() });
		}

		let mut iter = leaves.into_iter();
		let mut path = KeyPath::new();
		let value = self.build(treedef, &mut iter, &mut path, expected)?;

		let rest = iter.len();
		if rest > 0 {
			return Err(TreeError::LeafCountMismatch {
				expected,
				got: expected + rest,
			});
		}

		Ok(value)
	}

	fn build(&self, treedef: &TreeDef, leaves: &mut std::vec::IntoIter<Value>, path: &mut KeyPath, expected: usize) -> Result<Value> {
		let TreeDef::Node(node) = treedef else {
			return leaves.next().ok_or(TreeError::LeafCountMismatch {
				expected,
				got: expected - leaves.len(),
			});
		};

		let steps = treedef.child_steps();
		let mut children = Vec::with_capacity(node.children().len());
		for (idx, child) in node.children().iter().enumerate() {
			path.push(steps.get(idx).cloned().unwrap_or(PathStep::Index(idx)));
			let value = self.build(child, leaves, path, expected);
			path.pop();
			children.push(value?);
		}

		self.rebuild_node(node, children, path)
	}

	fn rebuild_node(&self, node: &NodeDef, children: Vec<Value>, path: &KeyPath) -> Result<Value> {
		let node_type = node.node_type();
		let Some(entry) = self.entry(node_type) else {
			return Err(TreeError::UnregisteredNode { tag: node_type.to_string() });
		};

		let count = children.len();
		let mismatch = |expected: String| TreeError::StructureMismatch {
			path: path.clone(),
			expected,
			got: plural(count, "child", "children"),
		};

		match (node_type, node.aux(), entry) {
			(NodeType::None, _, _) if count == 0 => Ok(Value::None),
			(NodeType::None, _, _) => Err(mismatch("None with 0 children".to_owned())),
			(NodeType::Tuple, _, _) => Ok(Value::Tuple(children)),
			(NodeType::List, _, _) => Ok(Value::List(children)),
			(NodeType::Dict, AuxData::Keys(keys), _) if keys.len() == count && keys.windows(2).all(|pair| pair[0] < pair[1]) => {
				let map: BTreeMap<_, _> = keys.iter().cloned().zip(children).collect();
				Ok(Value::Dict(map))
			}
			(NodeType::Dict, AuxData::Keys(keys), _) if keys.len() == count => Err(mismatch("dict with sorted unique keys".to_owned())),
			(NodeType::Dict, AuxData::Keys(keys), _) => Err(mismatch(format!("dict with {}", plural(keys.len(), "key", "keys")))),
			(NodeType::Record, AuxData::Record { type_name, fields }, _) if fields.len() == count => Ok(Value::Record(Record {
				type_name: type_name.clone(),
				fields: fields
					.iter()
					.cloned()
					.zip(children)
					.map(|(name, value)| Field { name, value })
					.collect(),
			})),
			(NodeType::Record, AuxData::Record { type_name, fields }, _) => Err(mismatch(format!("{type_name} with {}", plural(fields.len(), "field", "fields")))),
			(NodeType::Custom(_), AuxData::Custom(aux), NodeEntry::Custom { unflatten, .. }) => unflatten(aux, children),
			(node_type, aux, _) => Err(TreeError::StructureMismatch {
				path: path.clone(),
				expected: format!("aux data matching {node_type}"),
				got: format!("aux {aux}"),
			}),
		}
	}
}

/// Rebuild a value from `treedef` and `leaves` using the process-wide registry.
pub fn unflatten(treedef: &TreeDef, leaves: impl IntoIterator<Item = Value>) -> Result<Value> {
	global().unflatten(treedef, leaves)
}
