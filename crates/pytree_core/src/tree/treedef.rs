use std::fmt;
use std::sync::Arc;

use crate::tree::{Key, KeyPath, PathStep, Result, TreeError, TypeTag, Value, global};

/// Container kind recorded at a tree definition node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeType {
	/// Absence marker.
	None,
	/// Tuple.
	Tuple,
	/// List.
	List,
	/// Dictionary.
	Dict,
	/// Named record.
	Record,
	/// User-registered container.
	Custom(TypeTag),
}

impl fmt::Display for NodeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::None => f.write_str("None"),
			Self::Tuple => f.write_str("tuple"),
			Self::List => f.write_str("list"),
			Self::Dict => f.write_str("dict"),
			Self::Record => f.write_str("record"),
			Self::Custom(tag) => write!(f, "{tag}"),
		}
	}
}

/// Non-child metadata needed to rebuild a container.
#[derive(Debug, Clone, PartialEq)]
pub enum AuxData {
	/// No metadata.
	Empty,
	/// Dictionary keys in child order.
	Keys(Arc<[Key]>),
	/// Record type name and field names in child order.
	Record {
		/// Record type name.
		type_name: Arc<str>,
		/// Field names.
		fields: Arc<[Arc<str>]>,
	},
	/// Metadata returned by a custom flatten callback.
	Custom(Value),
}

impl fmt::Display for AuxData {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Empty => f.write_str("-"),
			Self::Keys(keys) => {
				f.write_str("[")?;
				for (idx, key) in keys.iter().enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{key}")?;
				}
				f.write_str("]")
			}
			Self::Record { type_name, fields } => write!(f, "{type_name}({})", fields.join(", ")),
			Self::Custom(value) => write!(f, "{value}"),
		}
	}
}

/// Interior node of a [`TreeDef`].
#[derive(Debug)]
pub struct NodeDef {
	node_type: NodeType,
	aux: AuxData,
	children: Vec<TreeDef>,
	num_leaves: usize,
	num_nodes: usize,
}

impl NodeDef {
	/// Container kind.
	pub fn node_type(&self) -> &NodeType {
		&self.node_type
	}

	/// Reconstruction metadata.
	pub fn aux(&self) -> &AuxData {
		&self.aux
	}

	/// Child structures in traversal order.
	pub fn children(&self) -> &[TreeDef] {
		&self.children
	}
}

impl PartialEq for NodeDef {
	fn eq(&self, other: &Self) -> bool {
		self.num_leaves == other.num_leaves
			&& self.num_nodes == other.num_nodes
			&& self.node_type == other.node_type
			&& self.aux == other.aux
			&& self.children == other.children
	}
}

/// Structure of a tree with its leaves erased. Cheap to clone and share.
#[derive(Debug, Clone)]
pub enum TreeDef {
	/// One leaf position.
	Leaf,
	/// Container node.
	Node(Arc<NodeDef>),
}

impl PartialEq for TreeDef {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Leaf, Self::Leaf) => true,
			(Self::Node(a), Self::Node(b)) => Arc::ptr_eq(a, b) || a == b,
			_ => false,
		}
	}
}

/// First point where two tree definitions differ.
#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
	/// Path of the divergent node.
	pub path: KeyPath,
	/// Description of the expected node.
	pub expected: String,
	/// Description of the actual node.
	pub got: String,
}

impl From<Divergence> for TreeError {
	fn from(value: Divergence) -> Self {
		TreeError::StructureMismatch {
			path: value.path,
			expected: value.expected,
			got: value.got,
		}
	}
}

impl TreeDef {
	/// Single-leaf structure.
	pub const fn leaf() -> Self {
		Self::Leaf
	}

	/// Container structure over `children`.
	pub fn node(node_type: NodeType, aux: AuxData, children: Vec<TreeDef>) -> Self {
		let num_leaves = children.iter().map(TreeDef::num_leaves).sum();
		let num_nodes = 1 + children.iter().map(TreeDef::num_nodes).sum::<usize>();
		Self::Node(Arc::new(NodeDef {
			node_type,
			aux,
			children,
			num_leaves,
			num_nodes,
		}))
	}

	/// Tuple structure over `children`.
	pub fn tuple(children: Vec<TreeDef>) -> Self {
		Self::node(NodeType::Tuple, AuxData::Empty, children)
	}

	/// Whether this is a single leaf.
	pub fn is_leaf(&self) -> bool {
		matches!(self, Self::Leaf)
	}

	/// Number of leaf positions.
	pub fn num_leaves(&self) -> usize {
		match self {
			Self::Leaf => 1,
			Self::Node(node) => node.num_leaves,
		}
	}

	/// Number of positions, leaves and containers both.
	pub fn num_nodes(&self) -> usize {
		match self {
			Self::Leaf => 1,
			Self::Node(node) => node.num_nodes,
		}
	}

	/// Child structures; empty for a leaf.
	pub fn children(&self) -> &[TreeDef] {
		match self {
			Self::Leaf => &[],
			Self::Node(node) => &node.children,
		}
	}

	/// Container kind, or `None` for a leaf.
	pub fn node_type(&self) -> Option<&NodeType> {
		match self {
			Self::Leaf => None,
			Self::Node(node) => Some(&node.node_type),
		}
	}

	/// Reconstruction metadata, or `None` for a leaf.
	pub fn aux(&self) -> Option<&AuxData> {
		match self {
			Self::Leaf => None,
			Self::Node(node) => Some(&node.aux),
		}
	}

	/// Key path step leading to each child.
	pub fn child_steps(&self) -> Vec<PathStep> {
		let Self::Node(node) = self else {
			return Vec::new();
		};
		child_steps(&node.node_type, &node.aux, node.children.len())
	}

	/// Replace every leaf of `self` with `inner`.
	pub fn compose(&self, inner: &TreeDef) -> TreeDef {
		match self {
			Self::Leaf => inner.clone(),
			Self::Node(node) => Self::node(
				node.node_type.clone(),
				node.aux.clone(),
				node.children.iter().map(|child| child.compose(inner)).collect(),
			),
		}
	}

	/// Rebuild a value from `leaves` using the process-wide registry.
	pub fn unflatten(&self, leaves: impl IntoIterator<Item = Value>) -> Result<Value> {
		global().unflatten(self, leaves)
	}

	/// Locate the first node where `actual` differs from `self`.
	pub fn diff(&self, actual: &TreeDef) -> Option<Divergence> {
		let mut path = KeyPath::new();
		diff_at(self, actual, &mut path)
	}

	/// Fail with [`TreeError::StructureMismatch`] unless `actual` equals `self`.
	pub fn ensure_same(&self, actual: &TreeDef) -> Result<()> {
		match self.diff(actual) {
			Some(divergence) => {
				tracing::debug!(path = %divergence.path, expected = %divergence.expected, got = %divergence.got, "tree structures diverge");
				Err(divergence.into())
			}
			None => Ok(()),
		}
	}
}

pub(crate) fn child_steps(node_type: &NodeType, aux: &AuxData, len: usize) -> Vec<PathStep> {
	match (node_type, aux) {
		(NodeType::Dict, AuxData::Keys(keys)) => keys.iter().cloned().map(PathStep::Key).collect(),
		(NodeType::Record, AuxData::Record { fields, .. }) => fields.iter().cloned().map(PathStep::Attr).collect(),
		(NodeType::Custom(_), _) => (0..len).map(PathStep::Flat).collect(),
		_ => (0..len).map(PathStep::Index).collect(),
	}
}

fn describe(def: &TreeDef) -> String {
	match def {
		TreeDef::Leaf => "leaf".to_owned(),
		TreeDef::Node(node) => match &node.aux {
			AuxData::Empty => format!("{} node with {}", node.node_type, plural(node.children.len(), "child", "children")),
			aux => format!("{} node with {} (aux {aux})", node.node_type, plural(node.children.len(), "child", "children")),
		},
	}
}

pub(crate) fn plural(count: usize, one: &str, many: &str) -> String {
	if count == 1 { format!("{count} {one}") } else { format!("{count} {many}") }
}

fn diff_at(expected: &TreeDef, actual: &TreeDef, path: &mut KeyPath) -> Option<Divergence> {
	let (TreeDef::Node(exp), TreeDef::Node(act)) = (expected, actual) else {
		if expected.is_leaf() && actual.is_leaf() {
			return None;
		}
		return Some(divergence(expected, actual, path));
	};

	if Arc::ptr_eq(exp, act) {
		return None;
	}

	if exp.node_type != act.node_type || exp.aux != act.aux || exp.children.len() != act.children.len() {
		return Some(divergence(expected, actual, path));
	}

	let steps = child_steps(&exp.node_type, &exp.aux, exp.children.len());
	for ((exp_child, act_child), step) in exp.children.iter().zip(&act.children).zip(steps) {
		path.push(step);
		if let Some(found) = diff_at(exp_child, act_child, path) {
			return Some(found);
		}
		path.pop();
	}

	None
}

fn divergence(expected: &TreeDef, actual: &TreeDef, path: &KeyPath) -> Divergence {
	Divergence {
		path: path.clone(),
		expected: describe(expected),
		got: describe(actual),
	}
}

impl fmt::Display for TreeDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let Self::Node(node) = self else {
			return f.write_str("*");
		};

		match (&node.node_type, &node.aux) {
			(NodeType::None, _) => f.write_str("None"),
			(NodeType::Tuple, _) => {
				f.write_str("(")?;
				write_children(f, &node.children)?;
				if node.children.len() == 1 {
					f.write_str(",")?;
				}
				f.write_str(")")
			}
			(NodeType::Dict, AuxData::Keys(keys)) => {
				f.write_str("{")?;
				for (idx, (key, child)) in keys.iter().zip(&node.children).enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{key}: {child}")?;
				}
				f.write_str("}")
			}
			(NodeType::Record, AuxData::Record { type_name, fields }) => {
				write!(f, "{type_name}(")?;
				for (idx, (name, child)) in fields.iter().zip(&node.children).enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{name}={child}")?;
				}
				f.write_str(")")
			}
			(NodeType::Custom(tag), aux) => {
				write!(f, "CustomNode({tag}[{aux}], [")?;
				write_children(f, &node.children)?;
				f.write_str("])")
			}
			_ => {
				f.write_str("[")?;
				write_children(f, &node.children)?;
				f.write_str("]")
			}
		}
	}
}

fn write_children(f: &mut fmt::Formatter<'_>, children: &[TreeDef]) -> fmt::Result {
	for (idx, child) in children.iter().enumerate() {
		if idx > 0 {
			f.write_str(", ")?;
		}
		write!(f, "{child}")?;
	}
	Ok(())
}

#[cfg(test)]
mod tests;
