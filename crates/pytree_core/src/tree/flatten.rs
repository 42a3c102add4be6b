use std::sync::Arc;

use crate::tree::treedef::child_steps;
use crate::tree::{AuxData, KeyPath, NodeEntry, NodeType, Registry, Result, TreeDef, TreeError, Value, global};

/// Traversal behavior switches for flattening.
#[derive(Clone, Copy)]
pub struct FlattenOptions<'a> {
	/// Values for which this returns true are leaves, even registered containers.
	pub is_leaf: Option<&'a (dyn Fn(&Value) -> bool + Sync)>,
	/// Treat `None` as a leaf instead of a childless node.
	pub none_is_leaf: bool,
	/// Fail on objects whose tag is not registered instead of keeping them as leaves.
	pub strict_objects: bool,
	/// Maximum container nesting depth.
	pub max_depth: u32,
}

impl Default for FlattenOptions<'_> {
	fn default() -> Self {
		Self {
			is_leaf: None,
			none_is_leaf: false,
			strict_objects: false,
			max_depth: 512,
		}
	}
}

impl std::fmt::Debug for FlattenOptions<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FlattenOptions")
			.field("is_leaf", &self.is_leaf.map(|_| "<fn>"))
			.field("none_is_leaf", &self.none_is_leaf)
			.field("strict_objects", &self.strict_objects)
			.field("max_depth", &self.max_depth)
			.finish()
	}
}

/// One level of decomposition: a node's kind, aux data, and direct children.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedNode {
	/// Container kind.
	pub node_type: NodeType,
	/// Reconstruction metadata.
	pub aux: AuxData,
	/// Direct children in traversal order.
	pub children: Vec<Value>,
}

/// Leaf paired with the key path that reaches it.
pub type PathLeaf = (KeyPath, Value);

struct Walker<'r, 'o> {
	registry: &'r Registry,
	options: &'o FlattenOptions<'o>,
	path: Option<KeyPath>,
}

enum Children<'v> {
	Borrowed(Vec<&'v Value>),
	Owned(Vec<Value>),
}

impl Children<'_> {
	fn len(&self) -> usize {
		match self {
			Self::Borrowed(items) => items.len(),
			Self::Owned(items) => items.len(),
		}
	}
}

impl Walker<'_, '_> {
	fn walk(&mut self, value: &Value, depth: u32, out: &mut Vec<PathLeaf>) -> Result<TreeDef> {
		let Some(level) = self.split(value)? else {
			let path = self.path.clone().unwrap_or_default();
			out.push((path, value.clone()));
			return Ok(TreeDef::Leaf);
		};
		let (node_type, aux, children) = level;

		if depth >= self.options.max_depth {
			return Err(TreeError::DepthExceeded {
				max_depth: self.options.max_depth,
			});
		}

		let steps = match self.path {
			Some(_) => child_steps(&node_type, &aux, children.len()),
			None => Vec::new(),
		};

		let owned;
		let children: Vec<&Value> = match children {
			Children::Borrowed(items) => items,
			Children::Owned(items) => {
				owned = items;
				owned.iter().collect()
			}
		};

		let mut defs = Vec::with_capacity(children.len());
		for (idx, child) in children.into_iter().enumerate() {
			if let (Some(path), Some(step)) = (self.path.as_mut(), steps.get(idx)) {
				path.push(step.clone());
			}
			let def = self.walk(child, depth + 1, out);
			if let Some(path) = self.path.as_mut() {
				path.pop();
			}
			defs.push(def?);
		}

		Ok(TreeDef::node(node_type, aux, defs))
	}

	fn split<'v>(&self, value: &'v Value) -> Result<Option<(NodeType, AuxData, Children<'v>)>> {
		if self.options.is_leaf.is_some_and(|is_leaf| is_leaf(value)) {
			return Ok(None);
		}
		if matches!(value, Value::None) && self.options.none_is_leaf {
			return Ok(None);
		}

		let Some(node_type) = self.registry.node_type_of(value) else {
			if let Value::Object(object) = value {
				if self.options.strict_objects {
					return Err(TreeError::UnregisteredNode { tag: object.tag().to_string() });
				}
				tracing::debug!(tag = %object.tag(), "unregistered object flattened as a leaf");
			}
			return Ok(None);
		};

		split_node(self.registry, node_type, value).map(Some)
	}
}

fn split_node<'v>(registry: &Registry, node_type: NodeType, value: &'v Value) -> Result<(NodeType, AuxData, Children<'v>)> {
	let level = match value {
		Value::None => (AuxData::Empty, Children::Borrowed(Vec::new())),
		Value::Tuple(items) | Value::List(items) => (AuxData::Empty, Children::Borrowed(items.iter().collect())),
		Value::Dict(map) => (
			AuxData::Keys(map.keys().cloned().collect::<Arc<[_]>>()),
			Children::Borrowed(map.values().collect()),
		),
		Value::Record(record) => (
			AuxData::Record {
				type_name: record.type_name.clone(),
				fields: record.fields.iter().map(|field| field.name.clone()).collect::<Arc<[_]>>(),
			},
			Children::Borrowed(record.fields.iter().map(|field| &field.value).collect()),
		),
		Value::Object(object) => match registry.entry(&node_type) {
			Some(NodeEntry::Custom { flatten, .. }) => {
				let (children, aux) = flatten(object)?;
				(AuxData::Custom(aux), Children::Owned(children))
			}
			_ => return Err(TreeError::UnregisteredNode { tag: object.tag().to_string() }),
		},
		_ => (AuxData::Empty, Children::Borrowed(Vec::new())),
	};

	Ok((node_type, level.0, level.1))
}

impl Registry {
	/// Flatten `value` into leaves in pre-order and its tree definition.
	pub fn flatten(&self, value: &Value) -> Result<(Vec<Value>, TreeDef)> {
		self.flatten_with(value, &FlattenOptions::default())
	}

	/// [`Registry::flatten`] with explicit options.
	pub fn flatten_with(&self, value: &Value, options: &FlattenOptions<'_>) -> Result<(Vec<Value>, TreeDef)> {
		let mut walker = Walker {
			registry: self,
			options,
			path: None,
		};
		let mut out = Vec::new();
		let treedef = walker.walk(value, 0, &mut out)?;
		tracing::trace!(leaves = out.len(), nodes = treedef.num_nodes(), "flattened tree");
		Ok((out.into_iter().map(|(_, leaf)| leaf).collect(), treedef))
	}

	/// Flatten `value`, pairing each leaf with its key path.
	pub fn flatten_with_path(&self, value: &Value) -> Result<(Vec<PathLeaf>, TreeDef)> {
		self.flatten_with_path_opts(value, &FlattenOptions::default())
	}

	/// [`Registry::flatten_with_path`] with explicit options.
	pub fn flatten_with_path_opts(&self, value: &Value, options: &FlattenOptions<'_>) -> Result<(Vec<PathLeaf>, TreeDef)> {
		let mut walker = Walker {
			registry: self,
			options,
			path: Some(KeyPath::new()),
		};
		let mut out = Vec::new();
		let treedef = walker.walk(value, 0, &mut out)?;
		Ok((out, treedef))
	}

	/// Leaves of `value` in traversal order.
	pub fn leaves(&self, value: &Value) -> Result<Vec<Value>> {
		self.flatten(value).map(|(leaves, _)| leaves)
	}

	/// Tree definition of `value`.
	pub fn structure(&self, value: &Value) -> Result<TreeDef> {
		self.flatten(value).map(|(_, treedef)| treedef)
	}

	/// Decompose only the root of `value`; `None` when it is a leaf.
	pub fn flatten_one_level(&self, value: &Value) -> Result<Option<FlattenedNode>> {
		let Some(node_type) = self.node_type_of(value) else {
			return Ok(None);
		};

		let (node_type, aux, children) = split_node(self, node_type, value)?;
		let children = match children {
			Children::Borrowed(items) => items.into_iter().cloned().collect(),
			Children::Owned(items) => items,
		};
		Ok(Some(FlattenedNode { node_type, aux, children }))
	}
}

/// Flatten `value` with the process-wide registry.
pub fn flatten(value: &Value) -> Result<(Vec<Value>, TreeDef)> {
	global().flatten(value)
}

/// Flatten `value` with the process-wide registry and explicit options.
pub fn flatten_with(value: &Value, options: &FlattenOptions<'_>) -> Result<(Vec<Value>, TreeDef)> {
	global().flatten_with(value, options)
}

/// Flatten `value` with key paths using the process-wide registry.
pub fn flatten_with_path(value: &Value) -> Result<(Vec<PathLeaf>, TreeDef)> {
	global().flatten_with_path(value)
}

/// Leaves of `value` using the process-wide registry.
pub fn leaves(value: &Value) -> Result<Vec<Value>> {
	global().leaves(value)
}

/// Tree definition of `value` using the process-wide registry.
pub fn structure(value: &Value) -> Result<TreeDef> {
	global().structure(value)
}
