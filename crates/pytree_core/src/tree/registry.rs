use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::tree::{NodeType, Object, Result, TreeError, TypeTag, Value};

/// Custom flatten callback: object to `(children, aux data)`.
pub type FlattenFn = dyn Fn(&Object) -> Result<(Vec<Value>, Value)> + Send + Sync;

/// Custom unflatten callback: `(aux data, children)` to rebuilt value.
pub type UnflattenFn = dyn Fn(&Value, Vec<Value>) -> Result<Value> + Send + Sync;

/// Rust type that registers as a custom tree node.
///
/// `unflatten_node(aux, children)` must rebuild a value equivalent to the one
/// that produced `(children, aux)` through `flatten_node`.
pub trait TreeNode: Any + Send + Sync + Sized {
	/// Registry tag for this type.
	const TAG: &'static str;

	/// Split into ordered children and aux data.
	fn flatten_node(&self) -> (Vec<Value>, Value);

	/// Rebuild from aux data and ordered children.
	fn unflatten_node(aux: &Value, children: Vec<Value>) -> Result<Self>;
}

/// Flatten/unflatten pair registered for one node type.
#[derive(Clone)]
pub enum NodeEntry {
	/// Built-in container handled by the engine itself.
	Builtin,
	/// User callbacks.
	Custom {
		/// Object to children and aux data.
		flatten: Arc<FlattenFn>,
		/// Aux data and children to value.
		unflatten: Arc<UnflattenFn>,
	},
}

impl std::fmt::Debug for NodeEntry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Builtin => f.write_str("Builtin"),
			Self::Custom { .. } => f.write_str("Custom { .. }"),
		}
	}
}

/// Table of known container types.
///
/// Values whose node type has no entry are leaves.
#[derive(Debug, Clone, Default)]
pub struct Registry {
	entries: HashMap<NodeType, NodeEntry>,
}

const BUILTINS: [NodeType; 5] = [NodeType::None, NodeType::Tuple, NodeType::List, NodeType::Dict, NodeType::Record];

impl Registry {
	/// Registry with no entries; every value is a leaf.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Registry with the built-in `None`, tuple, list, dict, and record entries.
	pub fn with_builtins() -> Self {
		let entries = BUILTINS.into_iter().map(|node_type| (node_type, NodeEntry::Builtin)).collect();
		Self { entries }
	}

	/// Register flatten/unflatten callbacks for objects tagged `tag`.
	pub fn register_node<F, U>(&mut self, tag: impl Into<TypeTag>, flatten: F, unflatten: U) -> Result<()>
	where
		F: Fn(&Object) -> Result<(Vec<Value>, Value)> + Send + Sync + 'static,
		U: Fn(&Value, Vec<Value>) -> Result<Value> + Send + Sync + 'static,
	{
		let tag = tag.into();
		let node_type = NodeType::Custom(tag.clone());
		if self.entries.contains_key(&node_type) {
			return Err(TreeError::DuplicateRegistration { tag: tag.to_string() });
		}

		self.entries.insert(
			node_type,
			NodeEntry::Custom {
				flatten: Arc::new(flatten),
				unflatten: Arc::new(unflatten),
			},
		);
		tracing::debug!(%tag, "registered custom node type");
		Ok(())
	}

	/// Register `T` under [`TreeNode::TAG`].
	pub fn register_type<T: TreeNode>(&mut self) -> Result<()> {
		self.register_node(
			T::TAG,
			|object| {
				let node = object.downcast_ref::<T>().ok_or_else(|| TreeError::NodeTypeMismatch {
					expected: std::any::type_name::<T>(),
					got: object.tag().to_string(),
				})?;
				Ok(node.flatten_node())
			},
			|aux, children| Ok(Value::object(T::unflatten_node(aux, children)?)),
		)
	}

	/// Entry for `node_type`, if registered.
	pub fn entry(&self, node_type: &NodeType) -> Option<&NodeEntry> {
		self.entries.get(node_type)
	}

	/// Whether objects tagged `tag` decompose.
	pub fn is_registered(&self, tag: &str) -> bool {
		self.entries.contains_key(&NodeType::Custom(TypeTag::new(tag)))
	}

	/// Registered custom tags, sorted.
	pub fn custom_tags(&self) -> Vec<TypeTag> {
		let mut out: Vec<TypeTag> = self
			.entries
			.keys()
			.filter_map(|node_type| match node_type {
				NodeType::Custom(tag) => Some(tag.clone()),
				_ => None,
			})
			.collect();
		out.sort();
		out
	}

	/// Node type of `value` when the registry decomposes it, `None` for leaves.
	pub fn node_type_of(&self, value: &Value) -> Option<NodeType> {
		let node_type = match value {
			Value::None => NodeType::None,
			Value::Tuple(_) => NodeType::Tuple,
			Value::List(_) => NodeType::List,
			Value::Dict(_) => NodeType::Dict,
			Value::Record(_) => NodeType::Record,
			Value::Object(object) => NodeType::Custom(object.tag().clone()),
			_ => return None,
		};
		self.entries.contains_key(&node_type).then_some(node_type)
	}
}

static GLOBAL: LazyLock<RwLock<Arc<Registry>>> = LazyLock::new(|| RwLock::new(Arc::new(Registry::with_builtins())));

/// Snapshot of the process-wide registry.
///
/// Traversal runs against the snapshot without holding the lock, so
/// callbacks may themselves flatten or register.
pub fn global() -> Arc<Registry> {
	GLOBAL.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn update_global(f: impl FnOnce(&mut Registry) -> Result<()>) -> Result<()> {
	let mut guard = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
	f(Arc::make_mut(&mut guard))
}

/// Register callbacks for objects tagged `tag` in the process-wide registry.
pub fn register_node<F, U>(tag: impl Into<TypeTag>, flatten: F, unflatten: U) -> Result<()>
where
	F: Fn(&Object) -> Result<(Vec<Value>, Value)> + Send + Sync + 'static,
	U: Fn(&Value, Vec<Value>) -> Result<Value> + Send + Sync + 'static,
{
	update_global(|registry| registry.register_node(tag, flatten, unflatten))
}

/// Register `T` in the process-wide registry.
pub fn register_type<T: TreeNode>() -> Result<()> {
	update_global(|registry| registry.register_type::<T>())
}

/// Whether `tag` is registered in the process-wide registry.
pub fn is_registered(tag: &str) -> bool {
	global().is_registered(tag)
}
