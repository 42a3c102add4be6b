use thiserror::Error;

use crate::tree::KeyPath;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors produced while flattening, rebuilding, and mapping trees.
#[derive(Debug, Error)]
pub enum TreeError {
	/// Two structures differ, or a node's children do not fit its aux data.
	#[error("structure mismatch at root{path}: expected {expected}, got {got}")]
	StructureMismatch {
		/// Key path of the first divergent node.
		path: KeyPath,
		/// Expected node description.
		expected: String,
		/// Actual node description.
		got: String,
	},
	/// Leaf sequence length disagrees with the tree definition.
	#[error("leaf count mismatch: tree definition expects {expected} leaves, got {got}")]
	LeafCountMismatch {
		/// Leaf count recorded in the tree definition.
		expected: usize,
		/// Number of leaves supplied.
		got: usize,
	},
	/// Custom node tag has no registry entry.
	#[error("unregistered custom node type: {tag}")]
	UnregisteredNode {
		/// Offending type tag.
		tag: String,
	},
	/// Custom node tag was registered twice.
	#[error("duplicate custom node registration: {tag}")]
	DuplicateRegistration {
		/// Offending type tag.
		tag: String,
	},
	/// Traversal nesting exceeded the configured limit.
	#[error("tree depth exceeded (max={max_depth})")]
	DepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Operation needs at least one input tree.
	#[error("{op} needs at least one tree")]
	EmptyInput {
		/// Operation name.
		op: &'static str,
	},
	/// Key path expression syntax is invalid.
	#[error("invalid key path: {path}")]
	InvalidKeyPath {
		/// Original user-provided path string.
		path: String,
	},
	/// Key path does not address a node of the tree.
	#[error("key path not found: {path} (failed at step {step})")]
	PathNotFound {
		/// Full requested path.
		path: String,
		/// Zero-based index of the step that did not apply.
		step: usize,
	},
	/// Custom node payload had an unexpected Rust type.
	#[error("node type mismatch: expected {expected}, got {got}")]
	NodeTypeMismatch {
		/// Expected Rust type name.
		expected: &'static str,
		/// Tag of the object that was supplied.
		got: String,
	},
	/// Array shape does not match its data length.
	#[error("array shape {shape:?} does not match data length {len}")]
	InvalidArrayShape {
		/// Declared shape.
		shape: Vec<usize>,
		/// Number of data elements.
		len: usize,
	},
	/// Error raised by a user flatten or unflatten callback.
	#[error("{0}")]
	Custom(String),
}

impl TreeError {
	/// Build a [`TreeError::Custom`] from any displayable message.
	pub fn custom(message: impl std::fmt::Display) -> Self {
		Self::Custom(message.to_string())
	}
}
