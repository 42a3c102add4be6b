mod error;
mod flatten;
mod map;
mod path;
mod registry;
mod transpose;
mod treedef;
mod unflatten;
mod value;

/// Error and result aliases.
pub use error::{Result, TreeError};
/// Flatten entry points and options.
pub use flatten::{FlattenOptions, FlattenedNode, PathLeaf, flatten, flatten_with, flatten_with_path, leaves, structure};
/// Leaf-wise map, fold, and predicate helpers.
pub use map::{map, map_multi, map_with_path, reduce, try_map};
/// Key path types and subtree lookup.
pub use path::{KeyPath, PathStep, get};
/// Node registry, callback types, and process-wide registration.
pub use registry::{FlattenFn, NodeEntry, Registry, TreeNode, UnflattenFn, global, is_registered, register_node, register_type};
/// Tree level swapping.
pub use transpose::{transpose, transpose_with};
/// Tree definition types.
pub use treedef::{AuxData, Divergence, NodeDef, NodeType, TreeDef};
/// Rebuild entry point.
pub use unflatten::unflatten;
/// Dynamic tree value types.
pub use value::{Array, Field, Key, Object, Record, TypeTag, Value};
