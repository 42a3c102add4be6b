//! Public library API for flattening, rebuilding, and mapping over nested container trees.

/// Tree values, structure descriptors, the node registry, and traversal helpers.
pub mod tree;
