/// JSON encoding of tree values.
pub mod codec;
/// Structure comparison command.
pub mod diff;
/// CLI error type.
pub mod error;
/// Leaf and tree definition listing command.
pub mod flatten;
/// Single-subtree lookup command.
pub mod get;
/// Numeric leaf transform command.
pub mod map;
/// Leaf path listing command.
pub mod paths;
/// Tree definition summary command.
pub mod structure;
/// Tree-of-trees transpose command.
pub mod transpose;

#[cfg(test)]
pub(crate) mod test_support;
pub(crate) mod util;

pub use error::{CliError, Result};
