use crate::tree::{FlattenOptions, KeyPath, Registry, Result, TreeError, Value, global};

impl Registry {
	/// Replace each leaf of `tree` with `f(leaf)`, keeping the structure.
	pub fn map(&self, tree: &Value, f: impl FnMut(Value) -> Value) -> Result<Value> {
		self.map_with(tree, &FlattenOptions::default(), f)
	}

	/// [`Registry::map`] with explicit flatten options.
	pub fn map_with(&self, tree: &Value, options: &FlattenOptions<'_>, f: impl FnMut(Value) -> Value) -> Result<Value> {
		let (leaves, treedef) = self.flatten_with(tree, options)?;
		self.unflatten(&treedef, leaves.into_iter().map(f))
	}

	/// [`Registry::map`] with a fallible leaf function. Stops at the first error.
	pub fn try_map(&self, tree: &Value, mut f: impl FnMut(Value) -> Result<Value>) -> Result<Value> {
		let (leaves, treedef) = self.flatten(tree)?;
		let mapped = leaves.into_iter().map(&mut f).collect::<Result<Vec<_>>>()?;
		self.unflatten(&treedef, mapped)
	}

	/// Replace each leaf with `f(path, leaf)`.
	pub fn map_with_path(&self, tree: &Value, mut f: impl FnMut(&KeyPath, Value) -> Value) -> Result<Value> {
		let (leaves, treedef) = self.flatten_with_path(tree)?;
		self.unflatten(&treedef, leaves.into_iter().map(|(path, leaf)| f(&path, leaf)))
	}

	/// Map `f` over the leaves of several trees with identical structure.
	///
	/// Leaf `i` of the result is `f(&[leaf_i of trees[0], leaf_i of trees[1], ..])`.
	/// Fails with [`TreeError::StructureMismatch`] at the first divergent node
	/// when any tree's structure differs from the first one.
	pub fn map_multi(&self, trees: &[&Value], mut f: impl FnMut(&[Value]) -> Value) -> Result<Value> {
		let Some((first, rest)) = trees.split_first() else {
			return Err(TreeError::EmptyInput { op: "map_multi" });
		};

		let (first_leaves, treedef) = self.flatten(first)?;
		let mut columns = Vec::with_capacity(rest.len());
		for tree in rest {
			let (leaves, other) = self.flatten(tree)?;
			treedef.ensure_same(&other)?;
			columns.push(leaves.into_iter());
		}

		let mut mapped = Vec::with_capacity(first_leaves.len());
		let mut args = Vec::with_capacity(trees.len());
		for leaf in first_leaves {
			args.clear();
			args.push(leaf);
			for column in &mut columns {
				let next = column.next().ok_or(TreeError::LeafCountMismatch {
					expected: treedef.num_leaves(),
					got: mapped.len(),
				})?;
				args.push(next);
			}
			mapped.push(f(&args));
		}

		self.unflatten(&treedef, mapped)
	}

	/// Fold leaves left to right in traversal order.
	pub fn reduce<A>(&self, tree: &Value, init: A, f: impl FnMut(A, Value) -> A) -> Result<A> {
		Ok(self.leaves(tree)?.into_iter().fold(init, f))
	}

	/// Whether `pred` holds for every leaf. True for trees without leaves.
	pub fn all_leaves(&self, tree: &Value, mut pred: impl FnMut(&Value) -> bool) -> Result<bool> {
		Ok(self.leaves(tree)?.iter().all(|leaf| pred(leaf)))
	}

	/// Whether `pred` holds for at least one leaf.
	pub fn any_leaf(&self, tree: &Value, mut pred: impl FnMut(&Value) -> bool) -> Result<bool> {
		Ok(self.leaves(tree)?.iter().any(|leaf| pred(leaf)))
	}
}

/// Map `f` over the leaves of `tree` using the process-wide registry.
pub fn map(tree: &Value, f: impl FnMut(Value) -> Value) -> Result<Value> {
	global().map(tree, f)
}

/// Fallible leaf map using the process-wide registry.
pub fn try_map(tree: &Value, f: impl FnMut(Value) -> Result<Value>) -> Result<Value> {
	global().try_map(tree, f)
}

/// Path-aware leaf map using the process-wide registry.
pub fn map_with_path(tree: &Value, f: impl FnMut(&KeyPath, Value) -> Value) -> Result<Value> {
	global().map_with_path(tree, f)
}

/// Multi-tree leaf map using the process-wide registry.
pub fn map_multi(trees: &[&Value], f: impl FnMut(&[Value]) -> Value) -> Result<Value> {
	global().map_multi(trees, f)
}

/// Left fold over leaves using the process-wide registry.
pub fn reduce<A>(tree: &Value, init: A, f: impl FnMut(A, Value) -> A) -> Result<A> {
	global().reduce(tree, init, f)
}

#[cfg(test)]
mod tests;
