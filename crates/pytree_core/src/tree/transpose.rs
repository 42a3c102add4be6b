use crate::tree::{Registry, Result, TreeDef, TreeError, Value, global};

impl Registry {
	/// Turn a sequence of same-shaped trees into one tree of lists.
	///
	/// Each leaf position of the result holds a [`Value::List`] with the
	/// matching leaves of `trees`, in order.
	pub fn transpose(&self, trees: &[Value]) -> Result<Value> {
		if trees.is_empty() {
			return Err(TreeError::EmptyInput { op: "transpose" });
		}

		let refs: Vec<&Value> = trees.iter().collect();
		self.map_multi(&refs, |column| Value::List(column.to_vec()))
	}

	/// Swap the outer and inner levels of `tree`.
	///
	/// `tree` must have structure `outer.compose(inner)`; the result has
	/// structure `inner.compose(outer)`.
	pub fn transpose_with(&self, outer: &TreeDef, inner: &TreeDef, tree: &Value) -> Result<Value> {
		let (leaves, actual) = self.flatten(tree)?;
		outer.compose(inner).ensure_same(&actual)?;

		let outer_len = outer.num_leaves();
		let inner_len = inner.num_leaves();
		let mut cells: Vec<Option<Value>> = leaves.into_iter().map(Some).collect();

		let mut inner_leaves = Vec::with_capacity(inner_len);
		for inner_idx in 0..inner_len {
			let mut column = Vec::with_capacity(outer_len);
			for outer_idx in 0..outer_len {
				let cell = cells.get_mut(outer_idx * inner_len + inner_idx).and_then(Option::take);
				column.push(cell.ok_or(TreeError::LeafCountMismatch {
					expected: outer_len * inner_len,
					got: outer_idx * inner_len + inner_idx,
				})?);
			}
			inner_leaves.push(self.unflatten(outer, column)?);
		}

		self.unflatten(inner, inner_leaves)
	}
}

/// Transpose a sequence of same-shaped trees using the process-wide registry.
pub fn transpose(trees: &[Value]) -> Result<Value> {
	global().transpose(trees)
}

/// Swap outer and inner tree levels using the process-wide registry.
pub fn transpose_with(outer: &TreeDef, inner: &TreeDef, tree: &Value) -> Result<Value> {
	global().transpose_with(outer, inner, tree)
}
