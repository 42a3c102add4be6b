use std::path::PathBuf;

use pytree::tree;

use crate::cmd::Result;
use crate::cmd::util::{emit_json, read_tree};

#[derive(clap::Args)]
pub struct Args {
	pub expected: PathBuf,
	pub actual: PathBuf,
	/// Exit with an error when the structures differ.
	#[arg(long)]
	pub check: bool,
	#[arg(long)]
	pub json: bool,
}

/// Compare the structures of two tree files and report the first divergent node.
pub fn run(args: Args) -> Result<()> {
	let Args {
		expected,
		actual,
		check,
		json,
	} = args;

	let expected_def = tree::structure(&read_tree(&expected)?)?;
	let actual_def = tree::structure(&read_tree(&actual)?)?;

	if check {
		expected_def.ensure_same(&actual_def)?;
	}
	let divergence = expected_def.diff(&actual_def);

	if json {
		return emit_json(&DiffJson {
			expected: expected.display().to_string(),
			actual: actual.display().to_string(),
			same: divergence.is_none(),
			divergence: divergence.map(|item| DivergenceJson {
				path: item.path.to_string(),
				expected: item.expected,
				got: item.got,
			}),
		});
	}

	match divergence {
		None => println!("same structure ({} leaves)", expected_def.num_leaves()),
		Some(item) => {
			println!("differs at root{}", item.path);
			println!("expected: {}", item.expected);
			println!("got: {}", item.got);
		}
	}
	Ok(())
}

#[derive(serde::Serialize)]
struct DiffJson {
	expected: String,
	actual: String,
	same: bool,
	divergence: Option<DivergenceJson>,
}

#[derive(serde::Serialize)]
struct DivergenceJson {
	path: String,
	expected: String,
	got: String,
}
