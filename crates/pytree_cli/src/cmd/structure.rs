use std::path::PathBuf;

use pytree::tree;

use crate::cmd::Result;
use crate::cmd::codec::treedef_to_json;
use crate::cmd::util::{emit_json, read_tree};

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print the tree definition of one tree file.
pub fn run(args: Args) -> Result<()> {
	let Args { file, json } = args;

	let treedef = tree::structure(&read_tree(&file)?)?;

	if json {
		return emit_json(&StructureJson {
			path: file.display().to_string(),
			treedef: treedef.to_string(),
			num_leaves: treedef.num_leaves(),
			num_nodes: treedef.num_nodes(),
			structure: treedef_to_json(&treedef),
		});
	}

	println!("{treedef}");
	println!("leaves: {}", treedef.num_leaves());
	println!("nodes: {}", treedef.num_nodes());
	Ok(())
}

#[derive(serde::Serialize)]
struct StructureJson {
	path: String,
	treedef: String,
	num_leaves: usize,
	num_nodes: usize,
	structure: serde_json::Value,
}
