use std::path::PathBuf;

use pytree::tree::{self, FlattenOptions};

use crate::cmd::Result;
use crate::cmd::codec::{treedef_to_json, value_to_json};
use crate::cmd::util::{emit_json, read_tree};

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
	#[arg(long = "none-is-leaf")]
	pub none_is_leaf: bool,
	#[arg(long)]
	pub strict: bool,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
	#[arg(long)]
	pub json: bool,
}

/// Flatten one tree file and print its leaves and tree definition.
pub fn run(args: Args) -> Result<()> {
	let Args {
		file,
		none_is_leaf,
		strict,
		max_depth,
		json,
	} = args;

	let value = read_tree(&file)?;
	let mut options = FlattenOptions {
		none_is_leaf,
		strict_objects: strict,
		..FlattenOptions::default()
	};
	if let Some(max_depth) = max_depth {
		options.max_depth = max_depth;
	}

	let (leaves, treedef) = tree::flatten_with(&value, &options)?;

	if json {
		let payload = FlattenJson {
			path: file.display().to_string(),
			num_leaves: leaves.len(),
			treedef: treedef.to_string(),
			structure: treedef_to_json(&treedef),
			leaves: leaves.iter().map(value_to_json).collect(),
		};
		return emit_json(&payload);
	}

	println!("path: {}", file.display());
	println!("treedef: {treedef}");
	println!("leaves: {}", leaves.len());
	for (idx, leaf) in leaves.iter().enumerate() {
		println!("{idx}\t{leaf}");
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct FlattenJson {
	path: String,
	num_leaves: usize,
	treedef: String,
	structure: serde_json::Value,
	leaves: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests;
