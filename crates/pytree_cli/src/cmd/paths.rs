use std::path::PathBuf;

use pytree::tree;

use crate::cmd::Result;
use crate::cmd::codec::value_to_json;
use crate::cmd::util::{emit_json, read_tree};

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print every leaf together with the key path that reaches it.
pub fn run(args: Args) -> Result<()> {
	let Args { file, json } = args;

	let (leaves, _) = tree::flatten_with_path(&read_tree(&file)?)?;

	if json {
		let leaves = leaves
			.iter()
			.map(|(path, leaf)| PathLeafJson {
				path: path.to_string(),
				value: value_to_json(leaf),
			})
			.collect();
		return emit_json(&PathsJson {
			path: file.display().to_string(),
			leaves,
		});
	}

	for (path, leaf) in &leaves {
		println!("root{path}\t{leaf}");
	}
	Ok(())
}

#[derive(serde::Serialize)]
struct PathsJson {
	path: String,
	leaves: Vec<PathLeafJson>,
}

#[derive(serde::Serialize)]
struct PathLeafJson {
	path: String,
	value: serde_json::Value,
}
