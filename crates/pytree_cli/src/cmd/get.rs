use std::path::PathBuf;

use pytree::tree::{self, KeyPath};

use crate::cmd::Result;
use crate::cmd::codec::{treedef_to_json, value_to_json};
use crate::cmd::util::{emit_json, read_tree};

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
	/// Key path such as `['layers'][0].w`; empty selects the whole tree.
	#[arg(long = "path", default_value = "")]
	pub path_expr: String,
	#[arg(long)]
	pub json: bool,
}

/// Select one subtree by key path.
pub fn run(args: Args) -> Result<()> {
	let Args { file, path_expr, json } = args;

	let key_path = KeyPath::parse(&path_expr)?;
	let value = tree::get(&read_tree(&file)?, &key_path)?;

	if json {
		let treedef = tree::structure(&value)?;
		return emit_json(&GetJson {
			path: file.display().to_string(),
			path_expr: key_path.to_string(),
			value: value_to_json(&value),
			structure: treedef_to_json(&treedef),
		});
	}

	println!("{value}");
	Ok(())
}

#[derive(serde::Serialize)]
struct GetJson {
	path: String,
	path_expr: String,
	value: serde_json::Value,
	structure: serde_json::Value,
}
