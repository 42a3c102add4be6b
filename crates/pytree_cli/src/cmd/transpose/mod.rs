use std::path::PathBuf;

use pytree::tree::{self, Value};

use crate::cmd::Result;
use crate::cmd::codec::value_to_json;
use crate::cmd::util::{emit_json, read_tree};

#[derive(clap::Args)]
pub struct Args {
	/// Tree files sharing one structure.
	#[arg(required = true)]
	pub files: Vec<PathBuf>,
	#[arg(long)]
	pub json: bool,
}

/// Turn a list of same-shaped trees into one tree of lists.
pub fn run(args: Args) -> Result<()> {
	let Args { files, json } = args;

	let trees = files.iter().map(|file| read_tree(file)).collect::<Result<Vec<Value>>>()?;
	let value = tree::transpose(&trees)?;

	if json {
		return emit_json(&TransposeJson {
			inputs: files.iter().map(|file| file.display().to_string()).collect(),
			value: value_to_json(&value),
		});
	}

	println!("{value}");
	Ok(())
}

#[derive(serde::Serialize)]
struct TransposeJson {
	inputs: Vec<String>,
	value: serde_json::Value,
}
