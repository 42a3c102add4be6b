use std::path::PathBuf;

use pytree::tree::{self, Value};

use crate::cmd::codec::value_to_json;
use crate::cmd::util::{emit_json, read_tree};
use crate::cmd::{CliError, Result};

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
	/// Offset added to every numeric leaf, after `--mul`.
	#[arg(long, allow_negative_numbers = true)]
	pub add: Option<f64>,
	/// Factor applied to every numeric leaf.
	#[arg(long, allow_negative_numbers = true)]
	pub mul: Option<f64>,
	#[arg(long)]
	pub json: bool,
}

/// Apply `leaf * mul + add` to every numeric leaf, keeping the tree structure.
pub fn run(args: Args) -> Result<()> {
	let Args { file, add, mul, json } = args;

	if add.is_none() && mul.is_none() {
		return Err(CliError::InvalidArgs {
			reason: "map needs --add or --mul".to_owned(),
		});
	}
	let affine = Affine {
		mul: mul.unwrap_or(1.0),
		add: add.unwrap_or(0.0),
	};

	let value = tree::map(&read_tree(&file)?, |leaf| affine.apply(leaf))?;

	if json {
		return emit_json(&MapJson {
			path: file.display().to_string(),
			value: value_to_json(&value),
		});
	}

	println!("{value}");
	Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Affine {
	mul: f64,
	add: f64,
}

impl Affine {
	/// Integers stay integers while both operands are integral and nothing overflows.
	fn apply(self, leaf: Value) -> Value {
		match leaf {
			Value::Int(v) => match self.apply_int(v) {
				Some(out) => Value::Int(out),
				None => Value::Float(self.apply_f64(v as f64)),
			},
			Value::Float(v) => Value::Float(self.apply_f64(v)),
			Value::Array(array) => Value::Array(array.map(|item| self.apply_f64(item))),
			other => other,
		}
	}

	fn apply_f64(self, v: f64) -> f64 {
		v * self.mul + self.add
	}

	fn apply_int(self, v: i64) -> Option<i64> {
		v.checked_mul(integral(self.mul)?)?.checked_add(integral(self.add)?)
	}
}

fn integral(v: f64) -> Option<i64> {
	let in_range = v >= i64::MIN as f64 && v < i64::MAX as f64;
	(v.fract() == 0.0 && in_range).then_some(v as i64)
}

#[derive(serde::Serialize)]
struct MapJson {
	path: String,
	value: serde_json::Value,
}
