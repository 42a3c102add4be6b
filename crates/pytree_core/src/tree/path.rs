use std::fmt;
use std::sync::Arc;

use crate::tree::value::write_quoted;
use crate::tree::{Key, Registry, Result, TreeError, Value, global};

/// One step from a node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
	/// Position in a tuple or list.
	Index(usize),
	/// Dictionary key.
	Key(Key),
	/// Record field name.
	Attr(Arc<str>),
	/// Child position of a custom node.
	Flat(usize),
}

impl fmt::Display for PathStep {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Index(idx) => write!(f, "[{idx}]"),
			Self::Key(key) => write!(f, "[{key}]"),
			Self::Attr(name) if is_identifier(name) => write!(f, ".{name}"),
			Self::Attr(name) => {
				f.write_str(".")?;
				write_quoted(f, name)
			}
			Self::Flat(idx) => write!(f, "[<flat index {idx}>]"),
		}
	}
}

/// Path from a tree's root to one of its nodes.
///
/// The empty path addresses the root and renders as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
	/// Ordered steps from the root.
	pub steps: Vec<PathStep>,
}

impl KeyPath {
	/// Root path.
	pub const fn new() -> Self {
		Self { steps: Vec::new() }
	}

	/// Push a step onto the path.
	pub fn push(&mut self, step: PathStep) {
		self.steps.push(step);
	}

	/// Pop the last step.
	pub fn pop(&mut self) -> Option<PathStep> {
		self.steps.pop()
	}

	/// Whether this is the root path.
	pub fn is_root(&self) -> bool {
		self.steps.is_empty()
	}

	/// Number of steps.
	pub fn len(&self) -> usize {
		self.steps.len()
	}

	/// Whether the path has no steps.
	pub fn is_empty(&self) -> bool {
		self.steps.is_empty()
	}

	/// Parse `[0]`, `['key']`, `.attr`, `.'attr'` and `[<flat index N>]` steps.
	///
	/// The empty string parses to the root path. Quoted names may escape `'`,
	/// `"` and `\` with a backslash. `[N]` always parses as [`PathStep::Index`];
	/// lookups on dicts fall back to integer keys.
	pub fn parse(input: &str) -> Result<Self> {
		let invalid = || TreeError::InvalidKeyPath { path: input.to_owned() };
		let bytes = input.as_bytes();
		let mut idx = 0_usize;
		let mut steps = Vec::new();

		while idx < bytes.len() {
			match bytes[idx] {
				b'.' if matches!(bytes.get(idx + 1), Some(b'\'' | b'"')) => {
					let (name, end) = scan_quoted(input, idx + 1).ok_or_else(invalid)?;
					steps.push(PathStep::Attr(Arc::from(name)));
					idx = end;
				}
				b'[' if matches!(bytes.get(idx + 1), Some(b'\'' | b'"')) => {
					let (key, end) = scan_quoted(input, idx + 1).ok_or_else(invalid)?;
					if bytes.get(end) != Some(&b']') {
						return Err(invalid());
					}
					steps.push(PathStep::Key(Key::from(key)));
					idx = end + 1;
				}
				b'.' => {
					idx += 1;
					let start = idx;
					while idx < bytes.len() && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_') {
						idx += 1;
					}
					if idx == start {
						return Err(invalid());
					}
					steps.push(PathStep::Attr(Arc::from(&input[start..idx])));
				}
				b'[' => {
					idx += 1;
					let close = input[idx..].find(']').map(|offset| idx + offset).ok_or_else(invalid)?;
					steps.push(parse_bracket(&input[idx..close]).ok_or_else(invalid)?);
					idx = close + 1;
				}
				_ => return Err(invalid()),
			}
		}

		Ok(Self { steps })
	}
}

fn parse_bracket(inner: &str) -> Option<PathStep> {
	if let Some(rest) = inner.strip_prefix("<flat index ") {
		let number = rest.strip_suffix('>')?;
		return number.parse::<usize>().ok().map(PathStep::Flat);
	}

	if let Some(negative) = inner.strip_prefix('-') {
		let number = negative.parse::<i64>().ok()?;
		return Some(PathStep::Key(Key::Int(-number)));
	}

	if inner.is_empty() || !inner.bytes().all(|byte| byte.is_ascii_digit()) {
		return None;
	}
	inner.parse::<usize>().ok().map(PathStep::Index)
}

/// Read a quoted name starting at the quote byte `start`.
///
/// Returns the unescaped text and the byte offset just past the closing quote.
fn scan_quoted(input: &str, start: usize) -> Option<(String, usize)> {
	let mut chars = input[start..].char_indices();
	let (_, quote) = chars.next()?;
	let mut out = String::new();
	while let Some((offset, ch)) = chars.next() {
		match ch {
			'\\' => out.push(chars.next()?.1),
			ch if ch == quote => return Some((out, start + offset + ch.len_utf8())),
			ch => out.push(ch),
		}
	}
	None
}

fn is_identifier(name: &str) -> bool {
	!name.is_empty() && name.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
}

impl fmt::Display for KeyPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for step in &self.steps {
			write!(f, "{step}")?;
		}
		Ok(())
	}
}

impl Registry {
	/// Select the subtree of `value` at `path`.
	///
	/// [`PathStep::Flat`] steps go through the flatten callback of a registered object.
	pub fn get(&self, value: &Value, path: &KeyPath) -> Result<Value> {
		let mut current = value.clone();
		for (step_idx, step) in path.steps.iter().enumerate() {
			let not_found = || TreeError::PathNotFound {
				path: path.to_string(),
				step: step_idx,
			};

			let next = match (&current, step) {
				(Value::Tuple(items) | Value::List(items), PathStep::Index(idx)) => items.get(*idx).cloned(),
				(Value::Dict(map), PathStep::Key(key)) => map.get(key).cloned(),
				(Value::Dict(map), PathStep::Index(idx)) => i64::try_from(*idx).ok().and_then(|key| map.get(&Key::Int(key))).cloned(),
				(Value::Record(record), PathStep::Attr(name)) => record.get(name).cloned(),
				(Value::Object(object), PathStep::Flat(idx)) => match self.flatten_one_level(&current)? {
					Some(level) => level.children.into_iter().nth(*idx),
					None => {
						tracing::debug!(tag = %object.tag(), "flat path step into unregistered object");
						None
					}
				},
				_ => None,
			};

			current = next.ok_or_else(not_found)?;
		}

		Ok(current)
	}
}

/// Select the subtree of `value` at `path` using the process-wide registry.
pub fn get(value: &Value, path: &KeyPath) -> Result<Value> {
	global().get(value, path)
}
