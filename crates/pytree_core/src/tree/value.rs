use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::tree::{Result, TreeError, TreeNode};

/// Dictionary key. Integer keys order before string keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
	/// Integer key.
	Int(i64),
	/// String key.
	Str(Arc<str>),
}

impl From<i64> for Key {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<&str> for Key {
	fn from(value: &str) -> Self {
		Self::Str(Arc::from(value))
	}
}

impl From<String> for Key {
	fn from(value: String) -> Self {
		Self::Str(Arc::from(value))
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(v) => write!(f, "{v}"),
			Self::Str(v) => write_quoted(f, v),
		}
	}
}

/// Write `text` in single quotes with `'` and `\` escaped by a backslash.
pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
	f.write_str("'")?;
	for ch in text.chars() {
		if matches!(ch, '\'' | '\\') {
			f.write_str("\\")?;
		}
		write!(f, "{ch}")?;
	}
	f.write_str("'")
}

/// Dense `f64` array leaf. Shape and data are shared between clones.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
	shape: Arc<[usize]>,
	data: Arc<[f64]>,
}

impl Array {
	/// Build an array, checking that `shape` covers exactly `data.len()` elements.
	pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
		let expected = shape.iter().try_fold(1_usize, |acc, dim| acc.checked_mul(*dim));
		if expected != Some(data.len()) {
			return Err(TreeError::InvalidArrayShape { shape, len: data.len() });
		}

		Ok(Self {
			shape: Arc::from(shape),
			data: Arc::from(data),
		})
	}

	/// One-dimensional array over `data`.
	pub fn from_vec(data: Vec<f64>) -> Self {
		Self {
			shape: Arc::from(vec![data.len()]),
			data: Arc::from(data),
		}
	}

	/// Array dimensions.
	pub fn shape(&self) -> &[usize] {
		&self.shape
	}

	/// Row-major element data.
	pub fn data(&self) -> &[f64] {
		&self.data
	}

	/// Number of elements.
	pub fn len(&self) -> usize {
		self.data.len()
	}

	/// Whether the array holds no elements.
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Apply `f` to every element, keeping the shape.
	pub fn map(&self, f: impl FnMut(f64) -> f64) -> Self {
		let data: Vec<f64> = self.data.iter().copied().map(f).collect();
		Self {
			shape: self.shape.clone(),
			data: Arc::from(data),
		}
	}
}

/// One named field of a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
	/// Field name.
	pub name: Arc<str>,
	/// Field value.
	pub value: Value,
}

/// Named record with ordered fields, flattened field by field.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
	/// Record type name, part of the record's structure.
	pub type_name: Arc<str>,
	/// Fields in declaration order.
	pub fields: Vec<Field>,
}

impl Record {
	/// Create an empty record of the given type.
	pub fn new(type_name: &str) -> Self {
		Self {
			type_name: Arc::from(type_name),
			fields: Vec::new(),
		}
	}

	/// Append a field.
	pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
		self.fields.push(Field {
			name: Arc::from(name),
			value: value.into(),
		});
		self
	}

	/// Look up a field value by name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.fields.iter().find(|field| field.name.as_ref() == name).map(|field| &field.value)
	}
}

/// Stable identifier for a user-registered container type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeTag(Arc<str>);

impl TypeTag {
	/// Create a tag from its name.
	pub fn new(name: &str) -> Self {
		Self(Arc::from(name))
	}

	/// Tag name.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for TypeTag {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl fmt::Display for TypeTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// User container value: a type tag plus shared, type-erased data.
///
/// Objects whose tag is registered decompose through the registry's callbacks.
/// Unregistered objects are opaque leaves.
#[derive(Clone)]
pub struct Object {
	tag: TypeTag,
	data: Arc<dyn Any + Send + Sync>,
}

impl Object {
	/// Wrap `data` under `tag`.
	pub fn new<T: Any + Send + Sync>(tag: impl Into<TypeTag>, data: T) -> Self {
		Self {
			tag: tag.into(),
			data: Arc::new(data),
		}
	}

	/// Container type tag.
	pub fn tag(&self) -> &TypeTag {
		&self.tag
	}

	/// Borrow the payload as `T` when it has that type.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.data.downcast_ref::<T>()
	}

	/// Whether both objects share one payload allocation.
	pub fn same_data(&self, other: &Self) -> bool {
		std::ptr::addr_eq(Arc::as_ptr(&self.data), Arc::as_ptr(&other.data))
	}
}

impl PartialEq for Object {
	fn eq(&self, other: &Self) -> bool {
		self.tag == other.tag && self.same_data(other)
	}
}

impl fmt::Debug for Object {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Object").field("tag", &self.tag).finish_non_exhaustive()
	}
}

/// Dynamic tree value: scalar and array leaves, built-in containers, and user objects.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Absence marker. A childless node, never a leaf unless configured otherwise.
	None,
	/// Boolean leaf.
	Bool(bool),
	/// Integer leaf.
	Int(i64),
	/// Floating-point leaf.
	Float(f64),
	/// String leaf.
	Str(Arc<str>),
	/// Array leaf.
	Array(Array),
	/// Fixed-arity sequence node.
	Tuple(Vec<Value>),
	/// Sequence node.
	List(Vec<Value>),
	/// Mapping node, children taken in key order.
	Dict(BTreeMap<Key, Value>),
	/// Named record node.
	Record(Record),
	/// User container; a node only when its tag is registered.
	Object(Object),
}

impl Value {
	/// String leaf.
	pub fn str(value: &str) -> Self {
		Self::Str(Arc::from(value))
	}

	/// List node over `items`.
	pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
		Self::List(items.into_iter().collect())
	}

	/// Tuple node over `items`.
	pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
		Self::Tuple(items.into_iter().collect())
	}

	/// Dict node over `entries`. Later duplicates replace earlier ones.
	pub fn dict<K: Into<Key>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
		Self::Dict(entries.into_iter().map(|(key, value)| (key.into(), value)).collect())
	}

	/// Object node holding a [`TreeNode`] payload under its tag.
	pub fn object<T: TreeNode>(node: T) -> Self {
		Self::Object(Object::new(T::TAG, node))
	}

	/// Integer payload.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Int(v) => Some(*v),
			_ => None,
		}
	}

	/// Numeric payload, widening integers.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Int(v) => Some(*v as f64),
			Self::Float(v) => Some(*v),
			_ => None,
		}
	}

	/// String payload.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(v) => Some(v),
			_ => None,
		}
	}

	/// User object payload.
	pub fn as_object(&self) -> Option<&Object> {
		match self {
			Self::Object(v) => Some(v),
			_ => None,
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::str(value)
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::Str(Arc::from(value))
	}
}

impl From<Array> for Value {
	fn from(value: Array) -> Self {
		Self::Array(value)
	}
}

impl From<Record> for Value {
	fn from(value: Record) -> Self {
		Self::Record(value)
	}
}

impl From<Object> for Value {
	fn from(value: Object) -> Self {
		Self::Object(value)
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::None => f.write_str("None"),
			Self::Bool(v) => write!(f, "{v}"),
			Self::Int(v) => write!(f, "{v}"),
			Self::Float(v) => write!(f, "{v:?}"),
			Self::Str(v) => write_quoted(f, v),
			Self::Array(v) => write!(f, "Array{:?}", v.shape()),
			Self::Tuple(items) => {
				f.write_str("(")?;
				write_joined(f, items)?;
				if items.len() == 1 {
					f.write_str(",")?;
				}
				f.write_str(")")
			}
			Self::List(items) => {
				f.write_str("[")?;
				write_joined(f, items)?;
				f.write_str("]")
			}
			Self::Dict(map) => {
				f.write_str("{")?;
				for (idx, (key, value)) in map.iter().enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{key}: {value}")?;
				}
				f.write_str("}")
			}
			Self::Record(record) => {
				write!(f, "{}(", record.type_name)?;
				for (idx, field) in record.fields.iter().enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{}={}", field.name, field.value)?;
				}
				f.write_str(")")
			}
			Self::Object(object) => write!(f, "<{}>", object.tag()),
		}
	}
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
	for (idx, item) in items.iter().enumerate() {
		if idx > 0 {
			f.write_str(", ")?;
		}
		write!(f, "{item}")?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn array_rejects_shape_that_does_not_cover_data() {
		let err = Array::new(vec![2, 3], vec![0.0; 5]).expect_err("shape product differs from data length");
		assert!(matches!(err, TreeError::InvalidArrayShape { len: 5, .. }));
		assert_eq!(Array::new(vec![2, 3], vec![0.0; 6]).expect("shape fits").shape(), &[2, 3]);
	}

	#[test]
	fn objects_compare_by_tag_and_shared_payload() {
		let a = Object::new("point", 1_u32);
		let b = a.clone();
		let c = Object::new("point", 1_u32);
		assert_eq!(a, b);
		assert_ne!(a, c, "equal payloads in distinct allocations are distinct objects");
	}

	#[test]
	fn display_renders_python_like_repr() {
		let value = Value::tuple([Value::Int(1), Value::list([Value::str("a"), Value::None]), Value::tuple([Value::Float(2.0)])]);
		assert_eq!(value.to_string(), "(1, ['a', None], (2.0,))");

		let record = Value::from(Record::new("Point").with("x", 1).with("y", 2));
		assert_eq!(record.to_string(), "Point(x=1, y=2)");
	}

	#[test]
	fn string_keys_escape_quotes_and_backslashes() {
		assert_eq!(Key::from("it's").to_string(), r"'it\'s'");
		assert_eq!(Key::from(r"a\b").to_string(), r"'a\\b'");
		assert_eq!(Value::str("a]b").to_string(), "'a]b'");
	}

	#[test]
	fn dict_keys_iterate_in_sorted_order() {
		let Value::Dict(map) = Value::dict([("b", Value::Int(2)), ("a", Value::Int(1))]) else {
			panic!("expected dict");
		};
		let keys: Vec<String> = map.keys().map(ToString::to_string).collect();
		assert_eq!(keys, ["'a'", "'b'"]);
	}
}
