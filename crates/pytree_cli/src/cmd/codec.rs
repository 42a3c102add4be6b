//! JSON encoding of tree values.
//!
//! Plain JSON maps onto the built-in containers. Tuples, records, and arrays
//! use single-key objects tagged with a `$` name. Objects whose only key starts
//! with `$` are always read as tags.

use std::collections::BTreeMap;

use pytree::tree::{Array, AuxData, Key, Record, TreeDef, Value};
use serde_json::{Map, Value as JsonValue, json};

use crate::cmd::error::{CliError, Result};

const TUPLE_TAG: &str = "$tuple";
const RECORD_TAG: &str = "$record";
const ARRAY_TAG: &str = "$array";
const OBJECT_TAG: &str = "$object";

/// Decode a JSON document into a tree value.
pub(crate) fn value_from_json(json: &JsonValue) -> Result<Value> {
	decode(json, "")
}

fn decode(json: &JsonValue, at: &str) -> Result<Value> {
	let value = match json {
		JsonValue::Null => Value::None,
		JsonValue::Bool(v) => Value::Bool(*v),
		JsonValue::Number(number) => match number.as_i64() {
			Some(v) => Value::Int(v),
			None => number.as_f64().map(Value::Float).ok_or_else(|| encoding(at, "number is out of range"))?,
		},
		JsonValue::String(v) => Value::str(v),
		JsonValue::Array(items) => Value::List(decode_items(items, at)?),
		JsonValue::Object(map) => match tagged(map) {
			Some((tag, body)) => decode_tagged(tag, body, &pointer(at, tag))?,
			None => {
				let entries = map
					.iter()
					.map(|(key, item)| Ok((Key::from(key.as_str()), decode(item, &pointer(at, key))?)))
					.collect::<Result<BTreeMap<_, _>>>()?;
				Value::Dict(entries)
			}
		},
	};
	Ok(value)
}

fn decode_items(items: &[JsonValue], at: &str) -> Result<Vec<Value>> {
	items.iter().enumerate().map(|(idx, item)| decode(item, &pointer(at, &idx.to_string()))).collect()
}

fn tagged(map: &Map<String, JsonValue>) -> Option<(&str, &JsonValue)> {
	let mut entries = map.iter();
	match (entries.next(), entries.next()) {
		(Some((key, body)), None) if key.starts_with('$') => Some((key.as_str(), body)),
		_ => None,
	}
}

fn decode_tagged(tag: &str, body: &JsonValue, at: &str) -> Result<Value> {
	match tag {
		TUPLE_TAG => {
			let items = body.as_array().ok_or_else(|| encoding(at, "tuple body must be an array"))?;
			Ok(Value::Tuple(decode_items(items, at)?))
		}
		RECORD_TAG => decode_record(body, at),
		ARRAY_TAG => decode_array(body, at),
		OBJECT_TAG => Err(encoding(at, "opaque objects cannot be read back")),
		other => Err(encoding(at, format!("unknown tag {other}"))),
	}
}

fn decode_record(body: &JsonValue, at: &str) -> Result<Value> {
	let type_name = body
		.get("type")
		.and_then(JsonValue::as_str)
		.ok_or_else(|| encoding(at, "record needs a string \"type\""))?;
	let fields = body
		.get("fields")
		.and_then(JsonValue::as_array)
		.ok_or_else(|| encoding(at, "record needs a \"fields\" array"))?;

	let mut record = Record::new(type_name);
	for (idx, field) in fields.iter().enumerate() {
		let field_at = format!("{at}/fields/{idx}");
		let Some([name, item]) = field.as_array().map(Vec::as_slice) else {
			return Err(encoding(&field_at, "field must be a [name, value] pair"));
		};
		let name = name.as_str().ok_or_else(|| encoding(&field_at, "field name must be a string"))?;
		if record.get(name).is_some() {
			return Err(encoding(&field_at, format!("duplicate field {name}")));
		}
		record = record.with(name, decode(item, &format!("{field_at}/1"))?);
	}

	Ok(Value::Record(record))
}

fn decode_array(body: &JsonValue, at: &str) -> Result<Value> {
	let shape = body
		.get("shape")
		.and_then(JsonValue::as_array)
		.ok_or_else(|| encoding(at, "array needs a \"shape\" list"))?
		.iter()
		.map(|dim| dim.as_u64().and_then(|dim| usize::try_from(dim).ok()))
		.collect::<Option<Vec<usize>>>()
		.ok_or_else(|| encoding(at, "shape entries must be non-negative integers"))?;
	let data = body
		.get("data")
		.and_then(JsonValue::as_array)
		.ok_or_else(|| encoding(at, "array needs a \"data\" list"))?
		.iter()
		.map(JsonValue::as_f64)
		.collect::<Option<Vec<f64>>>()
		.ok_or_else(|| encoding(at, "array data must be numbers"))?;

	Ok(Value::Array(Array::new(shape, data)?))
}

/// Encode a tree value using the same tagged encoding [`value_from_json`] reads.
///
/// Integer dict keys become decimal strings. Objects encode as their tag only.
pub(crate) fn value_to_json(value: &Value) -> JsonValue {
	match value {
		Value::None => JsonValue::Null,
		Value::Bool(v) => json!(v),
		Value::Int(v) => json!(v),
		Value::Float(v) => json!(v),
		Value::Str(v) => json!(v.as_ref()),
		Value::Array(array) => tagged_json(ARRAY_TAG, json!({ "shape": array.shape(), "data": array.data() })),
		Value::Tuple(items) => tagged_json(TUPLE_TAG, items_to_json(items)),
		Value::List(items) => items_to_json(items),
		Value::Dict(map) => JsonValue::Object(map.iter().map(|(key, item)| (key_to_string(key), value_to_json(item))).collect()),
		Value::Record(record) => {
			let fields: Vec<JsonValue> = record
				.fields
				.iter()
				.map(|field| json!([field.name.as_ref(), value_to_json(&field.value)]))
				.collect();
			tagged_json(RECORD_TAG, json!({ "type": record.type_name.as_ref(), "fields": fields }))
		}
		Value::Object(object) => tagged_json(OBJECT_TAG, json!(object.tag().as_str())),
	}
}

/// Describe a tree definition as nested JSON. Leaves render as `"*"`.
pub(crate) fn treedef_to_json(def: &TreeDef) -> JsonValue {
	let (Some(node_type), Some(aux)) = (def.node_type(), def.aux()) else {
		return json!("*");
	};

	let mut out = Map::new();
	out.insert("node".to_owned(), json!(node_type.to_string()));
	match aux {
		AuxData::Empty => {}
		AuxData::Keys(keys) => {
			let keys: Vec<String> = keys.iter().map(key_to_string).collect();
			out.insert("keys".to_owned(), json!(keys));
		}
		AuxData::Record { type_name, fields } => {
			let fields: Vec<&str> = fields.iter().map(|field| field.as_ref()).collect();
			out.insert("type".to_owned(), json!(type_name.as_ref()));
			out.insert("fields".to_owned(), json!(fields));
		}
		AuxData::Custom(value) => {
			out.insert("aux".to_owned(), value_to_json(value));
		}
	}
	out.insert("children".to_owned(), JsonValue::Array(def.children().iter().map(treedef_to_json).collect()));
	JsonValue::Object(out)
}

fn items_to_json(items: &[Value]) -> JsonValue {
	JsonValue::Array(items.iter().map(value_to_json).collect())
}

fn tagged_json(tag: &str, body: JsonValue) -> JsonValue {
	let mut out = Map::new();
	out.insert(tag.to_owned(), body);
	JsonValue::Object(out)
}

fn key_to_string(key: &Key) -> String {
	match key {
		Key::Int(v) => v.to_string(),
		Key::Str(v) => v.to_string(),
	}
}

fn pointer(at: &str, token: &str) -> String {
	format!("{at}/{}", token.replace('~', "~0").replace('/', "~1"))
}

fn encoding(at: &str, reason: impl Into<String>) -> CliError {
	CliError::Encoding {
		at: if at.is_empty() { "/".to_owned() } else { at.to_owned() },
		reason: reason.into(),
	}
}

#[cfg(test)]
mod tests {
	use pytree::tree::{Object, Registry};

	use super::*;

	#[test]
	fn plain_json_maps_onto_builtin_containers() {
		let value = value_from_json(&json!({ "b": [1, 2.5, null], "a": "x", "c": true })).expect("decodes");
		assert_eq!(
			value,
			Value::dict([
				("a", Value::str("x")),
				("b", Value::list([Value::Int(1), Value::Float(2.5), Value::None])),
				("c", Value::Bool(true)),
			])
		);
	}

	#[test]
	fn tagged_objects_decode_to_tuples_records_and_arrays() {
		let json = json!({
			"t": { "$tuple": [1, { "$tuple": [] }] },
			"r": { "$record": { "type": "Point", "fields": [["x", 1], ["y", 2]] } },
			"a": { "$array": { "shape": [2, 1], "data": [0.5, 1.5] } }
		});
		let value = value_from_json(&json).expect("decodes");
		let Value::Dict(map) = &value else {
			panic!("expected dict, got {value}");
		};
		assert_eq!(map[&Key::from("t")], Value::tuple([Value::Int(1), Value::tuple([])]));
		assert_eq!(map[&Key::from("r")], Value::from(Record::new("Point").with("x", 1).with("y", 2)));
		assert_eq!(map[&Key::from("a")], Value::from(Array::new(vec![2, 1], vec![0.5, 1.5]).expect("shape fits")));

		assert_eq!(value_to_json(&value), json);
	}

	#[test]
	fn multi_key_objects_are_dicts_even_with_dollar_keys() {
		let value = value_from_json(&json!({ "$tuple": [1], "other": 2 })).expect("decodes");
		assert!(matches!(value, Value::Dict(ref map) if map.len() == 2));
	}

	#[test]
	fn malformed_tags_report_their_location() {
		let err = value_from_json(&json!({ "xs": [{ "$set": [1] }] })).expect_err("unknown tag");
		assert_eq!(err.to_string(), "invalid tree encoding at /xs/0/$set: unknown tag $set");

		let err = value_from_json(&json!({ "$record": { "type": "P", "fields": [["x"]] } })).expect_err("bad field");
		assert!(matches!(err, CliError::Encoding { ref at, .. } if at == "/$record/fields/0"));

		let err = value_from_json(&json!({ "$array": { "shape": [3], "data": [1, 2] } })).expect_err("bad shape");
		assert!(matches!(err, CliError::Tree(_)));

		let err = value_from_json(&json!({ "$object": "opaque" })).expect_err("objects are write-only");
		assert!(err.to_string().contains("cannot be read back"));
	}

	#[test]
	fn objects_and_int_keys_encode_lossily() {
		let value = Value::dict([(Key::Int(3), Value::Object(Object::new("opaque", ())))]);
		assert_eq!(value_to_json(&value), json!({ "3": { "$object": "opaque" } }));
	}

	#[test]
	fn treedef_json_names_node_kinds() {
		let value = Value::dict([("a", Value::tuple([Value::Int(1), Value::None])), ("b", Value::from(Record::new("P").with("x", 1)))]);
		let def = Registry::with_builtins().structure(&value).expect("flatten succeeds");
		assert_eq!(
			treedef_to_json(&def),
			json!({
				"node": "dict",
				"keys": ["a", "b"],
				"children": [
					{ "node": "tuple", "children": ["*", { "node": "None", "children": [] }] },
					{ "node": "record", "type": "P", "fields": ["x"], "children": ["*"] }
				]
			})
		);
	}
}
