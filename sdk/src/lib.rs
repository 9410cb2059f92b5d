//! brine-layout
//!
//! Runtime entry points for working with fixed binary layouts.
//!
//! - `compile`: JSON schema text → elaborated `Layout` (with diagnostics)
//! - `encode_json` / `decode_to_json`: move between JSON documents and buffers
//! - `value_from_json` / `value_to_json`: bridge `serde_json` and `Value`

use serde_json::{Map, Number, Value as Json};

pub use brine_layout_compiler::{
    compile_layout_to_c, elaborate, parse_schema, Diagnostic, ElaboratedMember, ElaboratedRecord,
    Layout, LayoutError, LayoutOptions, Level, Report, TypeRef,
};
pub use brine_layout_schema::{BaseType, Endian, MemberSpec, RecordSchema, Schema, Value};

/// Parse and elaborate a JSON schema document in one step.
pub fn compile(text: &str, options: &LayoutOptions) -> Result<Report<Layout>, LayoutError> {
    let schema = parse_schema(text)?;
    elaborate(&schema, options)
}

/// Convert a JSON document into a [`Value`]. Non-negative integers become
/// `U64`, negative ones `I64`, any other number `Double`; the codec narrows
/// them to the member's base type.
pub fn value_from_json(json: &Json) -> Result<Value, LayoutError> {
    let mismatch = |kind: &str| LayoutError::ValueMismatch {
        record: String::new(),
        member: String::new(),
        detail: format!("{} values cannot be encoded", kind),
    };

    Ok(match json {
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => {
            if let Some(u) = n.as_u64() {
                Value::U64(u)
            } else if let Some(i) = n.as_i64() {
                Value::I64(i)
            } else {
                Value::Double(n.as_f64().ok_or_else(|| mismatch("non-numeric"))?)
            }
        }
        Json::Array(items) => Value::Array(
            items
                .iter()
                .map(value_from_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Json::Object(fields) => {
            let mut value = Value::object();
            for (name, field) in fields {
                value.set(name, value_from_json(field)?);
            }
            value
        }
        Json::String(_) => return Err(mismatch("string")),
        Json::Null => return Err(mismatch("null")),
    })
}

/// Convert a [`Value`] into JSON. Object keys come out sorted; NaN and
/// infinities become `null`.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::U8(n) => Json::from(*n),
        Value::I8(n) => Json::from(*n),
        Value::U16(n) => Json::from(*n),
        Value::I16(n) => Json::from(*n),
        Value::U32(n) => Json::from(*n),
        Value::I32(n) => Json::from(*n),
        Value::U64(n) => Json::from(*n),
        Value::I64(n) => Json::from(*n),
        Value::Float(f) => float_to_json(*f as f64),
        Value::Double(f) => float_to_json(*f),
        Value::Array(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Object(fields) => {
            let mut names: Vec<&String> = fields.keys().collect();
            names.sort();
            let map: Map<String, Json> = names
                .into_iter()
                .map(|name| (name.clone(), value_to_json(&fields[name])))
                .collect();
            Json::Object(map)
        }
    }
}

fn float_to_json(f: f64) -> Json {
    Number::from_f64(f).map(Json::Number).unwrap_or(Json::Null)
}

/// Encode a JSON document as the record `record`. Warnings about
/// zero-filled input are on the returned report.
pub fn encode_json(layout: &Layout, record: &str, json: &Json) -> Result<Report<Vec<u8>>, LayoutError> {
    let value = value_from_json(json)?;
    layout.encode(record, &value)
}

/// Decode a buffer into a pretty‐printed JSON string whose keys follow
/// member declaration order.
pub fn decode_to_json(layout: &Layout, record: &str, bytes: &[u8]) -> Result<String, LayoutError> {
    let value = layout.decode(record, bytes)?;
    let index = layout.index_of(record).ok_or_else(|| LayoutError::UnknownType {
        name:    record.to_owned(),
        context: "layout".to_owned(),
    })?;
    Ok(serde_json::to_string_pretty(&record_to_json(layout, index, &value))?)
}

fn record_to_json(layout: &Layout, index: usize, value: &Value) -> Json {
    let mut map = Map::new();
    for member in layout.records()[index].data_members() {
        if let Some(field) = value.get(&member.name) {
            let json = match member.type_ref {
                TypeRef::Record(sub) => map_leaves(field, &|leaf| record_to_json(layout, sub, leaf)),
                TypeRef::Base(_) => value_to_json(field),
            };
            map.insert(member.name.clone(), json);
        }
    }
    Json::Object(map)
}

fn map_leaves(value: &Value, f: &dyn Fn(&Value) -> Json) -> Json {
    match value {
        Value::Array(items) => Json::Array(items.iter().map(|item| map_leaves(item, f)).collect()),
        leaf => f(leaf),
    }
}

pub mod error {
    pub use brine_layout_compiler::error::LayoutError;
}

pub mod schema {
    pub use brine_layout_schema::{BaseType, MemberSpec, RecordSchema, Schema, Value};
}
