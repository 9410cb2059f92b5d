use brine_layout_schema::{MemberSpec, RecordSchema, Schema};
use serde_json::{Map, Value as Json};
use crate::{
    error::LayoutError,
    utils::quote,
};

/// Parses a JSON schema document:
///
/// ```json
/// { "Point": [ { "type": "i32", "name": "x" }, { "type": "i32", "name": "y", "counts": [2, 3] } ] }
/// ```
pub fn parse_schema(text: &str) -> Result<Schema, LayoutError> {
    let document: Json = serde_json::from_str(text)?;
    schema_from_json(&document)
}

/// Converts an already-parsed JSON document into a [`Schema`], keeping
/// document order. Structural problems are reported as `SchemaShape`.
pub fn schema_from_json(document: &Json) -> Result<Schema, LayoutError> {
    let records = document
        .as_object()
        .ok_or_else(|| shape(format!("Schema must be a JSON object, got {}", json_kind(document))))?;

    if records.is_empty() {
        return Err(shape("Schema cannot be empty".to_owned()));
    }

    let mut parsed = Vec::with_capacity(records.len());
    for (type_name, members) in records {
        let members = members.as_array().ok_or_else(|| {
            shape(format!(
                "Type {} must have a list of members, got {}",
                quote(type_name),
                json_kind(members)
            ))
        })?;

        if members.is_empty() {
            return Err(shape(format!("Type {} has no members", quote(type_name))));
        }

        let mut specs = Vec::with_capacity(members.len());
        for (idx, member) in members.iter().enumerate() {
            specs.push(member_from_json(type_name, idx, member)?);
        }
        parsed.push(RecordSchema::new(type_name, specs));
    }

    Ok(Schema::new(parsed))
}

fn member_from_json(type_name: &str, idx: usize, member: &Json) -> Result<MemberSpec, LayoutError> {
    let fields: &Map<String, Json> = member.as_object().ok_or_else(|| {
        shape(format!(
            "Member {} in type {} must be an object, got {}",
            idx,
            quote(type_name),
            json_kind(member)
        ))
    })?;

    let member_type = required_string(fields, "type", type_name, idx)?;
    let member_name = required_string(fields, "name", type_name, idx)?;

    let counts = match fields.get("counts") {
        None => None,
        Some(counts) => Some(counts_from_json(type_name, member_name, counts)?),
    };

    Ok(MemberSpec {
        name:      member_name.to_owned(),
        type_name: member_type.to_owned(),
        counts,
    })
}

fn required_string<'j>(
    fields: &'j Map<String, Json>,
    key: &str,
    type_name: &str,
    idx: usize,
) -> Result<&'j str, LayoutError> {
    match fields.get(key) {
        None => Err(shape(format!(
            "Member {} in type {} missing required field {}",
            idx,
            quote(type_name),
            quote(key)
        ))),
        Some(Json::String(text)) => Ok(text.as_str()),
        Some(other) => Err(shape(format!(
            "Member {} in type {}: {} must be a string, got {}",
            idx,
            quote(type_name),
            quote(key),
            json_kind(other)
        ))),
    }
}

fn counts_from_json(type_name: &str, member_name: &str, counts: &Json) -> Result<Vec<usize>, LayoutError> {
    let context = format!("Member {} in type {}", quote(member_name), quote(type_name));
    match counts {
        Json::Number(_) => Ok(vec![positive_count(&context, "counts", counts)?]),
        Json::Array(items) => {
            if items.is_empty() {
                return Err(shape(format!("{}: \"counts\" list cannot be empty", context)));
            }
            items
                .iter()
                .enumerate()
                .map(|(i, item)| positive_count(&context, &format!("counts[{}]", i), item))
                .collect()
        }
        other => Err(shape(format!(
            "{}: \"counts\" must be an integer or list of integers, got {}",
            context,
            json_kind(other)
        ))),
    }
}

fn positive_count(context: &str, what: &str, count: &Json) -> Result<usize, LayoutError> {
    if let Some(n) = count.as_u64() {
        if n >= 1 {
            return usize::try_from(n)
                .map_err(|_| shape(format!("{}: {} is too large, got {}", context, quote(what), n)));
        }
    }
    match count {
        Json::Number(n) if n.is_i64() || n.is_u64() => Err(shape(format!(
            "{}: {} must be positive, got {}",
            context,
            quote(what),
            n
        ))),
        other => Err(shape(format!(
            "{}: {} must be an integer, got {}",
            context,
            quote(what),
            json_kind(other)
        ))),
    }
}

fn shape(msg: String) -> LayoutError {
    LayoutError::SchemaShape(msg)
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(n) if n.is_f64() => "float",
        Json::Number(_) => "int",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
