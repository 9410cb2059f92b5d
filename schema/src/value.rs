use crate::base::BaseType;

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

/// This type holds dynamic record data.
///
/// Values can represent anything a layout can describe: scalars of every
/// base type, nested arrays of any rank, and records (as name -> value
/// objects). They are converted to and from fixed binary buffers using an
/// elaborated layout from the compiler crate.
#[derive(Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    Float(f32),
    Double(f64),
    Array(Vec<Value>),
    Object(HashMap<String, Value>),
}

impl Value {
    /// An empty [Object](#variant.Object).
    pub fn object() -> Value {
        Value::Object(HashMap::new())
    }

    /// The zero value of a base type, as decode would produce it from
    /// all-zero bytes.
    pub fn zero(base: BaseType) -> Value {
        match base {
            BaseType::Bool => Value::Bool(false),
            BaseType::U8 => Value::U8(0),
            BaseType::I8 => Value::I8(0),
            BaseType::U16 => Value::U16(0),
            BaseType::I16 => Value::I16(0),
            BaseType::U32 => Value::U32(0),
            BaseType::I32 => Value::I32(0),
            BaseType::U64 => Value::U64(0),
            BaseType::I64 => Value::I64(0),
            BaseType::Float => Value::Float(0.0),
            BaseType::Double => Value::Double(0.0),
        }
    }

    /// A convenience method to extract the value out of a [Bool](#variant.Bool).
    /// Returns `false` for other value kinds.
    pub fn as_bool(&self) -> bool {
        match *self {
            Value::Bool(value) => value,
            _ => false,
        }
    }

    /// Returns the value of any integer (or bool) variant widened to `i128`,
    /// or `None` for floats, arrays and objects.
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Value::Bool(value) => Some(value as i128),
            Value::U8(value) => Some(value as i128),
            Value::I8(value) => Some(value as i128),
            Value::U16(value) => Some(value as i128),
            Value::I16(value) => Some(value as i128),
            Value::U32(value) => Some(value as i128),
            Value::I32(value) => Some(value as i128),
            Value::U64(value) => Some(value as i128),
            Value::I64(value) => Some(value as i128),
            _ => None,
        }
    }

    /// Returns any numeric variant as `f64`. Bools, arrays and objects
    /// return `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(value) => Some(value as f64),
            Value::Double(value) => Some(value),
            Value::Bool(_) => None,
            _ => self.as_integer().map(|value| value as f64),
        }
    }

    /// A convenience method to get an array of values out of an [Array](#variant.Array).
    /// Returns an empty array for other value kinds.
    pub fn as_array(&self) -> &[Value] {
        match *self {
            Value::Array(ref values) => values.as_slice(),
            _ => &[],
        }
    }

    /// A convenience method to extract the length out of an [Array](#variant.Array).
    /// Returns `0` for other value kinds.
    pub fn len(&self) -> usize {
        match *self {
            Value::Array(ref values) => values.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A convenience method to append to an [Array](#variant.Array). Does
    /// nothing for other value kinds.
    pub fn push(&mut self, value: Value) {
        if let Value::Array(ref mut values) = *self {
            values.push(value);
        }
    }

    /// A convenience method to extract a field out of an [Object](#variant.Object).
    /// Returns `None` for other value kinds or if the field isn't present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match *self {
            Value::Object(ref fields) => fields.get(name),
            _ => None,
        }
    }

    /// A convenience method to update a field on an [Object](#variant.Object).
    /// Does nothing for other value kinds.
    pub fn set(&mut self, name: &str, value: Value) {
        if let Value::Object(ref mut fields) = *self {
            fields.insert(name.to_owned(), value);
        }
    }

    /// A convenience method to remove a field on an [Object](#variant.Object).
    /// Does nothing for other value kinds.
    pub fn remove(&mut self, name: &str) {
        if let Value::Object(ref mut fields) = *self {
            fields.remove(name);
        }
    }

    /// A short name for the kind of this value, used in error messages.
    pub fn kind(&self) -> &'static str {
        match *self {
            Value::Bool(_) => "bool",
            Value::U8(_) => "u8",
            Value::I8(_) => "i8",
            Value::U16(_) => "u16",
            Value::I16(_) => "i16",
            Value::U32(_) => "u32",
            Value::I32(_) => "i32",
            Value::U64(_) => "u64",
            Value::I64(_) => "i64",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Flattens nested arrays into their leaves in row-major order: the
    /// innermost (last) dimension varies fastest. Scalars and objects are
    /// leaves, so a bare scalar flattens to a single element.
    pub fn flatten(&self) -> Vec<&Value> {
        fn walk<'v>(value: &'v Value, out: &mut Vec<&'v Value>) {
            match *value {
                Value::Array(ref values) => {
                    for value in values {
                        walk(value, out);
                    }
                }
                _ => out.push(value),
            }
        }

        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }

    /// Rebuilds the nested shape described by `counts` from a flat row-major
    /// sequence. This is the inverse of [flatten](#method.flatten).
    ///
    /// A single-element, rank-1 shape yields the bare element rather than a
    /// one-element array. Higher ranks are grouped from the innermost
    /// dimension outwards, so any rank works.
    pub fn unflatten(flat: Vec<Value>, counts: &[usize]) -> Value {
        let mut level = flat;
        if counts == [1] {
            if let Some(value) = level.pop() {
                return value;
            }
        }
        for &extent in counts.iter().skip(1).rev() {
            let extent = extent.max(1);
            let mut grouped = Vec::with_capacity(level.len() / extent);
            let mut rest = level.into_iter().peekable();
            while rest.peek().is_some() {
                grouped.push(Value::Array(rest.by_ref().take(extent).collect()));
            }
            level = grouped;
        }
        Value::Array(level)
    }
}

impl Index<usize> for Value {
    type Output = Value;

    /// A convenience method that adds support for `self[index]` expressions.
    /// It will panic if this value isn't an [Array](#variant.Array) or if the
    /// provided index is out of bounds.
    fn index(&self, index: usize) -> &Value {
        match *self {
            Value::Array(ref values) => &values[index],
            _ => panic!(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match *self {
            Value::Bool(value) => value.fmt(f),
            Value::U8(value) => value.fmt(f),
            Value::I8(value) => value.fmt(f),
            Value::U16(value) => value.fmt(f),
            Value::I16(value) => value.fmt(f),
            Value::U32(value) => value.fmt(f),
            Value::I32(value) => value.fmt(f),
            Value::U64(value) => value.fmt(f),
            Value::I64(value) => value.fmt(f),
            Value::Float(value) => value.fmt(f),
            Value::Double(value) => value.fmt(f),
            Value::Array(ref values) => values.fmt(f),

            Value::Object(ref fields) => {
                let mut keys: Vec<_> = fields.keys().collect();
                let mut first = true;
                keys.sort();
                write!(f, "{{")?;

                for key in keys {
                    if first {
                        first = false;
                    } else {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {:?}", key, fields[key])?;
                }

                write!(f, "}}")
            }
        }
    }
}
