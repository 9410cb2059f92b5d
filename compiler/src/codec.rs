//! Fixed-layout encode/decode of [`Value`]s against an elaborated [`Layout`].
//!
//! Buffers are exactly `record.size` bytes: every member sits at its
//! elaborated offset, arrays are row-major, padding is zero-filled and
//! scalars use the layout's byte order.

use std::collections::HashMap;
use brine_layout_schema::{BaseType, ByteBuffer, ByteBufferMut, Value};
use crate::{
    error::LayoutError,
    types::{Diagnostic, ElaboratedMember, ElaboratedRecord, Layout, Report, TypeRef},
    utils::quote,
};

impl Layout {
    /// Encodes `value` (an object keyed by member name) as the record
    /// `record_name`.
    ///
    /// Missing members and short arrays are zero-filled and reported as
    /// warnings on the returned [`Report`]. Values of the wrong kind, out of
    /// range for their base type, or with more elements than the member
    /// holds are errors.
    pub fn encode(&self, record_name: &str, value: &Value) -> Result<Report<Vec<u8>>, LayoutError> {
        let index = self.record_index(record_name)?;
        let mut bb = ByteBufferMut::with_capacity(self.endian(), self.records[index].size);
        let mut diagnostics = Vec::new();
        self.encode_record(index, value, &mut bb, &mut diagnostics)?;
        Ok(Report::new(bb.data(), diagnostics))
    }

    /// Decodes the first `size` bytes of `bytes` as the record
    /// `record_name`. Trailing bytes are ignored.
    pub fn decode(&self, record_name: &str, bytes: &[u8]) -> Result<Value, LayoutError> {
        let index = self.record_index(record_name)?;
        let record = &self.records[index];
        if bytes.len() < record.size {
            return Err(LayoutError::BufferTooShort {
                record: record.name.clone(),
                need:   record.size,
                have:   bytes.len(),
            });
        }
        self.decode_record(index, &bytes[..record.size])
    }

    fn record_index(&self, record_name: &str) -> Result<usize, LayoutError> {
        self.index_of(record_name).ok_or_else(|| LayoutError::UnknownType {
            name:    record_name.to_owned(),
            context: "layout".to_owned(),
        })
    }

    fn encode_record(
        &self,
        index: usize,
        value: &Value,
        bb: &mut ByteBufferMut,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<(), LayoutError> {
        let record = &self.records[index];
        let fields = match *value {
            Value::Object(ref fields) => fields,
            ref other => {
                return Err(LayoutError::ValueMismatch {
                    record: record.name.clone(),
                    member: String::new(),
                    detail: format!("expected an object, got {}", other.kind()),
                })
            }
        };

        for member in &record.members {
            if member.padding {
                bb.write_zeros(member.size);
                continue;
            }
            match fields.get(&member.name) {
                Some(value) => self.encode_member(record, member, value, bb, diagnostics)?,
                None => {
                    diagnostics.push(Diagnostic::warning(format!(
                        "input for {}.{} missing, zero-filled",
                        quote(&record.name),
                        quote(&member.name)
                    )));
                    bb.write_zeros(member.size);
                }
            }
        }
        Ok(())
    }

    fn encode_member(
        &self,
        record: &ElaboratedRecord,
        member: &ElaboratedMember,
        value: &Value,
        bb: &mut ByteBufferMut,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<(), LayoutError> {
        let mismatch = |detail: String| LayoutError::ValueMismatch {
            record: record.name.clone(),
            member: member.name.clone(),
            detail,
        };

        let flat = value.flatten();
        let total = member.element_count();
        if flat.len() > total {
            return Err(mismatch(format!(
                "expected at most {} elements, got {}",
                total,
                flat.len()
            )));
        }
        let missing = total - flat.len();
        if missing > 0 {
            diagnostics.push(Diagnostic::warning(format!(
                "input for {}.{} too short: {} of {} elements, rest zero-filled",
                quote(&record.name),
                quote(&member.name),
                flat.len(),
                total
            )));
        }

        match member.type_ref {
            TypeRef::Base(base) => {
                for (i, element) in flat.iter().enumerate() {
                    write_scalar(bb, base, element)
                        .map_err(|detail| mismatch(format!("element {}: {}", i, detail)))?;
                }
                for _ in 0..missing {
                    bb.write_base_zero(base);
                }
            }
            TypeRef::Record(sub) => {
                for element in &flat {
                    self.encode_record(sub, element, bb, diagnostics)?;
                }
                bb.write_zeros(missing * self.records[sub].size);
            }
        }
        Ok(())
    }

    fn decode_record(&self, index: usize, bytes: &[u8]) -> Result<Value, LayoutError> {
        let record = &self.records[index];
        let too_short = || LayoutError::BufferTooShort {
            record: record.name.clone(),
            need:   record.size,
            have:   bytes.len(),
        };

        let mut fields = HashMap::with_capacity(record.members.len());
        for member in record.data_members() {
            let slice = bytes.get(member.offset..member.end()).ok_or_else(too_short)?;
            let total = member.element_count();

            let flat = match member.type_ref {
                TypeRef::Base(base) => {
                    let mut bb = ByteBuffer::new(slice, self.endian());
                    (0..total)
                        .map(|_| bb.read_base(base))
                        .collect::<Result<Vec<_>, ()>>()
                        .map_err(|_| too_short())?
                }
                TypeRef::Record(sub) => {
                    let sub_size = self.records[sub].size.max(1);
                    slice
                        .chunks_exact(sub_size)
                        .take(total)
                        .map(|chunk| self.decode_record(sub, chunk))
                        .collect::<Result<Vec<_>, _>>()?
                }
            };

            fields.insert(member.name.clone(), Value::unflatten(flat, &member.counts));
        }
        Ok(Value::Object(fields))
    }
}

/// Packs one scalar. Integer types take bools and in-range integers of any
/// width; `float`/`double` take any number.
fn write_scalar(bb: &mut ByteBufferMut, base: BaseType, value: &Value) -> Result<(), String> {
    match base {
        BaseType::Float => bb.write_f32(f32_of(value)?),
        BaseType::Double => bb.write_f64(float_of(base, value)?),
        BaseType::Bool | BaseType::U8 => bb.write_u8(integer_of(base, value)? as u8),
        BaseType::I8 => bb.write_i8(integer_of(base, value)? as i8),
        BaseType::U16 => bb.write_u16(integer_of(base, value)? as u16),
        BaseType::I16 => bb.write_i16(integer_of(base, value)? as i16),
        BaseType::U32 => bb.write_u32(integer_of(base, value)? as u32),
        BaseType::I32 => bb.write_i32(integer_of(base, value)? as i32),
        BaseType::U64 => bb.write_u64(integer_of(base, value)? as u64),
        BaseType::I64 => bb.write_i64(integer_of(base, value)? as i64),
    }
    Ok(())
}

fn float_of(base: BaseType, value: &Value) -> Result<f64, String> {
    value
        .as_f64()
        .ok_or_else(|| format!("expected a number for {}, got {}", base, value.kind()))
}

/// Finite numbers beyond the binary32 range are rejected instead of being
/// stored as infinities. NaN and infinities pass through.
fn f32_of(value: &Value) -> Result<f32, String> {
    let number = float_of(BaseType::Float, value)?;
    let narrowed = number as f32;
    if number.is_finite() && narrowed.is_infinite() {
        return Err(format!("{:e} is out of range for {}", number, BaseType::Float));
    }
    Ok(narrowed)
}

fn integer_of(base: BaseType, value: &Value) -> Result<i128, String> {
    let number = value
        .as_integer()
        .ok_or_else(|| format!("expected an integer for {}, got {}", base, value.kind()))?;
    match base.integer_range() {
        Some((min, max)) if number < min || number > max => {
            Err(format!("{} is out of range for {}", number, base))
        }
        _ => Ok(number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{elaborator::elaborate, types::{Level, LayoutOptions}};
    use brine_layout_schema::{MemberSpec, RecordSchema, Schema};

    fn object(fields: Vec<(&str, Value)>) -> Value {
        Value::Object(fields.into_iter().map(|(k, v)| (k.to_owned(), v)).collect())
    }

    fn layout(records: Vec<RecordSchema>, options: LayoutOptions) -> Layout {
        elaborate(&Schema::new(records), &options).unwrap().value
    }

    fn point() -> RecordSchema {
        RecordSchema::new("Point", vec![MemberSpec::new("x", "i32"), MemberSpec::new("y", "i32")])
    }

    #[test]
    fn encode_point_little_endian() {
        let layout = layout(vec![point()], LayoutOptions::default());
        let value = object(vec![("x", Value::I32(1)), ("y", Value::I32(-1))]);
        let report = layout.encode("Point", &value).unwrap();
        assert_eq!(report.value, [0x01, 0, 0, 0, 0xff, 0xff, 0xff, 0xff]);
        assert!(report.diagnostics.is_empty());
        assert_eq!(layout.decode("Point", &report.value).unwrap(), value);
    }

    #[test]
    fn encode_point_big_endian() {
        let options = LayoutOptions { big_endian: true, ..LayoutOptions::default() };
        let layout = layout(vec![point()], options);
        let value = object(vec![("x", Value::I32(1)), ("y", Value::I32(-2))]);
        let bytes = layout.encode("Point", &value).unwrap().value;
        assert_eq!(bytes, [0, 0, 0, 0x01, 0xff, 0xff, 0xff, 0xfe]);
        assert_eq!(layout.decode("Point", &bytes).unwrap(), value);
    }

    #[test]
    fn padding_is_zero_filled_and_not_decoded() {
        let layout = layout(
            vec![RecordSchema::new("P", vec![MemberSpec::new("a", "u8"), MemberSpec::new("b", "u32")])],
            LayoutOptions::default(),
        );
        let value = object(vec![("a", Value::U8(0xaa)), ("b", Value::U32(0x0102_0304))]);
        let bytes = layout.encode("P", &value).unwrap().value;
        assert_eq!(bytes, [0xaa, 0, 0, 0, 0x04, 0x03, 0x02, 0x01]);

        let decoded = layout.decode("P", &[0xaa, 9, 9, 9, 0x04, 0x03, 0x02, 0x01]).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(decoded.get("__pad_0"), None);
    }

    #[test]
    fn two_dimensional_arrays_are_row_major() {
        let layout = layout(
            vec![RecordSchema::new(
                "M",
                vec![MemberSpec::new("m", "u8").with_counts(vec![2, 3])],
            )],
            LayoutOptions::default(),
        );
        let row = |values: [u8; 3]| Value::Array(values.iter().map(|&v| Value::U8(v)).collect());
        let value = object(vec![("m", Value::Array(vec![row([1, 2, 3]), row([4, 5, 6])]))]);

        let bytes = layout.encode("M", &value).unwrap().value;
        assert_eq!(bytes, [1, 2, 3, 4, 5, 6]);
        assert_eq!(layout.decode("M", &bytes).unwrap(), value);
    }

    #[test]
    fn arrays_of_records() {
        let layout = layout(
            vec![
                RecordSchema::new("Line", vec![MemberSpec::new("ends", "Point").with_counts(vec![2])]),
                point(),
            ],
            LayoutOptions::default(),
        );
        let p = |x, y| object(vec![("x", Value::I32(x)), ("y", Value::I32(y))]);
        let value = object(vec![("ends", Value::Array(vec![p(1, 2), p(-3, 4)]))]);

        let bytes = layout.encode("Line", &value).unwrap().value;
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[8..12], &[0xfd, 0xff, 0xff, 0xff]);

        let decoded = layout.decode("Line", &bytes).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(decoded.get("ends").unwrap()[1].get("x"), Some(&Value::I32(-3)));
    }

    #[test]
    fn single_nested_record_decodes_bare() {
        let layout = layout(
            vec![
                RecordSchema::new("Wrap", vec![MemberSpec::new("p", "Point")]),
                point(),
            ],
            LayoutOptions::default(),
        );
        let inner = object(vec![("x", Value::I32(7)), ("y", Value::I32(8))]);
        let value = object(vec![("p", inner.clone())]);
        let bytes = layout.encode("Wrap", &value).unwrap().value;
        assert_eq!(layout.decode("Wrap", &bytes).unwrap().get("p"), Some(&inner));
    }

    #[test]
    fn any_rank_round_trips() {
        let counts = vec![2, 1, 3, 1, 2];
        let layout = layout(
            vec![RecordSchema::new("R", vec![MemberSpec::new("v", "i16").with_counts(counts.clone())])],
            LayoutOptions::default(),
        );
        let flat: Vec<Value> = (0..12).map(|i| Value::I16(i * 100 - 600)).collect();
        let value = object(vec![("v", Value::unflatten(flat, &counts))]);

        let bytes = layout.encode("R", &value).unwrap().value;
        assert_eq!(bytes.len(), 24);
        assert_eq!(layout.decode("R", &bytes).unwrap(), value);
    }

    #[test]
    fn short_input_is_zero_filled_with_warnings() {
        let layout = layout(
            vec![RecordSchema::new(
                "S",
                vec![
                    MemberSpec::new("a", "u16").with_counts(vec![3]),
                    MemberSpec::new("b", "u8"),
                ],
            )],
            LayoutOptions::default(),
        );
        let value = object(vec![("a", Value::Array(vec![Value::U16(0x0102)]))]);
        let report = layout.encode("S", &value).unwrap();

        assert_eq!(report.value, [0x02, 0x01, 0, 0, 0, 0, 0, 0]);
        assert_eq!(report.diagnostics.len(), 2);
        assert!(report.diagnostics.iter().all(|d| d.level == Level::Warning));
        assert!(report.diagnostics[0].message.contains("too short: 1 of 3"));
        assert!(report.diagnostics[1].message.contains("\"b\" missing"));

        let decoded = layout.decode("S", &report.value).unwrap();
        assert_eq!(decoded.get("a").unwrap()[2], Value::zero(BaseType::U16));
        assert_eq!(decoded.get("b"), Some(&Value::zero(BaseType::U8)));
    }

    #[test]
    fn short_record_arrays_are_zero_filled() {
        let layout = layout(
            vec![
                RecordSchema::new("Pair", vec![MemberSpec::new("pts", "Point").with_counts(vec![2])]),
                point(),
            ],
            LayoutOptions::default(),
        );
        let one = object(vec![("x", Value::I32(1)), ("y", Value::I32(1))]);
        let report = layout.encode("Pair", &object(vec![("pts", Value::Array(vec![one]))])).unwrap();
        assert_eq!(report.value.len(), 16);
        assert!(report.value[8..].iter().all(|&b| b == 0));
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn scalar_coercion() {
        let layout = layout(
            vec![RecordSchema::new(
                "C",
                vec![
                    MemberSpec::new("flag", "bool"),
                    MemberSpec::new("small", "i8"),
                    MemberSpec::new("ratio", "float"),
                ],
            )],
            LayoutOptions::default(),
        );
        let value = object(vec![
            ("flag", Value::U64(2)),
            ("small", Value::I64(-5)),
            ("ratio", Value::U8(3)),
        ]);
        let bytes = layout.encode("C", &value).unwrap().value;
        assert_eq!(bytes[..2], [2, 0xfb]);

        let decoded = layout.decode("C", &bytes).unwrap();
        assert_eq!(decoded.get("flag"), Some(&Value::Bool(true)));
        assert_eq!(decoded.get("small"), Some(&Value::I8(-5)));
        assert_eq!(decoded.get("ratio"), Some(&Value::Float(3.0)));
    }

    #[test]
    fn bad_values_are_rejected() {
        let layout = layout(
            vec![RecordSchema::new(
                "V",
                vec![
                    MemberSpec::new("a", "u8"),
                    MemberSpec::new("b", "i16").with_counts(vec![2]),
                ],
            )],
            LayoutOptions::default(),
        );

        let out_of_range = object(vec![("a", Value::I32(256))]);
        assert!(matches!(
            layout.encode("V", &out_of_range),
            Err(LayoutError::ValueMismatch { ref member, .. }) if member == "a"
        ));

        let float_for_int = object(vec![("a", Value::Double(1.0))]);
        assert!(layout.encode("V", &float_for_int).is_err());

        let too_many = object(vec![(
            "b",
            Value::Array(vec![Value::I16(1), Value::I16(2), Value::I16(3)]),
        )]);
        match layout.encode("V", &too_many) {
            Err(LayoutError::ValueMismatch { member, detail, .. }) => {
                assert_eq!(member, "b");
                assert_eq!(detail, "expected at most 2 elements, got 3");
            }
            other => panic!("expected a value mismatch, got {:?}", other),
        }

        assert!(matches!(
            layout.encode("V", &Value::U8(1)),
            Err(LayoutError::ValueMismatch { .. })
        ));
    }

    #[test]
    fn float_narrowing_rejects_overflow() {
        let layout = layout(
            vec![RecordSchema::new("F", vec![MemberSpec::new("f", "float")])],
            LayoutOptions::default(),
        );
        let encode = |v: f64| layout.encode("F", &object(vec![("f", Value::Double(v))]));

        for huge in [1e300, -1e300, f32::MAX as f64 * 2.0] {
            match encode(huge) {
                Err(LayoutError::ValueMismatch { member, detail, .. }) => {
                    assert_eq!(member, "f");
                    assert!(detail.contains("out of range for float"), "{}", detail);
                }
                other => panic!("expected {} to be rejected, got {:?}", huge, other),
            }
        }
        match encode(1e300) {
            Err(LayoutError::ValueMismatch { detail, .. }) => {
                assert_eq!(detail, "element 0: 1e300 is out of range for float")
            }
            other => panic!("expected a value mismatch, got {:?}", other),
        }

        let max = encode(f32::MAX as f64).unwrap().value;
        assert_eq!(layout.decode("F", &max).unwrap().get("f"), Some(&Value::Float(f32::MAX)));

        let inf = encode(f64::INFINITY).unwrap().value;
        assert_eq!(layout.decode("F", &inf).unwrap().get("f"), Some(&Value::Float(f32::INFINITY)));
        let neg_inf = encode(f64::NEG_INFINITY).unwrap().value;
        assert_eq!(neg_inf, (f32::NEG_INFINITY).to_le_bytes());

        let nan = encode(f64::NAN).unwrap().value;
        match layout.decode("F", &nan).unwrap().get("f") {
            Some(&Value::Float(f)) => assert!(f.is_nan()),
            other => panic!("expected a float, got {:?}", other),
        }
    }

    #[test]
    fn unknown_record_and_short_buffer() {
        let layout = layout(vec![point()], LayoutOptions::default());
        assert!(matches!(
            layout.decode("Nope", &[0; 8]),
            Err(LayoutError::UnknownType { ref name, .. }) if name == "Nope"
        ));
        assert!(matches!(
            layout.encode("Nope", &Value::object()),
            Err(LayoutError::UnknownType { .. })
        ));
        match layout.decode("Point", &[0; 7]) {
            Err(LayoutError::BufferTooShort { record, need, have }) => {
                assert_eq!(record, "Point");
                assert_eq!((need, have), (8, 7));
            }
            other => panic!("expected a short buffer error, got {:?}", other),
        }
        assert!(layout.decode("Point", &[0; 9]).is_ok());
    }

    #[test]
    fn packed_layout_round_trips() {
        let options = LayoutOptions { packed: true, ..LayoutOptions::default() };
        let layout = layout(
            vec![RecordSchema::new(
                "P",
                vec![
                    MemberSpec::new("a", "u8"),
                    MemberSpec::new("b", "double"),
                    MemberSpec::new("c", "u16"),
                ],
            )],
            options,
        );
        let value = object(vec![
            ("a", Value::U8(1)),
            ("b", Value::Double(-0.5)),
            ("c", Value::U16(0xbeef)),
        ]);
        let bytes = layout.encode("P", &value).unwrap().value;
        assert_eq!(bytes.len(), 11);
        assert_eq!(bytes[9..], [0xef, 0xbe]);
        assert_eq!(layout.decode("P", &bytes).unwrap(), value);
    }

    #[test]
    fn shared_layout_across_threads() {
        let layout = layout(vec![point()], LayoutOptions::default());
        std::thread::scope(|scope| {
            for i in 0..4 {
                let layout = &layout;
                scope.spawn(move || {
                    let value = object(vec![("x", Value::I32(i)), ("y", Value::I32(-i))]);
                    let bytes = layout.encode("Point", &value).unwrap().value;
                    assert_eq!(layout.decode("Point", &bytes).unwrap(), value);
                });
            }
        });
    }
}
