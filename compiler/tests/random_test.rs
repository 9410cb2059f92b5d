#![cfg(test)]

//! Property checks over randomly generated schemas and values.

use brine_layout_compiler::{elaborate, Layout, LayoutOptions, TypeRef};
use brine_layout_schema::{BaseType, MemberSpec, RecordSchema, Schema, Value};
use rand::{rngs::StdRng, Rng, SeedableRng};

const SEEDS: u64 = 64;

fn options(big_endian: bool, packed: bool) -> LayoutOptions {
    LayoutOptions {
        big_endian,
        packed,
        max_struct_size: 1 << 24,
        ..LayoutOptions::default()
    }
}

/// Records may only refer to records declared after them, so the schema is
/// acyclic but still exercises forward references.
fn random_schema(rng: &mut StdRng) -> Schema {
    let record_count = rng.gen_range(1..=4);
    let names: Vec<String> = (0..record_count).map(|i| format!("Rec{}", i)).collect();

    let records = (0..record_count)
        .map(|i| {
            let member_count = rng.gen_range(1..=5);
            let members = (0..member_count)
                .map(|m| {
                    let name = format!("m{}", m);
                    let nested = i + 1 < record_count && rng.gen_bool(0.25);
                    if nested {
                        let target = rng.gen_range(i + 1..record_count);
                        let member = MemberSpec::new(&name, &names[target]);
                        match rng.gen_range(0..3) {
                            0 => member,
                            _ => member.with_counts(vec![rng.gen_range(1..=2)]),
                        }
                    } else {
                        let base = BaseType::ALL[rng.gen_range(0..BaseType::ALL.len())];
                        let member = MemberSpec::new(&name, base.name());
                        match rng.gen_range(0..3) {
                            0 => member,
                            _ => {
                                let rank = rng.gen_range(1..=3);
                                member.with_counts((0..rank).map(|_| rng.gen_range(1..=3)).collect())
                            }
                        }
                    }
                })
                .collect();
            RecordSchema::new(&names[i], members)
        })
        .collect();

    Schema::new(records)
}

fn random_scalar(rng: &mut StdRng, base: BaseType) -> Value {
    match base {
        BaseType::Bool => Value::Bool(rng.gen()),
        BaseType::U8 => Value::U8(rng.gen()),
        BaseType::I8 => Value::I8(rng.gen()),
        BaseType::U16 => Value::U16(rng.gen()),
        BaseType::I16 => Value::I16(rng.gen()),
        BaseType::U32 => Value::U32(rng.gen()),
        BaseType::I32 => Value::I32(rng.gen()),
        BaseType::U64 => Value::U64(rng.gen()),
        BaseType::I64 => Value::I64(rng.gen()),
        BaseType::Float => Value::Float(rng.gen_range(-1.0e6f32..1.0e6)),
        BaseType::Double => Value::Double(rng.gen_range(-1.0e12..1.0e12)),
    }
}

fn random_value(rng: &mut StdRng, layout: &Layout, index: usize) -> Value {
    let mut value = Value::object();
    for member in layout.records()[index].data_members() {
        let flat: Vec<Value> = (0..member.element_count())
            .map(|_| match member.type_ref {
                TypeRef::Base(base) => random_scalar(rng, base),
                TypeRef::Record(sub) => random_value(rng, layout, sub),
            })
            .collect();
        value.set(&member.name, Value::unflatten(flat, &member.counts));
    }
    value
}

fn check_tiling(layout: &Layout) {
    for record in layout.records() {
        let mut end = 0;
        for member in &record.members {
            assert_eq!(member.offset, end, "gap or overlap at {}.{}", record.name, member.name);
            end = member.end();
        }
        assert_eq!(end, record.size, "members of {} do not cover it", record.name);
    }
}

#[test]
fn test_round_trip() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let schema = random_schema(&mut rng);

        for (big_endian, packed) in [(false, false), (true, false), (false, true), (true, true)] {
            let layout = elaborate(&schema, &options(big_endian, packed)).unwrap().value;
            for index in 0..layout.records().len() {
                let name = layout.records()[index].name.clone();
                let value = random_value(&mut rng, &layout, index);

                let report = layout.encode(&name, &value).unwrap();
                assert!(report.diagnostics.is_empty(), "seed {}: {:?}", seed, report.diagnostics);
                assert_eq!(report.value.len(), layout.records()[index].size);
                assert_eq!(layout.decode(&name, &report.value).unwrap(), value, "seed {}", seed);
            }
        }
    }
}

#[test]
fn test_alignment_and_tiling() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let layout = elaborate(&random_schema(&mut rng), &options(false, false)).unwrap().value;

        check_tiling(&layout);
        for record in layout.records() {
            assert!(record.align.is_power_of_two() && record.align <= 8);
            assert_eq!(record.size % record.align, 0, "seed {}: {}", seed, record.name);
            for member in &record.members {
                assert_eq!(member.offset % member.align, 0, "seed {}: {}.{}", seed, record.name, member.name);
            }
        }
    }
}

#[test]
fn test_packed_size() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut schema = random_schema(&mut rng);
        let layout = elaborate(&schema, &options(false, true)).unwrap().value;

        check_tiling(&layout);
        for record in layout.records() {
            assert!(record.members.iter().all(|m| !m.padding));
            assert_eq!(record.size, record.members.iter().map(|m| m.size).sum::<usize>());
            assert_eq!(record.align, 1);
        }

        // Member order does not change a packed record's size.
        for record in &mut schema.records {
            record.members.reverse();
        }
        let reversed = elaborate(&schema, &options(false, true)).unwrap().value;
        for record in layout.records() {
            assert_eq!(reversed.get(&record.name).unwrap().size, record.size, "seed {}", seed);
        }
    }
}

#[test]
fn test_determinism() {
    for seed in 0..SEEDS {
        let schema = random_schema(&mut StdRng::seed_from_u64(seed));
        let first = elaborate(&schema, &options(false, false)).unwrap();
        let second = elaborate(&schema, &options(false, false)).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first.value).unwrap(),
            serde_json::to_string(&second.value).unwrap()
        );
    }
}
