use std::collections::{BTreeSet, HashMap};
use brine_layout_schema::{BaseType, RecordSchema, Schema};
use crate::{
    error::LayoutError,
    types::{Diagnostic, ElaboratedMember, ElaboratedRecord, Layout, LayoutOptions, Report, TypeRef},
    utils::{align_up, quote},
    verifier::{verify_schema, PADDING_PREFIX},
};

/// Record alignment never exceeds this, matching natural alignment rules
/// for the widest base types.
pub const MAX_ALIGN: usize = 8;

/// Verify `schema` and lay out every record in it.
///
/// Returns the published layout table together with informational
/// diagnostics (one per inserted padding member). Any error aborts the
/// whole elaboration; no partial table is produced.
pub fn elaborate(schema: &Schema, options: &LayoutOptions) -> Result<Report<Layout>, LayoutError> {
    verify_schema(schema)?;

    let order = resolution_order(schema)?;
    log::debug!(
        "resolution order: {}",
        order
            .iter()
            .map(|&i| schema.records[i].name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut diagnostics = Vec::new();
    let mut records: Vec<ElaboratedRecord> = Vec::with_capacity(order.len());
    let mut resolved: HashMap<&str, usize> = HashMap::with_capacity(order.len());

    for &schema_index in &order {
        let record = &schema.records[schema_index];
        let elaborated = layout_record(record, &records, &resolved, options, &mut diagnostics)?;
        resolved.insert(record.name.as_str(), records.len());
        records.push(elaborated);
    }

    for record in &records {
        if record.depth > options.max_nesting_depth {
            return Err(LayoutError::NestingDepthLimit {
                record: record.name.clone(),
                depth:  record.depth,
                limit:  options.max_nesting_depth,
            });
        }
    }

    Ok(Report::new(Layout::new(options.clone(), records), diagnostics))
}

/// Indices into `schema.records` ordered so that every record comes after
/// the records its members refer to. Among records that are ready at the
/// same time, the one declared first wins, so the order is deterministic.
pub fn resolution_order(schema: &Schema) -> Result<Vec<usize>, LayoutError> {
    let count = schema.records.len();
    let dependencies: Vec<BTreeSet<usize>> = schema
        .records
        .iter()
        .map(|record| record_dependencies(schema, record))
        .collect();

    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (index, deps) in dependencies.iter().enumerate() {
        for &dep in deps {
            dependents[dep].push(index);
        }
    }

    let mut pending: Vec<usize> = dependencies.iter().map(BTreeSet::len).collect();
    let mut ready: BTreeSet<usize> = (0..count).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(count);

    while let Some(index) = ready.pop_first() {
        order.push(index);
        for &dependent in &dependents[index] {
            pending[dependent] -= 1;
            if pending[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() < count {
        return Err(cycle_error(schema, &dependencies, &pending));
    }
    Ok(order)
}

fn record_dependencies(schema: &Schema, record: &RecordSchema) -> BTreeSet<usize> {
    record
        .members
        .iter()
        .filter(|member| BaseType::from_name(&member.type_name).is_none())
        .filter_map(|member| schema.record_name_to_index.get(&member.type_name).copied())
        .collect()
}

/// Every unresolved record still waits on at least one unresolved record,
/// so walking those edges from any of them must revisit a record. The
/// revisited stretch of the walk is the reported cycle.
fn cycle_error(schema: &Schema, dependencies: &[BTreeSet<usize>], pending: &[usize]) -> LayoutError {
    let unresolved: Vec<usize> = (0..pending.len()).filter(|&i| pending[i] > 0).collect();
    let name = |i: usize| schema.records[i].name.clone();

    let mut path: Vec<usize> = Vec::new();
    let mut seen_at: HashMap<usize, usize> = HashMap::new();
    let mut current = unresolved.first().copied();
    let mut cycle = Vec::new();

    while let Some(index) = current {
        if let Some(&start) = seen_at.get(&index) {
            cycle = path[start..].iter().map(|&i| name(i)).collect();
            cycle.push(name(index));
            break;
        }
        seen_at.insert(index, path.len());
        path.push(index);
        current = dependencies[index].iter().copied().find(|&dep| pending[dep] > 0);
    }

    LayoutError::CyclicReference {
        cycle,
        unresolved: unresolved.into_iter().map(name).collect(),
    }
}

fn padding_member(index: usize, offset: u64, needed: u64) -> ElaboratedMember {
    ElaboratedMember {
        name:      format!("{}{}", PADDING_PREFIX, index),
        type_name: BaseType::U8.name().to_owned(),
        type_ref:  TypeRef::Base(BaseType::U8),
        offset:    offset as usize,
        align:     1,
        size:      needed as usize,
        counts:    vec![needed as usize],
        padding:   true,
    }
}

/// Lay out one record. Every record-typed member must already be in
/// `table` (guaranteed by the resolution order).
fn layout_record(
    record: &RecordSchema,
    table: &[ElaboratedRecord],
    resolved: &HashMap<&str, usize>,
    options: &LayoutOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<ElaboratedRecord, LayoutError> {
    let size_limit = options.max_struct_size as u64;
    let too_large = |size: u64| LayoutError::StructSizeLimit {
        record: record.name.clone(),
        size,
        limit: options.max_struct_size,
    };

    let mut members = Vec::with_capacity(record.members.len());
    let mut offset: u64 = 0;
    let mut padding_count = 0;
    let mut record_align = 1;
    let mut depth = 0;

    for member in &record.members {
        let (type_ref, element_size, required_align) = match BaseType::from_name(&member.type_name) {
            Some(base) => (TypeRef::Base(base), base.size(), base.align()),
            None => {
                let index = *resolved.get(member.type_name.as_str()).ok_or_else(|| {
                    LayoutError::UnknownType {
                        name:    member.type_name.clone(),
                        context: format!("type {}, member {}", quote(&record.name), quote(&member.name)),
                    }
                })?;
                let nested = &table[index];
                depth = depth.max(nested.depth + 1);
                (TypeRef::Record(index), nested.size, nested.align)
            }
        };

        if !options.packed {
            let aligned = align_up(offset, required_align as u64);
            if aligned != offset {
                let needed = aligned - offset;
                members.push(padding_member(padding_count, offset, needed));
                padding_count += 1;
                diagnostics.push(Diagnostic::info(format!(
                    "struct {}: alignment placeholder size {} inserted before {}",
                    quote(&record.name),
                    needed,
                    quote(&member.name)
                )));
                offset = aligned;
            }
            record_align = record_align.max(required_align);
        }

        let counts = member.normalized_counts();
        let element_count = counts.iter().fold(1u64, |acc, &c| acc.saturating_mul(c as u64));
        if element_count > options.max_array_elements as u64 {
            return Err(LayoutError::ArrayLimit {
                record: record.name.clone(),
                member: member.name.clone(),
                count:  element_count,
                limit:  options.max_array_elements,
            });
        }

        let size = (element_size as u64).saturating_mul(element_count);
        let end = offset.saturating_add(size);
        if end > size_limit {
            return Err(too_large(end));
        }

        members.push(ElaboratedMember {
            name:      member.name.clone(),
            type_name: member.type_name.clone(),
            type_ref,
            offset:    offset as usize,
            align:     required_align,
            size:      size as usize,
            counts,
            padding:   false,
        });
        offset = end;
    }

    let align = if options.packed { 1 } else { record_align.min(MAX_ALIGN) };
    if !options.packed {
        let aligned = align_up(offset, align as u64);
        if aligned != offset {
            let needed = aligned - offset;
            members.push(padding_member(padding_count, offset, needed));
            diagnostics.push(Diagnostic::info(format!(
                "struct {}: padding placeholder size {} appended",
                quote(&record.name),
                needed
            )));
            offset = aligned;
        }
    }

    if offset > size_limit {
        return Err(too_large(offset));
    }

    Ok(ElaboratedRecord {
        name: record.name.clone(),
        members,
        size: offset as usize,
        align,
        depth,
    })
}
