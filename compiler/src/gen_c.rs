use crate::types::{ElaboratedMember, ElaboratedRecord, Layout, TypeRef};

/// Maps a member's resolved type to its C spelling.
fn map_type(layout: &Layout, member: &ElaboratedMember) -> String {
    match member.type_ref {
        TypeRef::Base(base) => base.c_type().to_string(),
        TypeRef::Record(index) => layout.records[index].name.clone(),
    }
}

/// `[a][b]...` for arrays, nothing for a single element.
fn extents(member: &ElaboratedMember) -> String {
    if member.is_scalar() {
        return String::new();
    }
    member.counts.iter().map(|c| format!("[{}]", c)).collect()
}

fn emit_record(layout: &Layout, record: &ElaboratedRecord, lines: &mut Vec<String>) {
    lines.push(format!(
        "// size {}, align {}, depth {}",
        record.size, record.align, record.depth
    ));
    lines.push(format!("typedef struct {} {{", record.name));
    for member in &record.members {
        lines.push(format!(
            "    {} {}{}; // offset {}, align {}, size {}",
            map_type(layout, member),
            member.name,
            extents(member),
            member.offset,
            member.align,
            member.size
        ));
    }
    lines.push(format!("}} {};", record.name));
    lines.push(format!(
        "STATIC_ASSERT(sizeof({}) == {}, {}_size);",
        record.name, record.size, record.name
    ));
    lines.push(String::new());
}

/// Renders the layout as a C header whose structs have exactly the
/// elaborated offsets and sizes. Padding appears as explicit `uint8_t`
/// members and every struct carries a compile-time size check.
pub fn compile_layout_to_c(layout: &Layout) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("// Generated by blayout. Do not edit.".to_string());
    lines.push("#pragma once".to_string());
    lines.push(String::new());
    lines.push("#include <stdint.h>".to_string());
    lines.push("#include <stdbool.h>".to_string());
    lines.push(String::new());
    lines.push("#ifndef STATIC_ASSERT".to_string());
    lines.push("#define STATIC_ASSERT(cond, name) typedef char static_assert_##name[(cond) ? 1 : -1]".to_string());
    lines.push("#endif".to_string());
    lines.push(String::new());

    if layout.options.packed {
        lines.push("#pragma pack(push, 1)".to_string());
        lines.push(String::new());
    }

    for record in &layout.records {
        emit_record(layout, record, &mut lines);
    }

    if layout.options.packed {
        lines.push("#pragma pack(pop)".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}
