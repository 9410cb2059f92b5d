use std::collections::HashSet;
use brine_layout_schema::{BaseType, Schema};
use lazy_static::lazy_static;
use regex::Regex;
use crate::{
    error::LayoutError,
    utils::quote,
};

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Prefix of the synthetic members the elaborator inserts for alignment.
pub const PADDING_PREFIX: &str = "__pad_";

/// Words that cannot name a record or member because generated C and C++
/// declarations would not compile.
pub const RESERVED_NAMES: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char16_t", "char32_t", "char8_t", "class", "compl", "concept",
    "const", "const_cast", "consteval", "constexpr", "constinit", "continue", "co_await",
    "co_return", "co_yield", "decltype", "default", "delete", "do", "double", "dynamic_cast",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
    "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
    "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
    "reinterpret_cast", "requires", "return", "short", "signed", "sizeof", "static",
    "static_assert", "static_cast", "struct", "switch", "template", "this", "thread_local",
    "throw", "true", "try", "typedef", "typeid", "typename", "union", "unsigned", "using",
    "virtual", "void", "volatile", "wchar_t", "while", "xor", "xor_eq",
    "_Alignas", "_Alignof", "_Atomic", "_Bool", "_Complex", "_Generic", "_Imaginary",
    "_Noreturn", "_Static_assert", "_Thread_local",
];

/// Checks a single identifier. Base type names are exempt from the
/// reserved-word check only where `allow_base_types` is set, i.e. in the
/// `type` position of a member.
pub fn verify_identifier(name: &str, context: &str, allow_base_types: bool) -> Result<(), LayoutError> {
    let invalid = |reason: &str| LayoutError::Identifier {
        name:    name.to_owned(),
        context: context.to_owned(),
        reason:  reason.to_owned(),
    };

    if name.is_empty() {
        return Err(invalid("empty string not allowed"));
    }
    if !IDENTIFIER.is_match(name) {
        return Err(invalid(
            "must start with a letter or underscore, followed by letters, digits, or underscores",
        ));
    }
    if allow_base_types && BaseType::from_name(name).is_some() {
        return Ok(());
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(invalid("reserved C/C++ keyword"));
    }
    Ok(())
}

/// Returns `Ok(())` if the schema may be elaborated.
///
/// Shape problems (empty schema, empty member lists, bad counts) are
/// reported first for the whole schema, then names and type references.
pub fn verify_schema(schema: &Schema) -> Result<(), LayoutError> {
    // 1) Shape
    if schema.is_empty() {
        return Err(LayoutError::SchemaShape("Schema cannot be empty".to_owned()));
    }
    for record in &schema.records {
        if record.members.is_empty() {
            return Err(LayoutError::SchemaShape(format!(
                "Type {} has no members",
                quote(&record.name)
            )));
        }
        for member in &record.members {
            if let Some(ref counts) = member.counts {
                if counts.is_empty() {
                    return Err(LayoutError::SchemaShape(format!(
                        "Member {} in type {}: \"counts\" list cannot be empty",
                        quote(&member.name),
                        quote(&record.name)
                    )));
                }
                if let Some(i) = counts.iter().position(|&c| c == 0) {
                    return Err(LayoutError::SchemaShape(format!(
                        "Member {} in type {}: \"counts[{}]\" must be positive, got 0",
                        quote(&member.name),
                        quote(&record.name),
                        i
                    )));
                }
            }
        }
    }

    // 2) Record names: legal, unique, and not shadowing a base type
    let mut defined_types: HashSet<&str> = HashSet::new();
    for record in &schema.records {
        verify_identifier(&record.name, "type name", false)?;
        if BaseType::from_name(&record.name).is_some() {
            return Err(LayoutError::Identifier {
                name:    record.name.clone(),
                context: "type name".to_owned(),
                reason:  "shadows a base type".to_owned(),
            });
        }
        if !defined_types.insert(record.name.as_str()) {
            return Err(LayoutError::Identifier {
                name:    record.name.clone(),
                context: "type name".to_owned(),
                reason:  "the type is defined twice".to_owned(),
            });
        }
    }

    // 3) Members: legal unique names, known types
    for record in &schema.records {
        let mut member_names: HashSet<&str> = HashSet::new();
        for member in &record.members {
            let context = format!("member name in type {}", quote(&record.name));
            verify_identifier(&member.name, &context, false)?;
            if member.name.starts_with(PADDING_PREFIX) {
                return Err(LayoutError::Identifier {
                    name:    member.name.clone(),
                    context,
                    reason:  format!("the {} prefix is reserved for padding", quote(PADDING_PREFIX)),
                });
            }
            if !member_names.insert(member.name.as_str()) {
                return Err(LayoutError::Identifier {
                    name:    member.name.clone(),
                    context,
                    reason:  "the member is defined twice".to_owned(),
                });
            }

            let type_context = format!(
                "member type in type {}, member {}",
                quote(&record.name),
                quote(&member.name)
            );
            verify_identifier(&member.type_name, &type_context, true)?;
            if BaseType::from_name(&member.type_name).is_none() && !schema.contains(&member.type_name) {
                return Err(LayoutError::UnknownType {
                    name:    member.type_name.clone(),
                    context: format!("type {}, member {}", quote(&record.name), quote(&member.name)),
                });
            }
        }
    }

    Ok(())
}
