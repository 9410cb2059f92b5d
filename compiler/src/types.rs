use brine_layout_schema::{BaseType, Endian};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const DEFAULT_MAX_ARRAY_ELEMENTS: usize = 65535;
pub const DEFAULT_MAX_STRUCT_SIZE:    usize = 65535;
pub const DEFAULT_MAX_NESTING_DEPTH:  usize = 16;

/// Everything that changes the outcome of elaboration besides the schema.
///
/// The three limits are hard ceilings: crossing any of them fails the
/// whole elaboration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Byte order for scalar encode/decode. Does not affect the layout.
    pub big_endian:         bool,
    /// Disable all padding insertion and size rounding.
    pub packed:             bool,
    pub max_array_elements: usize,
    pub max_struct_size:    usize,
    pub max_nesting_depth:  usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            big_endian:         false,
            packed:             false,
            max_array_elements: DEFAULT_MAX_ARRAY_ELEMENTS,
            max_struct_size:    DEFAULT_MAX_STRUCT_SIZE,
            max_nesting_depth:  DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl LayoutOptions {
    pub fn endian(&self) -> Endian {
        Endian::from_big_endian(self.big_endian)
    }
}

/// What a member's type resolved to. Record references index into
/// [`Layout::records`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRef {
    Base(BaseType),
    Record(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElaboratedMember {
    pub name:     String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip)]
    pub type_ref: TypeRef,
    /// Bytes from the start of the enclosing record.
    pub offset:   usize,
    pub align:    usize,
    /// Total bytes, element size times the product of `counts`.
    pub size:     usize,
    /// Array extents, `[1]` for a scalar.
    pub counts:   Vec<usize>,
    /// Synthetic alignment filler with no value of its own.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub padding:  bool,
}

impl ElaboratedMember {
    pub fn element_count(&self) -> usize {
        self.counts.iter().product()
    }

    /// A rank-1 member with a single element.
    pub fn is_scalar(&self) -> bool {
        self.counts == [1]
    }

    pub fn end(&self) -> usize {
        self.offset + self.size
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElaboratedRecord {
    pub name:    String,
    pub members: Vec<ElaboratedMember>,
    pub size:    usize,
    pub align:   usize,
    /// 0 when every member is a base type, otherwise one more than the
    /// deepest record-typed member.
    pub depth:   usize,
}

impl ElaboratedRecord {
    pub fn member(&self, name: &str) -> Option<&ElaboratedMember> {
        self.members.iter().find(|m| !m.padding && m.name == name)
    }

    /// Members that carry data, skipping padding.
    pub fn data_members(&self) -> impl Iterator<Item = &ElaboratedMember> {
        self.members.iter().filter(|m| !m.padding)
    }
}

/// The published, read-only result of elaborating a schema.
///
/// Records are stored in resolution order, so every record appears after
/// all records it refers to. The table is read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub(crate) options: LayoutOptions,
    pub(crate) records: Vec<ElaboratedRecord>,
    #[serde(skip)]
    pub(crate) record_name_to_index: HashMap<String, usize>,
}

impl Layout {
    pub fn new(options: LayoutOptions, records: Vec<ElaboratedRecord>) -> Layout {
        let record_name_to_index = records
            .iter()
            .enumerate()
            .map(|(i, record)| (record.name.clone(), i))
            .collect();
        Layout {
            options,
            records,
            record_name_to_index,
        }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// All records, in resolution order.
    pub fn records(&self) -> &[ElaboratedRecord] {
        &self.records
    }

    pub fn get(&self, name: &str) -> Option<&ElaboratedRecord> {
        self.record_name_to_index
            .get(name)
            .map(|&index| &self.records[index])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.record_name_to_index.get(name).copied()
    }

    pub fn endian(&self) -> Endian {
        self.options.endian()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => f.write_str("info"),
            Level::Warning => f.write_str("warning"),
        }
    }
}

/// An advisory message attached to a successful result. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level:   Level,
    pub message: String,
}

impl Diagnostic {
    pub fn info(message: String) -> Diagnostic {
        log::info!("{}", message);
        Diagnostic { level: Level::Info, message }
    }

    pub fn warning(message: String) -> Diagnostic {
        log::warn!("{}", message);
        Diagnostic { level: Level::Warning, message }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:7} {}", self.level.to_string(), self.message)
    }
}

/// A successful result paired with the diagnostics produced while
/// computing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Report<T> {
    pub value:       T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Report<T> {
    pub fn new(value: T, diagnostics: Vec<Diagnostic>) -> Report<T> {
        Report { value, diagnostics }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.level == Level::Warning)
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
