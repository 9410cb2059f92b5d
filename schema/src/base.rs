use std::fmt;

/// One of the fixed-width primitive types a record member can have.
///
/// Sizes and alignments are the natural ones a C compiler uses for the
/// matching `<stdint.h>` type, so `align() == size()` for every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseType {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    Float,
    Double,
}

impl BaseType {
    /// Every base type, in catalog order.
    pub const ALL: [BaseType; 11] = [
        BaseType::Bool,
        BaseType::U8,
        BaseType::I8,
        BaseType::U16,
        BaseType::I16,
        BaseType::U32,
        BaseType::I32,
        BaseType::U64,
        BaseType::I64,
        BaseType::Float,
        BaseType::Double,
    ];

    /// Looks up a base type by its schema name (`"u32"`, `"double"`, ...).
    pub fn from_name(name: &str) -> Option<BaseType> {
        BaseType::ALL.iter().copied().find(|base| base.name() == name)
    }

    /// The name used for this type in schema documents.
    pub fn name(self) -> &'static str {
        match self {
            BaseType::Bool => "bool",
            BaseType::U8 => "u8",
            BaseType::I8 => "i8",
            BaseType::U16 => "u16",
            BaseType::I16 => "i16",
            BaseType::U32 => "u32",
            BaseType::I32 => "i32",
            BaseType::U64 => "u64",
            BaseType::I64 => "i64",
            BaseType::Float => "float",
            BaseType::Double => "double",
        }
    }

    pub fn size(self) -> usize {
        match self {
            BaseType::Bool | BaseType::U8 | BaseType::I8 => 1,
            BaseType::U16 | BaseType::I16 => 2,
            BaseType::U32 | BaseType::I32 | BaseType::Float => 4,
            BaseType::U64 | BaseType::I64 | BaseType::Double => 8,
        }
    }

    pub fn align(self) -> usize {
        self.size()
    }

    /// The struct-style format tag for this type's fixed-width encoding.
    /// `bool` travels as an unsigned byte.
    pub fn pack_code(self) -> char {
        match self {
            BaseType::Bool | BaseType::U8 => 'B',
            BaseType::I8 => 'b',
            BaseType::U16 => 'H',
            BaseType::I16 => 'h',
            BaseType::U32 => 'L',
            BaseType::I32 => 'l',
            BaseType::U64 => 'Q',
            BaseType::I64 => 'q',
            BaseType::Float => 'f',
            BaseType::Double => 'd',
        }
    }

    /// The C spelling of this type, as used by generated headers.
    pub fn c_type(self) -> &'static str {
        match self {
            BaseType::Bool => "bool",
            BaseType::U8 => "uint8_t",
            BaseType::I8 => "int8_t",
            BaseType::U16 => "uint16_t",
            BaseType::I16 => "int16_t",
            BaseType::U32 => "uint32_t",
            BaseType::I32 => "int32_t",
            BaseType::U64 => "uint64_t",
            BaseType::I64 => "int64_t",
            BaseType::Float => "float",
            BaseType::Double => "double",
        }
    }

    /// Inclusive value range for the integer types, `None` for floats.
    /// `bool` accepts any raw byte.
    pub fn integer_range(self) -> Option<(i128, i128)> {
        match self {
            BaseType::Bool | BaseType::U8 => Some((0, u8::MAX as i128)),
            BaseType::I8 => Some((i8::MIN as i128, i8::MAX as i128)),
            BaseType::U16 => Some((0, u16::MAX as i128)),
            BaseType::I16 => Some((i16::MIN as i128, i16::MAX as i128)),
            BaseType::U32 => Some((0, u32::MAX as i128)),
            BaseType::I32 => Some((i32::MIN as i128, i32::MAX as i128)),
            BaseType::U64 => Some((0, u64::MAX as i128)),
            BaseType::I64 => Some((i64::MIN as i128, i64::MAX as i128)),
            BaseType::Float | BaseType::Double => None,
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_bit_exact() {
        let table: Vec<(&str, usize, usize, char)> = BaseType::ALL
            .iter()
            .map(|b| (b.name(), b.size(), b.align(), b.pack_code()))
            .collect();
        assert_eq!(
            table,
            vec![
                ("bool", 1, 1, 'B'),
                ("u8", 1, 1, 'B'),
                ("i8", 1, 1, 'b'),
                ("u16", 2, 2, 'H'),
                ("i16", 2, 2, 'h'),
                ("u32", 4, 4, 'L'),
                ("i32", 4, 4, 'l'),
                ("u64", 8, 8, 'Q'),
                ("i64", 8, 8, 'q'),
                ("float", 4, 4, 'f'),
                ("double", 8, 8, 'd'),
            ]
        );
    }

    #[test]
    fn from_name() {
        assert_eq!(BaseType::from_name("u16"), Some(BaseType::U16));
        assert_eq!(BaseType::from_name("double"), Some(BaseType::Double));
        assert_eq!(BaseType::from_name("int"), None);
        assert_eq!(BaseType::from_name("U16"), None);
    }

    #[test]
    fn alignments_are_powers_of_two() {
        for base in BaseType::ALL {
            assert!(base.align().is_power_of_two(), "{}", base);
        }
    }
}
