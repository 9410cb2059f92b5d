use std::collections::HashMap;

/// A member as written in the schema document, before elaboration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSpec {
    pub name: String,
    /// Name of a base type or of another record in the same schema.
    pub type_name: String,
    /// Array extents, outermost first. `None` means a scalar member.
    pub counts: Option<Vec<usize>>,
}

impl MemberSpec {
    pub fn new(name: &str, type_name: &str) -> MemberSpec {
        MemberSpec {
            name: name.to_owned(),
            type_name: type_name.to_owned(),
            counts: None,
        }
    }

    pub fn with_counts(mut self, counts: Vec<usize>) -> MemberSpec {
        self.counts = Some(counts);
        self
    }

    /// The array extents with a scalar member reported as `[1]`.
    pub fn normalized_counts(&self) -> Vec<usize> {
        match self.counts {
            Some(ref counts) => counts.clone(),
            None => vec![1],
        }
    }
}

/// A named record type and its members in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    pub name: String,
    pub members: Vec<MemberSpec>,
}

impl RecordSchema {
    pub fn new(name: &str, members: Vec<MemberSpec>) -> RecordSchema {
        RecordSchema {
            name: name.to_owned(),
            members,
        }
    }
}

/// The raw schema: every declared record in document order.
///
/// Records may refer to each other in any order. Nothing is checked here;
/// see the compiler's verifier and elaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub records: Vec<RecordSchema>,
    pub record_name_to_index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(records: Vec<RecordSchema>) -> Schema {
        let mut record_name_to_index = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            record_name_to_index.entry(record.name.clone()).or_insert(i);
        }
        Schema {
            records,
            record_name_to_index,
        }
    }

    pub fn get(&self, name: &str) -> Option<&RecordSchema> {
        self.record_name_to_index
            .get(name)
            .map(|&index| &self.records[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.record_name_to_index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lookup() {
        let schema = Schema::new(vec![
            RecordSchema::new("Outer", vec![MemberSpec::new("inner", "Inner")]),
            RecordSchema::new(
                "Inner",
                vec![MemberSpec::new("v", "u8").with_counts(vec![2, 3])],
            ),
        ]);

        assert_eq!(schema.len(), 2);
        assert!(schema.contains("Inner"));
        assert!(!schema.contains("u8"));
        assert_eq!(schema.get("Outer").map(|r| r.members.len()), Some(1));
        assert_eq!(
            schema.get("Inner").unwrap().members[0].normalized_counts(),
            vec![2, 3]
        );
        assert_eq!(
            schema.get("Outer").unwrap().members[0].normalized_counts(),
            vec![1]
        );
    }

    #[test]
    fn duplicate_names_resolve_to_first() {
        let schema = Schema::new(vec![
            RecordSchema::new("A", vec![MemberSpec::new("x", "u8")]),
            RecordSchema::new("A", vec![MemberSpec::new("y", "u8")]),
        ]);
        assert_eq!(schema.get("A").unwrap().members[0].name, "x");
    }
}
