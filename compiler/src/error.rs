use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed schema: {0}")]
    SchemaShape(String),

    #[error("Invalid identifier \"{name}\" in {context}: {reason}")]
    Identifier {
        name:    String,
        context: String,
        reason:  String,
    },

    #[error("Unknown type \"{name}\" in {context}")]
    UnknownType {
        name:    String,
        context: String,
    },

    #[error("Cyclic type reference {} (unresolved types: {})", cycle.join(" -> "), unresolved.join(", "))]
    CyclicReference {
        cycle:      Vec<String>,
        unresolved: Vec<String>,
    },

    #[error("Array too large in type \"{record}\", member \"{member}\": {count} elements exceeds limit of {limit}")]
    ArrayLimit {
        record: String,
        member: String,
        count:  u64,
        limit:  usize,
    },

    #[error("Struct \"{record}\" too large: {size} bytes exceeds limit of {limit}")]
    StructSizeLimit {
        record: String,
        size:   u64,
        limit:  usize,
    },

    #[error("Nesting depth {depth} in type \"{record}\" exceeds limit of {limit}")]
    NestingDepthLimit {
        record: String,
        depth:  usize,
        limit:  usize,
    },

    #[error("Buffer too short for \"{record}\": need {need} bytes, have {have}")]
    BufferTooShort {
        record: String,
        need:   usize,
        have:   usize,
    },

    #[error("Bad value for \"{record}\" member \"{member}\": {detail}")]
    ValueMismatch {
        record: String,
        member: String,
        detail: String,
    },
}
