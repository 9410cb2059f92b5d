//! brine-layout-compiler
//!
//! This crate implements:
//!  1) A parser for JSON layout schemas (`parse_schema`),
//!  2) A schema verifier (identifier syntax, reserved words, duplicates, unknown types),
//!  3) The elaborator: dependency resolution, natural alignment, padding and limits (`elaborate`),
//!  4) Fixed-layout binary encode/decode on the elaborated `Layout`,
//!  5) C header generation (`compile_layout_to_c` → `String`),
//!  6) Error types (`LayoutError`) and advisory `Diagnostic`s.

pub mod error;
pub mod types;
pub mod utils;
pub mod parser;
pub mod verifier;
pub mod elaborator;
pub mod codec;
pub mod gen_c;

pub use elaborator::elaborate;
pub use elaborator::resolution_order;
pub use error::LayoutError;
pub use gen_c::compile_layout_to_c;
pub use parser::parse_schema;
pub use parser::schema_from_json;
pub use types::*;
pub use verifier::verify_schema;
