//! This is a Rust library with the building blocks shared by the Brine Layout
//! compiler and runtime: the fixed catalog of base types, the raw schema
//! model, dynamic values and fixed-width byte buffers.
//!
//! ```
//! use brine_layout_schema::*;
//!
//! let schema = Schema::new(vec![
//!     RecordSchema::new("Point", vec![
//!         MemberSpec::new("x", "i32"),
//!         MemberSpec::new("y", "i32"),
//!     ]),
//! ]);
//! assert_eq!(BaseType::from_name("i32").map(|b| b.size()), Some(4));
//! assert!(schema.contains("Point"));
//!
//! let mut bb = ByteBuffer::new(&[1, 0, 0, 0, 255, 255, 255, 255], Endian::Little);
//! assert_eq!(bb.read_i32(), Ok(1));
//! assert_eq!(bb.read_i32(), Ok(-1));
//! ```

pub mod base;
pub mod bb;
pub mod schema;
pub mod value;

pub use base::*;
pub use bb::*;
pub use schema::*;
pub use value::*;
