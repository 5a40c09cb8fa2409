//! devcap-yaml: escaped YAML fixture documents for captured sessions.
//!
//! Raw terminal output is full of control characters and trailing
//! whitespace that YAML block scalars would mangle; this crate escapes each
//! line into a literal-string form that survives the round trip, and frames
//! the records into the fixture document layout.

pub mod document;
pub mod encode;

pub use document::DocumentWriter;
pub use encode::{encode_block, escape_line, unescape_line};
