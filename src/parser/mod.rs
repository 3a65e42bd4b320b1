//! Callgrind profile parsing.
//!
//! This module handles:
//! - Reading header metadata (`events`, `cmd`, ...)
//! - Resolving compressed name references
//! - Decoding relative cost lines
//! - Assembling function blocks and call edges

pub mod callgrind;
pub mod compression;
pub mod costs;
pub mod metadata;
pub mod schema;

// Re-export main types
pub use callgrind::{parse_profile, parse_reader};
pub use compression::{EntityKind, NameTable, NameValue};
pub use costs::{decode_call_cost_line, decode_cost_line, DecodedCost};
pub use metadata::Metadata;
pub use schema::{CallEdge, Context, CostEntry, FieldKind, Identity, Profile};
