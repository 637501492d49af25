//! Code generator for a sea-of-nodes IR.
//!
//! Reads a node schema (`.sea`) and rewrite rule-sets (`.rules`) written as
//! s-expressions, validates them, and emits a C header with the node kinds
//! and payload structs plus a C source with first-match-wins dispatch
//! functions for every rule-set.

pub mod api;
pub mod cnames;
pub mod config;
pub mod diagnostic;
pub mod dispatch;
pub mod emit;
pub mod pattern;
pub mod schema;
pub mod source;
pub mod span;
pub mod term;

pub use api::{generate, write_output, GenerateOptions, Project};
pub use emit::Output;
