//! # querykit-db
//!
//! The ORM layer of querykit: field definitions, backend operator tables,
//! lookup resolution, and the WHERE-clause tree compiler.
//!
//! ## Architecture
//!
//! A predicate enters as `(column reference, operator name, value)`. The
//! [`LookupCatalog`](query::LookupCatalog) resolves the operator to a
//! [`Lookup`](query::Lookup); adding the predicate to a
//! [`WhereNode`](query::WhereNode) freezes the value and its annotation into
//! the tree. Compilation walks the tree bottom-up against a
//! [`Connection`](backend::Connection), emitting SQL text with `%s`
//! placeholders plus an ordered parameter list — or one of the
//! matches-nothing / matches-everything classifications that let callers
//! skip the database entirely. No I/O happens anywhere in this crate.
//!
//! ## Module Overview
//!
//! - [`value`] - The backend-agnostic [`Value`](value::Value) enum
//! - [`fields`] - Field definitions ([`FieldDef`](fields::FieldDef)) and types
//! - [`backend`] - Backend SQL idioms and operator tables
//! - [`query`] - Lookups, the catalog, and the where-clause compiler

// These clippy lints are intentionally allowed for the ORM crate:
// - result_large_err: QueryError is the framework error type and is used consistently
// - cast_precision_loss: i64-to-f64 casts are acceptable for float field coercion
// - needless_pass_by_value: prep APIs take owned values they usually transform
// - doc_markdown: backtick requirements for documentation items are too strict
// - use_self: explicit type names are clearer in some contexts
#![allow(clippy::result_large_err)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::use_self)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::option_if_let_else)]

pub mod backend;
pub mod fields;
pub mod query;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use backend::{Backend, Connection};
pub use fields::{FieldDef, FieldType};
pub use query::{
    AtomSql, ColumnRef, CompiledWhere, Connector, Lhs, Lookup, LookupCatalog, Operand, WhereChild,
    WhereNode,
};
pub use value::Value;
