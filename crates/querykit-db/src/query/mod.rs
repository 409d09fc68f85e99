//! Predicate building and WHERE-clause compilation.
//!
//! This module contains the lookup resolution and compilation pipeline:
//!
//! - [`expressions`] - Column references, operands, and sub-query values
//! - [`lookups`] - Comparison operators and their SQL synthesis
//! - [`catalog`] - Operator-name resolution, per-field-type registries
//! - [`where_clause`] - The AND/OR/NOT tree and its short-circuiting compiler

pub mod catalog;
pub mod expressions;
pub mod lookups;
pub mod where_clause;

pub use catalog::{LookupCatalog, RelatedLookup};
pub use expressions::{
    AggregateRef, ColumnRef, Lhs, ModelAttr, ModelRef, Operand, QueryWrapper, Subquery,
    ValueAnnotation,
};
pub use lookups::{AtomSql, Lookup, NormalizedValue, RhsPrepare};
pub use where_clause::{
    CompiledWhere, Connector, ExtraWhere, LeafPredicate, WhereChild, WhereNode,
};
