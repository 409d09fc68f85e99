//! Field definitions and types for the ORM.
//!
//! This module provides the [`FieldDef`] struct and [`FieldType`] enum that
//! describe model fields, their database column mappings, and how raw values
//! become DB-ready parameters.

pub mod types;

pub use types::{FieldDef, FieldType};
