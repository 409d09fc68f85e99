//! # querykit-core
//!
//! Foundation types for the querykit framework: error types, settings,
//! timezone helpers, logging integration, and the date-time range value type.
//! This crate has no dependency on the ORM layer and provides the foundation
//! for `querykit-db`.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Framework settings
//! - [`logging`] - Tracing-based logging integration
//! - [`timezone`] - Thread-local timezone activation and conversions
//! - [`ranges`] - The [`DateTimeRange`](ranges::DateTimeRange) value type

pub mod error;
pub mod logging;
pub mod ranges;
pub mod settings;
pub mod timezone;

// Re-export the most commonly used types at the crate root.
pub use error::{QueryError, QueryResult, ValidationError};
pub use ranges::{DateTimeRange, RangeStamp};
pub use settings::Settings;
