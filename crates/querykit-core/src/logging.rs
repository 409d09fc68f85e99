//! Logging integration for querykit.
//!
//! Provides a helper for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings). Advisory messages from the field
//! layer (e.g. naive datetimes under an aware configuration) are emitted as
//! `tracing::warn!` events and surface through whatever subscriber is
//! installed here.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The log level is read from `settings.log_level`. In debug mode a pretty,
/// human-readable format is used; in production a structured JSON format is
/// used. Installing a second subscriber is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one query-construction pass.
///
/// Attach this around predicate building and compilation so log entries
/// emitted on the way (e.g. naive-datetime advisories) carry the table name.
///
/// # Examples
///
/// ```
/// use querykit_core::logging::query_span;
///
/// let span = query_span("log_event");
/// let _guard = span.enter();
/// tracing::info!("compiling where clause");
/// ```
pub fn query_span(table: &str) -> tracing::Span {
    tracing::info_span!("query", table = table)
}
