//! Timezone helpers.
//!
//! Thread-local timezone activation, timezone-aware "now", and conversion of
//! naive datetimes into aware ones. The range types use [`make_aware`] when
//! localizing naive bounds.
//!
//! ```
//! use querykit_core::timezone;
//!
//! timezone::activate(5 * 3600); // UTC+5
//! assert_eq!(timezone::current_offset(), 5 * 3600);
//! timezone::deactivate();
//! ```

use std::cell::RefCell;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

thread_local! {
    /// The current thread's timezone offset in seconds east of UTC.
    /// `None` means UTC (the default).
    static CURRENT_TIMEZONE: RefCell<Option<i32>> = const { RefCell::new(None) };
}

/// Activates a timezone for the current thread.
///
/// `offset_seconds` is seconds east of UTC; UTC+5:30 is `19800`.
pub fn activate(offset_seconds: i32) {
    CURRENT_TIMEZONE.with(|cell| {
        *cell.borrow_mut() = Some(offset_seconds);
    });
}

/// Deactivates the current thread's timezone, reverting to UTC.
pub fn deactivate() {
    CURRENT_TIMEZONE.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

/// Returns the current thread's timezone offset in seconds east of UTC,
/// or `0` (UTC) if none has been activated.
pub fn current_offset() -> i32 {
    CURRENT_TIMEZONE.with(|cell| cell.borrow().unwrap_or(0))
}

/// Returns `true` if a timezone has been activated for the current thread.
pub fn is_active() -> bool {
    CURRENT_TIMEZONE.with(|cell| cell.borrow().is_some())
}

/// Returns the current timezone as a `FixedOffset`.
pub fn current_timezone() -> FixedOffset {
    fixed_offset(current_offset())
}

/// Returns the current date and time in UTC as a fixed-offset datetime.
pub fn now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&fixed_offset(0))
}

/// Converts an aware datetime to the current thread's active timezone.
pub fn localtime(dt: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    dt.with_timezone(&current_timezone())
}

/// Interprets a naive datetime as wall-clock time in the given offset.
///
/// Returns `None` only when the local time cannot be represented, which for
/// fixed offsets does not happen in practice but is surfaced rather than
/// panicking (the field layer turns it into a validation error).
pub fn make_aware(naive: NaiveDateTime, offset_seconds: i32) -> Option<DateTime<FixedOffset>> {
    fixed_offset(offset_seconds).from_local_datetime(&naive).single()
}

fn fixed_offset(offset_seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_seconds)
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("UTC offset"))
}
