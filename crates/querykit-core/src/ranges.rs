//! Date-time range values.
//!
//! A [`DateTimeRange`] is a bounded interval with independently
//! inclusive/exclusive ends. The text format uses `[`/`]` for inclusive and
//! `(`/`)` for exclusive bounds, with an empty string for an open bound:
//!
//! ```text
//! [2012-01-01T12:30:00, 2012-01-01T12:33:00]
//! (2012-01-01T12:30:00+00:00, ]
//! ```
//!
//! Bounds are either timezone-naive or carry a UTC offset ([`RangeStamp`]).
//! Naive bounds can be localized in place, which is the only sanctioned
//! mutation of a range after construction.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timezone;

// Range start "[" inclusive or "(" exclusive, two bound values, and a
// matching stop bracket.
static RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\[\(])(.*),[ ]*(.*)([\]\)])$").expect("range regex"));

/// One bound of a [`DateTimeRange`]: a wall-clock datetime that is either
/// timezone-naive or anchored to a UTC offset.
///
/// A naive and an aware stamp never compare equal, even when they would
/// denote the same instant under some localization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeStamp {
    /// A datetime without timezone information.
    Naive(NaiveDateTime),
    /// A datetime with a fixed UTC offset.
    Aware(DateTime<FixedOffset>),
}

impl RangeStamp {
    /// Returns `true` for a timezone-naive stamp.
    pub const fn is_naive(&self) -> bool {
        matches!(self, Self::Naive(_))
    }

    /// Parses an ISO-8601 datetime, with `T` or space as the separator and
    /// an optional offset suffix. A bare date parses to midnight.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(Self::Aware(dt));
        }
        if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
            return Ok(Self::Aware(dt));
        }
        for format in [
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M",
        ] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
                return Ok(Self::Naive(dt));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(Self::Naive(dt));
            }
        }
        Err(ValidationError::new(
            format!(
                "'{value}' value has an invalid format. It must be in \
                 YYYY-MM-DD HH:MM[:ss[.uuuuuu]][TZ] format."
            ),
            "invalid",
        ))
    }

    /// Renders the stamp in ISO-8601 form with a `T` separator.
    pub fn isoformat(&self) -> String {
        self.render('T')
    }

    /// Interprets a naive stamp as wall-clock time at the given offset.
    /// Aware stamps are returned unchanged.
    pub fn make_aware(self, offset_seconds: i32) -> Result<Self, ValidationError> {
        match self {
            Self::Naive(naive) => timezone::make_aware(naive, offset_seconds)
                .map(Self::Aware)
                .ok_or_else(|| {
                    ValidationError::new(
                        format!(
                            "{naive} couldn't be interpreted at offset \
                             {offset_seconds}; it may be ambiguous or it may not exist."
                        ),
                        "ambiguous_datetime",
                    )
                }),
            Self::Aware(_) => Ok(self),
        }
    }

    fn render(&self, sep: char) -> String {
        match self {
            Self::Naive(dt) => render_naive(dt, sep),
            Self::Aware(dt) => {
                let mut out = render_naive(&dt.naive_local(), sep);
                out.push_str(&dt.format("%:z").to_string());
                out
            }
        }
    }
}

fn render_naive(dt: &NaiveDateTime, sep: char) -> String {
    let mut out = if sep == 'T' {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    };
    let micros = dt.time().nanosecond() / 1_000;
    if micros > 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out
}

impl fmt::Display for RangeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(' '))
    }
}

impl From<NaiveDateTime> for RangeStamp {
    fn from(dt: NaiveDateTime) -> Self {
        Self::Naive(dt)
    }
}

impl From<DateTime<FixedOffset>> for RangeStamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::Aware(dt)
    }
}

/// A date-time interval with independently inclusive/exclusive bounds.
///
/// Equality requires exact match on all four fields. Whether `start <= end`
/// is not enforced here; that is left to database constraints.
///
/// # Examples
///
/// ```
/// use querykit_core::ranges::DateTimeRange;
///
/// let range = DateTimeRange::from_string("[2012-01-01T12:30:00, 2012-01-01T12:33:00]").unwrap();
/// assert!(range.start_inclusive);
/// assert_eq!(range.isoformat(), "[2012-01-01T12:30:00, 2012-01-01T12:33:00]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeRange {
    /// The lower bound, or `None` for an open start.
    pub start: Option<RangeStamp>,
    /// The upper bound, or `None` for an open end.
    pub end: Option<RangeStamp>,
    /// Whether the lower bound is part of the interval (`[` vs `(`).
    pub start_inclusive: bool,
    /// Whether the upper bound is part of the interval (`]` vs `)`).
    pub end_inclusive: bool,
}

impl DateTimeRange {
    /// Creates an inclusive-inclusive range.
    pub fn new(start: impl Into<RangeStamp>, end: impl Into<RangeStamp>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
            start_inclusive: true,
            end_inclusive: true,
        }
    }

    /// Creates a range with explicit bounds and inclusivity.
    pub const fn with_bounds(
        start: Option<RangeStamp>,
        end: Option<RangeStamp>,
        start_inclusive: bool,
        end_inclusive: bool,
    ) -> Self {
        Self {
            start,
            end,
            start_inclusive,
            end_inclusive,
        }
    }

    /// Builds a range from a two-element bound sequence (inclusive ends).
    ///
    /// Any other length is rejected with the `invalid_range` code.
    pub fn from_pair(bounds: &[RangeStamp]) -> Result<Self, ValidationError> {
        match bounds {
            [start, end] => Ok(Self::new(*start, *end)),
            _ => Err(ValidationError::new(
                format!("'{bounds:?}' value has to be a list or tuple of two elements."),
                "invalid_range",
            )),
        }
    }

    /// Parses the bracketed text form, e.g. `"[2012-01-01T12:30:00, 2012-01-01T12:33:00)"`.
    ///
    /// An empty string between the delimiters is an open bound. Bad input is
    /// rejected with the `invalid_range_format` code.
    pub fn from_string(value: &str) -> Result<Self, ValidationError> {
        let invalid = || {
            ValidationError::new(
                format!("'{value}' value has to be a valid range format"),
                "invalid_range_format",
            )
        };
        let captures = RANGE_RE.captures(value.trim()).ok_or_else(invalid)?;
        let parse_bound = |raw: &str| -> Result<Option<RangeStamp>, ValidationError> {
            if raw.is_empty() {
                Ok(None)
            } else {
                RangeStamp::parse(raw).map(Some).map_err(|_| invalid())
            }
        };
        Ok(Self {
            start: parse_bound(&captures[2])?,
            end: parse_bound(&captures[3])?,
            start_inclusive: &captures[1] == "[",
            end_inclusive: &captures[4] == "]",
        })
    }

    /// Returns `true` when either bound is timezone-naive.
    pub fn is_naive(&self) -> bool {
        self.start.is_some_and(|s| s.is_naive()) || self.end.is_some_and(|e| e.is_naive())
    }

    /// Replaces naive bounds in place with aware equivalents at the given
    /// offset. Aware bounds are left untouched, so the pass is idempotent.
    pub fn localize(&mut self, offset_seconds: i32) -> Result<(), ValidationError> {
        if let Some(start) = self.start {
            self.start = Some(start.make_aware(offset_seconds)?);
        }
        if let Some(end) = self.end {
            self.end = Some(end.make_aware(offset_seconds)?);
        }
        Ok(())
    }

    /// Renders the range with ISO-8601 (`T`-separated) bounds. This is the
    /// serialized form and round-trips through [`from_string`](Self::from_string).
    pub fn isoformat(&self) -> String {
        self.render(RangeStamp::isoformat)
    }

    fn render(&self, bound: impl Fn(&RangeStamp) -> String) -> String {
        format!(
            "{}{}, {}{}",
            if self.start_inclusive { '[' } else { '(' },
            self.start.as_ref().map(&bound).unwrap_or_default(),
            self.end.as_ref().map(&bound).unwrap_or_default(),
            if self.end_inclusive { ']' } else { ')' },
        )
    }
}

impl fmt::Display for DateTimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(ToString::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn aware(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, offset: i32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset)
            .unwrap()
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .unwrap()
    }

    // ── RangeStamp ───────────────────────────────────────────────────

    #[test]
    fn test_stamp_parse_naive_t_separator() {
        let stamp = RangeStamp::parse("2012-01-01T12:30:00").unwrap();
        assert_eq!(stamp, RangeStamp::Naive(naive(2012, 1, 1, 12, 30, 0)));
    }

    #[test]
    fn test_stamp_parse_naive_space_separator() {
        let stamp = RangeStamp::parse("2006-06-16 12:00:00").unwrap();
        assert_eq!(stamp, RangeStamp::Naive(naive(2006, 6, 16, 12, 0, 0)));
    }

    #[test]
    fn test_stamp_parse_aware() {
        let stamp = RangeStamp::parse("2005-07-28T10:00:00+00:00").unwrap();
        assert_eq!(stamp, RangeStamp::Aware(aware(2005, 7, 28, 10, 0, 0, 0)));
    }

    #[test]
    fn test_stamp_parse_date_only() {
        let stamp = RangeStamp::parse("2012-01-01").unwrap();
        assert_eq!(stamp, RangeStamp::Naive(naive(2012, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_stamp_parse_invalid() {
        let err = RangeStamp::parse("not a datetime").unwrap_err();
        assert_eq!(err.code, "invalid");
    }

    #[test]
    fn test_stamp_isoformat_naive() {
        let stamp = RangeStamp::Naive(naive(2005, 7, 28, 10, 10, 0));
        assert_eq!(stamp.isoformat(), "2005-07-28T10:10:00");
    }

    #[test]
    fn test_stamp_isoformat_aware() {
        let stamp = RangeStamp::Aware(aware(2005, 7, 28, 10, 0, 0, 7200));
        assert_eq!(stamp.isoformat(), "2005-07-28T10:00:00+02:00");
    }

    #[test]
    fn test_stamp_display_uses_space() {
        let stamp = RangeStamp::Aware(aware(2006, 6, 16, 10, 0, 0, 0));
        assert_eq!(stamp.to_string(), "2006-06-16 10:00:00+00:00");
    }

    #[test]
    fn test_stamp_make_aware_shifts_naive_only() {
        let stamp = RangeStamp::Naive(naive(2005, 7, 28, 10, 0, 0));
        let localized = stamp.make_aware(7200).unwrap();
        assert_eq!(localized, RangeStamp::Aware(aware(2005, 7, 28, 10, 0, 0, 7200)));
        // Already-aware stamps keep their offset.
        assert_eq!(localized.make_aware(0).unwrap(), localized);
    }

    // ── DateTimeRange parsing and rendering ──────────────────────────

    #[test]
    fn test_round_trip_iso() {
        let text = "[2012-01-01T12:30:00, 2012-01-01T12:33:00]";
        let range = DateTimeRange::from_string(text).unwrap();
        assert_eq!(range.isoformat(), text);
    }

    #[test]
    fn test_round_trip_mixed_brackets() {
        let text = "(2006-06-16T12:30:00, 2006-06-16T13:00:00]";
        let range = DateTimeRange::from_string(text).unwrap();
        assert!(!range.start_inclusive);
        assert!(range.end_inclusive);
        assert_eq!(range.isoformat(), text);
    }

    #[test]
    fn test_round_trip_aware_bounds() {
        let text = "[2005-07-28T10:00:00+00:00, 2005-07-28T10:10:00+00:00]";
        let range = DateTimeRange::from_string(text).unwrap();
        assert!(!range.is_naive());
        assert_eq!(range.isoformat(), text);
    }

    #[test]
    fn test_open_bounds_render_empty() {
        let range = DateTimeRange::with_bounds(
            None,
            Some(RangeStamp::Naive(naive(2012, 1, 1, 0, 0, 0))),
            true,
            false,
        );
        assert_eq!(range.isoformat(), "[, 2012-01-01T00:00:00)");
        let parsed = DateTimeRange::from_string("[, 2012-01-01T00:00:00)").unwrap();
        assert_eq!(parsed, range);
    }

    #[test]
    fn test_display_uses_space_separator() {
        let range = DateTimeRange::new(naive(2005, 7, 28, 10, 0, 0), naive(2005, 7, 28, 10, 10, 0));
        assert_eq!(
            range.to_string(),
            "[2005-07-28 10:00:00, 2005-07-28 10:10:00]"
        );
    }

    #[test]
    fn test_from_string_bad_format() {
        let err = DateTimeRange::from_string("xxxx").unwrap_err();
        assert_eq!(err.code, "invalid_range_format");
    }

    #[test]
    fn test_from_string_bad_bound() {
        let err = DateTimeRange::from_string("[bogus, 2012-01-01T00:00:00]").unwrap_err();
        assert_eq!(err.code, "invalid_range_format");
    }

    #[test]
    fn test_from_pair() {
        let start = RangeStamp::Naive(naive(2012, 1, 1, 12, 30, 0));
        let end = RangeStamp::Naive(naive(2012, 1, 1, 12, 33, 0));
        let range = DateTimeRange::from_pair(&[start, end]).unwrap();
        assert_eq!(range.start, Some(start));
        assert_eq!(range.end, Some(end));
        assert!(range.start_inclusive && range.end_inclusive);
    }

    #[test]
    fn test_from_pair_wrong_length() {
        let err = DateTimeRange::from_pair(&[RangeStamp::Naive(naive(2012, 1, 1, 0, 0, 0))])
            .unwrap_err();
        assert_eq!(err.code, "invalid_range");
    }

    // ── Equality ─────────────────────────────────────────────────────

    #[test]
    fn test_equality_requires_all_four_fields() {
        let a = DateTimeRange::new(naive(2012, 1, 1, 12, 30, 0), naive(2012, 1, 1, 12, 33, 0));
        let mut b = a.clone();
        assert_eq!(a, b);
        b.end_inclusive = false;
        assert_ne!(a, b);
    }

    #[test]
    fn test_naive_and_aware_bounds_are_distinct() {
        let naive_range =
            DateTimeRange::new(naive(2012, 1, 1, 12, 30, 0), naive(2012, 1, 1, 12, 33, 0));
        let aware_range = DateTimeRange::new(
            aware(2012, 1, 1, 12, 30, 0, 0),
            aware(2012, 1, 1, 12, 33, 0, 0),
        );
        assert_ne!(naive_range, aware_range);
    }

    // ── Localization ─────────────────────────────────────────────────

    #[test]
    fn test_localize_naive_bounds() {
        let mut range =
            DateTimeRange::new(naive(2005, 7, 28, 10, 0, 0), naive(2005, 7, 28, 10, 10, 0));
        assert!(range.is_naive());
        range.localize(2 * 3600).unwrap();
        assert!(!range.is_naive());
        assert_eq!(
            range.start,
            Some(RangeStamp::Aware(aware(2005, 7, 28, 10, 0, 0, 7200)))
        );
        assert_eq!(
            range.end,
            Some(RangeStamp::Aware(aware(2005, 7, 28, 10, 10, 0, 7200)))
        );
    }

    #[test]
    fn test_localize_is_idempotent_on_aware_bounds() {
        let mut range = DateTimeRange::new(
            aware(2005, 7, 28, 10, 0, 0, 0),
            aware(2005, 7, 28, 10, 10, 0, 0),
        );
        let before = range.clone();
        range.localize(2 * 3600).unwrap();
        assert_eq!(range, before);
    }
}
