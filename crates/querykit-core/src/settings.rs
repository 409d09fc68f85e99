//! Settings for the querykit framework.
//!
//! A trimmed-down configuration surface: debug/logging switches plus the
//! timezone policy that drives naive-datetime handling in the field layer.
//! Connections copy the timezone policy at construction so query compilation
//! stays a pure function of its inputs.

use serde::{Deserialize, Serialize};

/// Framework configuration with sensible defaults.
///
/// # Examples
///
/// ```
/// use querykit_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert!(!settings.use_tz);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled (controls the logging format).
    pub debug: bool,
    /// The log filter directive, e.g. `"info"` or `"querykit_db=debug"`.
    pub log_level: String,
    /// Whether datetimes are timezone-aware. When `true`, naive datetimes
    /// entering the field layer are interpreted in the default timezone and
    /// a warning is emitted.
    pub use_tz: bool,
    /// The default timezone as seconds east of UTC, used to localize naive
    /// datetimes when [`use_tz`](Self::use_tz) is enabled.
    pub time_zone_offset_secs: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            use_tz: false,
            time_zone_offset_secs: 0,
        }
    }
}

impl Settings {
    /// Returns settings with timezone support enabled for the given offset.
    #[must_use]
    pub fn with_timezone(mut self, offset_secs: i32) -> Self {
        self.use_tz = true;
        self.time_zone_offset_secs = offset_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.log_level, "info");
        assert!(!s.use_tz);
        assert_eq!(s.time_zone_offset_secs, 0);
    }

    #[test]
    fn test_with_timezone() {
        let s = Settings::default().with_timezone(2 * 3600);
        assert!(s.use_tz);
        assert_eq!(s.time_zone_offset_secs, 7200);
    }

    #[test]
    fn test_serde_round_trip() {
        let s = Settings::default().with_timezone(3600);
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.use_tz, s.use_tz);
        assert_eq!(back.time_zone_offset_secs, s.time_zone_offset_secs);
    }
}
