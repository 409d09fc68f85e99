//! Backend SQL idioms and the connection handle used during compilation.
//!
//! [`Connection`] carries everything the WHERE-clause compiler needs to know
//! about the target database: the operator table (lookup name to SQL
//! template), casting templates, LIKE/iexact value preparation, IN-list
//! chunking limits, year bounds, date-part extraction, full-text and regex
//! templates, and the timezone policy. All templates use `%s` positional
//! placeholders; the compiler splices sub-query SQL into them and leaves the
//! remaining `%s` markers for the parameter list.
//!
//! No I/O happens here: a `Connection` is a bag of backend knowledge, not a
//! socket.

use chrono::NaiveDate;
use querykit_core::ranges::DateTimeRange;
use querykit_core::settings::Settings;
use querykit_core::{QueryError, QueryResult};

use crate::value::Value;

/// The type of database backend, determining SQL syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// PostgreSQL.
    Postgres,
    /// SQLite.
    Sqlite,
    /// MySQL.
    Mysql,
}

/// A compilation-time handle describing one database.
///
/// # Examples
///
/// ```
/// use querykit_db::backend::{Backend, Connection};
///
/// let conn = Connection::new(Backend::Postgres);
/// assert_eq!(conn.operator("exact"), Some("= %s"));
/// assert_eq!(conn.operator("icontains"), Some("ILIKE %s"));
/// ```
#[derive(Debug, Clone)]
pub struct Connection {
    backend: Backend,
    max_in_list_size: Option<usize>,
    use_tz: bool,
    timezone_offset_secs: i32,
}

impl Connection {
    /// Creates a connection description with the backend's defaults.
    pub const fn new(backend: Backend) -> Self {
        Self {
            backend,
            // SQLite enforces a hard ceiling on bound variables per statement.
            max_in_list_size: match backend {
                Backend::Sqlite => Some(999),
                Backend::Postgres | Backend::Mysql => None,
            },
            use_tz: false,
            timezone_offset_secs: 0,
        }
    }

    /// Creates a connection description taking the timezone policy from
    /// settings.
    pub fn from_settings(backend: Backend, settings: &Settings) -> Self {
        let mut conn = Self::new(backend);
        conn.use_tz = settings.use_tz;
        conn.timezone_offset_secs = settings.time_zone_offset_secs;
        conn
    }

    /// Overrides the maximum number of values per `IN (...)` group.
    #[must_use]
    pub const fn with_max_in_list_size(mut self, size: Option<usize>) -> Self {
        self.max_in_list_size = size;
        self
    }

    /// Enables timezone awareness with the given default offset.
    #[must_use]
    pub const fn with_timezone(mut self, offset_secs: i32) -> Self {
        self.use_tz = true;
        self.timezone_offset_secs = offset_secs;
        self
    }

    /// The backend this connection compiles for.
    pub const fn backend(&self) -> Backend {
        self.backend
    }

    /// Whether datetimes are timezone-aware on this connection.
    pub const fn use_tz(&self) -> bool {
        self.use_tz
    }

    /// The default timezone offset in seconds east of UTC.
    pub const fn timezone_offset_secs(&self) -> i32 {
        self.timezone_offset_secs
    }

    /// Quotes an identifier for this backend. Plain lowercase-or-alias
    /// identifiers (letters, digits, underscores, not digit-leading) pass
    /// through bare; anything else gets the backend quote character.
    pub fn quote_name(&self, name: &str) -> String {
        let simple = !name.is_empty()
            && !name.starts_with(|c: char| c.is_ascii_digit())
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if simple {
            return name.to_string();
        }
        match self.backend {
            Backend::Postgres | Backend::Sqlite => format!("\"{name}\""),
            Backend::Mysql => format!("`{name}`"),
        }
    }

    /// Looks up the SQL template for an operator-table lookup. `None` means
    /// the backend has no native operator for that lookup name.
    pub fn operator(&self, lookup: &str) -> Option<&'static str> {
        match self.backend {
            Backend::Postgres => match lookup {
                "exact" => Some("= %s"),
                "iexact" => Some("= UPPER(%s)"),
                "contains" | "startswith" | "endswith" => Some("LIKE %s"),
                "icontains" | "istartswith" | "iendswith" => Some("ILIKE %s"),
                "gt" => Some("> %s"),
                "gte" => Some(">= %s"),
                "lt" => Some("< %s"),
                "lte" => Some("<= %s"),
                "regex" => Some("~ %s"),
                "iregex" => Some("~* %s"),
                "range_contains" => Some("@> %s"),
                "range_overlaps" => Some("&& %s"),
                _ => None,
            },
            Backend::Sqlite => match lookup {
                "exact" => Some("= %s"),
                "iexact" | "contains" | "icontains" | "startswith" | "istartswith"
                | "endswith" | "iendswith" => Some("LIKE %s ESCAPE '\\'"),
                "gt" => Some("> %s"),
                "gte" => Some(">= %s"),
                "lt" => Some("< %s"),
                "lte" => Some("<= %s"),
                _ => None,
            },
            Backend::Mysql => match lookup {
                "exact" => Some("= %s"),
                "iexact" | "icontains" | "istartswith" | "iendswith" => Some("LIKE %s"),
                "contains" | "startswith" | "endswith" => Some("LIKE BINARY %s"),
                "gt" => Some("> %s"),
                "gte" => Some(">= %s"),
                "lt" => Some("< %s"),
                "lte" => Some("<= %s"),
                "regex" => Some("REGEXP BINARY %s"),
                "iregex" => Some("REGEXP %s"),
                _ => None,
            },
        }
    }

    /// A template applied to the column reference itself. Hook for backends
    /// that must cast certain column types before comparing; identity here.
    pub fn field_cast_sql(&self, _db_type: Option<&str>) -> &'static str {
        "%s"
    }

    /// The cast template used when the compared value is a datetime.
    /// SQLite stores datetimes as text and normalizes through `datetime()`.
    pub const fn datetime_cast_sql(&self) -> &'static str {
        match self.backend {
            Backend::Sqlite => "datetime(%s)",
            Backend::Postgres | Backend::Mysql => "%s",
        }
    }

    /// A template wrapping the LHS for specific lookups. PostgreSQL
    /// case-folds the column for `iexact` to pair with its `= UPPER(%s)`
    /// operator.
    pub fn lookup_cast(&self, lookup: &str) -> &'static str {
        match (self.backend, lookup) {
            (Backend::Postgres, "iexact") => "UPPER(%s)",
            _ => "%s",
        }
    }

    /// The maximum number of values one `IN (...)` group may hold, or `None`
    /// for no limit.
    pub const fn max_in_list_size(&self) -> Option<usize> {
        self.max_in_list_size
    }

    /// The `[first, last]` datetime bounds covering a calendar year, for
    /// `BETWEEN` rendering of the `year` lookup on datetime columns.
    pub fn year_lookup_bounds(&self, year: i32) -> QueryResult<(Value, Value)> {
        let first = NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        let last = NaiveDate::from_ymd_opt(year, 12, 31)
            .and_then(|d| d.and_hms_micro_opt(23, 59, 59, 999_999));
        match (first, last) {
            (Some(first), Some(last)) => Ok((Value::DateTime(first), Value::DateTime(last))),
            _ => Err(QueryError::InvalidLookupValue {
                lookup: "year".to_string(),
                reason: format!("{year} is out of range"),
            }),
        }
    }

    /// Like [`year_lookup_bounds`](Self::year_lookup_bounds) but producing
    /// date bounds for date-only columns.
    pub fn year_lookup_bounds_for_date_field(&self, year: i32) -> QueryResult<(Value, Value)> {
        let first = NaiveDate::from_ymd_opt(year, 1, 1);
        let last = NaiveDate::from_ymd_opt(year, 12, 31);
        match (first, last) {
            (Some(first), Some(last)) => Ok((Value::Date(first), Value::Date(last))),
            _ => Err(QueryError::InvalidLookupValue {
                lookup: "year".to_string(),
                reason: format!("{year} is out of range"),
            }),
        }
    }

    /// SQL extracting a date part (`month`, `day`, `week_day`) from the
    /// given column SQL. Week days are 1 (Sunday) through 7 (Saturday) on
    /// every backend.
    pub fn date_extract_sql(&self, part: &str, lhs: &str) -> QueryResult<String> {
        let sql = match (self.backend, part) {
            (Backend::Postgres, "month") => format!("EXTRACT(MONTH FROM {lhs})"),
            (Backend::Postgres, "day") => format!("EXTRACT(DAY FROM {lhs})"),
            (Backend::Postgres, "week_day") => format!("EXTRACT(DOW FROM {lhs}) + 1"),
            (Backend::Sqlite, "month") => format!("CAST(strftime('%m', {lhs}) AS INTEGER)"),
            (Backend::Sqlite, "day") => format!("CAST(strftime('%d', {lhs}) AS INTEGER)"),
            (Backend::Sqlite, "week_day") => {
                format!("CAST(strftime('%w', {lhs}) AS INTEGER) + 1")
            }
            (Backend::Mysql, "month") => format!("MONTH({lhs})"),
            (Backend::Mysql, "day") => format!("DAYOFMONTH({lhs})"),
            (Backend::Mysql, "week_day") => format!("DAYOFWEEK({lhs})"),
            (_, other) => {
                return Err(QueryError::InvalidLookupValue {
                    lookup: other.to_string(),
                    reason: "unknown date part".to_string(),
                })
            }
        };
        Ok(sql)
    }

    /// Escapes a value destined for a LIKE pattern: backslash first, then
    /// the `%` and `_` wildcards.
    pub fn prep_for_like_query(&self, value: &str) -> String {
        value
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    }

    /// Prepares a value for the `iexact` lookup. Backends that compare via
    /// LIKE must neutralize wildcards; PostgreSQL compares with `= UPPER`
    /// and takes the value untouched.
    pub fn prep_for_iexact_query(&self, value: &str) -> String {
        match self.backend {
            Backend::Postgres => value.to_string(),
            Backend::Sqlite | Backend::Mysql => self.prep_for_like_query(value),
        }
    }

    /// The full-text search template for this backend.
    pub fn fulltext_search_sql(&self, lhs: &str) -> QueryResult<String> {
        match self.backend {
            Backend::Mysql => Ok(format!("MATCH ({lhs}) AGAINST (%s IN BOOLEAN MODE)")),
            Backend::Postgres => Ok(format!("to_tsvector({lhs}) @@ plainto_tsquery(%s)")),
            Backend::Sqlite => Err(QueryError::NotSupported(
                "full-text search is not available on SQLite".to_string(),
            )),
        }
    }

    /// The fallback regex template for backends with no native regex
    /// operator. SQLite routes through its user-registered REGEXP function.
    pub fn regex_lookup(&self, lookup: &str, lhs: &str) -> QueryResult<String> {
        match (self.backend, lookup) {
            (Backend::Sqlite, "regex") => Ok(format!("{lhs} REGEXP %s")),
            (Backend::Sqlite, "iregex") => Ok(format!("{lhs} REGEXP '(?i)' || %s")),
            _ => Err(QueryError::NotSupported(format!(
                "no regex fallback for lookup '{lookup}' on this backend"
            ))),
        }
    }

    /// Renders a range value as the literal the backend stores, with
    /// inclusivity brackets and ISO-8601 bounds.
    pub fn value_to_db_datetimerange(&self, range: &DateTimeRange) -> String {
        format!(
            "{}{},{}{}",
            if range.start_inclusive { '[' } else { '(' },
            range.start.as_ref().map(|s| s.isoformat()).unwrap_or_default(),
            range.end.as_ref().map(|e| e.isoformat()).unwrap_or_default(),
            if range.end_inclusive { ']' } else { ')' },
        )
    }
}
