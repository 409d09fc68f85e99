//! Lookups: named comparison operators and their SQL synthesis.
//!
//! A [`Lookup`] turns `(column reference, value annotation, operand)` into a
//! SQL fragment plus bound parameters. Three things happen on the way:
//!
//! 1. The LHS is rendered — a quoted `alias.column` or an aggregate's own
//!    SQL — and run through the backend's field cast.
//! 2. The RHS is normalized into properly typed parameters, according to the
//!    lookup's [`RhsPrepare`] mode. Field-aware modes delegate to the field
//!    so individual lookups never carry per-type conversion rules.
//! 3. The variant synthesizes the constraint, usually via the backend
//!    operator table.
//!
//! Lookup objects are stateless and immutable; they are shared as
//! `Arc<dyn Lookup>` and cloning one is an identity operation. A lookup is
//! always against a single column.

use std::fmt;

use querykit_core::{QueryError, QueryResult};

use crate::backend::Connection;
use crate::fields::{FieldDef, FieldType};
use crate::query::expressions::{Lhs, Operand, ValueAnnotation};
use crate::value::Value;

/// Outcome of compiling a single predicate: either SQL, or the signal that
/// the predicate can never match any row. The latter is an expected result,
/// not an error, so the enclosing tree folds over it directly.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomSql {
    /// The predicate matches no rows; the enclosing tree short-circuits.
    Nothing,
    /// A SQL fragment with `%s` placeholders and its parameters.
    Sql {
        /// The SQL fragment.
        sql: String,
        /// The bound parameters, in placeholder order.
        params: Vec<Value>,
    },
}

/// How the right-hand side of a lookup becomes database parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RhsPrepare {
    /// Use the single value as-is.
    Raw,
    /// The single value must be prepared by the field.
    FieldPrepare,
    /// Prepare each element of a candidate list separately.
    ListFieldPrepare,
}

/// A normalized right-hand side. A closed set: which variant applies is
/// decided by construction, not by probing the value at compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedValue {
    /// One DB-ready parameter.
    Scalar(Value),
    /// Element-wise prepared parameters, order preserved.
    List(Vec<Value>),
    /// Two prepared BETWEEN bounds.
    Bounds {
        /// The lower bound.
        low: Value,
        /// The upper bound.
        high: Value,
    },
    /// Sub-query SQL spliced in place of the parameter placeholder.
    Sql {
        /// The parenthesized sub-query SQL.
        sql: String,
        /// Parameters bound inside the sub-query.
        params: Vec<Value>,
    },
}

/// Normalizes a raw operand for a lookup. Returns `Ok(None)` when the value
/// itself proves the predicate can never match (a sub-query that matches
/// nothing).
pub fn normalize_rhs(
    lookup_name: &str,
    mode: RhsPrepare,
    value: &Operand,
    field: Option<&FieldDef>,
    conn: &Connection,
) -> QueryResult<Option<NormalizedValue>> {
    let prepare = |v: &Value| -> QueryResult<Value> {
        match field {
            Some(field) => field.get_db_prep_value(v.clone(), conn, false),
            None => Ok(v.clone()),
        }
    };
    match value {
        Operand::Subquery(sub) => match sub.as_sql(conn)? {
            AtomSql::Nothing => Ok(None),
            AtomSql::Sql { sql, params } => Ok(Some(NormalizedValue::Sql {
                sql: format!("({sql})"),
                params,
            })),
        },
        Operand::Raw(wrapper) => Ok(Some(NormalizedValue::Sql {
            sql: wrapper.sql.clone(),
            params: wrapper.params.clone(),
        })),
        Operand::Object(obj) => Err(QueryError::InvalidLookupValue {
            lookup: lookup_name.to_string(),
            reason: format!("unresolved model reference to '{}'", obj.model),
        }),
        Operand::Value(v) => match mode {
            RhsPrepare::Raw => Ok(Some(NormalizedValue::Scalar(v.clone()))),
            RhsPrepare::FieldPrepare => Ok(Some(NormalizedValue::Scalar(prepare(v)?))),
            RhsPrepare::ListFieldPrepare => Err(QueryError::InvalidLookupValue {
                lookup: lookup_name.to_string(),
                reason: "expected a list of candidate values".to_string(),
            }),
        },
        Operand::List(items) => match mode {
            RhsPrepare::ListFieldPrepare => {
                let mut prepared = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Operand::Value(v) => prepared.push(prepare(v)?),
                        other => {
                            return Err(QueryError::InvalidLookupValue {
                                lookup: lookup_name.to_string(),
                                reason: format!("nested non-scalar candidate {other:?}"),
                            })
                        }
                    }
                }
                Ok(Some(NormalizedValue::List(prepared)))
            }
            RhsPrepare::Raw | RhsPrepare::FieldPrepare => Err(QueryError::InvalidLookupValue {
                lookup: lookup_name.to_string(),
                reason: "a single value is expected".to_string(),
            }),
        },
    }
}

/// A named comparison operator plus the logic to compile it to SQL.
///
/// Implementations are immutable value objects with no per-call state, so a
/// single instance is safely shared across trees and threads.
pub trait Lookup: fmt::Debug + Send + Sync {
    /// The operator name, e.g. `"exact"` or `"in"`.
    fn lookup_name(&self) -> &'static str;

    /// The RHS preparation mode for this lookup.
    fn rhs_prepare(&self) -> RhsPrepare {
        RhsPrepare::Raw
    }

    /// Value transformation hook run when the predicate is added to a where
    /// tree, before the value is frozen. The default keeps the value as-is.
    fn prep(&self, field: &FieldDef, value: Operand) -> QueryResult<Operand> {
        let _ = field;
        Ok(value)
    }

    /// Per-lookup normalization hook applied after the common pass.
    fn normalize_value(
        &self,
        value: NormalizedValue,
        field: Option<&FieldDef>,
        conn: &Connection,
    ) -> QueryResult<NormalizedValue> {
        let _ = (field, conn);
        Ok(value)
    }

    /// Renders the left-hand side and applies the backend's field cast.
    fn prepare_lhs(&self, lhs: &Lhs, conn: &Connection) -> String {
        let base = lhs.as_sql(conn);
        let db_type = lhs.field().map(|f| f.db_type(conn.backend()));
        conn.field_cast_sql(db_type.as_deref()).replacen("%s", &base, 1)
    }

    /// The cast template wrapping each parameter placeholder.
    fn cast_sql(&self, annotation: ValueAnnotation, conn: &Connection) -> &'static str {
        if annotation == ValueAnnotation::Datetime {
            conn.datetime_cast_sql()
        } else {
            "%s"
        }
    }

    /// Compiles the full predicate. The default pipeline covers every lookup
    /// that compares a rendered LHS against prepared parameters.
    fn make_atom(
        &self,
        lhs: &Lhs,
        annotation: ValueAnnotation,
        value: &Operand,
        conn: &Connection,
    ) -> QueryResult<AtomSql> {
        let lhs_sql = self.prepare_lhs(lhs, conn);
        let field: Option<&FieldDef> = lhs.field().map(|f| &**f);
        let normalized =
            match normalize_rhs(self.lookup_name(), self.rhs_prepare(), value, field, conn) {
                Ok(Some(normalized)) => normalized,
                Ok(None) => return Ok(AtomSql::Nothing),
                // A vanished related object means the predicate cannot match.
                Err(QueryError::DoesNotExist(_)) => return Ok(AtomSql::Nothing),
                Err(err) => return Err(err),
            };
        let normalized = self.normalize_value(normalized, field, conn)?;
        let cast = self.cast_sql(annotation, conn);
        let (rhs_format, params) = match normalized {
            NormalizedValue::Sql { sql, params } => (cast.replacen("%s", &sql, 1), params),
            NormalizedValue::Scalar(v) => (cast.to_string(), vec![v]),
            NormalizedValue::List(values) => (cast.to_string(), values),
            NormalizedValue::Bounds { low, high } => (cast.to_string(), vec![low, high]),
        };
        self.as_sql(&lhs_sql, &rhs_format, params, annotation, conn)
    }

    /// Variant-specific SQL synthesis.
    fn as_sql(
        &self,
        lhs_sql: &str,
        rhs_format: &str,
        params: Vec<Value>,
        annotation: ValueAnnotation,
        conn: &Connection,
    ) -> QueryResult<AtomSql>;

    /// The standard operator-table path: `lhs <operator-template>` with the
    /// backend's lookup cast applied to the LHS.
    fn operator_as_sql(
        &self,
        lhs_sql: &str,
        rhs_format: &str,
        params: Vec<Value>,
        conn: &Connection,
    ) -> QueryResult<AtomSql> {
        let Some(template) = conn.operator(self.lookup_name()) else {
            return Err(QueryError::NotSupported(format!(
                "lookup '{}' has no operator on this backend",
                self.lookup_name()
            )));
        };
        let lhs_sql = conn
            .lookup_cast(self.lookup_name())
            .replacen("%s", lhs_sql, 1);
        let rhs_sql = template.replacen("%s", rhs_format, 1);
        Ok(AtomSql::Sql {
            sql: format!("{lhs_sql} {rhs_sql}"),
            params,
        })
    }
}

// ── Operator-table lookups ─────────────────────────────────────────────

/// A lookup whose SQL comes straight from the backend operator table.
#[derive(Debug, Clone, Copy)]
pub struct SimpleLookup {
    name: &'static str,
    rhs: RhsPrepare,
}

impl SimpleLookup {
    /// Declares an operator-table lookup.
    pub const fn new(name: &'static str, rhs: RhsPrepare) -> Self {
        Self { name, rhs }
    }
}

impl Lookup for SimpleLookup {
    fn lookup_name(&self) -> &'static str {
        self.name
    }

    fn rhs_prepare(&self) -> RhsPrepare {
        self.rhs
    }

    fn as_sql(
        &self,
        lhs_sql: &str,
        rhs_format: &str,
        params: Vec<Value>,
        _annotation: ValueAnnotation,
        conn: &Connection,
    ) -> QueryResult<AtomSql> {
        self.operator_as_sql(lhs_sql, rhs_format, params, conn)
    }
}

/// Exact match.
pub const EXACT: SimpleLookup = SimpleLookup::new("exact", RhsPrepare::FieldPrepare);
/// Greater than.
pub const GT: SimpleLookup = SimpleLookup::new("gt", RhsPrepare::FieldPrepare);
/// Greater than or equal.
pub const GTE: SimpleLookup = SimpleLookup::new("gte", RhsPrepare::FieldPrepare);
/// Less than.
pub const LT: SimpleLookup = SimpleLookup::new("lt", RhsPrepare::FieldPrepare);
/// Less than or equal.
pub const LTE: SimpleLookup = SimpleLookup::new("lte", RhsPrepare::FieldPrepare);
/// Range containment for range columns (`@>`). The field renders the range
/// literal, so this is a plain operator lookup.
pub const RANGE_CONTAINS: SimpleLookup =
    SimpleLookup::new("range_contains", RhsPrepare::FieldPrepare);
/// Range overlap for range columns (`&&`).
pub const RANGE_OVERLAPS: SimpleLookup =
    SimpleLookup::new("range_overlaps", RhsPrepare::FieldPrepare);

// ── Pattern lookups ────────────────────────────────────────────────────

/// LIKE-style lookups: the raw value is escaped and wrapped in a wildcard
/// pattern. Case-insensitive variants are separate names sharing the same
/// pattern logic; the operator table supplies the case handling.
#[derive(Debug, Clone, Copy)]
pub struct PatternLookup {
    name: &'static str,
    prefix: &'static str,
    suffix: &'static str,
}

impl PatternLookup {
    /// Declares a pattern lookup with the given wildcard placement.
    pub const fn new(name: &'static str, prefix: &'static str, suffix: &'static str) -> Self {
        Self {
            name,
            prefix,
            suffix,
        }
    }
}

impl Lookup for PatternLookup {
    fn lookup_name(&self) -> &'static str {
        self.name
    }

    fn normalize_value(
        &self,
        value: NormalizedValue,
        _field: Option<&FieldDef>,
        conn: &Connection,
    ) -> QueryResult<NormalizedValue> {
        match value {
            NormalizedValue::Scalar(v) => {
                let text = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                let escaped = conn.prep_for_like_query(&text);
                Ok(NormalizedValue::Scalar(Value::String(format!(
                    "{}{escaped}{}",
                    self.prefix, self.suffix
                ))))
            }
            other => Ok(other),
        }
    }

    fn as_sql(
        &self,
        lhs_sql: &str,
        rhs_format: &str,
        params: Vec<Value>,
        _annotation: ValueAnnotation,
        conn: &Connection,
    ) -> QueryResult<AtomSql> {
        self.operator_as_sql(lhs_sql, rhs_format, params, conn)
    }
}

/// Substring match.
pub const CONTAINS: PatternLookup = PatternLookup::new("contains", "%", "%");
/// Case-insensitive substring match.
pub const ICONTAINS: PatternLookup = PatternLookup::new("icontains", "%", "%");
/// Prefix match.
pub const STARTSWITH: PatternLookup = PatternLookup::new("startswith", "", "%");
/// Case-insensitive prefix match.
pub const ISTARTSWITH: PatternLookup = PatternLookup::new("istartswith", "", "%");
/// Suffix match.
pub const ENDSWITH: PatternLookup = PatternLookup::new("endswith", "%", "");
/// Case-insensitive suffix match.
pub const IENDSWITH: PatternLookup = PatternLookup::new("iendswith", "%", "");

// ── Case-insensitive exact ─────────────────────────────────────────────

/// Case-insensitive exact match. The backend decides whether that means
/// case-folding (`= UPPER(%s)`) or a LIKE comparison with neutralized
/// wildcards.
#[derive(Debug, Clone, Copy)]
pub struct IExact;

impl Lookup for IExact {
    fn lookup_name(&self) -> &'static str {
        "iexact"
    }

    fn normalize_value(
        &self,
        value: NormalizedValue,
        _field: Option<&FieldDef>,
        conn: &Connection,
    ) -> QueryResult<NormalizedValue> {
        match value {
            NormalizedValue::Scalar(v) => {
                let text = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                Ok(NormalizedValue::Scalar(Value::String(
                    conn.prep_for_iexact_query(&text),
                )))
            }
            other => Ok(other),
        }
    }

    fn as_sql(
        &self,
        lhs_sql: &str,
        rhs_format: &str,
        params: Vec<Value>,
        _annotation: ValueAnnotation,
        conn: &Connection,
    ) -> QueryResult<AtomSql> {
        self.operator_as_sql(lhs_sql, rhs_format, params, conn)
    }
}

// ── NULL test ──────────────────────────────────────────────────────────

/// `IS NULL` / `IS NOT NULL`. Never consumes a parameter: only the truthy
/// annotation decides the NOT.
#[derive(Debug, Clone, Copy)]
pub struct IsNull;

impl Lookup for IsNull {
    fn lookup_name(&self) -> &'static str {
        "isnull"
    }

    fn make_atom(
        &self,
        lhs: &Lhs,
        annotation: ValueAnnotation,
        _value: &Operand,
        conn: &Connection,
    ) -> QueryResult<AtomSql> {
        let lhs_sql = self.prepare_lhs(lhs, conn);
        let sql = if annotation.is_truthy() {
            format!("{lhs_sql} IS NULL")
        } else {
            format!("{lhs_sql} IS NOT NULL")
        };
        Ok(AtomSql::Sql {
            sql,
            params: Vec::new(),
        })
    }

    fn as_sql(
        &self,
        lhs_sql: &str,
        _rhs_format: &str,
        _params: Vec<Value>,
        annotation: ValueAnnotation,
        _conn: &Connection,
    ) -> QueryResult<AtomSql> {
        let sql = if annotation.is_truthy() {
            format!("{lhs_sql} IS NULL")
        } else {
            format!("{lhs_sql} IS NOT NULL")
        };
        Ok(AtomSql::Sql {
            sql,
            params: Vec::new(),
        })
    }
}

// ── BETWEEN lookups ────────────────────────────────────────────────────

/// `BETWEEN` over two field-prepared bounds.
#[derive(Debug, Clone, Copy)]
pub struct RangeLookup;

impl Lookup for RangeLookup {
    fn lookup_name(&self) -> &'static str {
        "range"
    }

    fn rhs_prepare(&self) -> RhsPrepare {
        RhsPrepare::ListFieldPrepare
    }

    fn normalize_value(
        &self,
        value: NormalizedValue,
        _field: Option<&FieldDef>,
        _conn: &Connection,
    ) -> QueryResult<NormalizedValue> {
        match value {
            NormalizedValue::List(values) => {
                let mut values = values.into_iter();
                match (values.next(), values.next(), values.next()) {
                    (Some(low), Some(high), None) => Ok(NormalizedValue::Bounds { low, high }),
                    _ => Err(QueryError::InvalidLookupValue {
                        lookup: "range".to_string(),
                        reason: "exactly two bounds are expected".to_string(),
                    }),
                }
            }
            other => Ok(other),
        }
    }

    fn as_sql(
        &self,
        lhs_sql: &str,
        rhs_format: &str,
        params: Vec<Value>,
        _annotation: ValueAnnotation,
        _conn: &Connection,
    ) -> QueryResult<AtomSql> {
        Ok(AtomSql::Sql {
            sql: format!("{lhs_sql} BETWEEN {rhs_format} AND {rhs_format}"),
            params,
        })
    }
}

/// Calendar-year lookup: the backend supplies the bound pair, date columns
/// getting date bounds and datetime columns getting datetime bounds.
#[derive(Debug, Clone, Copy)]
pub struct Year;

impl Lookup for Year {
    fn lookup_name(&self) -> &'static str {
        "year"
    }

    fn normalize_value(
        &self,
        value: NormalizedValue,
        field: Option<&FieldDef>,
        conn: &Connection,
    ) -> QueryResult<NormalizedValue> {
        let scalar = match value {
            NormalizedValue::Scalar(scalar) => scalar,
            other => return Ok(other),
        };
        let year = scalar
            .as_int()
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(|| QueryError::InvalidLookupValue {
                lookup: "year".to_string(),
                reason: format!("'{scalar}' is not a calendar year"),
            })?;
        let is_date_field =
            field.is_some_and(|f| matches!(f.field_type, FieldType::DateField));
        let (low, high) = if is_date_field {
            conn.year_lookup_bounds_for_date_field(year)?
        } else {
            conn.year_lookup_bounds(year)?
        };
        Ok(NormalizedValue::Bounds { low, high })
    }

    fn as_sql(
        &self,
        lhs_sql: &str,
        rhs_format: &str,
        params: Vec<Value>,
        _annotation: ValueAnnotation,
        _conn: &Connection,
    ) -> QueryResult<AtomSql> {
        Ok(AtomSql::Sql {
            sql: format!("{lhs_sql} BETWEEN {rhs_format} AND {rhs_format}"),
            params,
        })
    }
}

// ── Date-part lookups ──────────────────────────────────────────────────

/// Date-part extraction: `date_extract(part, lhs) = %s`.
#[derive(Debug, Clone, Copy)]
pub struct DatePart {
    name: &'static str,
    part: &'static str,
}

impl DatePart {
    /// Declares a date-part lookup.
    pub const fn new(name: &'static str, part: &'static str) -> Self {
        Self { name, part }
    }
}

impl Lookup for DatePart {
    fn lookup_name(&self) -> &'static str {
        self.name
    }

    fn as_sql(
        &self,
        lhs_sql: &str,
        rhs_format: &str,
        params: Vec<Value>,
        _annotation: ValueAnnotation,
        conn: &Connection,
    ) -> QueryResult<AtomSql> {
        let extract = conn.date_extract_sql(self.part, lhs_sql)?;
        Ok(AtomSql::Sql {
            sql: format!("{extract} = {rhs_format}"),
            params,
        })
    }
}

/// Calendar month (1-12).
pub const MONTH: DatePart = DatePart::new("month", "month");
/// Day of month (1-31).
pub const DAY: DatePart = DatePart::new("day", "day");
/// Day of week, 1 (Sunday) through 7 (Saturday).
pub const WEEK_DAY: DatePart = DatePart::new("week_day", "week_day");

// ── Membership ─────────────────────────────────────────────────────────

/// Membership test with backend IN-list chunking.
///
/// An empty candidate list with no sub-query can never match and
/// short-circuits immediately. Backends with a parameter-count ceiling get
/// the candidate list split into groups, OR-joined:
/// `(lhs IN (…) OR lhs IN (…))`.
#[derive(Debug, Clone, Copy)]
pub struct In;

impl Lookup for In {
    fn lookup_name(&self) -> &'static str {
        "in"
    }

    fn rhs_prepare(&self) -> RhsPrepare {
        RhsPrepare::ListFieldPrepare
    }

    fn make_atom(
        &self,
        lhs: &Lhs,
        annotation: ValueAnnotation,
        value: &Operand,
        conn: &Connection,
    ) -> QueryResult<AtomSql> {
        if !annotation.is_truthy() {
            return Ok(AtomSql::Nothing);
        }
        let lhs_sql = self.prepare_lhs(lhs, conn);
        let field: Option<&FieldDef> = lhs.field().map(|f| &**f);
        let normalized =
            match normalize_rhs(self.lookup_name(), self.rhs_prepare(), value, field, conn) {
                Ok(Some(normalized)) => normalized,
                Ok(None) => return Ok(AtomSql::Nothing),
                Err(QueryError::DoesNotExist(_)) => return Ok(AtomSql::Nothing),
                Err(err) => return Err(err),
            };
        match normalized {
            NormalizedValue::Sql { sql, params } => Ok(AtomSql::Sql {
                sql: format!("{lhs_sql} IN {sql}"),
                params,
            }),
            NormalizedValue::List(values) => self.as_sql(
                &lhs_sql,
                "%s",
                values,
                annotation,
                conn,
            ),
            NormalizedValue::Scalar(_) | NormalizedValue::Bounds { .. } => {
                Err(QueryError::InvalidLookupValue {
                    lookup: "in".to_string(),
                    reason: "expected a list of candidate values".to_string(),
                })
            }
        }
    }

    fn as_sql(
        &self,
        lhs_sql: &str,
        _rhs_format: &str,
        params: Vec<Value>,
        _annotation: ValueAnnotation,
        conn: &Connection,
    ) -> QueryResult<AtomSql> {
        if params.is_empty() {
            return Ok(AtomSql::Nothing);
        }
        let max_size = conn.max_in_list_size().unwrap_or(params.len());
        let group_sql = |size: usize| {
            let placeholders = vec!["%s"; size].join(", ");
            format!("{lhs_sql} IN ({placeholders})")
        };
        let sql = if params.len() > max_size {
            let groups: Vec<String> = params
                .chunks(max_size)
                .map(|chunk| group_sql(chunk.len()))
                .collect();
            format!("({})", groups.join(" OR "))
        } else {
            group_sql(params.len())
        };
        Ok(AtomSql::Sql { sql, params })
    }
}

// ── Full-text search ───────────────────────────────────────────────────

/// Full-text search; the SQL shape is entirely backend-supplied.
#[derive(Debug, Clone, Copy)]
pub struct Search;

impl Lookup for Search {
    fn lookup_name(&self) -> &'static str {
        "search"
    }

    fn rhs_prepare(&self) -> RhsPrepare {
        RhsPrepare::FieldPrepare
    }

    fn as_sql(
        &self,
        lhs_sql: &str,
        _rhs_format: &str,
        params: Vec<Value>,
        _annotation: ValueAnnotation,
        conn: &Connection,
    ) -> QueryResult<AtomSql> {
        let sql = conn.fulltext_search_sql(lhs_sql)?;
        Ok(AtomSql::Sql { sql, params })
    }
}

// ── Regular expressions ────────────────────────────────────────────────

/// Regex match: the backend's native operator when it has one, otherwise the
/// backend's regex-function template.
#[derive(Debug, Clone, Copy)]
pub struct Regex {
    name: &'static str,
}

impl Regex {
    /// Declares a regex lookup under the given name.
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Lookup for Regex {
    fn lookup_name(&self) -> &'static str {
        self.name
    }

    fn as_sql(
        &self,
        lhs_sql: &str,
        rhs_format: &str,
        params: Vec<Value>,
        _annotation: ValueAnnotation,
        conn: &Connection,
    ) -> QueryResult<AtomSql> {
        if conn.operator(self.name).is_some() {
            return self.operator_as_sql(lhs_sql, rhs_format, params, conn);
        }
        let sql = conn.regex_lookup(self.name, lhs_sql)?;
        Ok(AtomSql::Sql { sql, params })
    }
}

/// Case-sensitive regex match.
pub const REGEX: Regex = Regex::new("regex");
/// Case-insensitive regex match.
pub const IREGEX: Regex = Regex::new("iregex");
