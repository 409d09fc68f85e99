//! Field type definitions for the ORM.
//!
//! Each [`FieldType`] variant maps to a SQL column type per backend, and
//! [`FieldDef`] carries the metadata the lookup system needs: the column
//! name, nullability, relation targets, and the value-preparation pipeline
//! (`get_prep_value` / `get_db_prep_value`).

use chrono::NaiveDate;
use querykit_core::ranges::{DateTimeRange, RangeStamp};
use querykit_core::{timezone, QueryResult, ValidationError};
use serde::{Deserialize, Serialize};

use crate::backend::{Backend, Connection};
use crate::query::expressions::Operand;
use crate::value::Value;

/// The type of a model field, determining its SQL column type and behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FieldType {
    /// Auto-incrementing integer primary key.
    AutoField,
    /// 32-bit signed integer.
    IntegerField,
    /// 64-bit signed integer.
    BigIntegerField,
    /// Variable-length string with a max length.
    CharField,
    /// Unlimited-length text.
    TextField,
    /// Boolean (true/false).
    BooleanField,
    /// 64-bit floating-point number.
    FloatField,
    /// Date without time.
    DateField,
    /// Date and time.
    DateTimeField,
    /// UUID field.
    UuidField,
    /// Date-time interval with inclusive/exclusive bounds.
    DateTimeRangeField,
    /// Many-to-one relationship.
    ForeignKey {
        /// The target model name.
        to: String,
        /// The target attribute, defaulting to the primary key.
        to_field: Option<String>,
    },
    /// One-to-one relationship (unique foreign key).
    OneToOneField {
        /// The target model name.
        to: String,
        /// The target attribute, defaulting to the primary key.
        to_field: Option<String>,
    },
}

impl FieldType {
    /// The internal type name, used to key per-field-type lookup registries.
    pub const fn internal_type(&self) -> &'static str {
        match self {
            Self::AutoField => "AutoField",
            Self::IntegerField => "IntegerField",
            Self::BigIntegerField => "BigIntegerField",
            Self::CharField => "CharField",
            Self::TextField => "TextField",
            Self::BooleanField => "BooleanField",
            Self::FloatField => "FloatField",
            Self::DateField => "DateField",
            Self::DateTimeField => "DateTimeField",
            Self::UuidField => "UuidField",
            Self::DateTimeRangeField => "DateTimeRangeField",
            Self::ForeignKey { .. } => "ForeignKey",
            Self::OneToOneField { .. } => "OneToOneField",
        }
    }

    /// Returns `true` for relational field types.
    pub const fn is_relation(&self) -> bool {
        matches!(self, Self::ForeignKey { .. } | Self::OneToOneField { .. })
    }
}

/// Definition of a model field.
///
/// Constructed with builder methods:
///
/// ```
/// use querykit_db::fields::{FieldDef, FieldType};
///
/// let field = FieldDef::new("period", FieldType::DateTimeRangeField)
///     .null()
///     .disallow_overlap();
/// assert!(field.null);
/// assert_eq!(field.column, "period");
/// ```
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// The attribute name of this field.
    pub name: String,
    /// The database column name (may differ from `name`).
    pub column: String,
    /// The type of this field.
    pub field_type: FieldType,
    /// Whether this field is the primary key.
    pub primary_key: bool,
    /// Whether NULL is allowed in the database.
    pub null: bool,
    /// Whether a UNIQUE constraint is applied.
    pub unique: bool,
    /// Maximum character length (for `CharField`).
    pub max_length: Option<usize>,
    /// For range fields: add an exclusion constraint so stored ranges may
    /// never overlap.
    pub disallow_overlap: bool,
}

impl FieldDef {
    /// Creates a field definition with defaults: nullable off, no
    /// constraints, column named after the field.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
            field_type,
            primary_key: false,
            null: false,
            unique: false,
            max_length: None,
            disallow_overlap: false,
        }
    }

    /// Sets the database column name.
    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Marks this field as the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Allows NULL values.
    #[must_use]
    pub const fn null(mut self) -> Self {
        self.null = true;
        self
    }

    /// Applies a UNIQUE constraint.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the maximum character length.
    #[must_use]
    pub const fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Requests a database-level non-overlap constraint (range fields).
    #[must_use]
    pub const fn disallow_overlap(mut self) -> Self {
        self.disallow_overlap = true;
        self
    }

    /// The internal type name of this field.
    pub const fn internal_type(&self) -> &'static str {
        self.field_type.internal_type()
    }

    /// Returns `true` for relational fields.
    pub const fn is_relation(&self) -> bool {
        self.field_type.is_relation()
    }

    /// For relational fields, the attribute on the related model the
    /// comparison value resolves to (`to_field` or the primary key).
    pub fn target_attname(&self) -> Option<&str> {
        match &self.field_type {
            FieldType::ForeignKey { to_field, .. } | FieldType::OneToOneField { to_field, .. } => {
                Some(to_field.as_deref().unwrap_or("id"))
            }
            _ => None,
        }
    }

    /// The SQL column type for this field on the given backend.
    pub fn db_type(&self, backend: Backend) -> String {
        match (&self.field_type, backend) {
            (FieldType::AutoField, Backend::Postgres) => "serial".to_string(),
            (FieldType::AutoField, Backend::Sqlite) => "integer".to_string(),
            (FieldType::AutoField, Backend::Mysql) => "integer AUTO_INCREMENT".to_string(),
            (FieldType::IntegerField, _) => "integer".to_string(),
            (FieldType::BigIntegerField, _) => "bigint".to_string(),
            (FieldType::CharField, _) => {
                format!("varchar({})", self.max_length.unwrap_or(255))
            }
            (FieldType::TextField, _) => "text".to_string(),
            (FieldType::BooleanField, Backend::Postgres) => "boolean".to_string(),
            (FieldType::BooleanField, _) => "bool".to_string(),
            (FieldType::FloatField, _) => "double precision".to_string(),
            (FieldType::DateField, _) => "date".to_string(),
            (FieldType::DateTimeField, Backend::Postgres) => {
                "timestamp with time zone".to_string()
            }
            (FieldType::DateTimeField, _) => "datetime".to_string(),
            (FieldType::UuidField, Backend::Postgres) => "uuid".to_string(),
            (FieldType::UuidField, _) => "char(32)".to_string(),
            (FieldType::DateTimeRangeField, Backend::Postgres) => "tstzrange".to_string(),
            (FieldType::DateTimeRangeField, _) => "text".to_string(),
            (FieldType::ForeignKey { .. } | FieldType::OneToOneField { .. }, _) => {
                "integer".to_string()
            }
        }
    }

    /// Coerces a raw value into this field's native representation,
    /// applying the timezone policy for datetimes and ranges.
    pub fn get_prep_value(&self, value: Value, conn: &Connection) -> QueryResult<Value> {
        if value.is_null() {
            return Ok(value);
        }
        match &self.field_type {
            FieldType::AutoField
            | FieldType::IntegerField
            | FieldType::BigIntegerField
            | FieldType::ForeignKey { .. }
            | FieldType::OneToOneField { .. } => self.prep_integer(value),
            FieldType::CharField | FieldType::TextField => Ok(match value {
                Value::String(_) => value,
                other => Value::String(other.to_string()),
            }),
            FieldType::BooleanField => match value {
                Value::Bool(_) => Ok(value),
                Value::Int(i) => Ok(Value::Bool(i != 0)),
                other => Err(self.invalid(&other, "must be a boolean")),
            },
            FieldType::FloatField => match value {
                Value::Float(_) => Ok(value),
                Value::Int(i) => Ok(Value::Float(i as f64)),
                other => Err(self.invalid(&other, "must be a float")),
            },
            FieldType::DateField => match value {
                Value::Date(_) => Ok(value),
                Value::DateTime(dt) => Ok(Value::Date(dt.date())),
                Value::DateTimeTz(dt) => Ok(Value::Date(dt.naive_local().date())),
                Value::String(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map(Value::Date)
                    .map_err(|_| self.invalid(&Value::String(s.clone()), "must be a date")),
                other => Err(self.invalid(&other, "must be a date")),
            },
            FieldType::DateTimeField => self.prep_datetime(value, conn),
            FieldType::UuidField => match value {
                Value::Uuid(_) => Ok(value),
                Value::String(s) => uuid::Uuid::parse_str(&s)
                    .map(Value::Uuid)
                    .map_err(|_| self.invalid(&Value::String(s.clone()), "must be a UUID")),
                other => Err(self.invalid(&other, "must be a UUID")),
            },
            FieldType::DateTimeRangeField => self.prep_range(value, conn),
        }
    }

    /// Converts a value into the form the database adapter expects. When
    /// `prepared` is false the value is first run through
    /// [`get_prep_value`](Self::get_prep_value).
    pub fn get_db_prep_value(
        &self,
        value: Value,
        conn: &Connection,
        prepared: bool,
    ) -> QueryResult<Value> {
        let value = if prepared {
            value
        } else {
            self.get_prep_value(value, conn)?
        };
        match value {
            Value::Range(range) => Ok(Value::String(conn.value_to_db_datetimerange(&range))),
            other => Ok(other),
        }
    }

    /// Field hook run when a predicate is added to a where tree. Relational
    /// fields convert saved-row stand-ins to their primary-key scalar here,
    /// before the value is frozen into the tree.
    pub fn lookup_prep(&self, _lookup_name: &str, value: Operand) -> Operand {
        let Some(attname) = self.target_attname().map(str::to_string) else {
            return value;
        };
        let convert = |operand: Operand| match operand {
            Operand::Object(obj) => Operand::Value(obj.pk_value(&attname)),
            other => other,
        };
        match value {
            Operand::List(items) => Operand::List(items.into_iter().map(convert).collect()),
            other => convert(other),
        }
    }

    /// SQL adding the non-overlap exclusion constraint for a range column,
    /// when requested and expressible on the backend.
    pub fn exclusion_constraint_sql(&self, table: &str, conn: &Connection) -> Option<String> {
        if !self.disallow_overlap
            || self.field_type != FieldType::DateTimeRangeField
            || conn.backend() != Backend::Postgres
        {
            return None;
        }
        Some(format!(
            "ALTER TABLE {} ADD EXCLUDE USING gist ({} WITH &&)",
            conn.quote_name(table),
            conn.quote_name(&self.column),
        ))
    }

    fn prep_integer(&self, value: Value) -> QueryResult<Value> {
        match value {
            Value::Int(_) => Ok(value),
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| self.invalid(&Value::String(s.clone()), "must be an integer")),
            other => Err(self.invalid(&other, "must be an integer")),
        }
    }

    fn prep_datetime(&self, value: Value, conn: &Connection) -> QueryResult<Value> {
        let value = match value {
            Value::String(s) => match RangeStamp::parse(&s) {
                Ok(RangeStamp::Naive(dt)) => Value::DateTime(dt),
                Ok(RangeStamp::Aware(dt)) => Value::DateTimeTz(dt),
                Err(err) => return Err(err.into()),
            },
            Value::Date(d) => match d.and_hms_opt(0, 0, 0) {
                Some(dt) => Value::DateTime(dt),
                None => return Err(self.invalid(&Value::Date(d), "must be a datetime")),
            },
            other => other,
        };
        match value {
            Value::DateTime(naive) if conn.use_tz() => {
                tracing::warn!(
                    field = %self.name,
                    value = %naive,
                    "received a naive datetime while time zone support is active"
                );
                timezone::make_aware(naive, conn.timezone_offset_secs())
                    .map(Value::DateTimeTz)
                    .ok_or_else(|| {
                        self.invalid(&Value::DateTime(naive), "cannot be localized")
                    })
            }
            Value::DateTime(_) | Value::DateTimeTz(_) => Ok(value),
            other => Err(self.invalid(&other, "must be a datetime")),
        }
    }

    fn prep_range(&self, value: Value, conn: &Connection) -> QueryResult<Value> {
        let mut range = match value {
            Value::Range(r) => r,
            Value::String(s) => DateTimeRange::from_string(&s)?,
            other => return Err(self.invalid(&other, "must be a range")),
        };
        if conn.use_tz() && range.is_naive() {
            tracing::warn!(
                field = %self.name,
                value = %range,
                "received a naive range while time zone support is active"
            );
            range.localize(conn.timezone_offset_secs())?;
        }
        Ok(Value::Range(range))
    }

    fn invalid(&self, value: &Value, reason: &str) -> querykit_core::QueryError {
        ValidationError::new(
            format!("'{value}' value for field '{}' {reason}.", self.name),
            "invalid",
        )
        .into()
    }
}
