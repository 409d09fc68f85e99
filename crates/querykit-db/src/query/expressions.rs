//! Column references, comparison operands, and sub-query values.
//!
//! The left-hand side of a predicate is an [`Lhs`]: either a [`ColumnRef`]
//! (table alias + column name + optional field metadata) or an
//! [`AggregateRef`] that renders its own SQL. The right-hand side enters the
//! tree as an [`Operand`] — a closed set of value shapes selected by
//! construction, replacing any runtime capability probing.
//!
//! Alias relabeling reaches everything that can mention a table alias:
//! column refs, aggregates, and nested sub-queries.

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::Connection;
use crate::fields::FieldDef;
use crate::query::lookups::AtomSql;
use crate::query::where_clause::{CompiledWhere, WhereNode};
use crate::value::Value;
use querykit_core::QueryResult;

/// Auxiliary information about a predicate's value, computed once when the
/// predicate is added to a where tree and never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueAnnotation {
    /// The value is a concrete datetime; backends may cast the parameter.
    Datetime,
    /// The truthiness of the value, consulted by `isnull` and `in`.
    Truthy(bool),
}

impl ValueAnnotation {
    /// Whether the annotated value counts as truthy.
    pub const fn is_truthy(self) -> bool {
        matches!(self, Self::Datetime | Self::Truthy(true))
    }
}

/// Identifies a physical column by table alias and column name.
///
/// When `field` is absent the reference signals a raw comparison with no
/// type-driven preparation. The alias is the only part mutated after
/// creation, and only by [`relabel_aliases`](Self::relabel_aliases).
#[derive(Debug, Clone)]
pub struct ColumnRef {
    /// The table alias qualifying the column, if any.
    pub alias: Option<String>,
    /// The column name.
    pub column: String,
    /// Field metadata driving value preparation. A non-owning lookup into
    /// the schema, shared rather than copied.
    pub field: Option<Arc<FieldDef>>,
}

impl ColumnRef {
    /// Creates an unqualified, fieldless column reference.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            alias: None,
            column: column.into(),
            field: None,
        }
    }

    /// Qualifies the reference with a table alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Attaches field metadata.
    #[must_use]
    pub fn with_field(mut self, field: Arc<FieldDef>) -> Self {
        self.field = Some(field);
        self
    }

    /// Renders `alias.column` (or bare `column`), quoted per backend.
    pub fn as_sql(&self, conn: &Connection) -> String {
        match &self.alias {
            Some(alias) => format!("{}.{}", conn.quote_name(alias), conn.quote_name(&self.column)),
            None => conn.quote_name(&self.column),
        }
    }

    /// Replaces the table alias using the old-to-new mapping. Aliases not
    /// present in the map are left untouched, so the pass is idempotent.
    pub fn relabel_aliases(&mut self, change_map: &HashMap<String, String>) {
        if let Some(alias) = &self.alias {
            if let Some(new_alias) = change_map.get(alias) {
                self.alias = Some(new_alias.clone());
            }
        }
    }
}

/// An aggregate expression used as the left-hand side of a predicate,
/// e.g. `MAX(T1.price)` in a HAVING-style constraint.
#[derive(Debug, Clone)]
pub struct AggregateRef {
    /// The aggregate function name (`COUNT`, `MAX`, ...).
    pub function: String,
    /// The aggregated column.
    pub column: ColumnRef,
}

impl AggregateRef {
    /// Creates an aggregate over the given column.
    pub fn new(function: impl Into<String>, column: ColumnRef) -> Self {
        Self {
            function: function.into(),
            column,
        }
    }

    /// Renders `FUNCTION(alias.column)`.
    pub fn as_sql(&self, conn: &Connection) -> String {
        format!("{}({})", self.function, self.column.as_sql(conn))
    }
}

/// The left-hand side of a predicate.
#[derive(Debug, Clone)]
pub enum Lhs {
    /// A plain column constraint.
    Column(ColumnRef),
    /// An aggregate expression that renders its own SQL.
    Aggregate(AggregateRef),
}

impl Lhs {
    /// The field metadata driving value preparation, if any.
    pub fn field(&self) -> Option<&Arc<FieldDef>> {
        match self {
            Self::Column(col) => col.field.as_ref(),
            Self::Aggregate(agg) => agg.column.field.as_ref(),
        }
    }

    /// Renders the LHS SQL.
    pub fn as_sql(&self, conn: &Connection) -> String {
        match self {
            Self::Column(col) => col.as_sql(conn),
            Self::Aggregate(agg) => agg.as_sql(conn),
        }
    }

    /// Relabels the table alias underneath this LHS.
    pub fn relabel_aliases(&mut self, change_map: &HashMap<String, String>) {
        match self {
            Self::Column(col) => col.relabel_aliases(change_map),
            Self::Aggregate(agg) => agg.column.relabel_aliases(change_map),
        }
    }
}

impl From<ColumnRef> for Lhs {
    fn from(col: ColumnRef) -> Self {
        Self::Column(col)
    }
}

impl From<AggregateRef> for Lhs {
    fn from(agg: AggregateRef) -> Self {
        Self::Aggregate(agg)
    }
}

/// Opaque pre-rendered SQL with parameters, spliced verbatim into the
/// comparison. Carries no alias knowledge, so relabeling skips it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryWrapper {
    /// The SQL text, including any parentheses it needs.
    pub sql: String,
    /// Parameters bound by the SQL text, in order.
    pub params: Vec<Value>,
}

impl QueryWrapper {
    /// Wraps raw SQL and its parameters.
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// A single-column nested select used as a comparison value
/// (`lhs IN (SELECT …)`).
///
/// Unlike [`QueryWrapper`], a `Subquery` compiles through its own
/// [`WhereNode`], so alias relabeling recurses into it.
#[derive(Debug, Clone)]
pub struct Subquery {
    /// The table selected from.
    pub table: String,
    /// An optional alias for the table.
    pub alias: Option<String>,
    /// The single selected column.
    pub column: String,
    /// The sub-query's WHERE clause.
    pub where_clause: WhereNode,
}

impl Subquery {
    /// Creates a sub-query selecting `column` from `table` with an empty
    /// WHERE clause.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: None,
            column: column.into(),
            where_clause: WhereNode::new(),
        }
    }

    /// Aliases the selected table.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the sub-query's WHERE clause.
    #[must_use]
    pub fn with_where(mut self, where_clause: WhereNode) -> Self {
        self.where_clause = where_clause;
        self
    }

    /// Compiles the sub-query. A WHERE clause that can never match makes the
    /// whole sub-query match nothing.
    pub fn as_sql(&self, conn: &Connection) -> QueryResult<AtomSql> {
        let column = match &self.alias {
            Some(alias) => format!("{}.{}", conn.quote_name(alias), conn.quote_name(&self.column)),
            None => conn.quote_name(&self.column),
        };
        let from = match &self.alias {
            Some(alias) => format!("{} {}", conn.quote_name(&self.table), conn.quote_name(alias)),
            None => conn.quote_name(&self.table),
        };
        match self.where_clause.as_sql(conn)? {
            CompiledWhere::Nothing => Ok(AtomSql::Nothing),
            CompiledWhere::Everything | CompiledWhere::NoConstraint => Ok(AtomSql::Sql {
                sql: format!("SELECT {column} FROM {from}"),
                params: Vec::new(),
            }),
            CompiledWhere::Sql { sql, params } => Ok(AtomSql::Sql {
                sql: format!("SELECT {column} FROM {from} WHERE {sql}"),
                params,
            }),
        }
    }

    /// Relabels the sub-query's own alias and everything in its WHERE tree.
    pub fn relabel_aliases(&mut self, change_map: &HashMap<String, String>) {
        if let Some(alias) = &self.alias {
            if let Some(new_alias) = change_map.get(alias) {
                self.alias = Some(new_alias.clone());
            }
        }
        self.where_clause.relabel_aliases(change_map);
    }
}

/// An attribute value on a [`ModelRef`]: a comparison-ready scalar or a
/// nested related object (one-to-one chains).
#[derive(Debug, Clone)]
pub enum ModelAttr {
    /// A scalar attribute value.
    Scalar(Value),
    /// A nested related object; the walk continues through its primary key.
    Object(Box<ModelRef>),
}

impl From<Value> for ModelAttr {
    fn from(v: Value) -> Self {
        Self::Scalar(v)
    }
}

impl From<ModelRef> for ModelAttr {
    fn from(m: ModelRef) -> Self {
        Self::Object(Box::new(m))
    }
}

/// A saved-row stand-in used as a comparison value for relational lookups.
///
/// Relational fields resolve it to a primary-key scalar at tree-insertion
/// time by walking [`pk_value`](Self::pk_value).
#[derive(Debug, Clone)]
pub struct ModelRef {
    /// The model name, for diagnostics.
    pub model: String,
    /// The attribute holding this model's primary key.
    pub pk_attr: String,
    attrs: HashMap<String, ModelAttr>,
}

impl ModelRef {
    /// Creates a stand-in for a row of `model` whose pk lives in `pk_attr`.
    pub fn new(model: impl Into<String>, pk_attr: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            pk_attr: pk_attr.into(),
            attrs: HashMap::new(),
        }
    }

    /// Sets an attribute value.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, attr: impl Into<ModelAttr>) -> Self {
        self.attrs.insert(name.into(), attr.into());
        self
    }

    /// Looks up an attribute.
    pub fn attr(&self, name: &str) -> Option<&ModelAttr> {
        self.attrs.get(name)
    }

    /// Walks `attname` (then nested primary keys) until a scalar is reached.
    /// A missing attribute means the related row is gone and degrades to
    /// `Null`, matching no-such-related-row semantics.
    pub fn pk_value(&self, attname: &str) -> Value {
        let mut current = self;
        let mut attname = attname.to_string();
        loop {
            match current.attr(&attname) {
                None => return Value::Null,
                Some(ModelAttr::Scalar(v)) => return v.clone(),
                Some(ModelAttr::Object(next)) => {
                    attname = next.pk_attr.clone();
                    current = &**next;
                }
            }
        }
    }
}

/// The raw right-hand side of a predicate, before normalization.
///
/// A closed set of value shapes selected by construction: no runtime
/// "does it have an `as_sql`?" probing.
#[derive(Debug, Clone)]
pub enum Operand {
    /// A single raw value.
    Value(Value),
    /// Candidate values for list lookups (`in`, `range`). Lazily produced
    /// sequences are collected here eagerly, before emptiness is judged.
    List(Vec<Operand>),
    /// A saved-row stand-in, converted to a pk scalar at insertion time.
    Object(ModelRef),
    /// A nested single-column select.
    Subquery(Subquery),
    /// Opaque pre-rendered SQL with parameters.
    Raw(QueryWrapper),
}

impl Operand {
    /// Computes the value annotation frozen into the tree at insertion.
    pub fn annotation(&self) -> ValueAnnotation {
        match self {
            Self::Value(v) if v.is_datetime() => ValueAnnotation::Datetime,
            Self::Value(v) => ValueAnnotation::Truthy(v.is_truthy()),
            Self::List(items) => ValueAnnotation::Truthy(!items.is_empty()),
            Self::Object(_) | Self::Subquery(_) | Self::Raw(_) => ValueAnnotation::Truthy(true),
        }
    }

    /// Relabels aliases inside values that carry relabelable sub-SQL.
    pub fn relabel_aliases(&mut self, change_map: &HashMap<String, String>) {
        match self {
            Self::Subquery(sub) => sub.relabel_aliases(change_map),
            Self::List(items) => {
                for item in items {
                    item.relabel_aliases(change_map);
                }
            }
            Self::Value(_) | Self::Object(_) | Self::Raw(_) => {}
        }
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl From<ModelRef> for Operand {
    fn from(m: ModelRef) -> Self {
        Self::Object(m)
    }
}

impl From<Subquery> for Operand {
    fn from(s: Subquery) -> Self {
        Self::Subquery(s)
    }
}

impl From<QueryWrapper> for Operand {
    fn from(w: QueryWrapper) -> Self {
        Self::Raw(w)
    }
}

// Lazy sequences of candidate values are consumed immediately on
// construction, so emptiness can be judged before compilation.
impl FromIterator<Value> for Operand {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::List(iter.into_iter().map(Self::Value).collect())
    }
}

impl FromIterator<Operand> for Operand {
    fn from_iter<I: IntoIterator<Item = Operand>>(iter: I) -> Self {
        Self::List(iter.into_iter().collect())
    }
}
