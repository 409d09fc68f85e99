//! The lookup catalog: operator name to [`Lookup`] resolution.
//!
//! The catalog is an explicit mapping constructed at startup and injected
//! into query building, so registration is order-independent and testable in
//! isolation — there is no global mutable registry. Field types may override
//! or extend the base set (the range lookups only exist for range columns).
//!
//! Relational fields get their resolved lookup wrapped in [`RelatedLookup`],
//! which converts saved-row values to primary-key scalars before they are
//! frozen into a where tree.

use std::collections::HashMap;
use std::sync::Arc;

use querykit_core::{QueryError, QueryResult};

use crate::backend::Connection;
use crate::fields::FieldDef;
use crate::query::expressions::{Lhs, Operand, ValueAnnotation};
use crate::query::lookups::{
    AtomSql, IExact, In, IsNull, Lookup, RangeLookup, RhsPrepare, Search, Year, CONTAINS, DAY,
    ENDSWITH, EXACT, GT, GTE, ICONTAINS, IENDSWITH, IREGEX, ISTARTSWITH, LT, LTE, MONTH,
    RANGE_CONTAINS, RANGE_OVERLAPS, REGEX, STARTSWITH, WEEK_DAY,
};
use crate::value::Value;

/// Wraps an inner lookup for a relational field.
///
/// Saved-row comparison values are converted to the primary key of the
/// related row by walking attribute chains until a non-object scalar is
/// reached; a missing related object degrades the value to `Null` rather
/// than failing the query. Compilation delegates to the inner lookup.
#[derive(Debug)]
pub struct RelatedLookup {
    inner: Arc<dyn Lookup>,
}

impl RelatedLookup {
    /// Wraps `inner` for use on a relational field.
    pub fn new(inner: Arc<dyn Lookup>) -> Self {
        Self { inner }
    }
}

impl Lookup for RelatedLookup {
    fn lookup_name(&self) -> &'static str {
        self.inner.lookup_name()
    }

    fn rhs_prepare(&self) -> RhsPrepare {
        self.inner.rhs_prepare()
    }

    fn prep(&self, field: &FieldDef, value: Operand) -> QueryResult<Operand> {
        self.inner
            .prep(field, field.lookup_prep(self.lookup_name(), value))
    }

    fn make_atom(
        &self,
        lhs: &Lhs,
        annotation: ValueAnnotation,
        value: &Operand,
        conn: &Connection,
    ) -> QueryResult<AtomSql> {
        self.inner.make_atom(lhs, annotation, value, conn)
    }

    fn as_sql(
        &self,
        lhs_sql: &str,
        rhs_format: &str,
        params: Vec<Value>,
        annotation: ValueAnnotation,
        conn: &Connection,
    ) -> QueryResult<AtomSql> {
        self.inner
            .as_sql(lhs_sql, rhs_format, params, annotation, conn)
    }
}

/// A mapping from operator name to lookup implementation, with per-field-type
/// overrides falling back to the base registry.
#[derive(Debug, Clone)]
pub struct LookupCatalog {
    base: HashMap<&'static str, Arc<dyn Lookup>>,
    per_type: HashMap<&'static str, HashMap<&'static str, Arc<dyn Lookup>>>,
}

impl Default for LookupCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl LookupCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self {
            base: HashMap::new(),
            per_type: HashMap::new(),
        }
    }

    /// Creates a catalog pre-populated with the built-in lookups.
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        let base: [Arc<dyn Lookup>; 22] = [
            Arc::new(EXACT),
            Arc::new(IExact),
            Arc::new(GT),
            Arc::new(GTE),
            Arc::new(LT),
            Arc::new(LTE),
            Arc::new(CONTAINS),
            Arc::new(ICONTAINS),
            Arc::new(STARTSWITH),
            Arc::new(ISTARTSWITH),
            Arc::new(ENDSWITH),
            Arc::new(IENDSWITH),
            Arc::new(IsNull),
            Arc::new(In),
            Arc::new(RangeLookup),
            Arc::new(Year),
            Arc::new(MONTH),
            Arc::new(DAY),
            Arc::new(WEEK_DAY),
            Arc::new(Search),
            Arc::new(REGEX),
            Arc::new(IREGEX),
        ];
        for lookup in base {
            catalog.register(lookup);
        }
        // Range columns additionally understand containment and overlap.
        catalog.register_for("DateTimeRangeField", Arc::new(RANGE_CONTAINS));
        catalog.register_for("DateTimeRangeField", Arc::new(RANGE_OVERLAPS));
        catalog
    }

    /// Registers (or overrides) a base lookup under its own name.
    pub fn register(&mut self, lookup: Arc<dyn Lookup>) {
        self.base.insert(lookup.lookup_name(), lookup);
    }

    /// Registers (or overrides) a lookup for one field type only.
    pub fn register_for(&mut self, internal_type: &'static str, lookup: Arc<dyn Lookup>) {
        self.per_type
            .entry(internal_type)
            .or_default()
            .insert(lookup.lookup_name(), lookup);
    }

    /// Returns `true` when `name` resolves for the given field type.
    pub fn has_lookup(&self, internal_type: &str, name: &str) -> bool {
        self.per_type
            .get(internal_type)
            .is_some_and(|m| m.contains_key(name))
            || self.base.contains_key(name)
    }

    /// Resolves an operator name for a field. Field-type overrides win over
    /// the base registry; relational fields get the [`RelatedLookup`]
    /// wrapper.
    pub fn resolve(&self, field: &FieldDef, name: &str) -> QueryResult<Arc<dyn Lookup>> {
        let lookup = self
            .per_type
            .get(field.internal_type())
            .and_then(|overrides| overrides.get(name))
            .or_else(|| self.base.get(name))
            .cloned()
            .ok_or_else(|| QueryError::UnsupportedLookup {
                field: field.name.clone(),
                lookup: name.to_string(),
            })?;
        if field.is_relation() {
            Ok(Arc::new(RelatedLookup::new(lookup)))
        } else {
            Ok(lookup)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::fields::FieldType;
    use crate::query::expressions::{ColumnRef, ModelRef};
    use crate::query::lookups::SimpleLookup;

    fn fk_field() -> FieldDef {
        FieldDef::new(
            "author",
            FieldType::ForeignKey {
                to: "auth.User".to_string(),
                to_field: None,
            },
        )
    }

    #[test]
    fn test_resolve_base_lookup() {
        let catalog = LookupCatalog::with_defaults();
        let field = FieldDef::new("name", FieldType::CharField);
        let lookup = catalog.resolve(&field, "icontains").unwrap();
        assert_eq!(lookup.lookup_name(), "icontains");
    }

    #[test]
    fn test_resolve_unknown_lookup() {
        let catalog = LookupCatalog::with_defaults();
        let field = FieldDef::new("name", FieldType::CharField);
        let err = catalog.resolve(&field, "fuzzy").unwrap_err();
        match err {
            QueryError::UnsupportedLookup { field, lookup } => {
                assert_eq!(field, "name");
                assert_eq!(lookup, "fuzzy");
            }
            other => panic!("expected UnsupportedLookup, got {other}"),
        }
    }

    #[test]
    fn test_range_lookups_only_for_range_fields() {
        let catalog = LookupCatalog::with_defaults();
        let range_field = FieldDef::new("period", FieldType::DateTimeRangeField);
        assert!(catalog.resolve(&range_field, "range_contains").is_ok());
        let text_field = FieldDef::new("name", FieldType::CharField);
        assert!(catalog.resolve(&text_field, "range_contains").is_err());
    }

    #[test]
    fn test_register_override() {
        let mut catalog = LookupCatalog::with_defaults();
        catalog.register_for("CharField", Arc::new(SimpleLookup::new("exact", RhsPrepare::Raw)));
        let field = FieldDef::new("name", FieldType::CharField);
        let lookup = catalog.resolve(&field, "exact").unwrap();
        assert_eq!(lookup.rhs_prepare(), RhsPrepare::Raw);
        // Other field types keep the base behavior.
        let other = FieldDef::new("age", FieldType::IntegerField);
        assert_eq!(
            catalog.resolve(&other, "exact").unwrap().rhs_prepare(),
            RhsPrepare::FieldPrepare
        );
    }

    #[test]
    fn test_has_lookup() {
        let catalog = LookupCatalog::with_defaults();
        assert!(catalog.has_lookup("CharField", "exact"));
        assert!(catalog.has_lookup("DateTimeRangeField", "range_overlaps"));
        assert!(!catalog.has_lookup("CharField", "range_overlaps"));
    }

    // ── RelatedLookup ────────────────────────────────────────────────

    #[test]
    fn test_related_lookup_converts_object_to_pk() {
        let catalog = LookupCatalog::with_defaults();
        let field = fk_field();
        let lookup = catalog.resolve(&field, "exact").unwrap();
        let user = ModelRef::new("auth.User", "id").with_attr("id", Value::Int(7));
        let prepped = lookup.prep(&field, Operand::Object(user)).unwrap();
        match prepped {
            Operand::Value(v) => assert_eq!(v, Value::Int(7)),
            other => panic!("expected a scalar, got {other:?}"),
        }
    }

    #[test]
    fn test_related_lookup_missing_object_degrades_to_null() {
        let catalog = LookupCatalog::with_defaults();
        let field = fk_field();
        let lookup = catalog.resolve(&field, "exact").unwrap();
        let orphan = ModelRef::new("auth.User", "id");
        let prepped = lookup.prep(&field, Operand::Object(orphan)).unwrap();
        assert!(matches!(prepped, Operand::Value(Value::Null)));
    }

    #[test]
    fn test_related_lookup_converts_list_elements() {
        let catalog = LookupCatalog::with_defaults();
        let field = fk_field();
        let lookup = catalog.resolve(&field, "in").unwrap();
        let a = ModelRef::new("auth.User", "id").with_attr("id", Value::Int(1));
        let b = ModelRef::new("auth.User", "id").with_attr("id", Value::Int(2));
        let value: Operand = vec![Operand::Object(a), Operand::Object(b)].into_iter().collect();
        let prepped = lookup.prep(&field, value).unwrap();
        match prepped {
            Operand::List(items) => {
                assert!(items
                    .iter()
                    .all(|item| matches!(item, Operand::Value(Value::Int(_)))));
            }
            other => panic!("expected a list, got {other:?}"),
        }
    }

    #[test]
    fn test_related_lookup_compiles_through_inner() {
        let catalog = LookupCatalog::with_defaults();
        let field = fk_field();
        let lookup = catalog.resolve(&field, "exact").unwrap();
        let lhs = Lhs::from(ColumnRef::new("author_id").with_field(Arc::new(field.clone())));
        let user = ModelRef::new("auth.User", "id").with_attr("id", Value::Int(7));
        let value = lookup.prep(&field, Operand::Object(user)).unwrap();
        let annotation = value.annotation();
        let conn = Connection::new(Backend::Postgres);
        match lookup.make_atom(&lhs, annotation, &value, &conn).unwrap() {
            AtomSql::Sql { sql, params } => {
                assert_eq!(sql, "author_id = %s");
                assert_eq!(params, vec![Value::Int(7)]);
            }
            AtomSql::Nothing => panic!("expected SQL"),
        }
    }
}
