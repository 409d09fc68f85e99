//! The WHERE-clause tree and its compiler.
//!
//! A [`WhereNode`] is an AND/OR tree with an optional negation. Children are
//! nested trees, leaf predicates, the `Everything`/`Nothing` sentinels, or
//! raw `ExtraWhere` fragments. Compilation folds the children left to right
//! into a [`CompiledWhere`], tracking how many children are known to match
//! everything or nothing so the fold can stop before compiling the rest:
//! one never-matching child empties an AND chain, one always-matching child
//! saturates an OR chain, and negation flips the two.
//!
//! The empty result set is a value, not an exception: every compile step
//! returns a variant the fold pattern-matches on.

use std::collections::HashMap;
use std::sync::Arc;

use querykit_core::QueryResult;

use crate::backend::Connection;
use crate::query::expressions::{Lhs, Operand, ValueAnnotation};
use crate::query::lookups::{AtomSql, Lookup};
use crate::value::Value;

/// The boolean connector between a node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connector {
    /// All children must match.
    #[default]
    And,
    /// Any child may match.
    Or,
}

impl Connector {
    /// The SQL keyword for this connector.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// One `(column, operator, value)` predicate stored in a where tree.
///
/// The annotation and the (lookup-prepped) value are frozen at insertion
/// time and never recomputed.
#[derive(Debug, Clone)]
pub struct LeafPredicate {
    /// The column reference or aggregate being constrained.
    pub lhs: Lhs,
    /// The comparison operator. Lookups are stateless and shared.
    pub lookup: Arc<dyn Lookup>,
    /// Auxiliary value information computed at insertion.
    pub annotation: ValueAnnotation,
    /// The raw comparison value.
    pub value: Operand,
}

/// Raw WHERE fragments attached by callers, each wrapped in parentheses and
/// AND-joined.
#[derive(Debug, Clone)]
pub struct ExtraWhere {
    /// The raw SQL fragments.
    pub sqls: Vec<String>,
    /// Parameters bound by the fragments.
    pub params: Vec<Value>,
}

impl ExtraWhere {
    /// Creates a raw-fragment child.
    pub fn new(sqls: Vec<String>, params: Vec<Value>) -> Self {
        Self { sqls, params }
    }

    fn as_sql(&self) -> String {
        let wrapped: Vec<String> = self.sqls.iter().map(|sql| format!("({sql})")).collect();
        wrapped.join(" AND ")
    }
}

/// A child of a [`WhereNode`].
#[derive(Debug, Clone)]
pub enum WhereChild {
    /// A nested tree.
    Node(WhereNode),
    /// A leaf predicate.
    Leaf(LeafPredicate),
    /// Sentinel: matches every row.
    Everything,
    /// Sentinel: matches no row.
    Nothing,
    /// Raw SQL fragments.
    Extra(ExtraWhere),
}

/// The classification a node (or the whole tree) compiles to.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledWhere {
    /// The subtree can never match any row.
    Nothing,
    /// The subtree matches every row and contributes no SQL.
    Everything,
    /// Every child was blank; the node contributes no constraint. Distinct
    /// from `Everything` only for a historical edge case; consumers treat it
    /// as "no WHERE clause".
    NoConstraint,
    /// A compiled boolean expression.
    Sql {
        /// SQL with `%s` placeholders.
        sql: String,
        /// Bound parameters, in placeholder order.
        params: Vec<Value>,
    },
}

impl CompiledWhere {
    /// Extracts the SQL and parameters for the `Sql` variant.
    pub fn into_sql(self) -> Option<(String, Vec<Value>)> {
        match self {
            Self::Sql { sql, params } => Some((sql, params)),
            _ => None,
        }
    }
}

/// An AND/OR/NOT tree of predicates compiled to a single SQL boolean
/// expression.
#[derive(Debug, Clone, Default)]
pub struct WhereNode {
    /// The connector between children.
    pub connector: Connector,
    /// Whether the node's result is negated. Negation flips the
    /// empty/everything classification at evaluation time; it never mutates
    /// children.
    pub negated: bool,
    children: Vec<WhereChild>,
}

impl WhereNode {
    /// Creates an empty, non-negated AND node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty node with the given connector.
    pub fn with_connector(connector: Connector) -> Self {
        Self {
            connector,
            ..Self::default()
        }
    }

    /// The node's children.
    pub fn children(&self) -> &[WhereChild] {
        &self.children
    }

    /// Returns `true` when the node has no children. A childless tree
    /// matches everything unless a `Nothing` sentinel is added.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Flips the node's negation.
    pub fn negate(&mut self) {
        self.negated = !self.negated;
    }

    /// Adds a child under the given connector. When the connector differs
    /// from the node's and children already exist, the current children are
    /// squashed into a subnode first, preserving their grouping.
    pub fn add(&mut self, child: WhereChild, connector: Connector) {
        if self.children.is_empty() || connector == self.connector {
            self.connector = connector;
            self.children.push(child);
            return;
        }
        let inner = Self {
            connector: self.connector,
            negated: false,
            children: std::mem::take(&mut self.children),
        };
        self.connector = connector;
        self.children.push(WhereChild::Node(inner));
        self.children.push(child);
    }

    /// Adds a leaf predicate. The value annotation is computed here, once;
    /// when the column carries field metadata the raw value is run through
    /// the lookup's prep hook before being frozen into the tree.
    pub fn add_leaf(
        &mut self,
        lhs: Lhs,
        lookup: Arc<dyn Lookup>,
        value: Operand,
        connector: Connector,
    ) -> QueryResult<()> {
        let annotation = value.annotation();
        let value = match lhs.field() {
            Some(field) => lookup.prep(field, value)?,
            None => value,
        };
        self.add(
            WhereChild::Leaf(LeafPredicate {
                lhs,
                lookup,
                annotation,
                value,
            }),
            connector,
        );
        Ok(())
    }

    /// Compiles the tree. The top-level SQL comes back unparenthesized;
    /// composite subtrees are parenthesized where they are embedded.
    pub fn as_sql(&self, conn: &Connection) -> QueryResult<CompiledWhere> {
        self.compile(conn).map(|(compiled, _)| compiled)
    }

    fn compile(&self, conn: &Connection) -> QueryResult<(CompiledWhere, usize)> {
        let mut fragments: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();
        let mut everything_children = 0usize;
        let mut nothing_children = 0usize;
        let mut non_empty_children = self.children.len();

        for child in &self.children {
            match Self::compile_child(child, conn)? {
                CompiledWhere::Nothing => nothing_children += 1,
                CompiledWhere::Everything => everything_children += 1,
                CompiledWhere::NoConstraint => {
                    // Blank children do not count toward either threshold.
                    non_empty_children -= 1;
                    continue;
                }
                CompiledWhere::Sql { sql, params: child_params } => {
                    fragments.push(sql);
                    params.extend(child_params);
                }
            }
            // Re-evaluate after every child so long chains stop early.
            let (full_needed, empty_needed) = match self.connector {
                Connector::And => (non_empty_children, 1),
                Connector::Or => (1, non_empty_children),
            };
            if nothing_children >= empty_needed {
                let compiled = if self.negated {
                    CompiledWhere::Everything
                } else {
                    CompiledWhere::Nothing
                };
                return Ok((compiled, 0));
            }
            if everything_children >= full_needed {
                let compiled = if self.negated {
                    CompiledWhere::Nothing
                } else {
                    CompiledWhere::Everything
                };
                return Ok((compiled, 0));
            }
        }

        if non_empty_children == 0 {
            return Ok((CompiledWhere::NoConstraint, 0));
        }
        if fragments.is_empty() {
            return Ok((CompiledWhere::Everything, 0));
        }
        let count = fragments.len();
        let joined = fragments.join(&format!(" {} ", self.connector.as_str()));
        let sql = if self.negated {
            format!("NOT ({joined})")
        } else {
            joined
        };
        Ok((CompiledWhere::Sql { sql, params }, count))
    }

    fn compile_child(child: &WhereChild, conn: &Connection) -> QueryResult<CompiledWhere> {
        match child {
            WhereChild::Node(node) => {
                let (compiled, count) = node.compile(conn)?;
                match compiled {
                    CompiledWhere::Sql { sql, params } if count > 1 && !node.negated => {
                        Ok(CompiledWhere::Sql {
                            sql: format!("({sql})"),
                            params,
                        })
                    }
                    other => Ok(other),
                }
            }
            WhereChild::Leaf(leaf) => {
                match leaf
                    .lookup
                    .make_atom(&leaf.lhs, leaf.annotation, &leaf.value, conn)?
                {
                    AtomSql::Nothing => Ok(CompiledWhere::Nothing),
                    AtomSql::Sql { sql, params } => Ok(CompiledWhere::Sql { sql, params }),
                }
            }
            WhereChild::Everything => Ok(CompiledWhere::Everything),
            WhereChild::Nothing => Ok(CompiledWhere::Nothing),
            WhereChild::Extra(extra) => Ok(CompiledWhere::Sql {
                sql: extra.as_sql(),
                params: extra.params.clone(),
            }),
        }
    }

    /// Relabels table aliases throughout the tree: leaf column references,
    /// nested trees, and any value carrying relabelable sub-SQL. Idempotent
    /// for aliases absent from the mapping.
    pub fn relabel_aliases(&mut self, change_map: &HashMap<String, String>) {
        for child in &mut self.children {
            match child {
                WhereChild::Node(node) => node.relabel_aliases(change_map),
                WhereChild::Leaf(leaf) => {
                    leaf.lhs.relabel_aliases(change_map);
                    leaf.value.relabel_aliases(change_map);
                }
                WhereChild::Everything | WhereChild::Nothing | WhereChild::Extra(_) => {}
            }
        }
    }
}
