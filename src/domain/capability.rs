//! Column discovery results expressed as typed capability maps.
//!
//! Each loosely-versioned table gets a logical-field enum implementing
//! [`LogicalField`]. Resolving that enum against a live [`TableSchema`]
//! yields a [`Capabilities`] map that records which logical fields are
//! backed by a physical column and under which name.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::domain::value::{Assignment, FieldValue};

/// Live shape of a table as reported by the storage engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name that was inspected.
    pub name: String,
    /// Whether the table exists at all.
    pub exists: bool,
    /// Column names in declaration order.
    pub columns: Vec<String>,
}

impl TableSchema {
    /// Schema of an existing table with the given columns.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            exists: true,
            columns,
        }
    }

    /// Schema of a table that is not present in the database.
    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exists: false,
            columns: Vec::new(),
        }
    }

    /// Returns `true` when `column` is one of the live columns.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|existing| existing == column)
    }
}

/// A stable, named concept stored in one of several candidate columns.
pub trait LogicalField: Copy + Ord + Debug + Send + Sync + 'static {
    /// Physical table the field belongs to.
    const TABLE: &'static str;
    /// Every logical field of the table, in write order.
    const ALL: &'static [Self];

    /// Candidate column names in priority order.
    fn candidates(self) -> &'static [&'static str];
}

/// Picks the first candidate (in caller priority order) present in `existing`.
pub fn resolve_column<'c>(existing: &[String], candidates: &[&'c str]) -> Option<&'c str> {
    candidates
        .iter()
        .copied()
        .find(|candidate| existing.iter().any(|column| column == candidate))
}

/// Resolved mapping of logical fields to physical columns for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities<F: LogicalField> {
    schema: TableSchema,
    resolved: BTreeMap<F, &'static str>,
}

impl<F: LogicalField> Capabilities<F> {
    /// Resolve every logical field of `F` against the inspected schema.
    pub fn resolve(schema: TableSchema) -> Self {
        let resolved = F::ALL
            .iter()
            .filter_map(|field| {
                resolve_column(&schema.columns, field.candidates()).map(|column| (*field, column))
            })
            .collect();

        Self { schema, resolved }
    }

    /// Build capabilities for an existing table from a literal column list.
    pub fn from_columns(columns: &[&str]) -> Self {
        let columns = columns.iter().map(|column| (*column).to_string()).collect();
        Self::resolve(TableSchema::new(F::TABLE, columns))
    }

    /// Capabilities of a table that does not exist.
    pub fn absent() -> Self {
        Self::resolve(TableSchema::missing(F::TABLE))
    }

    pub fn table(&self) -> &'static str {
        F::TABLE
    }

    pub fn table_exists(&self) -> bool {
        self.schema.exists
    }

    /// Every live column of the table, resolved or not.
    pub fn columns(&self) -> &[String] {
        &self.schema.columns
    }

    /// Physical column backing `field`, if any.
    pub fn column(&self, field: F) -> Option<&'static str> {
        self.resolved.get(&field).copied()
    }

    pub fn supports(&self, field: F) -> bool {
        self.resolved.contains_key(&field)
    }

    /// Resolved `(field, column)` pairs in logical field order.
    pub fn resolved(&self) -> impl Iterator<Item = (F, &'static str)> + '_ {
        self.resolved.iter().map(|(field, column)| (*field, *column))
    }

    /// Maps logical values onto physical assignments, dropping unresolved fields.
    pub fn assignments<I>(&self, values: I) -> Vec<Assignment>
    where
        I: IntoIterator<Item = (F, FieldValue)>,
    {
        values
            .into_iter()
            .filter_map(|(field, value)| {
                self.column(field)
                    .map(|column| Assignment::new(column, value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum PriceField {
        Id,
        Price,
    }

    impl LogicalField for PriceField {
        const TABLE: &'static str = "prices";
        const ALL: &'static [Self] = &[Self::Id, Self::Price];

        fn candidates(self) -> &'static [&'static str] {
            match self {
                Self::Id => &["id"],
                Self::Price => &["price_USD", "price", "cost"],
            }
        }
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn resolve_column_respects_caller_priority() {
        let existing = columns(&["cost", "price"]);

        let resolved = resolve_column(&existing, &["price_USD", "price", "cost"]);

        assert_eq!(resolved, Some("price"));
        assert_eq!(
            resolve_column(&existing, &["price_USD", "price", "cost"]),
            resolved
        );
    }

    #[test]
    fn resolve_column_returns_none_without_match() {
        let existing = columns(&["id", "label"]);

        assert_eq!(resolve_column(&existing, &["name", "title"]), None);
    }

    #[test]
    fn capabilities_drop_unresolved_fields() {
        let caps = Capabilities::<PriceField>::from_columns(&["id", "label"]);

        assert!(caps.table_exists());
        assert_eq!(caps.column(PriceField::Id), Some("id"));
        assert!(!caps.supports(PriceField::Price));

        let assignments = caps.assignments([
            (PriceField::Id, FieldValue::integer(3)),
            (PriceField::Price, FieldValue::real(9.5)),
        ]);
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].column, "id");
    }

    #[test]
    fn absent_table_resolves_nothing() {
        let caps = Capabilities::<PriceField>::absent();

        assert!(!caps.table_exists());
        assert_eq!(caps.resolved().count(), 0);
        assert!(caps.columns().is_empty());
    }
}
