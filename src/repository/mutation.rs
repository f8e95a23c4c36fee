//! Parameterized INSERT / UPDATE / DELETE statements over runtime-resolved
//! columns.
//!
//! Only identifiers are spliced into the SQL text, always quoted; every value
//! travels as a typed bind parameter.

use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{BigInt, Double, Nullable, Text};
use diesel::sqlite::Sqlite;

use crate::domain::value::{Assignment, FieldValue, ValueKind};
use crate::repository::errors::MutationError;

pub(crate) type BoxedQuery<'a> = BoxedSqlQuery<'a, Sqlite, SqlQuery>;

/// Quotes an identifier for SQLite, doubling embedded quotes.
pub fn quote_ident(name: &str) -> Result<String, MutationError> {
    if name.is_empty() || name.contains('\0') {
        return Err(MutationError::Prepare(format!(
            "invalid identifier `{}`",
            name.escape_debug()
        )));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Quotes a string literal for SQLite, doubling embedded quotes.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Attaches `value` as the next positional parameter.
pub(crate) fn bind_value<'a>(query: BoxedQuery<'a>, value: &FieldValue) -> BoxedQuery<'a> {
    match value {
        FieldValue::Text(text) => query.bind::<Nullable<Text>, _>(text.clone()),
        FieldValue::Integer(number) => query.bind::<Nullable<BigInt>, _>(*number),
        FieldValue::Real(number) => query.bind::<Nullable<Double>, _>(*number),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MutationKind {
    Insert,
    Update,
    Delete,
}

/// A single-table write built from ordered column assignments and an
/// equality key predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    kind: MutationKind,
    table: String,
    assignments: Vec<Assignment>,
    keys: Vec<Assignment>,
}

impl Mutation {
    fn new(kind: MutationKind, table: &str) -> Self {
        Self {
            kind,
            table: table.to_string(),
            assignments: Vec::new(),
            keys: Vec::new(),
        }
    }

    pub fn insert(table: &str) -> Self {
        Self::new(MutationKind::Insert, table)
    }

    pub fn update(table: &str) -> Self {
        Self::new(MutationKind::Update, table)
    }

    pub fn delete(table: &str) -> Self {
        Self::new(MutationKind::Delete, table)
    }

    /// Appends every assignment in order.
    pub fn set_all(mut self, assignments: &[Assignment]) -> Self {
        self.assignments.extend_from_slice(assignments);
        self
    }

    /// Adds a `column = ?` term to the WHERE clause.
    pub fn key(mut self, column: &str, value: FieldValue) -> Self {
        self.keys.push(Assignment::new(column, value));
        self
    }

    /// Renders the statement text with `?` placeholders.
    pub fn to_sql(&self) -> Result<String, MutationError> {
        let table = quote_ident(&self.table)?;

        if self.kind != MutationKind::Delete && self.assignments.is_empty() {
            return Err(MutationError::Prepare(format!(
                "no columns to write on `{}`",
                self.table
            )));
        }
        if self.kind != MutationKind::Insert && self.keys.is_empty() {
            return Err(MutationError::Prepare(format!(
                "missing key predicate for `{}`",
                self.table
            )));
        }

        let sql = match self.kind {
            MutationKind::Insert => {
                let columns = self
                    .assignments
                    .iter()
                    .map(|assignment| quote_ident(&assignment.column))
                    .collect::<Result<Vec<_>, _>>()?;
                let placeholders = vec!["?"; columns.len()].join(", ");
                format!(
                    "INSERT INTO {table} ({}) VALUES ({placeholders})",
                    columns.join(", ")
                )
            }
            MutationKind::Update => {
                let sets = Self::terms(&self.assignments)?.join(", ");
                let keys = Self::terms(&self.keys)?.join(" AND ");
                format!("UPDATE {table} SET {sets} WHERE {keys}")
            }
            MutationKind::Delete => {
                let keys = Self::terms(&self.keys)?.join(" AND ");
                format!("DELETE FROM {table} WHERE {keys}")
            }
        };

        Ok(sql)
    }

    /// Storage types of the bound parameters, in placeholder order.
    pub fn parameter_kinds(&self) -> Vec<ValueKind> {
        self.parameters().map(FieldValue::kind).collect()
    }

    /// Runs the statement and returns the number of affected rows.
    pub fn execute(&self, conn: &mut SqliteConnection) -> Result<usize, MutationError> {
        let sql = self.to_sql()?;
        let query = self
            .parameters()
            .fold(diesel::sql_query(sql).into_boxed::<Sqlite>(), bind_value);

        Ok(query.execute(conn)?)
    }

    fn parameters(&self) -> impl Iterator<Item = &FieldValue> {
        let assignments = match self.kind {
            MutationKind::Delete => &[][..],
            _ => self.assignments.as_slice(),
        };
        assignments
            .iter()
            .chain(self.keys.iter())
            .map(|assignment| &assignment.value)
    }

    fn terms(assignments: &[Assignment]) -> Result<Vec<String>, MutationError> {
        assignments
            .iter()
            .map(|assignment| quote_ident(&assignment.column).map(|column| format!("{column} = ?")))
            .collect()
    }
}
