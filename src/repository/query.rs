//! SELECT statements that project each row to a JSON object inside SQLite.

use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::Record;
use crate::domain::value::FieldValue;
use crate::models::record::JsonRow;
use crate::repository::errors::{MutationError, RepositoryResult};
use crate::repository::mutation::{bind_value, quote_ident, quote_literal};

/// Key/value pairs per JSON function call. Keeps every call under the
/// 127-argument default of `SQLITE_MAX_FUNCTION_ARG`.
const JSON_PAIRS_PER_CALL: usize = 50;

/// JSON cannot hold BLOBs, so they are projected as hex text.
fn json_safe(expr: &str) -> String {
    format!("CASE typeof({expr}) WHEN 'blob' THEN hex({expr}) ELSE {expr} END")
}

/// JSON path addressing the top-level member `key`.
fn json_path(key: &str) -> Result<String, MutationError> {
    if key.contains('"') {
        return Err(MutationError::Prepare(format!(
            "cannot address `{}` in a JSON path",
            key.escape_debug()
        )));
    }
    Ok(format!("$.\"{key}\""))
}

/// Builder for `SELECT json_object(...) AS record FROM ...` queries.
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    from: String,
    fields: Vec<(String, String)>,
    filters: Vec<(String, FieldValue)>,
    order: Vec<String>,
    limit: Option<i64>,
}

impl RecordQuery {
    /// Query over a single table.
    pub fn table(table: &str) -> Result<Self, MutationError> {
        Ok(Self::from_clause(quote_ident(table)?))
    }

    /// Query over an already-rendered FROM clause (joins, aliases).
    pub fn from_clause(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            ..Self::default()
        }
    }

    /// Projects `column` under its own name.
    pub fn column(self, column: &str) -> Result<Self, MutationError> {
        let expr = quote_ident(column)?;
        Ok(self.field(column, expr))
    }

    /// Projects every column under its own name.
    pub fn columns<S: AsRef<str>>(self, columns: &[S]) -> Result<Self, MutationError> {
        columns
            .iter()
            .try_fold(self, |query, column| query.column(column.as_ref()))
    }

    /// Projects an arbitrary SQL expression under `key`.
    pub fn field(mut self, key: &str, expr: String) -> Self {
        self.fields.push((key.to_string(), expr));
        self
    }

    /// Adds `expr = ?` to the WHERE clause.
    pub fn filter_eq(mut self, expr: String, value: FieldValue) -> Self {
        self.filters.push((expr, value));
        self
    }

    pub fn order_desc(mut self, expr: String) -> Self {
        self.order.push(format!("{expr} DESC"));
        self
    }

    pub fn order_asc(mut self, expr: String) -> Self {
        self.order.push(format!("{expr} ASC"));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// `json_object(...)` for the first chunk of fields, wrapped in one
    /// `json_insert(...)` per further chunk so no call exceeds SQLite's
    /// argument limit.
    fn projection(&self) -> Result<String, MutationError> {
        let mut chunks = self.fields.chunks(JSON_PAIRS_PER_CALL);
        let Some(first) = chunks.next() else {
            return Err(MutationError::Prepare(format!(
                "no columns to select from {}",
                self.from
            )));
        };

        let pairs = first
            .iter()
            .map(|(key, expr)| format!("{}, {}", quote_literal(key), json_safe(expr)))
            .collect::<Vec<_>>()
            .join(", ");
        let mut projection = format!("json_object({pairs})");

        for chunk in chunks {
            let pairs = chunk
                .iter()
                .map(|(key, expr)| {
                    let path = json_path(key)?;
                    Ok(format!("{}, {}", quote_literal(&path), json_safe(expr)))
                })
                .collect::<Result<Vec<_>, MutationError>>()?
                .join(", ");
            projection = format!("json_insert({projection}, {pairs})");
        }

        Ok(projection)
    }

    /// Renders the statement text with `?` placeholders.
    pub fn to_sql(&self) -> Result<String, MutationError> {
        let projection = self.projection()?;
        let mut sql = format!("SELECT {projection} AS record FROM {}", self.from);

        if !self.filters.is_empty() {
            let terms = self
                .filters
                .iter()
                .map(|(expr, _)| format!("{expr} = ?"))
                .collect::<Vec<_>>()
                .join(" AND ");
            sql.push_str(&format!(" WHERE {terms}"));
        }
        if !self.order.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", self.order.join(", ")));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        Ok(sql)
    }

    pub fn load(&self, conn: &mut SqliteConnection) -> RepositoryResult<Vec<Record>> {
        let sql = self.to_sql()?;
        let query = self
            .filters
            .iter()
            .map(|(_, value)| value)
            .fold(diesel::sql_query(sql).into_boxed::<Sqlite>(), bind_value);

        let rows = query.load::<JsonRow>(conn)?;
        rows.into_iter()
            .map(|row| row.into_record().map_err(Into::into))
            .collect()
    }

    /// Loads at most one row.
    pub fn first(self, conn: &mut SqliteConnection) -> RepositoryResult<Option<Record>> {
        let mut rows = self.limit(1).load(conn)?;
        Ok(rows.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_projection_filters_and_order() {
        let query = RecordQuery::table("vehicle_discounts")
            .and_then(|query| query.columns(&["id", "price_USD"]))
            .map(|query| {
                query
                    .filter_eq(r#""vehicle_id""#.to_string(), FieldValue::integer(4))
                    .order_desc(r#""id""#.to_string())
                    .limit(1)
            })
            .and_then(|query| query.to_sql());

        assert_eq!(
            query.as_deref(),
            Ok(concat!(
                r#"SELECT json_object('id', CASE typeof("id") WHEN 'blob' THEN hex("id") "#,
                r#"ELSE "id" END, 'price_USD', CASE typeof("price_USD") WHEN 'blob' "#,
                r#"THEN hex("price_USD") ELSE "price_USD" END) AS record "#,
                r#"FROM "vehicle_discounts" WHERE "vehicle_id" = ? ORDER BY "id" DESC LIMIT 1"#
            ))
        );
    }

    #[test]
    fn wide_projections_are_split_across_calls() {
        let columns = (0..120).map(|n| format!("c{n}")).collect::<Vec<_>>();
        let sql = RecordQuery::table("wide")
            .and_then(|query| query.columns(&columns))
            .and_then(|query| query.to_sql())
            .expect("render wide query");

        assert!(sql.starts_with("SELECT json_insert(json_insert(json_object('c0', "));
        assert!(sql.contains(r#"'$."c50"', CASE typeof("c50")"#));
        assert!(sql.contains(r#"'$."c119"', CASE typeof("c119")"#));
        assert!(!sql.contains("'c50',"));
    }

    #[test]
    fn keys_with_quotes_cannot_be_split_into_paths() {
        let mut query = RecordQuery::from_clause(r#""wide""#);
        for n in 0..JSON_PAIRS_PER_CALL {
            query = query.field(&format!("c{n}"), format!("\"c{n}\""));
        }
        let query = query.field(r#"odd"key"#, r#""odd""key""#.to_string());

        assert!(matches!(query.to_sql(), Err(MutationError::Prepare(_))));
    }

    #[test]
    fn empty_projection_fails_to_prepare() {
        let query = RecordQuery::from_clause(r#""vehicles""#);

        assert!(matches!(query.to_sql(), Err(MutationError::Prepare(_))));
    }
}
