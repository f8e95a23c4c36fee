use diesel::prelude::*;
use diesel::sql_types::Text;

use crate::domain::capability::TableSchema;
use crate::models::introspection::{ColumnName, TableCount};
use crate::repository::{DieselRepository, RepositoryResult, SchemaReader};

const TABLE_EXISTS_SQL: &str =
    "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?";
const TABLE_COLUMNS_SQL: &str = "SELECT name FROM pragma_table_info(?) ORDER BY cid";

impl SchemaReader for DieselRepository {
    fn inspect_table(&self, table: &str) -> RepositoryResult<TableSchema> {
        let mut conn = self.conn()?;

        let found = diesel::sql_query(TABLE_EXISTS_SQL)
            .bind::<Text, _>(table)
            .get_result::<TableCount>(&mut conn)?;
        if found.count == 0 {
            log::debug!("table `{table}` not found");
            return Ok(TableSchema::missing(table));
        }

        let columns = diesel::sql_query(TABLE_COLUMNS_SQL)
            .bind::<Text, _>(table)
            .load::<ColumnName>(&mut conn)?
            .into_iter()
            .map(|column| column.name)
            .collect::<Vec<_>>();
        log::debug!("table `{table}` has columns {columns:?}");

        Ok(TableSchema::new(table, columns))
    }
}
