use diesel::QueryableByName;
use diesel::sql_types::{BigInt, Text};

/// Result of counting matching entries in `sqlite_master`.
#[derive(Debug, QueryableByName)]
pub struct TableCount {
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}

/// One row of `pragma_table_info`.
#[derive(Debug, QueryableByName)]
pub struct ColumnName {
    #[diesel(sql_type = Text)]
    pub name: String,
}
