use diesel::QueryableByName;
use diesel::sql_types::{BigInt, Text};

use crate::domain::Record;

/// A row serialized to a JSON object by SQLite's `json_object`.
#[derive(Debug, QueryableByName)]
pub struct JsonRow {
    #[diesel(sql_type = Text)]
    pub record: String,
}

impl JsonRow {
    pub fn into_record(self) -> Result<Record, serde_json::Error> {
        serde_json::from_str(&self.record)
    }
}

/// Rowid of the last successful insert on the connection.
#[derive(Debug, QueryableByName)]
pub struct InsertedId {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
}
