use crate::domain::Record;
use crate::domain::capability::Capabilities;
use crate::domain::history::HistoryField;
use crate::domain::value::{Assignment, FieldValue};
use crate::repository::mutation::{Mutation, quote_ident};
use crate::repository::query::RecordQuery;
use crate::repository::{
    DieselRepository, HistoryReader, HistoryWriter, RepositoryResult, required_column,
};

impl HistoryReader for DieselRepository {
    fn list_history(
        &self,
        caps: &Capabilities<HistoryField>,
        order_id: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<Record>> {
        let order_column = required_column(caps, HistoryField::OrderId)?;
        let mut conn = self.conn()?;

        let mut query = RecordQuery::table(caps.table())?
            .columns(caps.columns())?
            .filter_eq(quote_ident(order_column)?, FieldValue::integer(order_id));
        for field in [HistoryField::CreatedAt, HistoryField::Id] {
            if let Some(column) = caps.column(field) {
                query = query.order_desc(quote_ident(column)?);
            }
        }

        query.limit(limit).load(&mut conn)
    }
}

impl HistoryWriter for DieselRepository {
    fn append_history(
        &self,
        caps: &Capabilities<HistoryField>,
        assignments: &[Assignment],
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let inserted = Mutation::insert(caps.table())
            .set_all(assignments)
            .execute(&mut conn)?;
        Ok(inserted)
    }
}
