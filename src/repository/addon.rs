use crate::domain::Record;
use crate::domain::addon::AddOnField;
use crate::domain::capability::Capabilities;
use crate::domain::value::{Assignment, FieldValue};
use crate::repository::mutation::{Mutation, quote_ident};
use crate::repository::query::RecordQuery;
use crate::repository::{
    AddOnReader, AddOnWriter, DieselRepository, RepositoryResult, required_column,
};

impl AddOnReader for DieselRepository {
    fn get_addon(
        &self,
        caps: &Capabilities<AddOnField>,
        id: i64,
    ) -> RepositoryResult<Option<Record>> {
        let id_column = required_column(caps, AddOnField::Id)?;
        let mut conn = self.conn()?;

        RecordQuery::table(caps.table())?
            .columns(caps.columns())?
            .filter_eq(quote_ident(id_column)?, FieldValue::integer(id))
            .first(&mut conn)
    }
}

impl AddOnWriter for DieselRepository {
    fn update_addon(
        &self,
        caps: &Capabilities<AddOnField>,
        id: i64,
        assignments: &[Assignment],
    ) -> RepositoryResult<usize> {
        let id_column = required_column(caps, AddOnField::Id)?;
        let mut conn = self.conn()?;

        let updated = Mutation::update(caps.table())
            .set_all(assignments)
            .key(id_column, FieldValue::integer(id))
            .execute(&mut conn)?;
        Ok(updated)
    }
}
