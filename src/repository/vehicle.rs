use diesel::prelude::*;

use crate::domain::Record;
use crate::domain::capability::{Capabilities, LogicalField};
use crate::domain::value::{Assignment, FieldValue, value_as_i64};
use crate::domain::vehicle::VehicleField;
use crate::models::record::InsertedId;
use crate::repository::mutation::{Mutation, quote_ident};
use crate::repository::query::RecordQuery;
use crate::repository::{
    DieselRepository, RepositoryResult, VehicleReader, VehicleWriter, required_column,
};

impl VehicleReader for DieselRepository {
    fn get_vehicle(
        &self,
        caps: &Capabilities<VehicleField>,
        id: i64,
    ) -> RepositoryResult<Option<Record>> {
        let id_column = required_column(caps, VehicleField::Id)?;
        let mut conn = self.conn()?;

        RecordQuery::table(caps.table())?
            .columns(caps.columns())?
            .filter_eq(quote_ident(id_column)?, FieldValue::integer(id))
            .first(&mut conn)
    }

    fn slug_taken(
        &self,
        caps: &Capabilities<VehicleField>,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        let id_column = required_column(caps, VehicleField::Id)?;
        let slug_column = required_column(caps, VehicleField::Slug)?;
        let mut conn = self.conn()?;

        let matches = RecordQuery::table(caps.table())?
            .column(id_column)?
            .filter_eq(quote_ident(slug_column)?, FieldValue::text(slug))
            .load(&mut conn)?;

        Ok(matches.iter().any(|row| match exclude_id {
            Some(exclude) => row.get(id_column).and_then(value_as_i64) != Some(exclude),
            None => true,
        }))
    }

    fn list_vehicles(&self, caps: &Capabilities<VehicleField>) -> RepositoryResult<Vec<Record>> {
        let mut conn = self.conn()?;

        let mut query = RecordQuery::table(caps.table())?.columns(caps.columns())?;
        if let Some(name) = caps.column(VehicleField::Name) {
            query = query.order_asc(quote_ident(name)?);
        }
        if let Some(id) = caps.column(VehicleField::Id) {
            query = query.order_asc(quote_ident(id)?);
        }

        query.load(&mut conn)
    }
}

impl VehicleWriter for DieselRepository {
    fn create_vehicle(&self, assignments: &[Assignment]) -> RepositoryResult<i64> {
        let mut conn = self.conn()?;

        Mutation::insert(VehicleField::TABLE)
            .set_all(assignments)
            .execute(&mut conn)?;

        let inserted = diesel::sql_query("SELECT last_insert_rowid() AS id")
            .get_result::<InsertedId>(&mut conn)?;
        Ok(inserted.id)
    }

    fn update_vehicle(
        &self,
        caps: &Capabilities<VehicleField>,
        id: i64,
        assignments: &[Assignment],
    ) -> RepositoryResult<usize> {
        let id_column = required_column(caps, VehicleField::Id)?;
        let mut conn = self.conn()?;

        let updated = Mutation::update(caps.table())
            .set_all(assignments)
            .key(id_column, FieldValue::integer(id))
            .execute(&mut conn)?;
        Ok(updated)
    }
}
