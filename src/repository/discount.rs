use crate::domain::Record;
use crate::domain::capability::Capabilities;
use crate::domain::discount::{DiscountField, DiscountTarget};
use crate::domain::value::{Assignment, FieldValue};
use crate::repository::mutation::{Mutation, quote_ident};
use crate::repository::query::RecordQuery;
use crate::repository::{
    DieselRepository, DiscountReader, DiscountWriter, RepositoryResult, required_column,
};

impl DiscountReader for DieselRepository {
    fn latest_discount(
        &self,
        caps: &Capabilities<DiscountField>,
        vehicle_id: i64,
    ) -> RepositoryResult<Option<Record>> {
        let vehicle_column = required_column(caps, DiscountField::VehicleId)?;
        let mut conn = self.conn()?;

        // Without a primary key the vehicle column is the only ordering left.
        let order_column = caps.column(DiscountField::Id).unwrap_or(vehicle_column);

        RecordQuery::table(caps.table())?
            .columns(caps.columns())?
            .filter_eq(quote_ident(vehicle_column)?, FieldValue::integer(vehicle_id))
            .order_desc(quote_ident(order_column)?)
            .first(&mut conn)
    }
}

impl DiscountWriter for DieselRepository {
    fn delete_discounts(
        &self,
        caps: &Capabilities<DiscountField>,
        vehicle_id: i64,
    ) -> RepositoryResult<usize> {
        let vehicle_column = required_column(caps, DiscountField::VehicleId)?;
        let mut conn = self.conn()?;

        let deleted = Mutation::delete(caps.table())
            .key(vehicle_column, FieldValue::integer(vehicle_id))
            .execute(&mut conn)?;
        Ok(deleted)
    }

    fn insert_discount(
        &self,
        caps: &Capabilities<DiscountField>,
        assignments: &[Assignment],
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let inserted = Mutation::insert(caps.table())
            .set_all(assignments)
            .execute(&mut conn)?;
        Ok(inserted)
    }

    fn update_discount(
        &self,
        caps: &Capabilities<DiscountField>,
        target: DiscountTarget,
        assignments: &[Assignment],
    ) -> RepositoryResult<usize> {
        let (key_column, key) = match target {
            DiscountTarget::Id(id) => (required_column(caps, DiscountField::Id)?, id),
            DiscountTarget::Vehicle(vehicle_id) => {
                (required_column(caps, DiscountField::VehicleId)?, vehicle_id)
            }
        };
        let mut conn = self.conn()?;

        let updated = Mutation::update(caps.table())
            .set_all(assignments)
            .key(key_column, FieldValue::integer(key))
            .execute(&mut conn)?;
        Ok(updated)
    }
}
