use crate::domain::Record;
use crate::domain::capability::Capabilities;
use crate::domain::order::{ContactField, OrderField, OrderView};
use crate::domain::value::{Assignment, FieldValue};
use crate::domain::vehicle::VehicleField;
use crate::repository::errors::MutationError;
use crate::repository::mutation::{Mutation, quote_ident};
use crate::repository::query::RecordQuery;
use crate::repository::{
    DieselRepository, OrderReader, OrderWriter, RepositoryResult, required_column,
};

fn qualified(alias: &str, column: &str) -> Result<String, MutationError> {
    Ok(format!("{alias}.{}", quote_ident(column)?))
}

/// `order_requests o LEFT JOIN vehicles v ... LEFT JOIN contact_info c ...`
/// projected to one flat object: order columns as-is, vehicle columns under
/// their `vehicle_*` aliases, contact columns unprefixed.
fn refresh_query(
    view: &OrderView,
    id_column: &str,
    id: i64,
) -> Result<RecordQuery, MutationError> {
    let mut from = format!("{} o", quote_ident(view.order.table())?);
    if view.joins_vehicle() {
        from.push_str(&format!(
            " LEFT JOIN {} v ON {} = {}",
            quote_ident(view.vehicle.table())?,
            qualified("v", required_vehicle_id(view)?)?,
            qualified("o", required_car_id(view)?)?,
        ));
    }
    if view.joins_contact() {
        from.push_str(&format!(
            " LEFT JOIN {} c ON {} = {}",
            quote_ident(view.contact.table())?,
            qualified("c", required_contact_id(view)?)?,
            qualified("o", required_contact_fk(view)?)?,
        ));
    }

    let mut query = RecordQuery::from_clause(from);
    for (_, column) in view.order.resolved() {
        query = query.field(column, qualified("o", column)?);
    }
    if view.joins_vehicle() {
        for (field, column) in view.vehicle.resolved() {
            if let Some(alias) = field.order_alias() {
                query = query.field(alias, qualified("v", column)?);
            }
        }
    }
    if view.joins_contact() {
        for (field, column) in view.contact.resolved() {
            if field != ContactField::Id {
                query = query.field(column, qualified("c", column)?);
            }
        }
    }

    Ok(query.filter_eq(qualified("o", id_column)?, FieldValue::integer(id)))
}

fn join_error(what: &str) -> MutationError {
    MutationError::Prepare(format!("join column `{what}` is not available"))
}

fn required_vehicle_id(view: &OrderView) -> Result<&'static str, MutationError> {
    view.vehicle
        .column(VehicleField::Id)
        .ok_or_else(|| join_error("vehicles.id"))
}

fn required_car_id(view: &OrderView) -> Result<&'static str, MutationError> {
    view.order
        .column(OrderField::CarId)
        .ok_or_else(|| join_error("order_requests.car_id"))
}

fn required_contact_id(view: &OrderView) -> Result<&'static str, MutationError> {
    view.contact
        .column(ContactField::Id)
        .ok_or_else(|| join_error("contact_info.id"))
}

fn required_contact_fk(view: &OrderView) -> Result<&'static str, MutationError> {
    view.order
        .column(OrderField::ContactInfoId)
        .ok_or_else(|| join_error("order_requests.contact_info_id"))
}

impl OrderReader for DieselRepository {
    fn get_order(
        &self,
        caps: &Capabilities<OrderField>,
        id: i64,
    ) -> RepositoryResult<Option<Record>> {
        let id_column = required_column(caps, OrderField::Id)?;
        let mut conn = self.conn()?;

        RecordQuery::table(caps.table())?
            .columns(caps.columns())?
            .filter_eq(quote_ident(id_column)?, FieldValue::integer(id))
            .first(&mut conn)
    }

    fn get_contact(
        &self,
        caps: &Capabilities<ContactField>,
        id: i64,
    ) -> RepositoryResult<Option<Record>> {
        let id_column = required_column(caps, ContactField::Id)?;
        let mut conn = self.conn()?;

        RecordQuery::table(caps.table())?
            .columns(caps.columns())?
            .filter_eq(quote_ident(id_column)?, FieldValue::integer(id))
            .first(&mut conn)
    }

    fn refresh_order(&self, view: &OrderView, id: i64) -> RepositoryResult<Option<Record>> {
        let id_column = required_column(&view.order, OrderField::Id)?;
        let query = refresh_query(view, id_column, id)?;
        let mut conn = self.conn()?;

        query.first(&mut conn)
    }
}

impl OrderWriter for DieselRepository {
    fn update_order(
        &self,
        caps: &Capabilities<OrderField>,
        id: i64,
        assignments: &[Assignment],
    ) -> RepositoryResult<usize> {
        let id_column = required_column(caps, OrderField::Id)?;
        let mut conn = self.conn()?;

        let updated = Mutation::update(caps.table())
            .set_all(assignments)
            .key(id_column, FieldValue::integer(id))
            .execute(&mut conn)?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(order: &[&str], vehicle: &[&str], contact: &[&str]) -> OrderView {
        OrderView {
            order: Capabilities::from_columns(order),
            vehicle: Capabilities::from_columns(vehicle),
            contact: Capabilities::from_columns(contact),
        }
    }

    #[test]
    fn refresh_joins_and_aliases_existing_columns() {
        let view = view(
            &["id", "car_id", "contact_info_id", "confirmed"],
            &["id", "name", "base_price_USD", "times_requested"],
            &["id", "first_name"],
        );

        let sql = refresh_query(&view, "id", 4).and_then(|query| query.to_sql());

        assert_eq!(
            sql.as_deref(),
            Ok(concat!(
                r#"SELECT json_object('id', o."id", 'confirmed', o."confirmed", "#,
                r#"'car_id', o."car_id", 'contact_info_id', o."contact_info_id", "#,
                r#"'vehicle_name', v."name", 'vehicle_base_price', v."base_price_USD", "#,
                r#"'first_name', c."first_name") AS record "#,
                r#"FROM "order_requests" o "#,
                r#"LEFT JOIN "vehicles" v ON v."id" = o."car_id" "#,
                r#"LEFT JOIN "contact_info" c ON c."id" = o."contact_info_id" "#,
                r#"WHERE o."id" = ?"#
            ))
        );
    }

    #[test]
    fn refresh_skips_joins_without_foreign_keys() {
        let view = view(&["id", "status"], &["id", "name"], &["id", "first_name"]);

        let sql = refresh_query(&view, "id", 4).and_then(|query| query.to_sql());

        assert_eq!(
            sql.as_deref(),
            Ok(concat!(
                r#"SELECT json_object('id', o."id", 'status', o."status") AS record "#,
                r#"FROM "order_requests" o WHERE o."id" = ?"#
            ))
        );
    }
}
