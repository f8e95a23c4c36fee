use pushkind_common::domain::auth::AuthenticatedUser;

use crate::domain::discount::{DiscountField, DiscountPlan, DiscountProjection};
use crate::domain::vehicle::VehicleField;
use crate::forms::discounts::DiscountForm;
use crate::repository::{DiscountReader, DiscountWriter, SchemaReader, VehicleReader};
use crate::services::{ServiceError, ServiceResult, ensure_admin, load_capabilities};

/// Applies an `update_discount` request.
///
/// Returns `None` when the request cleared both prices and the vehicle's
/// discounts were removed, otherwise the normalized latest discount.
pub fn update_discount<R>(
    repo: &R,
    user: &AuthenticatedUser,
    vehicle_id: Option<i64>,
    form: Option<DiscountForm>,
) -> ServiceResult<Option<DiscountProjection>>
where
    R: SchemaReader + VehicleReader + DiscountReader + DiscountWriter + ?Sized,
{
    ensure_admin(user)?;

    let vehicle_id =
        vehicle_id.ok_or_else(|| ServiceError::BadRequest("Invalid vehicle id.".to_string()))?;
    let form =
        form.ok_or_else(|| ServiceError::BadRequest("Missing discount data.".to_string()))?;

    let caps = load_capabilities::<DiscountField, _>(repo)?;
    if !caps.supports_discounts() {
        return Err(ServiceError::Schema("Discount fields not found.".to_string()));
    }

    let input = form
        .into_input()
        .map_err(|err| ServiceError::Validation(err.to_string()))?;

    let vehicles = load_capabilities::<VehicleField, _>(repo)?;
    if vehicles.table_exists() {
        let vehicle = repo
            .get_vehicle(&vehicles, vehicle_id)
            .map_err(|err| ServiceError::storage("Unable to load vehicle", err))?;
        if vehicle.is_none() {
            return Err(ServiceError::NotFound("Vehicle not found.".to_string()));
        }
    }

    let existing = if input.has_price() {
        repo.latest_discount(&caps, vehicle_id)
            .map_err(|err| ServiceError::storage("Unable to load discount", err))?
    } else {
        None
    };

    match DiscountPlan::decide(&caps, vehicle_id, &input, existing.as_ref()) {
        DiscountPlan::Remove => {
            let removed = repo
                .delete_discounts(&caps, vehicle_id)
                .map_err(|err| ServiceError::storage("Delete failed", err))?;
            log::info!("removed {removed} discount rows of vehicle {vehicle_id}");
            return Ok(None);
        }
        DiscountPlan::Insert(assignments) => {
            repo.insert_discount(&caps, &assignments)
                .map_err(|err| ServiceError::storage("Insert failed", err))?;
        }
        DiscountPlan::Update {
            target,
            assignments,
        } => {
            repo.update_discount(&caps, target, &assignments)
                .map_err(|err| ServiceError::storage("Update failed", err))?;
        }
    }

    let latest = repo
        .latest_discount(&caps, vehicle_id)
        .map_err(|err| ServiceError::storage("Unable to load discount", err))?;
    Ok(latest.map(|row| DiscountProjection::from_record(&caps, &row)))
}
