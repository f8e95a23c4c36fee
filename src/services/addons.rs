use pushkind_common::domain::auth::AuthenticatedUser;

use crate::domain::Record;
use crate::domain::addon::AddOnField;
use crate::forms::addons::AddOnForm;
use crate::repository::{AddOnReader, AddOnWriter, SchemaReader};
use crate::services::{ServiceError, ServiceResult, ensure_admin, load_capabilities};

/// Applies an `update_addon` request and returns the stored row.
///
/// `form` is `None` when the request carried no `addon` object.
pub fn update_addon<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: Option<AddOnForm>,
) -> ServiceResult<Record>
where
    R: SchemaReader + AddOnReader + AddOnWriter + ?Sized,
{
    ensure_admin(user)?;

    let form = form.ok_or_else(|| ServiceError::BadRequest("Missing add-on data.".to_string()))?;
    let id = form
        .id()
        .ok_or_else(|| ServiceError::BadRequest("Invalid add-on id.".to_string()))?;

    let caps = load_capabilities::<AddOnField, _>(repo)?;
    if !caps.table_exists() {
        return Err(ServiceError::Schema("Add-ons table not found.".to_string()));
    }
    if !caps.supports(AddOnField::Id) {
        return Err(ServiceError::Schema(
            "Add-ons table is missing an id field.".to_string(),
        ));
    }

    let values = form
        .into_values(&caps)
        .map_err(|err| ServiceError::Validation(err.to_string()))?;
    let assignments = caps.assignments(values);
    if assignments.is_empty() {
        return Err(ServiceError::BadRequest("No fields to update.".to_string()));
    }

    repo.update_addon(&caps, id, &assignments)
        .map_err(|err| ServiceError::storage("Update failed", err))?;

    repo.get_addon(&caps, id)
        .map_err(|err| ServiceError::storage("Failed to load updated add-on", err))?
        .ok_or_else(|| ServiceError::NotFound("Add-on not found.".to_string()))
}
