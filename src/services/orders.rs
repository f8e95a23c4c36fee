use pushkind_common::domain::auth::AuthenticatedUser;

use crate::domain::Record;
use crate::domain::admin::{AdminField, FALLBACK_ADMIN_NAME, display_name_from_record};
use crate::domain::capability::Capabilities;
use crate::domain::history::{HISTORY_LIMIT, HistoryField, NewHistoryEntry, UPDATE_ACTION};
use crate::domain::order::{
    ContactField, FieldChange, OrderField, OrderSnapshot, OrderView, diff_tracked_fields,
    finalize_order_projection, render_change_summary,
};
use crate::domain::value::value_as_i64;
use crate::domain::vehicle::VehicleField;
use crate::forms::orders::OrderForm;
use crate::repository::{
    AdminDirectory, HistoryReader, HistoryWriter, OrderReader, OrderWriter, SchemaReader,
};
use crate::services::{ServiceError, ServiceResult, ensure_admin, load_capabilities};

/// State captured before an order update, recorded once the update lands.
struct OrderAudit {
    order_id: i64,
    contact_id: Option<i64>,
    changes: Vec<FieldChange>,
    previous: OrderSnapshot,
}

fn load_contact<R>(
    repo: &R,
    caps: &Capabilities<ContactField>,
    contact_id: Option<i64>,
) -> ServiceResult<Record>
where
    R: OrderReader + ?Sized,
{
    let Some(contact_id) = contact_id.filter(|id| *id > 0) else {
        return Ok(Record::new());
    };
    if !caps.supports(ContactField::Id) {
        return Ok(Record::new());
    }

    let contact = repo
        .get_contact(caps, contact_id)
        .map_err(|err| ServiceError::storage("Unable to load contact", err))?;
    Ok(contact.unwrap_or_default())
}

/// Applies an `update_order` request and returns the refreshed, joined order.
///
/// A history entry is appended when a tracked field changed and the history
/// table exists. Failing to record it does not fail the update.
pub fn update_order<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: Option<OrderForm>,
) -> ServiceResult<Record>
where
    R: SchemaReader + OrderReader + OrderWriter + HistoryWriter + AdminDirectory + ?Sized,
{
    ensure_admin(user)?;

    let form = form.ok_or_else(|| ServiceError::BadRequest("Missing order data.".to_string()))?;
    let id = form
        .id()
        .ok_or_else(|| ServiceError::BadRequest("Invalid order id.".to_string()))?;

    let caps = load_capabilities::<OrderField, _>(repo)?;
    if !caps.table_exists() {
        return Err(ServiceError::Schema(
            "Order requests table not found.".to_string(),
        ));
    }

    let update = form
        .into_status_update()
        .map_err(|err| ServiceError::Validation(err.to_string()))?;

    let before = repo
        .get_order(&caps, id)
        .map_err(|err| ServiceError::storage("Unable to load order", err))?
        .ok_or_else(|| ServiceError::NotFound("Order not found.".to_string()))?;

    let contact_caps = load_capabilities::<ContactField, _>(repo)?;
    let contact_id = caps
        .column(OrderField::ContactInfoId)
        .and_then(|column| before.get(column))
        .and_then(value_as_i64);
    let contact_before = load_contact(repo, &contact_caps, contact_id)?;

    let changes = diff_tracked_fields(&caps, &before, &update);

    let assignments = caps.assignments(update.values());
    if !assignments.is_empty() {
        repo.update_order(&caps, id, &assignments)
            .map_err(|err| ServiceError::storage("Update failed", err))?;
    }

    let has_status = caps.supports(OrderField::Status);
    let view = OrderView {
        order: caps,
        vehicle: load_capabilities::<VehicleField, _>(repo)?,
        contact: contact_caps,
    };
    let updated = repo
        .refresh_order(&view, id)
        .map_err(|err| ServiceError::storage("Unable to load updated order", err))?
        .ok_or_else(|| ServiceError::Persistence("Updated order not found.".to_string()))?;
    let updated = finalize_order_projection(updated, has_status);

    if !changes.is_empty() {
        let audit = OrderAudit {
            order_id: id,
            contact_id,
            changes,
            previous: OrderSnapshot {
                order: before,
                contact: contact_before,
            },
        };
        if let Err(err) = record_history(repo, user, &view, audit, &updated) {
            log::warn!("Failed to record history of order {id}: {err}");
        }
    }

    Ok(updated)
}

fn record_history<R>(
    repo: &R,
    user: &AuthenticatedUser,
    view: &OrderView,
    audit: OrderAudit,
    updated: &Record,
) -> ServiceResult<()>
where
    R: SchemaReader + OrderReader + HistoryWriter + AdminDirectory + ?Sized,
{
    let caps = load_capabilities::<HistoryField, _>(repo)?;
    if !caps.table_exists() {
        return Ok(());
    }

    let entry = NewHistoryEntry {
        order_id: audit.order_id,
        admin_user: resolve_admin_name(repo, user),
        action: UPDATE_ACTION.to_string(),
        change_summary: render_change_summary(&audit.changes),
        previous: audit.previous,
        current: OrderSnapshot {
            order: updated.clone(),
            contact: load_contact(repo, &view.contact, audit.contact_id)?,
        },
    };
    let values = entry
        .values()
        .map_err(|err| ServiceError::Persistence(format!("Unable to encode snapshot: {err}")))?;
    let assignments = caps.assignments(values);
    if assignments.is_empty() {
        return Ok(());
    }

    repo.append_history(&caps, &assignments)
        .map_err(|err| ServiceError::storage("Insert failed", err))?;
    Ok(())
}

/// Session name first, then the `admin_users` row of the session subject.
fn resolve_admin_name<R>(repo: &R, user: &AuthenticatedUser) -> String
where
    R: SchemaReader + AdminDirectory + ?Sized,
{
    let session_name = user.name.trim();
    if !session_name.is_empty() {
        return session_name.to_string();
    }

    let Some(admin_id) = user.sub.trim().parse::<i64>().ok().filter(|id| *id > 0) else {
        return FALLBACK_ADMIN_NAME.to_string();
    };
    let caps = match load_capabilities::<AdminField, _>(repo) {
        Ok(caps) if caps.supports(AdminField::Id) => caps,
        Ok(_) => return FALLBACK_ADMIN_NAME.to_string(),
        Err(err) => {
            log::warn!("Failed to inspect admin directory: {err}");
            return FALLBACK_ADMIN_NAME.to_string();
        }
    };

    match repo.find_admin(&caps, admin_id) {
        Ok(Some(row)) => display_name_from_record(&caps, &row)
            .unwrap_or_else(|| FALLBACK_ADMIN_NAME.to_string()),
        Ok(None) => FALLBACK_ADMIN_NAME.to_string(),
        Err(err) => {
            log::warn!("Failed to look up admin {admin_id}: {err}");
            FALLBACK_ADMIN_NAME.to_string()
        }
    }
}

/// Returns the newest history entries of an order.
pub fn fetch_history<R>(
    repo: &R,
    user: &AuthenticatedUser,
    order_id: Option<i64>,
) -> ServiceResult<Vec<Record>>
where
    R: SchemaReader + HistoryReader + ?Sized,
{
    ensure_admin(user)?;

    let order_id =
        order_id.ok_or_else(|| ServiceError::BadRequest("Invalid order id.".to_string()))?;

    let caps = load_capabilities::<HistoryField, _>(repo)?;
    if !caps.table_exists() || !caps.supports(HistoryField::OrderId) {
        return Err(ServiceError::NotFound(
            "Order history unavailable.".to_string(),
        ));
    }

    repo.list_history(&caps, order_id, HISTORY_LIMIT)
        .map_err(|err| ServiceError::storage("Unable to load history", err))
}
