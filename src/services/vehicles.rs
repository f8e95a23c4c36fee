use pushkind_common::domain::auth::AuthenticatedUser;

use crate::domain::Record;
use crate::domain::capability::Capabilities;
use crate::domain::vehicle::{
    FleetOverview, FleetStats, VehicleField, normalize_slug, slug_candidate,
};
use crate::forms::vehicles::{VehicleForm, VehicleFormError, VehicleFormMode};
use crate::repository::{SchemaReader, VehicleReader, VehicleWriter};
use crate::services::{ServiceError, ServiceResult, ensure_admin, load_capabilities};

fn vehicle_capabilities<R>(repo: &R) -> ServiceResult<Capabilities<VehicleField>>
where
    R: SchemaReader + ?Sized,
{
    let caps = load_capabilities::<VehicleField, _>(repo)?;
    if !caps.table_exists() {
        return Err(ServiceError::Schema("Vehicles table not found.".to_string()));
    }
    Ok(caps)
}

fn form_error(err: VehicleFormError) -> ServiceError {
    ServiceError::Validation(err.to_string())
}

/// Returns `candidate` normalized, or the first `_2`, `_3`, ... variant not
/// used by another vehicle.
///
/// The probe and the following write are separate statements; concurrent
/// requests may still race for the same slug.
pub fn allocate_unique_slug<R>(
    repo: &R,
    caps: &Capabilities<VehicleField>,
    candidate: &str,
    exclude_id: Option<i64>,
) -> ServiceResult<String>
where
    R: VehicleReader + ?Sized,
{
    let base = normalize_slug(candidate);
    if !caps.supports(VehicleField::Slug) {
        return Ok(base);
    }

    let mut attempt = 1;
    loop {
        let slug = slug_candidate(&base, attempt);
        let taken = repo
            .slug_taken(caps, &slug, exclude_id)
            .map_err(|err| ServiceError::storage("Unable to check slug", err))?;
        if !taken {
            return Ok(slug);
        }
        attempt += 1;
    }
}

/// Applies an `update_vehicle` request and returns the stored row.
pub fn update_vehicle<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: VehicleForm,
) -> ServiceResult<Record>
where
    R: SchemaReader + VehicleReader + VehicleWriter + ?Sized,
{
    ensure_admin(user)?;
    let caps = vehicle_capabilities(repo)?;

    let id = form.id();
    let draft = form.into_draft(VehicleFormMode::Update).map_err(form_error)?;
    let id = id.ok_or_else(|| ServiceError::BadRequest("Invalid vehicle id.".to_string()))?;

    let existing = repo
        .get_vehicle(&caps, id)
        .map_err(|err| ServiceError::storage("Unable to load vehicle", err))?;
    if existing.is_none() {
        return Err(ServiceError::NotFound("Vehicle not found.".to_string()));
    }

    let slug = allocate_unique_slug(repo, &caps, &draft.slug, Some(id))?;
    let draft = draft.with_slug(slug);

    let assignments = caps.assignments(draft.update_values());
    if assignments.is_empty() {
        return Err(ServiceError::Schema(
            "No editable columns available.".to_string(),
        ));
    }

    repo.update_vehicle(&caps, id, &assignments)
        .map_err(|err| ServiceError::storage("Update failed", err))?;

    repo.get_vehicle(&caps, id)
        .map_err(|err| ServiceError::storage("Unable to load vehicle", err))?
        .ok_or_else(|| ServiceError::Persistence("Updated vehicle not found.".to_string()))
}

/// Applies a `create_vehicle` request and returns the stored row.
pub fn create_vehicle<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: VehicleForm,
) -> ServiceResult<Record>
where
    R: SchemaReader + VehicleReader + VehicleWriter + ?Sized,
{
    ensure_admin(user)?;
    let caps = vehicle_capabilities(repo)?;

    let draft = form.into_draft(VehicleFormMode::Create).map_err(form_error)?;
    let slug = allocate_unique_slug(repo, &caps, &draft.slug, None)?;
    let draft = draft.with_slug(slug);

    let assignments = caps.assignments(draft.create_values());
    if assignments.is_empty() {
        return Err(ServiceError::Schema(
            "No writable columns available for create.".to_string(),
        ));
    }

    let id = repo
        .create_vehicle(&assignments)
        .map_err(|err| ServiceError::storage("Create failed", err))?;
    log::info!("created vehicle {id} with slug {}", draft.slug);

    repo.get_vehicle(&caps, id)
        .map_err(|err| ServiceError::storage("Unable to load vehicle", err))?
        .ok_or_else(|| ServiceError::Persistence("Created vehicle not found.".to_string()))
}

/// Every vehicle ordered by name, with counters.
pub fn load_fleet_overview<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<FleetOverview>
where
    R: SchemaReader + VehicleReader + ?Sized,
{
    ensure_admin(user)?;
    let caps = vehicle_capabilities(repo)?;

    let vehicles = repo
        .list_vehicles(&caps)
        .map_err(|err| ServiceError::storage("Unable to load vehicles", err))?;
    let stats = FleetStats::from_records(&vehicles);

    Ok(FleetOverview { vehicles, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    use crate::SERVICE_ACCESS_ROLE;
    use crate::domain::capability::TableSchema;
    use crate::domain::value::{Assignment, FieldValue};
    use crate::repository::mock::MockStore;
    use crate::services::test_support::{record, schema, user_with_roles};

    const VEHICLE_COLUMNS: &[&str] = &[
        "id",
        "name",
        "type",
        "slug",
        "base_price_USD",
        "base_price_XCD",
        "insurance",
        "people",
        "bags",
        "doors",
        "manual",
        "ac",
        "4wd",
        "showing",
        "landing_order",
        "times_requested",
    ];

    fn vehicles_schema() -> TableSchema {
        schema("vehicles", VEHICLE_COLUMNS)
    }

    fn form(value: Value) -> VehicleForm {
        VehicleForm::from_value(Some(&value))
    }

    fn value_of<'a>(assignments: &'a [Assignment], column: &str) -> Option<&'a FieldValue> {
        assignments
            .iter()
            .find(|assignment| assignment.column == column)
            .map(|assignment| &assignment.value)
    }

    fn valid_update(id: i64) -> VehicleForm {
        form(json!({
            "id": id,
            "name": "Jimny",
            "type": "suv",
            "slug": "Jimny",
            "base_price_USD": 55,
            "insurance": 10,
            "people": 4,
            "bags": 1,
            "doors": 3,
        }))
    }

    #[test]
    fn update_requires_role() {
        let repo = MockStore::new();
        let user = user_with_roles(&[]);

        let result = update_vehicle(&repo, &user, valid_update(1));

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn missing_table_is_a_schema_error() {
        let mut repo = MockStore::new();
        repo.expect_inspect_table()
            .returning(|table| Ok(TableSchema::missing(table)));
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);

        let result = update_vehicle(&repo, &user, valid_update(1));

        assert!(matches!(
            result,
            Err(ServiceError::Schema(message)) if message == "Vehicles table not found."
        ));
    }

    #[test]
    fn invalid_payload_reports_all_errors() {
        let mut repo = MockStore::new();
        repo.expect_inspect_table().returning(|_| Ok(vehicles_schema()));
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);

        let result = update_vehicle(
            &repo,
            &user,
            form(json!({
                "id": 1,
                "type": "suv",
                "slug": "jimny",
                "base_price_USD": "n/a",
                "insurance": 0,
                "people": 4,
                "bags": 0,
                "doors": 4,
            })),
        );

        let Err(ServiceError::Validation(message)) = result else {
            panic!("expected validation error");
        };
        assert!(message.contains("Name is required."));
        assert!(message.contains("Base price must be numeric."));
    }

    #[test]
    fn update_rejects_non_positive_id() {
        let mut repo = MockStore::new();
        repo.expect_inspect_table().returning(|_| Ok(vehicles_schema()));
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);

        let result = update_vehicle(&repo, &user, valid_update(0));

        assert!(matches!(
            result,
            Err(ServiceError::BadRequest(message)) if message == "Invalid vehicle id."
        ));
    }

    #[test]
    fn update_of_unknown_vehicle_is_not_found() {
        let mut repo = MockStore::new();
        repo.expect_inspect_table().returning(|_| Ok(vehicles_schema()));
        repo.expect_get_vehicle().returning(|_, _| Ok(None));
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);

        let result = update_vehicle(&repo, &user, valid_update(9));

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn update_keeps_own_slug_and_mirrors_xcd_price() {
        let mut repo = MockStore::new();
        repo.expect_inspect_table().returning(|_| Ok(vehicles_schema()));
        repo.expect_get_vehicle()
            .returning(|_, id| Ok(Some(record(json!({"id": id, "slug": "jimny"})))));
        repo.expect_slug_taken()
            .times(1)
            .withf(|_, slug, exclude| slug == "jimny" && *exclude == Some(5))
            .returning(|_, _, _| Ok(false));
        repo.expect_update_vehicle()
            .times(1)
            .withf(|_, id, assignments| {
                assert_eq!(*id, 5);
                assert_eq!(value_of(assignments, "slug"), Some(&FieldValue::text("jimny")));
                assert_eq!(
                    value_of(assignments, "base_price_XCD"),
                    Some(&FieldValue::real(55.0))
                );
                assert_eq!(value_of(assignments, "times_requested"), None);
                true
            })
            .returning(|_, _, _| Ok(1));
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);

        let vehicle = update_vehicle(&repo, &user, valid_update(5)).expect("update succeeds");

        assert_eq!(vehicle.get("id"), Some(&json!(5)));
    }

    #[test]
    fn create_appends_suffix_until_slug_is_free() {
        let mut repo = MockStore::new();
        repo.expect_inspect_table().returning(|_| Ok(vehicles_schema()));
        repo.expect_slug_taken()
            .withf(|_, _, exclude| exclude.is_none())
            .returning(|_, slug, _| Ok(slug == "sedan" || slug == "sedan_2"));
        repo.expect_create_vehicle()
            .times(1)
            .withf(|assignments| {
                assert_eq!(value_of(assignments, "slug"), Some(&FieldValue::text("sedan_3")));
                true
            })
            .returning(|_| Ok(12));
        repo.expect_get_vehicle()
            .withf(|_, id| *id == 12)
            .returning(|_, id| Ok(Some(record(json!({"id": id, "slug": "sedan_3"})))));
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);

        let vehicle = create_vehicle(&repo, &user, form(json!({"name": "Sedan"})))
            .expect("create succeeds");

        assert_eq!(vehicle.get("slug"), Some(&json!("sedan_3")));
    }

    #[test]
    fn create_writes_defaults_for_existing_columns() {
        let mut repo = MockStore::new();
        repo.expect_inspect_table().returning(|_| Ok(vehicles_schema()));
        repo.expect_slug_taken().returning(|_, _, _| Ok(false));
        repo.expect_create_vehicle()
            .times(1)
            .withf(|assignments| {
                assert_eq!(value_of(assignments, "name"), Some(&FieldValue::text("New Vehicle")));
                assert_eq!(value_of(assignments, "type"), Some(&FieldValue::text("car")));
                assert_eq!(value_of(assignments, "people"), Some(&FieldValue::integer(4)));
                assert_eq!(value_of(assignments, "bags"), Some(&FieldValue::integer(0)));
                assert_eq!(value_of(assignments, "doors"), Some(&FieldValue::integer(4)));
                assert_eq!(value_of(assignments, "insurance"), Some(&FieldValue::real(0.0)));
                assert_eq!(value_of(assignments, "showing"), Some(&FieldValue::integer(1)));
                assert_eq!(
                    value_of(assignments, "times_requested"),
                    Some(&FieldValue::integer(0))
                );
                true
            })
            .returning(|_| Ok(1));
        repo.expect_get_vehicle()
            .returning(|_, id| Ok(Some(record(json!({"id": id})))));
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);

        let result = create_vehicle(&repo, &user, form(json!({})));

        assert!(result.is_ok());
    }

    #[test]
    fn create_skips_columns_missing_from_the_table() {
        let mut repo = MockStore::new();
        repo.expect_inspect_table()
            .returning(|_| Ok(schema("vehicles", &["id", "name", "slug"])));
        repo.expect_slug_taken().returning(|_, _, _| Ok(false));
        repo.expect_create_vehicle()
            .times(1)
            .withf(|assignments| {
                let columns: Vec<&str> = assignments.iter().map(|a| a.column.as_str()).collect();
                assert_eq!(columns, vec!["name", "slug"]);
                true
            })
            .returning(|_| Ok(2));
        repo.expect_get_vehicle()
            .returning(|_, id| Ok(Some(record(json!({"id": id})))));
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);

        assert!(create_vehicle(&repo, &user, form(json!({"name": "Van"}))).is_ok());
    }

    #[test]
    fn fleet_overview_counts_vehicles() {
        let mut repo = MockStore::new();
        repo.expect_inspect_table().returning(|_| Ok(vehicles_schema()));
        repo.expect_list_vehicles().returning(|_| {
            Ok(vec![
                record(json!({"id": 1, "showing": 1, "landing_order": 2})),
                record(json!({"id": 2, "showing": 0, "landing_order": null})),
            ])
        });
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);

        let overview = load_fleet_overview(&repo, &user).expect("overview loads");

        assert_eq!(overview.vehicles.len(), 2);
        assert_eq!(
            overview.stats,
            FleetStats {
                total: 2,
                showing: 1,
                landing: 1
            }
        );
    }
}
