use actix_web::{HttpResponse, Responder, get, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde_json::json;

use crate::forms::vehicles::VehicleForm;
use crate::repository::DieselRepository;
use crate::routes::{failure, parse_action, require_user};
use crate::services::vehicles::{create_vehicle, load_fleet_overview, update_vehicle};

const UPDATE_VEHICLE: &str = "update_vehicle";
const CREATE_VEHICLE: &str = "create_vehicle";

#[post("/admin/vehicles")]
pub async fn post_vehicle(
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
    body: web::Bytes,
) -> impl Responder {
    let user = match require_user(user) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let envelope = match parse_action(&body, &[UPDATE_VEHICLE, CREATE_VEHICLE]) {
        Ok(envelope) => envelope,
        Err(response) => return response,
    };

    let form = VehicleForm::from_value(envelope.get("vehicle"));
    let result = if envelope.action == CREATE_VEHICLE {
        create_vehicle(repo.get_ref(), &user, form)
    } else {
        update_vehicle(repo.get_ref(), &user, form)
    };

    match result {
        Ok(vehicle) => HttpResponse::Ok().json(json!({
            "success": true,
            "vehicle": vehicle,
        })),
        Err(err) => failure(&envelope.action.replace('_', " "), err),
    }
}

#[get("/admin/fleet")]
pub async fn show_fleet(
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let user = match require_user(user) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match load_fleet_overview(repo.get_ref(), &user) {
        Ok(overview) => HttpResponse::Ok().json(json!({
            "success": true,
            "vehicles": overview.vehicles,
            "stats": overview.stats,
        })),
        Err(err) => failure("load fleet", err),
    }
}
