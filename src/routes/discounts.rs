use actix_web::{HttpResponse, Responder, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde_json::json;

use crate::forms::discounts::DiscountForm;
use crate::forms::positive_id;
use crate::repository::DieselRepository;
use crate::routes::{failure, parse_action, require_user};
use crate::services::discounts::update_discount;

#[post("/admin/discounts")]
pub async fn post_discount(
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
    body: web::Bytes,
) -> impl Responder {
    let user = match require_user(user) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let envelope = match parse_action(&body, &["update_discount"]) {
        Ok(envelope) => envelope,
        Err(response) => return response,
    };

    let vehicle_id = positive_id(envelope.get("vehicle_id"));
    let form = envelope.object("discount").cloned().map(DiscountForm::new);
    match update_discount(repo.get_ref(), &user, vehicle_id, form) {
        Ok(discount) => HttpResponse::Ok().json(json!({
            "success": true,
            "discount": discount,
        })),
        Err(err) => failure("update discount", err),
    }
}
