use actix_web::{HttpResponse, Responder, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde_json::json;

use crate::forms::addons::AddOnForm;
use crate::repository::DieselRepository;
use crate::routes::{failure, parse_action, require_user};
use crate::services::addons::update_addon;

#[post("/admin/addons")]
pub async fn post_addon(
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
    body: web::Bytes,
) -> impl Responder {
    let user = match require_user(user) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let envelope = match parse_action(&body, &["update_addon"]) {
        Ok(envelope) => envelope,
        Err(response) => return response,
    };

    let form = envelope.object("addon").cloned().map(AddOnForm::new);
    match update_addon(repo.get_ref(), &user, form) {
        Ok(addon) => HttpResponse::Ok().json(json!({
            "success": true,
            "addon": addon,
        })),
        Err(err) => failure("update add-on", err),
    }
}
