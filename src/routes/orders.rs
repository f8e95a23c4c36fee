use actix_web::{HttpResponse, Responder, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde_json::json;

use crate::forms::orders::OrderForm;
use crate::forms::positive_id;
use crate::repository::DieselRepository;
use crate::routes::{failure, parse_action, require_user};
use crate::services::orders::{fetch_history, update_order};

const UPDATE_ORDER: &str = "update_order";
const FETCH_HISTORY: &str = "fetch_history";

#[post("/admin/orders")]
pub async fn post_order(
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
    body: web::Bytes,
) -> impl Responder {
    let user = match require_user(user) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let envelope = match parse_action(&body, &[UPDATE_ORDER, FETCH_HISTORY]) {
        Ok(envelope) => envelope,
        Err(response) => return response,
    };

    if envelope.action == FETCH_HISTORY {
        let order_id = positive_id(envelope.get("order_id"));
        return match fetch_history(repo.get_ref(), &user, order_id) {
            Ok(history) => HttpResponse::Ok().json(json!({
                "success": true,
                "history": history,
            })),
            Err(err) => failure("fetch order history", err),
        };
    }

    let form = envelope.object("order").cloned().map(OrderForm::new);
    match update_order(repo.get_ref(), &user, form) {
        Ok(order) => HttpResponse::Ok().json(json!({
            "success": true,
            "order": order,
        })),
        Err(err) => failure("update order", err),
    }
}
