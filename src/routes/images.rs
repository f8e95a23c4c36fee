use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde_json::json;

use crate::forms::images::UploadVehicleImageForm;
use crate::models::config::ImageStorageConfig;
use crate::repository::DieselRepository;
use crate::routes::{failure, require_user};
use crate::services::images::upload_vehicle_image;

#[post("/admin/vehicle-image")]
pub async fn upload_image(
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
    storage: web::Data<ImageStorageConfig>,
    MultipartForm(form): MultipartForm<UploadVehicleImageForm>,
) -> impl Responder {
    let user = match require_user(user) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let vehicle_id = form.vehicle_id();
    match upload_vehicle_image(
        repo.get_ref(),
        &user,
        vehicle_id,
        form.image,
        &storage.vehicle_image_dir,
    ) {
        Ok(image) => HttpResponse::Ok().json(json!({
            "success": true,
            "image_url": image.image_url,
            "message": "Vehicle image updated.",
        })),
        Err(err) => failure("upload vehicle image", err),
    }
}
