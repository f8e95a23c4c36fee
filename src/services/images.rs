use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use actix_multipart::form::tempfile::TempFile;
use pushkind_common::domain::auth::AuthenticatedUser;
use serde::Serialize;

use crate::domain::vehicle::{VehicleField, sanitize_slug};
use crate::forms::images::{ALLOWED_IMAGE_EXTENSIONS, MAX_IMAGE_BYTES, image_extension};
use crate::repository::{SchemaReader, VehicleReader};
use crate::services::{ServiceError, ServiceResult, ensure_admin, load_capabilities};

/// Public URL prefix under which vehicle images are served.
pub const VEHICLE_IMAGE_URL_PREFIX: &str = "/assets/images/vehicles";

/// Result of a successful upload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VehicleImage {
    /// Cache-busted public URL of the stored file.
    pub image_url: String,
}

/// Stores `image` as `<slug>.<ext>` in `image_dir`, replacing any earlier
/// image of the same vehicle regardless of its extension.
pub fn upload_vehicle_image<R>(
    repo: &R,
    user: &AuthenticatedUser,
    vehicle_id: Option<i64>,
    image: Option<TempFile>,
    image_dir: &Path,
) -> ServiceResult<VehicleImage>
where
    R: SchemaReader + VehicleReader + ?Sized,
{
    ensure_admin(user)?;

    let vehicle_id =
        vehicle_id.ok_or_else(|| ServiceError::BadRequest("Invalid vehicle id.".to_string()))?;
    let image =
        image.ok_or_else(|| ServiceError::BadRequest("Image file is required.".to_string()))?;
    if image.size > MAX_IMAGE_BYTES {
        return Err(ServiceError::Validation(
            "Image must be 8MB or smaller.".to_string(),
        ));
    }

    let caps = load_capabilities::<VehicleField, _>(repo)?;
    if !caps.table_exists() {
        return Err(ServiceError::Schema("Vehicles table not found.".to_string()));
    }
    let vehicle = repo
        .get_vehicle(&caps, vehicle_id)
        .map_err(|err| ServiceError::storage("Unable to load vehicle", err))?
        .ok_or_else(|| ServiceError::NotFound("Vehicle not found.".to_string()))?;

    let stored_slug = caps
        .column(VehicleField::Slug)
        .and_then(|column| vehicle.get(column))
        .and_then(|value| value.as_str())
        .unwrap_or_default();
    let slug = sanitize_slug(stored_slug);
    if slug.is_empty() {
        return Err(ServiceError::Validation(
            "Vehicle slug is missing.".to_string(),
        ));
    }

    let extension = image_extension(image.file_name.as_deref()).ok_or_else(|| {
        ServiceError::Validation(format!(
            "Allowed image types: {}.",
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        ))
    })?;

    fs::create_dir_all(image_dir).map_err(|err| {
        log::error!("Failed to create {}: {err}", image_dir.display());
        ServiceError::Persistence("Unable to create vehicle image directory.".to_string())
    })?;

    for known in ALLOWED_IMAGE_EXTENSIONS {
        let existing = image_dir.join(format!("{slug}.{known}"));
        match fs::remove_file(&existing) {
            Err(err) if err.kind() != ErrorKind::NotFound => {
                log::warn!("Failed to remove {}: {err}", existing.display());
            }
            _ => {}
        }
    }

    let file_name = format!("{slug}.{extension}");
    let target = image_dir.join(&file_name);
    fs::copy(image.file.path(), &target).map_err(|err| {
        log::error!("Failed to store {}: {err}", target.display());
        ServiceError::Persistence("Failed to store uploaded image.".to_string())
    })?;
    log::info!("stored image of vehicle {vehicle_id} at {}", target.display());

    Ok(VehicleImage {
        image_url: format!(
            "{VEHICLE_IMAGE_URL_PREFIX}/{file_name}?v={}",
            chrono::Utc::now().timestamp()
        ),
    })
}
