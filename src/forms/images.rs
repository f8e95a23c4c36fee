use std::path::Path;

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};

/// Largest accepted vehicle image.
pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// Extensions accepted for vehicle images, in the order they are listed to users.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["avif", "webp", "jpg", "jpeg", "png"];

#[derive(MultipartForm)]
/// Multipart form for replacing a vehicle's image.
pub struct UploadVehicleImageForm {
    pub vehicle_id: Option<Text<String>>,
    /// Oversized files are accepted by the extractor and rejected with a
    /// validation error by the service.
    #[multipart(limit = "16MB")]
    pub image: Option<TempFile>,
}

impl UploadVehicleImageForm {
    /// Positive `vehicle_id`, if the field parses as one.
    pub fn vehicle_id(&self) -> Option<i64> {
        self.vehicle_id
            .as_ref()
            .and_then(|id| id.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
    }
}

/// Lower-cased extension of the client file name when it is an allowed type.
pub fn image_extension(file_name: Option<&str>) -> Option<String> {
    let extension = Path::new(file_name?)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    ALLOWED_IMAGE_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}
