use std::path::PathBuf;

/// Default directory for uploaded vehicle images, relative to the working directory.
pub const DEFAULT_VEHICLE_IMAGE_DIR: &str = "./assets/images/vehicles";

/// Where uploaded files are written. Served under `/assets`.
#[derive(Debug, Clone)]
pub struct ImageStorageConfig {
    pub vehicle_image_dir: PathBuf,
}

impl Default for ImageStorageConfig {
    fn default() -> Self {
        Self {
            vehicle_image_dir: PathBuf::from(DEFAULT_VEHICLE_IMAGE_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_image_dir_is_served_under_assets() {
        let config = ImageStorageConfig::default();

        assert_eq!(
            config.vehicle_image_dir,
            PathBuf::from("./assets/images/vehicles")
        );
    }
}
