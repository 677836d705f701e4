//! Input validation for upload submissions

use crate::error::AppError;

/// Maximum length of an upload's free-text description.
pub const MAX_DESCRIPTION_LENGTH: usize = 100;

/// Validate an optional upload description (length bound, non-blank when present).
pub fn validate_description(description: Option<&str>) -> Result<(), AppError> {
    if let Some(text) = description {
        if text.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Description must not be blank when provided".to_string(),
            ));
        }
        if text.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(AppError::InvalidInput(format!(
                "Description exceeds {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }
    }
    Ok(())
}

/// A coordinate is either absent or a complete, in-range pair.
pub fn validate_coordinate(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<(), AppError> {
    match (latitude, longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lng)) => {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(AppError::InvalidInput(format!(
                    "Latitude {} out of range [-90, 90]",
                    lat
                )));
            }
            if !(-180.0..=180.0).contains(&lng) {
                return Err(AppError::InvalidInput(format!(
                    "Longitude {} out of range [-180, 180]",
                    lng
                )));
            }
            Ok(())
        }
        _ => Err(AppError::InvalidInput(
            "Latitude and longitude must be provided together".to_string(),
        )),
    }
}
