//! Gallery size rules for model profiles.
//!
//! A profile is created with between [`MIN_GALLERY_IMAGES`] and
//! [`MAX_GALLERY_IMAGES`] images and can never hold more than the maximum.

use crate::error::CoreError;

/// Minimum number of images required to create a profile.
pub const MIN_GALLERY_IMAGES: usize = 4;

/// Maximum number of images a gallery may hold at any time.
pub const MAX_GALLERY_IMAGES: usize = 8;

/// Validate the number of images submitted with a new profile.
pub fn validate_initial_count(count: usize) -> Result<(), CoreError> {
    if !(MIN_GALLERY_IMAGES..=MAX_GALLERY_IMAGES).contains(&count) {
        return Err(CoreError::Validation(format!(
            "A profile needs between {MIN_GALLERY_IMAGES} and {MAX_GALLERY_IMAGES} images, got {count}"
        )));
    }
    Ok(())
}

/// Validate adding `incoming` images to a gallery that already has `existing`.
pub fn validate_append(existing: usize, incoming: usize) -> Result<(), CoreError> {
    if incoming == 0 {
        return Err(CoreError::Validation(
            "At least one image is required".into(),
        ));
    }
    let total = existing + incoming;
    if total > MAX_GALLERY_IMAGES {
        let remaining = MAX_GALLERY_IMAGES.saturating_sub(existing);
        return Err(CoreError::Validation(format!(
            "Gallery is limited to {MAX_GALLERY_IMAGES} images; {remaining} slot(s) remaining"
        )));
    }
    Ok(())
}

/// Validate the index of the image chosen as profile picture.
pub fn validate_primary_index(index: usize, count: usize) -> Result<(), CoreError> {
    if index >= count {
        return Err(CoreError::Validation(format!(
            "primary_image index {index} is out of range for {count} uploaded images"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_count_bounds() {
        assert!(validate_initial_count(3).is_err());
        assert!(validate_initial_count(4).is_ok());
        assert!(validate_initial_count(8).is_ok());
        assert!(validate_initial_count(9).is_err());
    }

    #[test]
    fn append_respects_maximum() {
        assert!(validate_append(4, 4).is_ok());
        assert!(validate_append(7, 1).is_ok());
        let err = validate_append(6, 3).unwrap_err();
        assert!(err.to_string().contains("2 slot(s) remaining"));
    }

    #[test]
    fn append_requires_at_least_one_image() {
        assert!(validate_append(4, 0).is_err());
    }

    #[test]
    fn full_gallery_has_no_slots() {
        let err = validate_append(8, 1).unwrap_err();
        assert!(err.to_string().contains("0 slot(s) remaining"));
    }

    #[test]
    fn primary_index_must_be_in_range() {
        assert!(validate_primary_index(0, 4).is_ok());
        assert!(validate_primary_index(3, 4).is_ok());
        assert!(validate_primary_index(4, 4).is_err());
    }
}
