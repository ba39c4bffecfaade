//! Input validation for user-supplied fields
//!
//! Security-focused checks applied at the API boundary before any
//! workflow logic runs:
//! - PSN identifier format (whitelist regex)
//! - trophy/build identifiers used as filesystem path components
//! - uploaded photo content types

use lazy_regex::regex;

use crate::core::error::AppError;

/// Validates the PSN online-ID format: 3-16 characters of
/// `A-Z a-z 0-9 - _` (original rule from the profile form).
///
/// # Examples
/// ```
/// use kensei_core::core::validation::is_valid_psn_id;
///
/// assert!(is_valid_psn_id("abc-DEF_123"));
/// assert!(!is_valid_psn_id("ab"));
/// assert!(!is_valid_psn_id("this_id_is_way_too_long_1"));
/// ```
pub fn is_valid_psn_id(psn: &str) -> bool {
    regex!(r"^[A-Za-z0-9_-]{3,16}$").is_match(psn)
}

/// Validates an opaque identifier (trophy id) that ends up as a path
/// component of the photo store. Whitelist approach: letters, digits,
/// `-` and `_`, 1-64 characters — no separators, no traversal.
pub fn is_safe_key(key: &str) -> bool {
    regex!(r"^[A-Za-z0-9_-]{1,64}$").is_match(key)
}

/// Checks that an uploaded part is an image by its declared content type.
///
/// The content type comes from the multipart part header; decoding the
/// bytes is out of scope here, mismatched payloads simply produce broken
/// previews on the moderator side.
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .parse::<mime::Mime>()
        .map(|m| m.type_() == mime::IMAGE)
        .unwrap_or(false)
}

/// Validates the photo set of a trophy submission: at least one photo,
/// at most `max`, every part an image.
pub fn validate_photo_set(content_types: &[String], max: usize) -> Result<(), AppError> {
    if content_types.is_empty() {
        return Err(AppError::Validation("необходимо хотя бы одно фото".to_string()));
    }
    if content_types.len() > max {
        return Err(AppError::Validation(format!("слишком много фото (максимум {})", max)));
    }
    for ct in content_types {
        if !is_image_content_type(ct) {
            return Err(AppError::Validation(format!("недопустимый тип файла: {}", ct)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn psn_id_accepts_valid_formats() {
        assert!(is_valid_psn_id("abc"));
        assert!(is_valid_psn_id("abc-DEF_123"));
        assert!(is_valid_psn_id("a234567890123456")); // 16 chars
    }

    #[test]
    fn psn_id_rejects_invalid_formats() {
        assert!(!is_valid_psn_id(""));
        assert!(!is_valid_psn_id("ab")); // too short
        assert!(!is_valid_psn_id("this_id_is_way_too_long_1")); // 25 chars
        assert!(!is_valid_psn_id("has space"));
        assert!(!is_valid_psn_id("кириллица"));
    }

    #[test]
    fn safe_key_rejects_path_components() {
        assert!(is_safe_key("ghost_of_legends"));
        assert!(is_safe_key("wave-50"));
        assert!(!is_safe_key("../etc"));
        assert!(!is_safe_key("a/b"));
        assert!(!is_safe_key(""));
        assert!(!is_safe_key(&"x".repeat(65)));
    }

    #[test]
    fn image_content_types() {
        assert!(is_image_content_type("image/jpeg"));
        assert!(is_image_content_type("image/png"));
        assert!(!is_image_content_type("video/mp4"));
        assert!(!is_image_content_type("application/octet-stream"));
        assert!(!is_image_content_type("not a mime"));
    }

    #[test]
    fn photo_set_limits() {
        let img = |n: usize| vec!["image/jpeg".to_string(); n];
        assert!(validate_photo_set(&img(0), 10).is_err());
        assert!(validate_photo_set(&img(1), 10).is_ok());
        assert!(validate_photo_set(&img(10), 10).is_ok());
        assert!(validate_photo_set(&img(11), 10).is_err());

        let mixed = vec!["image/jpeg".to_string(), "text/plain".to_string()];
        assert!(validate_photo_set(&mixed, 10).is_err());
    }
}
