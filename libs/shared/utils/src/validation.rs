// =====================================================================================
// FIELD VALIDATION
// =====================================================================================

use std::sync::OnceLock;

use regex::Regex;

use shared_models::error::AppError;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("static pattern compiles")
    })
}

fn phone_pattern() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("static pattern compiles"))
}

/// Character count of `value` must lie in `min..=max`.
pub fn length_between(field: &str, value: &str, min: usize, max: usize) -> Result<(), AppError> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(AppError::InvalidArgument(format!(
            "{} must be between {} and {} characters",
            field, min, max
        )));
    }
    Ok(())
}

pub fn at_most(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::InvalidArgument(format!(
            "{} cannot exceed {} characters",
            field, max
        )));
    }
    Ok(())
}

pub fn at_least(field: &str, value: &str, min: usize) -> Result<(), AppError> {
    if value.chars().count() < min {
        return Err(AppError::InvalidArgument(format!(
            "{} must be at least {} characters",
            field, min
        )));
    }
    Ok(())
}

pub fn required(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidArgument(format!("{} is required", field)));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), AppError> {
    if !email_pattern().is_match(value.trim()) {
        return Err(AppError::InvalidArgument("Email must be a valid email address".to_string()));
    }
    Ok(())
}

/// Exactly ten digits, no separators.
pub fn phone(value: &str) -> Result<(), AppError> {
    if !phone_pattern().is_match(value) {
        return Err(AppError::InvalidArgument("Phone number must be 10 digits".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_email_format() {
        assert!(email("jane.roe@clinic.test").is_ok());
        assert_matches!(email("jane.roe"), Err(AppError::InvalidArgument(_)));
        assert_matches!(email("jane@clinic"), Err(AppError::InvalidArgument(_)));
    }

    #[test]
    fn test_phone_is_ten_digits() {
        assert!(phone("5551234567").is_ok());
        assert!(phone("555-123-4567").is_err());
        assert!(phone("555123456").is_err());
    }

    #[test]
    fn test_length_bounds() {
        assert!(length_between("Name", "Al", 3, 100).is_err());
        assert!(length_between("Name", "Alice", 3, 100).is_ok());
        assert!(at_most("Notes", &"x".repeat(201), 200).is_err());
        assert!(at_least("Password", "12345", 6).is_err());
        assert!(required("Dosage", "  ").is_err());
    }
}
