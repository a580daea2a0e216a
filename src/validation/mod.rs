//! Field validation helpers shared by the domain services.
//!
//! Every helper returns `AppError::Validation` with a message suitable for
//! showing next to the offending field.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::AppError;

pub fn require_range(field: &str, value: i64, min: i64, max: i64) -> Result<(), AppError> {
    if value < min || value > max {
        return Err(AppError::validation(format!(
            "{} must be between {} and {} (got {})",
            field, min, max, value
        )));
    }
    Ok(())
}

pub fn require_optional_range(
    field: &str,
    value: Option<i64>,
    min: i64,
    max: i64,
) -> Result<(), AppError> {
    match value {
        Some(v) => require_range(field, v, min, max),
        None => Ok(()),
    }
}

/// Trim and require a non-empty value of at most `max_len` characters.
pub fn require_text(field: &str, value: &str, max_len: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    max_length(field, trimmed, max_len)?;
    Ok(trimmed.to_string())
}

pub fn max_length(field: &str, value: &str, max_len: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::validation(format!(
            "{} must be at most {} characters (got {})",
            field, max_len, len
        )));
    }
    Ok(())
}

pub fn require_choice<T>(field: &str, value: &str, parse: impl Fn(&str) -> Option<T>) -> Result<T, AppError> {
    parse(value).ok_or_else(|| AppError::validation(format!("Invalid {}: {}", field, value)))
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[A-Za-z]{2,}$").expect("static regex"))
        .is_match(email)
}

pub fn is_valid_username(username: &str) -> bool {
    static USERNAME: OnceLock<Regex> = OnceLock::new();
    USERNAME
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_.@+-]{3,150}$").expect("static regex"))
        .is_match(username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_bounds_are_inclusive() {
        assert!(require_range("mood_score", 1, 1, 10).is_ok());
        assert!(require_range("mood_score", 10, 1, 10).is_ok());
        assert!(require_range("mood_score", 0, 1, 10).is_err());
        assert!(require_range("mood_score", 11, 1, 10).is_err());
    }

    #[test]
    fn text_is_trimmed_and_bounded() {
        assert_eq!(require_text("title", "  hello ", 10).unwrap(), "hello");
        assert!(require_text("title", "   ", 10).is_err());
        assert!(require_text("title", "abcdefghijk", 10).is_err());
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("amara@example.org"));
        assert!(!is_valid_email("amara@example"));
        assert!(!is_valid_email("amara example.org"));
        assert!(!is_valid_email("@example.org"));
    }

    #[test]
    fn username_shapes() {
        assert!(is_valid_username("dr.grace_mwangi"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("has space"));
    }
}
