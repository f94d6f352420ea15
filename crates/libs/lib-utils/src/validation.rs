//! # Validation Utilities
//!
//! Input validation helpers. Each returns a human-readable message on failure;
//! callers attach the offending field name.

use chrono::NaiveDate;

use crate::time::years_between;

/// Validate that a string is not empty.
pub fn validate_not_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate email format (basic check: a local part, `@`, and a dotted domain).
pub fn validate_email(email: &str) -> Result<(), String> {
    let valid = match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(format!("{} is not a valid email", email))
    }
}

/// Validate minimum length.
pub fn validate_min_length(value: &str, min: usize, field_name: &str) -> Result<(), String> {
    if value.chars().count() < min {
        Err(format!("{} must be at least {} characters long", field_name, min))
    } else {
        Ok(())
    }
}

/// Password rules applied at the transport boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicy {
    /// New passwords: lowercase, uppercase, digit and one of `@!?`.
    Signup,
    /// Passwords presented for an existing account: lowercase, uppercase, digit.
    Credentials,
}

/// Special characters a new password must draw at least one of.
pub const PASSWORD_SPECIALS: &str = "@!?";

/// Minimum password length for every policy.
pub const PASSWORD_MIN_LEN: usize = 8;

/// Validate a password against the given policy.
pub fn validate_password_strength(
    password: &str,
    policy: PasswordPolicy,
    field_name: &str,
) -> Result<(), String> {
    validate_min_length(password, PASSWORD_MIN_LEN, field_name)?;

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(format!("{} should contain at least one lowercase letter", field_name));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(format!("{} should contain at least one uppercase letter", field_name));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(format!("{} should contain at least one digit", field_name));
    }
    if policy == PasswordPolicy::Signup && !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return Err(format!(
            "{} should contain at least one {} character",
            field_name, PASSWORD_SPECIALS
        ));
    }

    Ok(())
}

/// Validate a six digit verification code.
pub fn validate_verify_code(code: &str) -> Result<(), String> {
    if code.len() == 6 && code.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err("verify_code must be 6 digits".to_string())
    }
}

/// Validate a twelve digit individual identification number.
pub fn validate_iin(iin: &str) -> Result<(), String> {
    if iin.len() == 12 && iin.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err("IIN must be 12 digits".to_string())
    }
}

/// Validate that a birthday is in the past and less than 130 years ago.
pub fn validate_birthday(birthday: NaiveDate, today: NaiveDate) -> Result<(), String> {
    if birthday >= today || years_between(birthday, today) >= 130 {
        Err("Age must be between 0 and 130".to_string())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("alice.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@localhost").is_err());
        assert!(validate_email("alice@example.").is_err());
    }

    #[test]
    fn test_signup_password_requires_special_character() {
        assert!(validate_password_strength("Password123!", PasswordPolicy::Signup, "password").is_ok());

        let err = validate_password_strength("Password123", PasswordPolicy::Signup, "password")
            .expect_err("missing special character should be rejected");
        assert_eq!(err, "password should contain at least one @!? character");

        assert!(validate_password_strength("Password123", PasswordPolicy::Credentials, "password").is_ok());
    }

    #[test]
    fn test_password_too_short() {
        let err = validate_password_strength("Pa1!", PasswordPolicy::Signup, "password")
            .expect_err("short password should be rejected");
        assert_eq!(err, "password must be at least 8 characters long");
    }

    #[test]
    fn test_password_character_classes() {
        assert!(validate_password_strength("password123!", PasswordPolicy::Signup, "password").is_err());
        assert!(validate_password_strength("PASSWORD123!", PasswordPolicy::Signup, "password").is_err());
        assert!(validate_password_strength("Password!!!!", PasswordPolicy::Signup, "password").is_err());
    }

    #[test]
    fn test_verify_code_and_iin() {
        assert!(validate_verify_code("123456").is_ok());
        assert!(validate_verify_code("12345").is_err());
        assert!(validate_verify_code("12345a").is_err());

        assert!(validate_iin("990101300123").is_ok());
        assert!(validate_iin("99010130012").is_err());
        assert!(validate_iin("99010130012x").is_err());
    }

    #[test]
    fn test_validate_birthday() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(validate_birthday(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(), today).is_ok());
        assert!(validate_birthday(today, today).is_err());
        assert!(validate_birthday(NaiveDate::from_ymd_opt(1880, 1, 1).unwrap(), today).is_err());
    }
}
