//! # Utilities Library
//!
//! Shared helpers for environment variables, date arithmetic and input validation.

pub mod envs;
pub mod time;
pub mod validation;

// Re-export commonly used functions
pub use envs::{get_env, get_env_opt, get_env_parse_or};
pub use time::years_between;
pub use validation::{
    validate_not_empty, validate_email, validate_min_length, validate_password_strength,
    validate_verify_code, validate_iin, validate_birthday, PasswordPolicy,
};
