//! # Authentication Library
//!
//! Password hashing, verification codes, and JWT token management.

pub mod code;
pub mod error;
pub mod pwd;
pub mod token;

// Re-export commonly used types
pub use code::{generate_verify_code, VERIFY_CODE_MAX, VERIFY_CODE_MIN};
pub use error::{Error, Result};
pub use pwd::{hash_password, verify_password};
pub use token::{Claims, TokenConfig, TokenService};
