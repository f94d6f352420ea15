//! # Authentication Data Transfer Objects
//!
//! Request and response structures for the `/api/auth` endpoints.
//!
//! ## Endpoints Using These DTOs
//!
//! 1. `POST /api/auth/sign-up` - [`SignUpRequest`] -> [`MessageResponse`]
//! 2. `POST /api/auth/send-verify-code` - [`SendVerifyCodeRequest`] -> [`MessageResponse`]
//! 3. `POST /api/auth/check-verify-code` - [`CheckVerifyCodeRequest`] -> [`TokenResponse`]
//! 4. `POST /api/auth/sign-in` - [`SignInRequest`] -> [`TokenResponse`]
//! 5. `POST /api/auth/update-profile` - [`UpdateProfileRequest`] -> [`TokenResponse`]
//!
//! ## Wire Format
//!
//! All DTOs use **snake_case** field names in JSON (default serde behavior).
//! Each request exposes a `validate` method run by the handler before the
//! request reaches a service; failures are [`AppError::Validation`] naming the
//! offending field.
//!
//! ```text
//! POST /api/auth/check-verify-code
//! Content-Type: application/json
//!
//! {
//!   "email": "alice@example.com",
//!   "password": "MyPassword123",
//!   "verify_code": "482913"
//! }
//! ```
//!
//! Response:
//! ```text
//! { "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9..." }
//! ```

use chrono::NaiveDate;
use lib_utils::{
    validate_birthday, validate_email, validate_iin, validate_not_empty,
    validate_password_strength, validate_verify_code, PasswordPolicy,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::model::models::{Address, Gender, Profile};

fn check(field: &str, result: Result<(), String>) -> Result<(), AppError> {
    result.map_err(|message| AppError::validation(field, message))
}

fn check_credentials(email: &str, password: &str, policy: PasswordPolicy) -> Result<(), AppError> {
    check("email", validate_not_empty(email, "email"))?;
    check("email", validate_email(email))?;
    check("password", validate_password_strength(password, policy, "password"))
}

// region: --- Requests

/// Registration request.
///
/// The password must be at least 8 characters and contain a lowercase letter,
/// an uppercase letter, a digit and one of `@!?`. `password_confirm` must
/// match it exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        check_credentials(&self.email, &self.password, PasswordPolicy::Signup)?;
        if self.password != self.password_confirm {
            return Err(AppError::validation("password", "Passwords do not match"));
        }
        Ok(())
    }
}

/// Ask for a fresh verification code to be mailed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendVerifyCodeRequest {
    pub email: String,
    pub password: String,
}

impl SendVerifyCodeRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        check_credentials(&self.email, &self.password, PasswordPolicy::Credentials)
    }
}

/// Redeem a mailed verification code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckVerifyCodeRequest {
    pub email: String,
    pub password: String,
    pub verify_code: String,
}

impl CheckVerifyCodeRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        check_credentials(&self.email, &self.password, PasswordPolicy::Credentials)?;
        check("verify_code", validate_verify_code(&self.verify_code))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl SignInRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        check_credentials(&self.email, &self.password, PasswordPolicy::Credentials)
    }
}

/// Profile completion request; `role_ids` is the full desired set of
/// non-default roles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateProfileRequest {
    pub iin: String,
    pub name: String,
    pub surname: String,
    pub birthday: NaiveDate,
    /// 1 male, 2 female, 3 non-binary
    pub gender: u8,
    pub address: Address,
    pub role_ids: Vec<String>,
}

impl UpdateProfileRequest {
    /// Validate against `today` and build the profile to store.
    pub fn to_profile(&self, today: NaiveDate) -> Result<Profile, AppError> {
        check("iin", validate_iin(&self.iin))?;
        check("name", validate_not_empty(&self.name, "name"))?;
        check("surname", validate_not_empty(&self.surname, "surname"))?;
        check("birthday", validate_birthday(self.birthday, today))?;
        let gender = Gender::try_from(self.gender)
            .map_err(|message| AppError::validation("gender", message))?;
        check("address.country", validate_not_empty(&self.address.country, "address.country"))?;
        check("address.city", validate_not_empty(&self.address.city, "address.city"))?;

        Ok(Profile {
            iin: Some(self.iin.clone()),
            name: Some(self.name.clone()),
            surname: Some(self.surname.clone()),
            birthday: Some(self.birthday),
            gender: Some(gender),
            address: Some(self.address.clone()),
        })
    }
}

// endregion: --- Requests

// region: --- Responses

/// Freshly minted access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body produced by [`AppError`]'s `IntoResponse`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub field: String,
    pub tag: String,
    pub code: String,
}

// endregion: --- Responses
