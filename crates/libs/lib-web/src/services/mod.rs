//! # Services Layer
//!
//! Business logic behind the HTTP handlers. Services depend only on the store
//! contracts in [`lib_core::Stores`], the token service and a [`Notifier`];
//! they know nothing about HTTP.
//!
//! ```text
//! Handlers (HTTP) → Services (Business Logic) → Stores / Token Service / Notifier
//! ```
//!
//! ## Module Organization
//!
//! - [`account`] - Sign-up, sign-in, profile lookup
//! - [`verification`] - Email verification codes
//! - [`role_assignment`] - Role catalog, single grants and reconciliation
//! - [`session`] - Sanitized user snapshots and token minting
//!
//! ## Error Handling
//!
//! All services return `Result<T, AppError>`; lower-level store and crypto
//! errors are converted into the matching `AppError` variant. Nothing is
//! retried, and only notification failures are swallowed.
//!
//! [`Notifier`]: crate::notifier::Notifier

pub mod account;
pub mod role_assignment;
pub mod session;
pub mod verification;

#[cfg(test)]
pub(crate) mod testing;

// Re-export services for convenience
pub use account::AccountService;
pub use role_assignment::RoleAssignmentService;
pub use session::TokenIssuer;
pub use verification::VerificationService;
