//! # Email Verification
//!
//! Per-user state machine `Unverified -> CodeSent -> Verified`.
//!
//! A user holds at most one active code. Requesting a new one overwrites the
//! previous code; redeeming clears it and marks the email verified.

use std::sync::Arc;

use lib_auth::generate_verify_code;
use lib_core::{AppError, Stores};
use tracing::{info, instrument, warn};

use super::account::authenticate;
use super::session::TokenIssuer;
use crate::notifier::{EmailMessage, Notifier};

#[derive(Clone)]
pub struct VerificationService {
    stores: Stores,
    tokens: TokenIssuer,
    notifier: Arc<dyn Notifier>,
}

impl VerificationService {
    pub fn new(stores: Stores, tokens: TokenIssuer, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            stores,
            tokens,
            notifier,
        }
    }

    /// Store a fresh code on the user and mail it.
    #[instrument(skip(self, password))]
    pub async fn request_code(&self, email: &str, password: &str) -> Result<(), AppError> {
        let mut user = authenticate(self.stores.users.as_ref(), email, password).await?;

        let code = generate_verify_code();
        user.verify_code = Some(code.clone());
        user.updated_at = chrono::Utc::now();
        self.stores.users.update_user(&user).await?;

        self.notifier.send(EmailMessage::verify_code(&user.email, &code));
        info!("[VERIFY] Code sent to user {}", user.id);

        Ok(())
    }

    /// Redeem `code`, mark the email verified and return a fresh token.
    #[instrument(skip(self, password, code))]
    pub async fn redeem_code(&self, email: &str, password: &str, code: &str) -> Result<String, AppError> {
        let mut user = authenticate(self.stores.users.as_ref(), email, password).await?;

        if user.verify_code.as_deref() != Some(code) {
            warn!("[VERIFY] Code mismatch for user {}", user.id);
            return Err(AppError::CodeMismatch);
        }

        user.verified = true;
        user.verify_code = None;
        user.updated_at = chrono::Utc::now();
        self.stores.users.update_user(&user).await?;

        info!("[VERIFY] Email verified for user {}", user.id);
        self.tokens.issue(&user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{insert_user, setup};

    const PASSWORD: &str = "Secret123!";

    #[tokio::test]
    async fn test_request_code_stores_and_mails_code() {
        let ctx = setup().await;
        let user = insert_user(&ctx, "alice@example.com", PASSWORD, false).await;

        ctx.verification.request_code("alice@example.com", PASSWORD).await.unwrap();

        let stored = ctx.stores.users.get_user_by_id(&user.id).await.unwrap().unwrap();
        let code = stored.verify_code.expect("code should be stored");
        assert_eq!(code.len(), 6);
        assert!((100_000..=999_999).contains(&code.parse::<u32>().unwrap()));

        let sent = ctx.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["alice@example.com".to_string()]);
        assert_eq!(ctx.notifier.last_code(), Some(code));
    }

    #[tokio::test]
    async fn test_request_code_checks_credentials() {
        let ctx = setup().await;
        insert_user(&ctx, "alice@example.com", PASSWORD, false).await;

        assert_eq!(
            ctx.verification.request_code("nobody@example.com", PASSWORD).await.unwrap_err(),
            AppError::UserNotFound
        );
        assert_eq!(
            ctx.verification.request_code("alice@example.com", "Wrong123!").await.unwrap_err(),
            AppError::InvalidCredentials
        );
        assert!(ctx.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_redeem_code_verifies_once() {
        let ctx = setup().await;
        let user = insert_user(&ctx, "alice@example.com", PASSWORD, false).await;
        ctx.verification.request_code("alice@example.com", PASSWORD).await.unwrap();
        let code = ctx.notifier.last_code().unwrap();

        let token = ctx.verification.redeem_code("alice@example.com", PASSWORD, &code).await.unwrap();

        let stored = ctx.stores.users.get_user_by_id(&user.id).await.unwrap().unwrap();
        assert!(stored.verified);
        assert!(stored.verify_code.is_none());
        assert!(ctx.tokens.parse(&token).unwrap().verified);

        let again = ctx.verification.redeem_code("alice@example.com", PASSWORD, &code).await;
        assert_eq!(again.unwrap_err(), AppError::CodeMismatch);
    }

    #[tokio::test]
    async fn test_new_code_replaces_old_one() {
        let ctx = setup().await;
        let mut user = insert_user(&ctx, "alice@example.com", PASSWORD, false).await;
        user.verify_code = Some("000000".to_string());
        ctx.stores.users.update_user(&user).await.unwrap();

        ctx.verification.request_code("alice@example.com", PASSWORD).await.unwrap();
        let code = ctx.notifier.last_code().unwrap();

        assert_eq!(
            ctx.verification.redeem_code("alice@example.com", PASSWORD, "000000").await.unwrap_err(),
            AppError::CodeMismatch
        );
        assert!(ctx.verification.redeem_code("alice@example.com", PASSWORD, &code).await.is_ok());
    }

    #[tokio::test]
    async fn test_absent_code_never_matches() {
        let ctx = setup().await;
        insert_user(&ctx, "alice@example.com", PASSWORD, false).await;

        let result = ctx.verification.redeem_code("alice@example.com", PASSWORD, "").await;

        assert_eq!(result.unwrap_err(), AppError::CodeMismatch);
    }
}
