//! Router-level helpers for handler tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt;

use crate::server::{build_router, AppState};
use crate::services::testing::{setup, token_service, TestContext};

/// Router over seeded in-memory stores, plus the context that backs it.
pub async fn setup_app() -> (Router, TestContext) {
    let ctx = setup().await;
    let state = AppState::new(ctx.stores.clone(), token_service(), Arc::new(ctx.notifier.clone()));
    let app = build_router(state, &[]);
    (app, ctx)
}

/// `Bearer` header value for a verified user.
pub async fn sign_in_token(ctx: &TestContext, email: &str, password: &str) -> String {
    let token = ctx
        .account
        .sign_in(email, password)
        .await
        .expect("Sign-in should succeed in test");
    format!("Bearer {token}")
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    app.clone().oneshot(request).await.unwrap()
}

pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
