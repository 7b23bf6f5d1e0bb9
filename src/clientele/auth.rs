//! HTTP Basic authentication gate for the customer endpoints.

use axum::{
    extract::{Extension, Request},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64ct::{Base64, Encoding};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::cli::globals::GlobalArgs;

/// Credentials accepted as valid for this server instance.
///
/// Custom `Debug` redacts the password to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AuthConfig {
    username: String,
    password: SecretString,
}

impl AuthConfig {
    #[must_use]
    pub fn new(username: String, password: SecretString) -> Self {
        Self { username, password }
    }

    #[must_use]
    pub fn from_globals(globals: &GlobalArgs) -> Self {
        Self::new(
            globals.auth_username.clone(),
            globals.auth_password.clone(),
        )
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Middleware guarding every customer route.
///
/// Requests that do not carry acceptable Basic credentials are answered with
/// `401` and a `WWW-Authenticate: Basic` challenge before the handler runs.
pub async fn require_basic_auth(
    Extension(config): Extension<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    if verify_basic_auth(request.headers(), &config) {
        next.run(request).await
    } else {
        warn!("Rejected request with missing or invalid credentials");

        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic")],
            Json(json!({"detail": "Invalid authentication credentials"})),
        )
            .into_response()
    }
}

/// Verify credentials directly from headers.
#[must_use]
pub fn verify_basic_auth(headers: &HeaderMap, config: &AuthConfig) -> bool {
    let Some(encoded) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Basic "))
    else {
        return false;
    };

    let Ok(decoded) = Base64::decode_vec(encoded) else {
        return false;
    };

    let Ok(credentials) = std::str::from_utf8(&decoded) else {
        return false;
    };

    let Some((username, password)) = credentials.split_once(':') else {
        return false;
    };

    // Both comparisons always run, a username mismatch costs the same as a
    // password mismatch.
    let username_ok = constant_time_eq(username, &config.username);
    let password_ok = constant_time_eq(password, config.password.expose_secret());

    username_ok & password_ok
}

/// Constant-time comparison of credential strings.
///
/// When lengths differ, performs a dummy comparison to avoid leaking length
/// information through timing variance.
fn constant_time_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}
