//! Account registration and login.
//!
//! Both endpoints take `{"email", "password"}` and answer with
//! `{"token", "email"}`. The token is opaque to the client.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::services::auth::{AuthService, Authenticated};
use crate::state::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Login and registration payload.
#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful auth response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
}

impl From<Authenticated> for AuthResponse {
    fn from(auth: Authenticated) -> Self {
        Self {
            token: auth.token,
            email: auth.user.email.into_inner(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Create an account.
///
/// `POST /api/auth/register` → `201 {token, email}`
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let Json(credentials) = payload?;

    let auth = AuthService::new(state.pool())
        .register(&credentials.email, &credentials.password)
        .await?;

    Ok((StatusCode::CREATED, Json(auth.into())))
}

/// Sign in.
///
/// `POST /api/auth/login` → `200 {token, email}`
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(credentials) = payload?;

    let auth = AuthService::new(state.pool())
        .login(&credentials.email, &credentials.password)
        .await?;

    Ok(Json(auth.into()))
}
