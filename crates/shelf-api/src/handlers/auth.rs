//! Admin login and logout.
//!
//! Credentials come from `ADMIN_EMAIL` and `ADMIN_PASSWORD_HASH` (an argon2
//! PHC string). A successful login mints an opaque bearer token; the server
//! keeps only its digest.

use argon2::{password_hash::PasswordHash, Argon2, PasswordVerifier};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{bearer_token, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in_secs: i64,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    // One rejection message for every failure mode, so probes learn nothing.
    let rejected = || ApiError::Unauthorized("Invalid email or password".to_string());

    if !req.email.trim().eq_ignore_ascii_case(&state.admin_email) {
        warn!(
            subsystem = "api",
            component = "auth",
            op = "login",
            "Login rejected: unknown email"
        );
        return Err(rejected());
    }

    let parsed_hash = PasswordHash::new(&state.admin_password_hash).map_err(|e| {
        warn!(error = %e, "ADMIN_PASSWORD_HASH is not a valid PHC string");
        ApiError::Database(shelf_core::Error::Config(
            "Admin credential configuration is invalid".to_string(),
        ))
    })?;

    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        warn!(
            subsystem = "api",
            component = "auth",
            op = "login",
            "Login rejected: bad password"
        );
        return Err(rejected());
    }

    let token = state.db.sessions.issue(state.session_ttl_secs).await?;
    info!(
        subsystem = "api",
        component = "auth",
        op = "login",
        "Admin logged in"
    );

    Ok(Json(LoginResponse {
        token,
        expires_in_secs: state.session_ttl_secs,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    state.db.sessions.revoke(token).await?;
    info!(
        subsystem = "api",
        component = "auth",
        op = "logout",
        "Admin logged out"
    );
    Ok(Json(serde_json::json!({ "loggedOut": true })))
}
