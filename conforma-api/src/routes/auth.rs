/// Authentication endpoints
///
/// The admin SPA authenticates here to obtain the bearer token it presents
/// to the provisioning endpoints.
///
/// # Endpoints
///
/// - `POST /v1/auth/login` - Exchange credentials for a token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use conforma_shared::auth::token::{create_token, Claims};
use serde::{Deserialize, Serialize};

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: Option<String>,

    /// Password
    pub password: Option<String>,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token (24h)
    pub token: String,

    /// Account id
    pub user_id: String,

    /// Email as stored
    pub email: String,
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// { "email": "admin@example.com", "password": "secret1" }
/// ```
///
/// # Errors
///
/// - `400 MISSING_FIELDS`: email or password absent
/// - `401 INVALID_CREDENTIALS`: unknown email or wrong password
///   (indistinguishable by design)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (email, password) = match (req.email, req.password) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(ApiError::MissingFields("email, password".to_string())),
    };

    let account = state
        .directory
        .verify_credentials(&email, &password)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let claims = Claims::new(account.id, account.email.clone());
    let token = create_token(&claims, state.jwt_secret())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(LoginResponse {
        token,
        user_id: account.id.to_string(),
        email: account.email,
    }))
}
