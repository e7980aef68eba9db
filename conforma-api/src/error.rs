/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which converts to the wire
/// format the admin SPA consumes: `{ "error": "<CODE>", "message": "..." }`.
///
/// The error taxonomy distinguishes:
/// - **credential errors** (401): missing or invalid bearer token; terminal
/// - **authorization errors** (403): a correct security decision
/// - **infrastructure errors during authorization** (500 `PROFILE_ERROR`):
///   the privilege check itself could not run — logged with detail
///   server-side, surfaced generically
/// - **validation errors** (400): field-specific, nothing was mutated
/// - **conflict errors** (409): duplicate email, nothing was mutated
/// - **transactional errors** (500): step 1 or step 2 of provisioning
///   failed; the caller is always told the operation failed as a whole
///
/// Nothing in this taxonomy is retried by the server; retry is the human
/// administrator resubmitting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use conforma_shared::auth::authorization::AuthzError;
use conforma_shared::auth::token::TokenError;
use conforma_shared::identity::DirectoryError;
use conforma_shared::provisioning::ProvisionError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Authorization header missing (401, NO_AUTH_TOKEN)
    #[error("Missing authorization token")]
    MissingAuthToken,

    /// Bearer token rejected (401, INVALID_TOKEN)
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Login credentials rejected (401, INVALID_CREDENTIALS)
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Caller lacks the required privilege (403, FORBIDDEN)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Required fields missing from the request (400, MISSING_FIELDS)
    #[error("Missing required fields: {0}")]
    MissingFields(String),

    /// Email is not a valid address (400, INVALID_EMAIL)
    #[error("Invalid email format")]
    InvalidEmail,

    /// Password fails the policy (400, WEAK_PASSWORD)
    #[error("{0}")]
    WeakPassword(String),

    /// Role is not one of the accepted set (400, INVALID_ROLE)
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// Caller attempted to delete their own account (400, CANNOT_DELETE_SELF)
    #[error("You cannot delete your own account")]
    CannotDeleteSelf,

    /// Email already registered (409, EMAIL_EXISTS)
    #[error("An account with email {0} already exists")]
    EmailExists(String),

    /// Deletion target does not exist (404, USER_NOT_FOUND)
    #[error("User not found")]
    UserNotFound,

    /// The caller's profile could not be loaded (500, PROFILE_ERROR)
    ///
    /// Infrastructure fault during the authorization check, distinct from a
    /// legitimate "not authorized" outcome.
    #[error("Profile lookup failed: {0}")]
    ProfileLookup(String),

    /// Step 1 of provisioning failed (500, CREATE_USER_ERROR)
    #[error("Account creation failed: {0}")]
    AccountCreation(String),

    /// Step 2 of provisioning failed (500, CREATE_PROFILE_ERROR)
    #[error("Profile creation failed: {0}")]
    ProfileCreation(String),

    /// Anything else (500, INTERNAL_ERROR)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response format consumed by the admin SPA
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code (e.g. "EMAIL_EXISTS")
    pub error: String,

    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Stable wire code for this error
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingAuthToken => "NO_AUTH_TOKEN",
            ApiError::InvalidToken(_) => "INVALID_TOKEN",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::MissingFields(_) => "MISSING_FIELDS",
            ApiError::InvalidEmail => "INVALID_EMAIL",
            ApiError::WeakPassword(_) => "WEAK_PASSWORD",
            ApiError::InvalidRole(_) => "INVALID_ROLE",
            ApiError::CannotDeleteSelf => "CANNOT_DELETE_SELF",
            ApiError::EmailExists(_) => "EMAIL_EXISTS",
            ApiError::UserNotFound => "USER_NOT_FOUND",
            ApiError::ProfileLookup(_) => "PROFILE_ERROR",
            ApiError::AccountCreation(_) => "CREATE_USER_ERROR",
            ApiError::ProfileCreation(_) => "CREATE_PROFILE_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingAuthToken
            | ApiError::InvalidToken(_)
            | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::MissingFields(_)
            | ApiError::InvalidEmail
            | ApiError::WeakPassword(_)
            | ApiError::InvalidRole(_)
            | ApiError::CannotDeleteSelf => StatusCode::BAD_REQUEST,
            ApiError::EmailExists(_) => StatusCode::CONFLICT,
            ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::ProfileLookup(_)
            | ApiError::AccountCreation(_)
            | ApiError::ProfileCreation(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        // 500-class detail is logged server-side, never sent to clients
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(code, error = %self, "Internal error");
            match &self {
                ApiError::ProfileLookup(_) => "Failed to verify permissions".to_string(),
                ApiError::AccountCreation(_) => "Failed to create the account".to_string(),
                ApiError::ProfileCreation(_) => {
                    "Failed to create the user profile".to_string()
                }
                _ => "An internal error occurred".to_string(),
            }
        } else {
            self.to_string()
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Convert token errors to API errors
impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::InvalidToken("Token expired".to_string()),
            TokenError::InvalidIssuer { .. } => {
                ApiError::InvalidToken("Invalid token issuer".to_string())
            }
            other => ApiError::InvalidToken(other.to_string()),
        }
    }
}

/// Convert authorization denials to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        ApiError::Forbidden(err.to_string())
    }
}

/// Convert provisioning errors to API errors
impl From<ProvisionError> for ApiError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::EmailTaken(email) => ApiError::EmailExists(email),
            ProvisionError::AccountCreation(e) => ApiError::AccountCreation(e.to_string()),
            ProvisionError::ProfileCreation { source, compensated } => {
                ApiError::ProfileCreation(format!(
                    "{} (compensated: {})",
                    source, compensated
                ))
            }
            ProvisionError::AccountNotFound(_) => ApiError::UserNotFound,
            ProvisionError::Directory(e) => ApiError::Internal(e.to_string()),
        }
    }
}

/// Convert directory errors to API errors
impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::DuplicateEmail(email) => ApiError::EmailExists(email),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Convert database errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(format!("Database error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::MissingAuthToken.code(), "NO_AUTH_TOKEN");
        assert_eq!(ApiError::InvalidEmail.code(), "INVALID_EMAIL");
        assert_eq!(
            ApiError::EmailExists("a@b.com".to_string()).code(),
            "EMAIL_EXISTS"
        );
        assert_eq!(
            ApiError::ProfileCreation("x".to_string()).code(),
            "CREATE_PROFILE_ERROR"
        );
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(ApiError::MissingAuthToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Forbidden("nope".to_string()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::EmailExists("a@b.com".to_string()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::WeakPassword("short".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_provision_error_mapping() {
        let err: ApiError = ProvisionError::EmailTaken("dup@x.com".to_string()).into();
        assert_eq!(err.code(), "EMAIL_EXISTS");

        let err: ApiError = ProvisionError::AccountNotFound(uuid::Uuid::nil()).into();
        assert_eq!(err.code(), "USER_NOT_FOUND");
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let err = ApiError::ProfileCreation("connection refused at 10.0.0.5".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
