/// Bearer-token generation and validation
///
/// This module resolves the `Authorization: Bearer` credential presented by the
/// admin UI to a caller identity. Tokens are signed with HS256 (HMAC-SHA256)
/// and carry the caller's account id and email.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: 24 hours
/// - **Validation**: Signature, expiration, and issuer checks
/// - **Secret Management**: Secrets must be at least 32 bytes (256 bits)
///
/// Validation is a pure, read-only operation: it never touches the database
/// and a rejected token is terminal for the request.
///
/// # Example
///
/// ```
/// use conforma_shared::auth::token::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let account_id = Uuid::new_v4();
/// let claims = Claims::new(account_id, "admin@example.com".to_string());
/// let token = create_token(&claims, "secret-key-that-is-32-bytes-long!!!!")?;
///
/// let validated = validate_token(&token, "secret-key-that-is-32-bytes-long!!!!")?;
/// assert_eq!(validated.sub, account_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token issuer claim value
const ISSUER: &str = "conforma";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}, got {actual}")]
    InvalidIssuer { expected: String, actual: String },
}

/// Bearer-token claims
///
/// # Standard Claims
///
/// - `sub`: Subject (account ID)
/// - `iss`: Issuer (always "conforma")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `email`: Caller's email address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - Account ID
    pub sub: Uuid,

    /// Issuer - Always "conforma"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Caller email (custom claim)
    pub email: String,
}

impl Claims {
    /// Creates new claims with the default 24-hour expiration
    pub fn new(account_id: Uuid, email: String) -> Self {
        Self::with_expiration(account_id, email, Duration::hours(24))
    }

    /// Creates claims with a custom expiration
    ///
    /// # Example
    ///
    /// ```
    /// use conforma_shared::auth::token::Claims;
    /// use chrono::Duration;
    /// use uuid::Uuid;
    ///
    /// let claims = Claims::with_expiration(
    ///     Uuid::new_v4(),
    ///     "admin@example.com".to_string(),
    ///     Duration::hours(1),
    /// );
    /// ```
    pub fn with_expiration(account_id: Uuid, email: String, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: account_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            email,
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed token from claims
///
/// # Arguments
///
/// * `claims` - Token claims
/// * `secret` - Secret key for signing (should be at least 32 bytes)
///
/// # Errors
///
/// Returns `TokenError::CreateError` if token creation fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| TokenError::CreateError(e.to_string()))
}

/// Validates a token and returns its claims
///
/// Checks the signature, expiration, not-before, and issuer.
///
/// # Arguments
///
/// * `token` - The encoded token string
/// * `secret` - Secret key used for signing
///
/// # Errors
///
/// - `TokenError::Expired` if the token is past its expiration
/// - `TokenError::InvalidIssuer` if the issuer claim is wrong
/// - `TokenError::ValidationError` for any other validation failure
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => TokenError::InvalidIssuer {
            expected: ISSUER.to_string(),
            actual: "unknown".to_string(),
        },
        _ => TokenError::ValidationError(e.to_string()),
    })?;

    Ok(data.claims)
}
