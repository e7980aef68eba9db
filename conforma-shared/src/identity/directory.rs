/// Directory trait and account types
///
/// An [`Account`] is the identity-side record: credentials and confirmation
/// state, nothing application-specific. The application-side counterpart is
/// `models::profile::Profile`, keyed to the same id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::password::PasswordError;

/// Error type for directory operations
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// An account with this email already exists
    #[error("An account with email {0} already exists")]
    DuplicateEmail(String),

    /// Password hashing failed
    #[error("Password hashing failed: {0}")]
    Password(#[from] PasswordError),

    /// Database error
    #[error("Directory database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The directory rejected the operation (used by test fault injection)
    #[error("Directory rejected the operation: {0}")]
    Rejected(String),
}

/// An identity account
///
/// The password hash never leaves the directory; this struct is what the
/// rest of the system sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique account ID (UUID v4)
    pub id: Uuid,

    /// Email address, unique across all accounts
    pub email: String,

    /// Whether the email address has been confirmed
    ///
    /// Admin-provisioned accounts are created pre-confirmed: the action is
    /// administrator-initiated, so the verification round-trip is skipped.
    pub email_confirmed: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new account
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Email address
    pub email: String,

    /// Plaintext password; the directory hashes it before storage
    pub password: String,

    /// Whether to mark the email as already confirmed
    pub email_confirmed: bool,
}

/// The accounts directory
///
/// All methods are sequential, per-request operations; the directory itself
/// enforces email uniqueness (a unique constraint in the Postgres
/// implementation), so a `find_by_email` pre-check is only ever a fast-fail
/// optimization, never the authority.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Finds an account by email
    ///
    /// Lookup is case-insensitive.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError>;

    /// Finds an account by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DirectoryError>;

    /// Creates an account
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::DuplicateEmail` if the email is taken,
    /// including when a concurrent request won the race.
    async fn create_account(&self, data: NewAccount) -> Result<Account, DirectoryError>;

    /// Verifies credentials for an account, by email
    ///
    /// Returns the account on success, None when the account doesn't exist
    /// or the password doesn't match; the two cases are deliberately
    /// indistinguishable to the caller.
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, DirectoryError>;

    /// Deletes an account
    ///
    /// # Returns
    ///
    /// True if an account was deleted, false if none existed.
    async fn delete_account(&self, id: Uuid) -> Result<bool, DirectoryError>;
}
