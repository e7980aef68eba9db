/// Account provisioning workflows
///
/// The provisioner owns the two-step create and the deletion workflow. Both
/// run as single sequential operations per request; there is no queueing,
/// batching, or retry. Creation is a saga without a coordinator:
///
/// 1. Create the identity account (pre-confirmed, since the action is
///    administrator-initiated).
/// 2. Insert the application profile keyed to the account id.
/// 3. On step 2 failure, compensate backward: delete the step 1 account,
///    best-effort and exactly once, and record the attempt in the
///    compensation log.
///
/// The ordering — account first, profile second, compensate backward — is
/// the entire design. Once step 1 succeeds the workflow commits to either
/// finishing or compensating before returning; the caller is told the
/// operation failed, never that it partially succeeded.
///
/// Deletion is the inverse but not a strict mirror: the account delete is
/// the security-relevant action (it revokes login), so a subsequent profile
/// delete failure is logged rather than surfaced. The schema is not trusted
/// to cascade.
///
/// # Example
///
/// ```no_run
/// use conforma_shared::identity::PgDirectory;
/// use conforma_shared::models::profile::ProfileRole;
/// use conforma_shared::provisioning::{NewUser, Provisioner};
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let provisioner = Provisioner::new(pool.clone(), Arc::new(PgDirectory::new(pool)));
///
/// let user = provisioner
///     .create_user(NewUser {
///         email: "ana@example.com".to_string(),
///         password: "secret1".to_string(),
///         full_name: "Ana Souza".to_string(),
///         role: ProfileRole::Auditor,
///         company_id: None,
///         phone: None,
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::identity::{Directory, DirectoryError, NewAccount};
use crate::models::compensation::{CompensationOutcome, CompensationRecord};
use crate::models::profile::{CreateProfile, Profile, ProfileRole};

/// Action label written to the compensation log by the create workflow
const COMPENSATION_ACTION: &str = "delete_account_after_profile_failure";

/// Error type for provisioning workflows
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// The email is already registered
    ///
    /// Raised by the fast-fail uniqueness check and by the directory's own
    /// constraint when a concurrent request wins the race; both are the
    /// same condition to the caller.
    #[error("An account with email {0} already exists")]
    EmailTaken(String),

    /// Step 1 (account creation) failed; no profile was attempted
    #[error("Account creation failed: {0}")]
    AccountCreation(#[source] DirectoryError),

    /// Step 2 (profile creation) failed after the account was created
    ///
    /// `compensated` reports whether the compensating account delete
    /// succeeded. Either way the operation failed as a whole.
    #[error("Profile creation failed (account compensated: {compensated}): {source}")]
    ProfileCreation {
        #[source]
        source: sqlx::Error,
        compensated: bool,
    },

    /// Deletion target does not exist in the directory
    #[error("Account {0} not found")]
    AccountNotFound(Uuid),

    /// Directory operation failed outside the create saga
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),
}

/// Input for the create workflow
///
/// Field-level validation (format, policy, role/company coherence) happens
/// at the API boundary before this struct is built; the provisioner assumes
/// it is well-formed.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address for the new account
    pub email: String,

    /// Plaintext password chosen by the administrator
    pub password: String,

    /// Display name for the profile
    pub full_name: String,

    /// Role to assign
    pub role: ProfileRole,

    /// Company reference (None for auditors)
    pub company_id: Option<Uuid>,

    /// Optional contact phone
    pub phone: Option<String>,
}

/// Outcome of a successful create workflow
#[derive(Debug, Clone)]
pub struct ProvisionedUser {
    /// New account/profile id
    pub id: Uuid,

    /// Email as stored
    pub email: String,

    /// Display name as stored
    pub full_name: String,

    /// Assigned role
    pub role: ProfileRole,
}

/// Executes provisioning workflows against the directory and the database
pub struct Provisioner {
    db: PgPool,
    directory: Arc<dyn Directory>,
}

impl Provisioner {
    /// Creates a provisioner
    pub fn new(db: PgPool, directory: Arc<dyn Directory>) -> Self {
        Self { db, directory }
    }

    /// Creates an account and its profile
    ///
    /// # Errors
    ///
    /// - `ProvisionError::EmailTaken` if the email is already registered
    /// - `ProvisionError::AccountCreation` if step 1 fails (no profile is
    ///   attempted)
    /// - `ProvisionError::ProfileCreation` if step 2 fails (the step 1
    ///   account has been compensated, or the failure to do so recorded)
    pub async fn create_user(&self, data: NewUser) -> Result<ProvisionedUser, ProvisionError> {
        // Fast-fail uniqueness check. The directory's unique constraint
        // remains the authority under concurrent requests.
        if self.directory.find_by_email(&data.email).await?.is_some() {
            return Err(ProvisionError::EmailTaken(data.email));
        }

        // Step 1: identity account, pre-confirmed because the action is
        // administrator-initiated.
        let account = self
            .directory
            .create_account(NewAccount {
                email: data.email.clone(),
                password: data.password.clone(),
                email_confirmed: true,
            })
            .await
            .map_err(|e| match e {
                DirectoryError::DuplicateEmail(email) => ProvisionError::EmailTaken(email),
                other => ProvisionError::AccountCreation(other),
            })?;

        info!(account_id = %account.id, email = %account.email, "Account created");

        // Step 2: application profile keyed to the account id.
        let profile = Profile::create(
            &self.db,
            CreateProfile {
                id: account.id,
                full_name: data.full_name,
                role: data.role,
                company_id: data.company_id,
                phone: data.phone,
            },
        )
        .await;

        match profile {
            Ok(profile) => {
                info!(account_id = %profile.id, role = %profile.role, "Profile created");
                Ok(ProvisionedUser {
                    id: profile.id,
                    email: account.email,
                    full_name: profile.full_name,
                    role: profile.role,
                })
            }
            Err(source) => {
                error!(
                    account_id = %account.id,
                    error = %source,
                    "Profile creation failed, compensating account"
                );
                let compensated = self.compensate_account(account.id, &account.email).await;
                Err(ProvisionError::ProfileCreation { source, compensated })
            }
        }
    }

    /// Deletes an account and its profile
    ///
    /// The caller is responsible for authorization, including the
    /// same-tenant check for scoped administrators; this method only
    /// executes the deletion. The account delete comes first; a failing
    /// profile delete afterwards is logged, not surfaced, because login
    /// capability is already revoked.
    ///
    /// # Errors
    ///
    /// - `ProvisionError::AccountNotFound` if no such account exists
    /// - `ProvisionError::Directory` if the account delete fails
    pub async fn delete_user(&self, account_id: Uuid) -> Result<(), ProvisionError> {
        let deleted = self.directory.delete_account(account_id).await?;
        if !deleted {
            return Err(ProvisionError::AccountNotFound(account_id));
        }

        info!(%account_id, "Account deleted");

        // Best-effort: do not rely on a cascade trigger to clean this up.
        match Profile::delete(&self.db, account_id).await {
            Ok(true) => info!(%account_id, "Profile deleted"),
            Ok(false) => warn!(%account_id, "No profile row existed for deleted account"),
            Err(e) => error!(
                %account_id,
                error = %e,
                "Profile deletion failed after account was removed"
            ),
        }

        Ok(())
    }

    /// Compensating delete for the create saga, attempted exactly once
    ///
    /// Returns whether the account was removed. Every attempt gets an
    /// append-only audit row; if even the audit write fails, the failure is
    /// at least logged.
    async fn compensate_account(&self, account_id: Uuid, email: &str) -> bool {
        let (outcome, detail) = match self.directory.delete_account(account_id).await {
            Ok(true) => (CompensationOutcome::Succeeded, None),
            Ok(false) => (
                CompensationOutcome::Failed,
                Some("account no longer exists".to_string()),
            ),
            Err(e) => {
                error!(
                    %account_id,
                    error = %e,
                    "Compensating account delete failed; account may be orphaned"
                );
                (CompensationOutcome::Failed, Some(e.to_string()))
            }
        };

        if let Err(e) = CompensationRecord::append(
            &self.db,
            account_id,
            email,
            COMPENSATION_ACTION,
            outcome,
            detail.as_deref(),
        )
        .await
        {
            error!(
                %account_id,
                error = %e,
                "Failed to record compensation attempt"
            );
        }

        outcome == CompensationOutcome::Succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provision_error_messages() {
        let err = ProvisionError::EmailTaken("dup@x.com".to_string());
        assert!(err.to_string().contains("dup@x.com"));

        let err = ProvisionError::AccountNotFound(Uuid::nil());
        assert!(err.to_string().contains("not found"));
    }

    // The saga itself is exercised end-to-end (including forced step 2
    // failure and compensation) in conforma-api/tests/provisioning_test.rs.
}
