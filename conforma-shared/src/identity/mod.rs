/// Identity subsystem: the accounts directory
///
/// The directory is the authority over login credentials. The provisioning
/// workflow talks to it through the [`Directory`] trait so the API can run
/// against the real Postgres-backed store in production and a deterministic
/// in-memory store in tests.
///
/// # Implementations
///
/// - [`PgDirectory`]: accounts table in Postgres, Argon2id password hashes
/// - [`MockDirectory`]: in-memory store with configurable failure injection
///
/// # Example
///
/// ```no_run
/// use conforma_shared::identity::{Directory, NewAccount, PgDirectory};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let directory = PgDirectory::new(pool);
///
/// let account = directory
///     .create_account(NewAccount {
///         email: "a@b.com".to_string(),
///         password: "secret1".to_string(),
///         email_confirmed: true,
///     })
///     .await?;
///
/// assert!(directory.find_by_email("a@b.com").await?.is_some());
/// directory.delete_account(account.id).await?;
/// # Ok(())
/// # }
/// ```

pub mod directory;
pub mod mock;
pub mod pg;

pub use directory::{Account, Directory, DirectoryError, NewAccount};
pub use mock::MockDirectory;
pub use pg::PgDirectory;
