/// Postgres-backed accounts directory
///
/// Stores accounts in the `accounts` table with Argon2id password hashes.
/// Email uniqueness is enforced by a unique index on `LOWER(email)`; a
/// violation of that index is reported as `DirectoryError::DuplicateEmail`
/// so concurrent create races collapse into the same conflict condition the
/// fast-fail pre-check reports.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE accounts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     email_confirmed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// CREATE UNIQUE INDEX accounts_email_unique ON accounts (LOWER(email));
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::directory::{Account, Directory, DirectoryError, NewAccount};
use crate::auth::password;

/// Row type for the accounts table
///
/// Kept private so the password hash never escapes this module.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    email_confirmed: bool,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            email: row.email,
            email_confirmed: row.email_confirmed,
            created_at: row.created_at,
        }
    }
}

/// Accounts directory backed by Postgres
#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    /// Creates a new directory over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Directory for PgDirectory {
    async fn verify_credentials(
        &self,
        email: &str,
        candidate: &str,
    ) -> Result<Option<Account>, DirectoryError> {
        let row = sqlx::query_as::<_, (Uuid, String, bool, DateTime<Utc>, String)>(
            r#"
            SELECT id, email, email_confirmed, created_at, password_hash
            FROM accounts
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, email, email_confirmed, created_at, hash)) = row else {
            return Ok(None);
        };

        if password::verify_password(candidate, &hash)? {
            Ok(Some(Account {
                id,
                email,
                email_confirmed,
                created_at,
            }))
        } else {
            Ok(None)
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, email_confirmed, created_at
            FROM accounts
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DirectoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, email_confirmed, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn create_account(&self, data: NewAccount) -> Result<Account, DirectoryError> {
        let password_hash = password::hash_password(&data.password)?;

        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (email, password_hash, email_confirmed)
            VALUES ($1, $2, $3)
            RETURNING id, email, email_confirmed, created_at
            "#,
        )
        .bind(&data.email)
        .bind(password_hash)
        .bind(data.email_confirmed)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if db_err.constraint().is_some_and(|c| c.contains("email")) =>
            {
                DirectoryError::DuplicateEmail(data.email.clone())
            }
            _ => DirectoryError::Database(e),
        })?;

        Ok(row.into())
    }

    async fn delete_account(&self, id: Uuid) -> Result<bool, DirectoryError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
