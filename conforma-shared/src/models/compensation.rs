/// Compensation audit log
///
/// Append-only record of compensating deletes attempted by the provisioning
/// workflow. When profile creation fails after an account was already
/// created, the workflow deletes the account and records the attempt here,
/// whether it succeeded or not. Operators query this table to detect
/// orphaned accounts whose compensation silently failed — a failed row means
/// an account may still exist in the identity store with no profile,
/// invisible to the application UI but consuming a seat.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE compensation_outcome AS ENUM ('succeeded', 'failed');
///
/// CREATE TABLE compensation_log (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     account_id UUID NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     action VARCHAR(64) NOT NULL,
///     outcome compensation_outcome NOT NULL,
///     detail TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Rows are never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Outcome of a compensation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "compensation_outcome", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CompensationOutcome {
    /// The compensating delete removed the account
    Succeeded,

    /// The compensating delete itself failed; the account may be orphaned
    Failed,
}

/// A single compensation attempt record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CompensationRecord {
    /// Record ID
    pub id: Uuid,

    /// The account the compensation targeted
    pub account_id: Uuid,

    /// Email of the account at the time of the attempt
    pub email: String,

    /// What was compensated (e.g. "delete_account_after_profile_failure")
    pub action: String,

    /// Whether the compensating delete succeeded
    pub outcome: CompensationOutcome,

    /// Failure detail, when there is one
    pub detail: Option<String>,

    /// When the attempt was recorded
    pub created_at: DateTime<Utc>,
}

impl CompensationRecord {
    /// Appends a compensation attempt to the log
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails. Callers treat this as
    /// best-effort: a failed audit write is logged, never surfaced.
    pub async fn append(
        pool: &PgPool,
        account_id: Uuid,
        email: &str,
        action: &str,
        outcome: CompensationOutcome,
        detail: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        let record = sqlx::query_as::<_, CompensationRecord>(
            r#"
            INSERT INTO compensation_log (account_id, email, action, outcome, detail)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, account_id, email, action, outcome, detail, created_at
            "#,
        )
        .bind(account_id)
        .bind(email)
        .bind(action)
        .bind(outcome)
        .bind(detail)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Lists compensation attempts for an account, newest first
    pub async fn list_for_account(
        pool: &PgPool,
        account_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let records = sqlx::query_as::<_, CompensationRecord>(
            r#"
            SELECT id, account_id, email, action, outcome, detail, created_at
            FROM compensation_log
            WHERE account_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Lists failed compensation attempts, newest first
    ///
    /// Each row here is a potential orphaned account worth investigating.
    pub async fn list_failed(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        let records = sqlx::query_as::<_, CompensationRecord>(
            r#"
            SELECT id, account_id, email, action, outcome, detail, created_at
            FROM compensation_log
            WHERE outcome = 'failed'
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}
