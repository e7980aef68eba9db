/// Profile model and database operations
///
/// A Profile is the application-level record keyed 1:1 to an identity
/// account: same id, plus display name, role, and tenant affiliation.
/// Profiles are only ever created by the provisioning workflow, after the
/// account exists; a profile must never outlive its account.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE profile_role AS ENUM ('administrator', 'auditor', 'operator', 'viewer');
///
/// CREATE TABLE profiles (
///     id UUID PRIMARY KEY,
///     full_name VARCHAR(255) NOT NULL,
///     role profile_role NOT NULL,
///     company_id UUID REFERENCES companies(id),
///     phone VARCHAR(32),
///     is_super_admin BOOLEAN NOT NULL DEFAULT FALSE,
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Roles
///
/// - **administrator**: manages users and settings within their company
/// - **auditor**: conducts audits across companies (no company affiliation)
/// - **operator**: works corrective actions and documents
/// - **viewer**: read-only access
///
/// # Example
///
/// ```no_run
/// use conforma_shared::models::profile::{CreateProfile, Profile, ProfileRole};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, account_id: Uuid) -> Result<(), sqlx::Error> {
/// let profile = Profile::create(&pool, CreateProfile {
///     id: account_id,
///     full_name: "Ana Souza".to_string(),
///     role: ProfileRole::Auditor,
///     company_id: None,
///     phone: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Roles a profile can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "profile_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProfileRole {
    /// Manages users and settings within their company
    Administrator,

    /// Conducts audits; tenant-agnostic, never tied to a company
    Auditor,

    /// Works corrective actions and documents
    Operator,

    /// Read-only access
    Viewer,
}

impl ProfileRole {
    /// Converts role to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileRole::Administrator => "administrator",
            ProfileRole::Auditor => "auditor",
            ProfileRole::Operator => "operator",
            ProfileRole::Viewer => "viewer",
        }
    }

    /// Whether this role is bound to a company
    ///
    /// Auditors operate across tenants; every other role requires a company
    /// reference at provisioning time.
    pub fn requires_company(&self) -> bool {
        !matches!(self, ProfileRole::Auditor)
    }
}

impl fmt::Display for ProfileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "administrator" => Ok(ProfileRole::Administrator),
            "auditor" => Ok(ProfileRole::Auditor),
            "operator" => Ok(ProfileRole::Operator),
            "viewer" => Ok(ProfileRole::Viewer),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Profile model representing a user's application-level record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    /// Profile ID, always equal to the identity account ID
    pub id: Uuid,

    /// Display name
    pub full_name: String,

    /// Role within the platform
    pub role: ProfileRole,

    /// Company the profile belongs to (None for auditors)
    pub company_id: Option<Uuid>,

    /// Optional contact phone
    pub phone: Option<String>,

    /// Cross-tenant administrative privilege
    pub is_super_admin: bool,

    /// Whether the profile is active
    pub active: bool,

    /// When the profile was created
    pub created_at: DateTime<Utc>,

    /// When the profile was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new profile
///
/// `is_super_admin` is never settable through provisioning; new profiles
/// always start unprivileged and active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfile {
    /// Account ID the profile is keyed to
    pub id: Uuid,

    /// Display name
    pub full_name: String,

    /// Role to assign
    pub role: ProfileRole,

    /// Company reference (required unless role is auditor)
    pub company_id: Option<Uuid>,

    /// Optional contact phone
    pub phone: Option<String>,
}

impl Profile {
    /// Creates a new profile
    ///
    /// This is a plain insert: a conflicting row is an error, not something
    /// to tolerate. No trigger pre-creates profile rows in this schema, so a
    /// duplicate id means the workflow is broken and the caller must
    /// compensate.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A profile with this id already exists (unique violation)
    /// - The company reference doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateProfile) -> Result<Self, sqlx::Error> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, full_name, role, company_id, phone, is_super_admin, active)
            VALUES ($1, $2, $3, $4, $5, FALSE, TRUE)
            RETURNING id, full_name, role, company_id, phone, is_super_admin, active,
                      created_at, updated_at
            "#,
        )
        .bind(data.id)
        .bind(data.full_name)
        .bind(data.role)
        .bind(data.company_id)
        .bind(data.phone)
        .fetch_one(pool)
        .await?;

        Ok(profile)
    }

    /// Finds a profile by ID
    ///
    /// # Returns
    ///
    /// The profile if found, None otherwise
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, full_name, role, company_id, phone, is_super_admin, active,
                   created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Deletes a profile by ID
    ///
    /// # Returns
    ///
    /// True if a profile was deleted, false if none existed
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
