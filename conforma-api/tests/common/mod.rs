/// Common test utilities for integration tests
///
/// Provides shared infrastructure:
/// - Test database setup (env-gated: tests skip when DATABASE_URL is unset)
/// - A mock accounts directory shared between the router and the test body
/// - Seeded caller profiles with signed bearer tokens
/// - Response body helpers

use conforma_api::app::{build_router, AppState};
use conforma_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use conforma_shared::auth::token::{create_token, Claims};
use conforma_shared::identity::{Account, MockDirectory};
use conforma_shared::models::company::Company;
use conforma_shared::models::profile::ProfileRole;
use sqlx::PgPool;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Signing secret used by all integration tests
const TEST_JWT_SECRET: &str = "integration-test-secret-key-0123456789abcdef";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub directory: Arc<MockDirectory>,
    pub company: Company,
    created_profiles: Mutex<Vec<Uuid>>,
    created_companies: Mutex<Vec<Uuid>>,
}

impl TestContext {
    /// Creates a new test context, or None when no database is configured
    ///
    /// The accounts directory is a [`MockDirectory`] so tests can inject
    /// faults and observe call counts; only profiles and the compensation
    /// log live in Postgres.
    pub async fn new() -> anyhow::Result<Option<Self>> {
        dotenvy::dotenv().ok();

        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            return Ok(None);
        };

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: database_url.clone(),
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
        };

        let db = PgPool::connect(&database_url).await?;

        // Path relative to Cargo.toml, not this file
        sqlx::migrate!("../migrations").run(&db).await?;

        let directory = Arc::new(MockDirectory::new());

        let company = Company::create(&db, &format!("Test Company {}", Uuid::new_v4())).await?;

        let state = AppState::new(db.clone(), directory.clone(), config.clone());
        let app = build_router(state);

        Ok(Some(TestContext {
            db,
            app,
            config,
            directory,
            created_companies: Mutex::new(vec![company.id]),
            company,
            created_profiles: Mutex::new(Vec::new()),
        }))
    }

    /// Registers a profile id for cleanup
    pub fn track_profile(&self, id: Uuid) {
        self.created_profiles.lock().unwrap().push(id);
    }

    /// Creates an extra company, registered for cleanup
    pub async fn create_company(&self, name: &str) -> anyhow::Result<Company> {
        let company = Company::create(&self.db, name).await?;
        self.created_companies.lock().unwrap().push(company.id);
        Ok(company)
    }

    /// Seeds an account plus profile and returns it with a signed token
    ///
    /// The profile insert bypasses the provisioning workflow so tests can
    /// seed privileged callers (`is_super_admin` is never settable through
    /// the API).
    pub async fn seed_user(
        &self,
        email: &str,
        role: ProfileRole,
        company_id: Option<Uuid>,
        is_super_admin: bool,
    ) -> anyhow::Result<(Account, String)> {
        let account = self.directory.insert_account(Uuid::new_v4(), email);

        sqlx::query(
            r#"
            INSERT INTO profiles (id, full_name, role, company_id, is_super_admin)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(account.id)
        .bind("Test User")
        .bind(role)
        .bind(company_id)
        .bind(is_super_admin)
        .execute(&self.db)
        .await?;

        self.track_profile(account.id);

        let token = self.token_for(&account)?;
        Ok((account, token))
    }

    /// Signs a bearer token for the given account
    pub fn token_for(&self, account: &Account) -> anyhow::Result<String> {
        let claims = Claims::new(account.id, account.email.clone());
        Ok(create_token(&claims, &self.config.jwt.secret)?)
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        let profile_ids = self.created_profiles.lock().unwrap().clone();
        for id in profile_ids {
            sqlx::query("DELETE FROM compensation_log WHERE account_id = $1")
                .bind(id)
                .execute(&self.db)
                .await?;
            sqlx::query("DELETE FROM profiles WHERE id = $1")
                .bind(id)
                .execute(&self.db)
                .await?;
        }

        let company_ids = self.created_companies.lock().unwrap().clone();
        for id in company_ids {
            sqlx::query("DELETE FROM companies WHERE id = $1")
                .bind(id)
                .execute(&self.db)
                .await?;
        }

        Ok(())
    }
}

/// Generates an email no other test run will collide with
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4())
}

/// Collects a response body as JSON
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Body should collect");
    serde_json::from_slice(&body).expect("Body should be JSON")
}
