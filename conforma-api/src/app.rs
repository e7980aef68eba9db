/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use conforma_api::{app::{build_router, AppState}, config::Config};
/// use conforma_shared::identity::PgDirectory;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let directory = Arc::new(PgDirectory::new(pool.clone()));
/// let state = AppState::new(pool, directory, config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use conforma_shared::auth::token;
use conforma_shared::identity::Directory;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

use crate::config::Config;
use crate::error::ApiError;

/// Caller identity resolved from the bearer token
///
/// Inserted into request extensions by the auth middleware and extracted by
/// handlers. This is the only thing the token resolves to; the caller's
/// privileges come from their profile, loaded explicitly per request.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    /// Caller's account id
    pub account_id: Uuid,

    /// Caller's email
    pub email: String,
}

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Accounts directory (identity store)
    pub directory: Arc<dyn Directory>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, directory: Arc<dyn Directory>, config: Config) -> Self {
        Self {
            db,
            directory,
            config: Arc::new(config),
        }
    }

    /// Gets the token-signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                     # Health check (public)
/// └── /v1/
///     ├── /auth/
///     │   └── POST /login         # Credential login (public)
///     └── /admin/
///         ├── POST /users         # Provision a user (super-admin)
///         └── POST /users/delete  # Delete a user (super-admin or
///                                 #  same-company administrator)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer; the admin SPA calls from a browser
///    origin, so both admin endpoints answer OPTIONS preflight)
/// 3. Bearer authentication (admin routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new().route("/login", post(routes::auth::login));

    // Admin routes require a bearer token
    let admin_routes = Router::new()
        .route("/users", post(routes::admin_users::create_user))
        .route("/users/delete", post(routes::admin_users::delete_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer authentication middleware
///
/// Extracts and validates the token from the Authorization header, then
/// injects [`CallerIdentity`] into request extensions. Validation is local
/// and read-only; a missing header and a rejected token are distinct,
/// terminal conditions.
async fn bearer_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingAuthToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::InvalidToken("Expected Bearer token".to_string()))?;

    let claims = token::validate_token(token, state.jwt_secret())?;

    let caller = CallerIdentity {
        account_id: claims.sub,
        email: claims.email,
    };
    req.extensions_mut().insert(caller);

    Ok(next.run(req).await)
}
