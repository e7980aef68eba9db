/// Privileged user provisioning endpoints
///
/// These endpoints back the admin UI's user-management screen. Both require
/// a bearer token; the required privilege differs:
///
/// - **Creation** is cross-tenant and requires the global super-admin flag.
/// - **Deletion** is allowed to super-admins, or to company administrators
///   for targets of their own company.
///
/// The creation workflow validates everything before any mutation, then
/// runs the two-step account-then-profile saga with backward compensation
/// (see `conforma_shared::provisioning`).
///
/// # Endpoints
///
/// - `POST /v1/admin/users` - Provision a new user
/// - `POST /v1/admin/users/delete` - Delete a user

use crate::{
    app::{AppState, CallerIdentity},
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use conforma_shared::auth::authorization::{
    can_delete_orphan, require_delete_rights, require_super_admin,
};
use conforma_shared::auth::password::validate_password_policy;
use conforma_shared::models::profile::{Profile, ProfileRole};
use conforma_shared::provisioning::{NewUser, Provisioner};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::ValidateEmail;

/// Create-user request body
///
/// Fields are optional at the serde level so absence maps to the
/// `MISSING_FIELDS` code instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Email address for the new account
    pub email: Option<String>,

    /// Password chosen by the administrator
    pub password: Option<String>,

    /// Display name
    pub full_name: Option<String>,

    /// Role: administrator, auditor, operator, or viewer
    pub role: Option<String>,

    /// Company the user belongs to (required unless role is auditor)
    pub company_id: Option<Uuid>,

    /// Optional contact phone
    pub phone: Option<String>,
}

/// The created user, echoed back to the caller
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    /// New account/profile id
    pub id: Uuid,

    /// Email as stored
    pub email: String,

    /// Display name as stored
    pub full_name: String,

    /// Assigned role
    pub role: ProfileRole,
}

/// Create-user response body
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserResponse {
    /// Always true on the success path
    pub success: bool,

    /// The created user
    pub user: CreatedUser,

    /// Human-readable confirmation
    pub message: String,
}

/// Delete-user request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserRequest {
    /// Account id to delete
    pub user_id: Option<Uuid>,
}

/// Delete-user response body
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    /// Human-readable confirmation
    pub message: String,
}

/// Validated form of a create request
#[derive(Debug)]
struct ValidatedCreate {
    email: String,
    password: String,
    full_name: String,
    role: ProfileRole,
    company_id: Option<Uuid>,
    phone: Option<String>,
}

/// Validates a create request before any external call
///
/// Check order: required fields, email format, password policy, role
/// membership, role/company coherence. The first failure wins; nothing has
/// been mutated when any of them fires.
fn validate_create(req: CreateUserRequest) -> Result<ValidatedCreate, ApiError> {
    let mut missing = Vec::new();
    if req.email.as_deref().map_or(true, |s| s.trim().is_empty()) {
        missing.push("email");
    }
    if req.password.as_deref().map_or(true, |s| s.is_empty()) {
        missing.push("password");
    }
    if req
        .full_name
        .as_deref()
        .map_or(true, |s| s.trim().is_empty())
    {
        missing.push("fullName");
    }
    if req.role.as_deref().map_or(true, |s| s.is_empty()) {
        missing.push("role");
    }
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing.join(", ")));
    }

    // Presence established above
    let email = req.email.unwrap_or_default().trim().to_string();
    let password = req.password.unwrap_or_default();
    let full_name = req.full_name.unwrap_or_default().trim().to_string();
    let role_str = req.role.unwrap_or_default();

    if !email.validate_email() {
        return Err(ApiError::InvalidEmail);
    }

    validate_password_policy(&password).map_err(ApiError::WeakPassword)?;

    let role: ProfileRole = role_str
        .parse()
        .map_err(|_| ApiError::InvalidRole(role_str.clone()))?;

    // Auditors are tenant-agnostic; every other role needs a company
    let company_id = if role.requires_company() {
        match req.company_id {
            Some(id) => Some(id),
            None => return Err(ApiError::MissingFields("companyId".to_string())),
        }
    } else {
        None
    };

    Ok(ValidatedCreate {
        email,
        password,
        full_name,
        role,
        company_id,
        phone: req.phone.filter(|p| !p.trim().is_empty()),
    })
}

/// Loads the caller's profile for an authorization decision
///
/// A lookup failure is an infrastructure fault (`PROFILE_ERROR`), distinct
/// from the legitimate deny a missing profile produces.
async fn load_caller_profile(
    state: &AppState,
    caller: &CallerIdentity,
) -> Result<Profile, ApiError> {
    Profile::find_by_id(&state.db, caller.account_id)
        .await
        .map_err(|e| ApiError::ProfileLookup(e.to_string()))?
        .ok_or_else(|| ApiError::Forbidden("No profile for caller".to_string()))
}

/// Provision a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/admin/users
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {
///   "email": "ana@example.com",
///   "password": "secret1",
///   "fullName": "Ana Souza",
///   "role": "auditor"
/// }
/// ```
///
/// # Response
///
/// `201 Created`:
///
/// ```json
/// {
///   "success": true,
///   "user": { "id": "uuid", "email": "ana@example.com",
///             "fullName": "Ana Souza", "role": "auditor" },
///   "message": "User created successfully"
/// }
/// ```
///
/// # Errors
///
/// - `400`: `MISSING_FIELDS`, `INVALID_EMAIL`, `WEAK_PASSWORD`, `INVALID_ROLE`
/// - `401`: `NO_AUTH_TOKEN`, `INVALID_TOKEN`
/// - `403`: `FORBIDDEN` (caller is not a super-admin)
/// - `409`: `EMAIL_EXISTS`
/// - `500`: `PROFILE_ERROR`, `CREATE_USER_ERROR`, `CREATE_PROFILE_ERROR`
pub async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<CreateUserResponse>)> {
    let caller_profile = load_caller_profile(&state, &caller).await?;
    require_super_admin(&caller_profile)?;

    let validated = validate_create(req)?;

    let provisioner = Provisioner::new(state.db.clone(), state.directory.clone());
    let user = provisioner
        .create_user(NewUser {
            email: validated.email,
            password: validated.password,
            full_name: validated.full_name,
            role: validated.role,
            company_id: validated.company_id,
            phone: validated.phone,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            success: true,
            user: CreatedUser {
                id: user.id,
                email: user.email,
                full_name: user.full_name,
                role: user.role,
            },
            message: "User created successfully".to_string(),
        }),
    ))
}

/// Delete a user
///
/// # Endpoint
///
/// ```text
/// POST /v1/admin/users/delete
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// { "userId": "uuid" }
/// ```
///
/// # Errors
///
/// - `400`: `MISSING_FIELDS`, `CANNOT_DELETE_SELF`
/// - `401`: `NO_AUTH_TOKEN`, `INVALID_TOKEN`
/// - `403`: `FORBIDDEN` (including cross-tenant attempts by scoped
///   administrators)
/// - `404`: `USER_NOT_FOUND`
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(req): Json<DeleteUserRequest>,
) -> ApiResult<Json<DeleteUserResponse>> {
    let target_id = req
        .user_id
        .ok_or_else(|| ApiError::MissingFields("userId".to_string()))?;

    let caller_profile = load_caller_profile(&state, &caller).await?;

    let target_profile = Profile::find_by_id(&state.db, target_id)
        .await
        .map_err(|e| ApiError::ProfileLookup(e.to_string()))?;

    match &target_profile {
        Some(target) => require_delete_rights(&caller_profile, target)?,
        None => {
            // Orphaned account: only super-admins may revoke it, since a
            // scoped administrator's authority hinges on the target's
            // company and there is none to check.
            if !can_delete_orphan(&caller_profile) {
                return Err(ApiError::UserNotFound);
            }
        }
    }

    // Decided after the privilege gate, so an unauthorized caller naming
    // their own id still sees the same deny as any other target.
    if target_id == caller.account_id {
        return Err(ApiError::CannotDeleteSelf);
    }

    let provisioner = Provisioner::new(state.db.clone(), state.directory.clone());
    provisioner.delete_user(target_id).await?;

    Ok(Json(DeleteUserResponse {
        message: "User deleted successfully".to_string(),
    }))
}
