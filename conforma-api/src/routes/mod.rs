/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Credential login
/// - `admin_users`: Privileged user provisioning and deletion

pub mod admin_users;
pub mod auth;
pub mod health;
