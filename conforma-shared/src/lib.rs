//! # Conforma Shared Library
//!
//! This crate contains the identity subsystem, models, and business logic
//! shared by the Conforma provisioning API.
//!
//! ## Module Organization
//!
//! - `models`: Database models (profiles, companies, compensation log)
//! - `auth`: Token validation, password hashing, authorization rules
//! - `identity`: Identity-store abstraction (accounts directory)
//! - `provisioning`: Account/profile creation and deletion workflows
//! - `db`: Database pool management

pub mod auth;
pub mod db;
pub mod identity;
pub mod models;
pub mod provisioning;

/// Current version of the Conforma shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
