/// Database models for Conforma
///
/// This module contains the application-level models and their database
/// operations. Account records live in the identity subsystem
/// (`crate::identity`), not here; a Profile is the application-side record
/// keyed 1:1 to an account.
///
/// # Models
///
/// - `profile`: Application profiles with role and tenant affiliation
/// - `company`: Tenants (the multi-tenancy boundary)
/// - `compensation`: Append-only audit log for compensating deletes

pub mod company;
pub mod compensation;
pub mod profile;
