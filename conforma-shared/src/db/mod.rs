/// Database utilities
///
/// # Modules
///
/// - [`pool`]: PostgreSQL connection pool creation and the round-trip probe
/// - [`migrations`]: Schema migration runner

pub mod migrations;
pub mod pool;
