/// Authentication and authorization utilities
///
/// This module provides the security primitives for the provisioning service:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and the account password policy
/// - [`token`]: Bearer-token (HS256) generation and validation
/// - [`authorization`]: Privilege checks for the provisioning workflows
///
/// # Example
///
/// ```no_run
/// use conforma_shared::auth::password::{hash_password, verify_password};
/// use conforma_shared::auth::token::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), "admin@example.com".to_string());
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod password;
pub mod token;
