/// Authorization rules for the provisioning workflows
///
/// Provisioning uses two privilege checks:
///
/// 1. **Creation**: only global super-admins may create accounts, regardless
///    of tenant.
/// 2. **Deletion**: a global super-admin may delete any account; a company
///    administrator may delete accounts of their own company only.
///
/// All predicates take the caller's profile as an explicit argument. The
/// caller identity is resolved once by the request middleware and passed
/// down; nothing here reads ambient state or touches the database, which
/// keeps every decision unit-testable in isolation. An infrastructure
/// failure while *loading* a profile is a different condition entirely and
/// is surfaced at the lookup site, never conflated with a deny.
///
/// # Example
///
/// ```
/// use conforma_shared::auth::authorization::require_super_admin;
/// use conforma_shared::models::profile::{Profile, ProfileRole};
/// # fn example(caller: &Profile) {
/// if require_super_admin(caller).is_ok() {
///     // proceed with creation
/// }
/// # }
/// ```

use uuid::Uuid;

use crate::models::profile::{Profile, ProfileRole};

/// Error type for authorization checks
///
/// Every variant is a correct security decision (HTTP 403 material), not an
/// infrastructure fault.
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller lacks the global super-admin flag
    #[error("Caller is not a super-admin")]
    NotSuperAdmin,

    /// Caller is neither a super-admin nor a company administrator
    #[error("Caller cannot manage users")]
    CannotManageUsers,

    /// Caller administers a different company than the target belongs to
    #[error("Target belongs to a different company")]
    CompanyMismatch {
        caller_company: Uuid,
        target_company: Option<Uuid>,
    },

    /// Caller's profile is inactive
    #[error("Caller profile is inactive")]
    Inactive,
}

/// Asserts the caller may provision new accounts
///
/// Creation is cross-tenant by nature (the company of the new user is chosen
/// in the request), so it requires the global super-admin flag. An inactive
/// profile is rejected even if flagged.
///
/// # Errors
///
/// - `AuthzError::Inactive` if the caller profile is deactivated
/// - `AuthzError::NotSuperAdmin` otherwise when the flag is missing
pub fn require_super_admin(caller: &Profile) -> Result<(), AuthzError> {
    if !caller.active {
        return Err(AuthzError::Inactive);
    }

    if !caller.is_super_admin {
        return Err(AuthzError::NotSuperAdmin);
    }

    Ok(())
}

/// Asserts the caller may delete the target account
///
/// Allowed when either:
/// - the caller is an active super-admin, or
/// - the caller is an active company administrator and the target profile
///   belongs to the same company.
///
/// A scoped administrator can never delete across tenants, and cannot delete
/// a target with no company affiliation (there is nothing to match against).
///
/// # Errors
///
/// - `AuthzError::Inactive` if the caller profile is deactivated
/// - `AuthzError::CannotManageUsers` if the caller is neither super-admin
///   nor a company administrator
/// - `AuthzError::CompanyMismatch` on a cross-tenant attempt
pub fn require_delete_rights(caller: &Profile, target: &Profile) -> Result<(), AuthzError> {
    if !caller.active {
        return Err(AuthzError::Inactive);
    }

    if caller.is_super_admin {
        return Ok(());
    }

    let caller_company = match (caller.role, caller.company_id) {
        (ProfileRole::Administrator, Some(company_id)) => company_id,
        _ => return Err(AuthzError::CannotManageUsers),
    };

    if target.company_id != Some(caller_company) {
        return Err(AuthzError::CompanyMismatch {
            caller_company,
            target_company: target.company_id,
        });
    }

    Ok(())
}

/// Whether the caller may delete orphaned accounts (accounts with no
/// profile row)
///
/// Only super-admins qualify: a scoped administrator's authority is defined
/// by the target's company, which an orphan doesn't have.
pub fn can_delete_orphan(caller: &Profile) -> bool {
    caller.active && caller.is_super_admin
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(role: ProfileRole, company_id: Option<Uuid>, is_super_admin: bool) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            full_name: "Test User".to_string(),
            role,
            company_id,
            phone: None,
            is_super_admin,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_super_admin_may_create() {
        let caller = profile(ProfileRole::Administrator, Some(Uuid::new_v4()), true);
        assert!(require_super_admin(&caller).is_ok());
    }

    #[test]
    fn test_plain_administrator_may_not_create() {
        let caller = profile(ProfileRole::Administrator, Some(Uuid::new_v4()), false);
        assert!(matches!(
            require_super_admin(&caller),
            Err(AuthzError::NotSuperAdmin)
        ));
    }

    #[test]
    fn test_inactive_super_admin_rejected() {
        let mut caller = profile(ProfileRole::Administrator, None, true);
        caller.active = false;
        assert!(matches!(
            require_super_admin(&caller),
            Err(AuthzError::Inactive)
        ));
    }

    #[test]
    fn test_super_admin_may_delete_anyone() {
        let caller = profile(ProfileRole::Auditor, None, true);
        let target = profile(ProfileRole::Operator, Some(Uuid::new_v4()), false);
        assert!(require_delete_rights(&caller, &target).is_ok());
    }

    #[test]
    fn test_company_admin_may_delete_same_company() {
        let company = Uuid::new_v4();
        let caller = profile(ProfileRole::Administrator, Some(company), false);
        let target = profile(ProfileRole::Viewer, Some(company), false);
        assert!(require_delete_rights(&caller, &target).is_ok());
    }

    #[test]
    fn test_company_admin_may_not_delete_cross_tenant() {
        let caller = profile(ProfileRole::Administrator, Some(Uuid::new_v4()), false);
        let target = profile(ProfileRole::Viewer, Some(Uuid::new_v4()), false);
        assert!(matches!(
            require_delete_rights(&caller, &target),
            Err(AuthzError::CompanyMismatch { .. })
        ));
    }

    #[test]
    fn test_company_admin_may_not_delete_auditor() {
        // Auditors have no company; a scoped administrator has no authority
        let caller = profile(ProfileRole::Administrator, Some(Uuid::new_v4()), false);
        let target = profile(ProfileRole::Auditor, None, false);
        assert!(require_delete_rights(&caller, &target).is_err());
    }

    #[test]
    fn test_administrator_without_company_may_not_delete() {
        let caller = profile(ProfileRole::Administrator, None, false);
        let target = profile(ProfileRole::Viewer, Some(Uuid::new_v4()), false);
        assert!(matches!(
            require_delete_rights(&caller, &target),
            Err(AuthzError::CannotManageUsers)
        ));
    }

    #[test]
    fn test_non_admin_roles_may_not_delete() {
        let company = Uuid::new_v4();
        for role in [ProfileRole::Auditor, ProfileRole::Operator, ProfileRole::Viewer] {
            let caller = profile(role, Some(company), false);
            let target = profile(ProfileRole::Viewer, Some(company), false);
            assert!(
                require_delete_rights(&caller, &target).is_err(),
                "role {} must not delete",
                role
            );
        }
    }

    #[test]
    fn test_orphan_deletion_is_super_admin_only() {
        let super_admin = profile(ProfileRole::Administrator, None, true);
        let scoped = profile(ProfileRole::Administrator, Some(Uuid::new_v4()), false);

        assert!(can_delete_orphan(&super_admin));
        assert!(!can_delete_orphan(&scoped));
    }
}
