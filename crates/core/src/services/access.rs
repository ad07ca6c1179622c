//! Role and permission checks shared by the back-office services.

use stayhub_common::{AppError, AppResult};
use stayhub_db::entities::user::{self, Permissions, Role};

/// A back-office capability a sub-admin may be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ApproveUsers,
    DeleteUsers,
    ManageListings,
    ViewBookings,
}

impl Capability {
    const fn granted_by(self, perms: &Permissions) -> bool {
        match self {
            Self::ApproveUsers => perms.can_approve_users,
            Self::DeleteUsers => perms.can_delete_users,
            Self::ManageListings => perms.can_manage_listings,
            Self::ViewBookings => perms.can_view_bookings,
        }
    }
}

/// Fail with `Forbidden` unless `actor` is an admin.
pub fn require_admin(actor: &user::Model) -> AppResult<()> {
    if actor.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}

/// Whether `actor` is an admin, or a sub-admin holding `capability`.
#[must_use]
pub fn has_capability(actor: &user::Model, capability: Capability) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::SubAdmin => capability.granted_by(&actor.sub_admin_permissions()),
        Role::Guest | Role::Host => false,
    }
}

/// Fail with `Forbidden` unless `actor` has `capability`.
pub fn require_capability(actor: &user::Model, capability: Capability) -> AppResult<()> {
    if has_capability(actor, capability) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Missing permission: {capability:?}"
        )))
    }
}

/// Fail with `Forbidden` unless `actor` is a host or an admin.
pub fn require_host(actor: &user::Model) -> AppResult<()> {
    if matches!(actor.role, Role::Host | Role::Admin) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Host access required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::user_with_role;

    #[test]
    fn test_admin_has_every_capability() {
        let admin = user_with_role("a", Role::Admin);
        assert!(has_capability(&admin, Capability::DeleteUsers));
        assert!(has_capability(&admin, Capability::ViewBookings));
    }

    #[test]
    fn test_sub_admin_needs_flag() {
        let mut sub = user_with_role("s", Role::SubAdmin);
        assert!(!has_capability(&sub, Capability::ApproveUsers));

        sub.permissions = Some(Permissions {
            can_approve_users: true,
            ..Default::default()
        });
        assert!(has_capability(&sub, Capability::ApproveUsers));
        assert!(!has_capability(&sub, Capability::DeleteUsers));
    }

    #[test]
    fn test_host_is_never_staff() {
        let mut host = user_with_role("h", Role::Host);
        // Stray permissions on a non-sub-admin are ignored
        host.permissions = Some(Permissions {
            can_manage_listings: true,
            ..Default::default()
        });
        assert!(require_capability(&host, Capability::ManageListings).is_err());
        assert!(require_admin(&host).is_err());
        assert!(require_host(&host).is_ok());
    }
}
