//! User entity.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum Role {
    #[sea_orm(string_value = "guest")]
    #[default]
    Guest,
    #[sea_orm(string_value = "host")]
    Host,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "sub-admin")]
    SubAdmin,
}

impl Role {
    /// Whether this role belongs to the back office (admin or sub-admin).
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::SubAdmin)
    }

    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Host => "host",
            Self::Admin => "admin",
            Self::SubAdmin => "sub-admin",
        }
    }
}

/// Named capabilities granted to a sub-admin.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult,
)]
#[serde(rename_all = "camelCase", default)]
pub struct Permissions {
    pub can_approve_users: bool,
    pub can_delete_users: bool,
    pub can_manage_listings: bool,
    pub can_view_bookings: bool,
    pub can_manage_settings: bool,
    /// Never granted to sub-admins.
    pub can_access_maintenance: bool,
    /// Never granted to sub-admins.
    pub can_permanent_delete: bool,
}

impl Permissions {
    /// Clear the capabilities a sub-admin can never hold.
    #[must_use]
    pub const fn pinned_for_sub_admin(mut self) -> Self {
        self.can_access_maintenance = false;
        self.can_permanent_delete = false;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Login email, stored lowercased
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub name: String,

    #[sea_orm(nullable)]
    pub phone: Option<String>,

    pub role: Role,

    #[sea_orm(default_value = true)]
    pub is_approved: bool,

    /// Sub-admin capabilities (None for every other role)
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub permissions: Option<Permissions>,

    /// Bearer token
    #[sea_orm(unique, nullable)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Effective sub-admin permissions (all false for other roles).
    #[must_use]
    pub fn sub_admin_permissions(&self) -> Permissions {
        if self.role == Role::SubAdmin {
            self.permissions.unwrap_or_default().pinned_for_sub_admin()
        } else {
            Permissions::default()
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_permissions_cleared() {
        let requested = Permissions {
            can_approve_users: true,
            can_access_maintenance: true,
            can_permanent_delete: true,
            ..Default::default()
        };

        let pinned = requested.pinned_for_sub_admin();
        assert!(pinned.can_approve_users);
        assert!(!pinned.can_access_maintenance);
        assert!(!pinned.can_permanent_delete);
    }

    #[test]
    fn test_role_is_staff() {
        assert!(Role::Admin.is_staff());
        assert!(Role::SubAdmin.is_staff());
        assert!(!Role::Host.is_staff());
        assert!(!Role::Guest.is_staff());
    }

    #[test]
    fn test_role_serde_names() {
        let json = serde_json::to_string(&Role::SubAdmin).unwrap_or_default();
        assert_eq!(json, "\"sub-admin\"");
        let role: Role = serde_json::from_str("\"host\"").unwrap_or_default();
        assert_eq!(role, Role::Host);
    }

    #[test]
    fn test_permissions_missing_fields_default_false() {
        let perms: Permissions =
            serde_json::from_str(r#"{"canDeleteUsers": true}"#).unwrap_or_default();
        assert!(perms.can_delete_users);
        assert!(!perms.can_view_bookings);
    }
}
