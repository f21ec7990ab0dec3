// Principals, roles and permission flags.
//
// Responsibilities
// - Carry the authenticated user as returned by the current-user endpoint.
// - Answer permission questions. Superusers hold every flag; other users hold
//   the flags of their role; users without a role hold none.

use crate::shared::core::primitives::UserId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleName {
    Admin,
    Senior,
    Sysadmin,
    Communications,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionFlag {
    ViewAllClients,
    CreateClient,
    EditClient,
    DeleteClient,
    ManageUsers,
    ManageRoles,
    ManageCustomFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub can_view_all_clients: bool,
    #[serde(default)]
    pub can_create_client: bool,
    #[serde(default)]
    pub can_edit_client: bool,
    #[serde(default)]
    pub can_delete_client: bool,
    #[serde(default)]
    pub can_manage_users: bool,
    #[serde(default)]
    pub can_manage_roles: bool,
    #[serde(default)]
    pub can_manage_custom_fields: bool,
}

impl Permissions {
    /// Flags a freshly provisioned role starts with.
    pub fn defaults_for(role: RoleName) -> Self {
        match role {
            RoleName::Admin => Self {
                can_view_all_clients: true,
                can_create_client: true,
                can_edit_client: true,
                can_delete_client: true,
                can_manage_users: true,
                can_manage_roles: true,
                can_manage_custom_fields: true,
            },
            RoleName::Senior | RoleName::Sysadmin | RoleName::Communications => Self {
                can_view_all_clients: true,
                can_create_client: true,
                can_edit_client: true,
                ..Self::default()
            },
        }
    }

    pub fn get(&self, flag: PermissionFlag) -> bool {
        match flag {
            PermissionFlag::ViewAllClients => self.can_view_all_clients,
            PermissionFlag::CreateClient => self.can_create_client,
            PermissionFlag::EditClient => self.can_edit_client,
            PermissionFlag::DeleteClient => self.can_delete_client,
            PermissionFlag::ManageUsers => self.can_manage_users,
            PermissionFlag::ManageRoles => self.can_manage_roles,
            PermissionFlag::ManageCustomFields => self.can_manage_custom_fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: RoleName,
    #[serde(flatten)]
    pub permissions: Permissions,
}

impl Role {
    pub fn provisioned(name: RoleName) -> Self {
        Self {
            name,
            permissions: Permissions::defaults_for(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default, rename = "role_data")]
    pub role: Option<Role>,
}

impl Principal {
    pub fn has_perm(&self, flag: PermissionFlag) -> bool {
        if self.is_superuser {
            return true;
        }
        self.role
            .as_ref()
            .is_some_and(|role| role.permissions.get(flag))
    }

    pub fn is_admin(&self) -> bool {
        self.is_superuser
            || self
                .role
                .as_ref()
                .is_some_and(|role| role.name == RoleName::Admin)
    }

    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }
}

#[cfg(test)]
mod access_tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn senior() -> Principal {
        Principal {
            id: UserId(3),
            email: "senior@example.net".into(),
            full_name: "Petrova Anna".into(),
            is_superuser: false,
            role: Some(Role::provisioned(RoleName::Senior)),
        }
    }

    #[rstest]
    fn it_should_use_role_flags_for_regular_users(senior: Principal) {
        assert!(senior.has_perm(PermissionFlag::EditClient));
        assert!(!senior.has_perm(PermissionFlag::DeleteClient));
        assert!(!senior.is_admin());
    }

    #[rstest]
    fn it_should_grant_everything_to_superusers(mut senior: Principal) {
        senior.is_superuser = true;
        assert!(senior.has_perm(PermissionFlag::DeleteClient));
        assert!(senior.has_perm(PermissionFlag::ManageRoles));
        assert!(senior.is_admin());
    }

    #[rstest]
    fn it_should_grant_nothing_without_a_role(mut senior: Principal) {
        senior.role = None;
        assert!(!senior.has_perm(PermissionFlag::ViewAllClients));
    }

    #[rstest]
    fn it_should_treat_the_admin_role_as_admin(mut senior: Principal) {
        senior.role = Some(Role::provisioned(RoleName::Admin));
        assert!(senior.is_admin());
        assert!(senior.has_perm(PermissionFlag::ManageUsers));
    }

    #[rstest]
    fn it_should_read_the_current_user_payload() {
        let json = r#"{
            "id": 1, "email": "admin@example.net", "full_name": "",
            "role_data": {"name": "admin", "can_edit_client": true, "can_delete_client": true}
        }"#;
        let principal: Principal = serde_json::from_str(json).unwrap();
        assert!(principal.is_admin());
        assert!(principal.has_perm(PermissionFlag::DeleteClient));
        assert!(!principal.has_perm(PermissionFlag::ManageRoles));
        assert_eq!(principal.display_name(), "admin@example.net");
    }
}
