// Signed-in users for tests.

use crate::shared::core::access::{Principal, Role, RoleName};
use crate::shared::core::primitives::UserId;

pub fn principal_with_role(id: u64, role: RoleName) -> Principal {
    Principal {
        id: UserId(id),
        email: format!("user{id}@isp.test"),
        full_name: format!("User {id}"),
        is_superuser: false,
        role: Some(Role::provisioned(role)),
    }
}

pub fn admin() -> Principal {
    principal_with_role(1, RoleName::Admin)
}

pub fn communications() -> Principal {
    principal_with_role(4, RoleName::Communications)
}
