use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    ViewCatalog,
    RunEnrichment,
    ViewAuditLog,
}

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::ViewCatalog,
    Permission::RunEnrichment,
    Permission::ViewAuditLog,
];
const REGULAR_PERMISSIONS: &[Permission] = &[Permission::ViewCatalog];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    Regular,
}

impl UserRole {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            UserRole::Admin => ADMIN_PERMISSIONS,
            UserRole::Regular => REGULAR_PERMISSIONS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Regular => "Regular",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "regular" => Some(UserRole::Regular),
            _ => None,
        }
    }
}

/// Union of the permissions granted by `roles`, without duplicates.
pub fn resolve_permissions(roles: &[UserRole]) -> Vec<Permission> {
    let mut permissions: Vec<Permission> = Vec::new();
    for role in roles {
        for permission in role.permissions() {
            if !permissions.contains(permission) {
                permissions.push(*permission);
            }
        }
    }
    permissions
}
