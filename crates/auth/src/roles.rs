use serde::{Deserialize, Serialize};

use stocktally_core::DomainError;

use crate::Permission;

/// Role used for RBAC. Closed set; each role maps to a fixed allow-list.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    #[default]
    Staff,
}

const ADMIN: &[Permission] = &[
    Permission::ViewInventory,
    Permission::AddInventory,
    Permission::EditInventory,
    Permission::DeleteInventory,
    Permission::ViewSales,
    Permission::ManageUsers,
    Permission::ViewReports,
    Permission::ExportData,
    Permission::ViewSettings,
    Permission::EditSettings,
];

const MANAGER: &[Permission] = &[
    Permission::ViewInventory,
    Permission::AddInventory,
    Permission::EditInventory,
    Permission::ViewSales,
    Permission::ViewReports,
    Permission::ExportData,
];

const STAFF: &[Permission] = &[Permission::ViewInventory, Permission::AddInventory];

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Staff];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
        }
    }

    /// The role's fixed allow-list.
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Admin => ADMIN,
            Role::Manager => MANAGER,
            Role::Staff => STAFF,
        }
    }

    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Admin => "Full access including user management and settings",
            Role::Manager => "Inventory management, sales and reports",
            Role::Staff => "View inventory and record stock",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "staff" => Ok(Role::Staff),
            other => Err(DomainError::validation(format!(
                "role must be one of: admin, manager, staff (got '{other}')"
            ))),
        }
    }
}
