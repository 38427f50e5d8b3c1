use serde::{Deserialize, Serialize};

use stocktally_core::DomainError;

/// Permission identifier.
///
/// The set is closed: permissions are granted only through a role's fixed
/// allow-list, never assigned individually.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewInventory,
    AddInventory,
    EditInventory,
    DeleteInventory,
    ViewSales,
    ManageUsers,
    ViewReports,
    ExportData,
    ViewSettings,
    EditSettings,
}

impl Permission {
    pub const ALL: [Permission; 10] = [
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

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewInventory => "view_inventory",
            Permission::AddInventory => "add_inventory",
            Permission::EditInventory => "edit_inventory",
            Permission::DeleteInventory => "delete_inventory",
            Permission::ViewSales => "view_sales",
            Permission::ManageUsers => "manage_users",
            Permission::ViewReports => "view_reports",
            Permission::ExportData => "export_data",
            Permission::ViewSettings => "view_settings",
            Permission::EditSettings => "edit_settings",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Permission {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown permission '{s}'")))
    }
}
