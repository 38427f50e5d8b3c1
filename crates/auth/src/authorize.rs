use serde::Serialize;
use thiserror::Error;

use stocktally_core::AccountId;

use crate::{Account, Permission, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(Permission),
}

/// Explicit capability object for one request.
///
/// Built once from the stored account a verified token names and handed to
/// every handler, which must call [`Capabilities::require`] before acting.
/// There is no ambient "current user".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    account_id: AccountId,
    role: Role,
}

impl Capabilities {
    pub fn new(account_id: AccountId, role: Role) -> Self {
        Self { account_id, role }
    }

    /// Capabilities of a stored account. The stored role is authoritative;
    /// the role a token claims is not consulted.
    pub fn for_account(account: &Account) -> Self {
        Self::new(account.id, account.role)
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn permissions(&self) -> &'static [Permission] {
        self.role.permissions()
    }

    pub fn allows(&self, permission: Permission) -> bool {
        self.role.grants(permission)
    }

    /// Pure policy check: no IO, no panics.
    pub fn require(&self, permission: Permission) -> Result<(), AuthzError> {
        if self.allows(permission) {
            Ok(())
        } else {
            tracing::debug!(
                account_id = %self.account_id,
                role = %self.role,
                permission = %permission,
                "permission denied"
            );
            Err(AuthzError::Forbidden(permission))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_forbidden_from_sales() {
        let caps = Capabilities::new(AccountId::new(), Role::Staff);
        assert!(caps.require(Permission::ViewInventory).is_ok());
        assert_eq!(
            caps.require(Permission::ViewSales),
            Err(AuthzError::Forbidden(Permission::ViewSales))
        );
    }

    #[test]
    fn account_role_decides_permissions() {
        let now = chrono::Utc::now();
        let account = Account {
            id: AccountId::new(),
            email: "bar@example.com".to_string(),
            display_name: "Bar".to_string(),
            role: Role::Staff,
            created_at: now,
            updated_at: now,
        };
        let caps = Capabilities::for_account(&account);
        assert_eq!(caps.account_id(), account.id);
        assert!(!caps.allows(Permission::ViewSales));
    }

    #[test]
    fn error_names_the_missing_permission() {
        let caps = Capabilities::new(AccountId::new(), Role::Manager);
        let err = caps.require(Permission::ManageUsers).unwrap_err();
        assert_eq!(err.to_string(), "forbidden: missing permission 'manage_users'");
    }
}
