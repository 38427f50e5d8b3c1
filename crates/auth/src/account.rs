//! User accounts.
//!
//! An account is the profile record for someone who can sign in: identity,
//! display name and a single role. Credentials are held by the identity
//! provider, never here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stocktally_core::{AccountId, DomainError};

use crate::{Capabilities, Permission, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Command: register an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub role: Role,
}

impl NewAccount {
    pub fn validate(&self) -> Result<(), DomainError> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("email must be a valid address"));
        }
        if self.display_name.trim().is_empty() {
            return Err(DomainError::validation("display_name cannot be empty"));
        }
        Ok(())
    }

    pub fn into_account(self, id: AccountId, now: DateTime<Utc>) -> Result<Account, DomainError> {
        self.validate()?;
        Ok(Account {
            id,
            email: self.email.trim().to_lowercase(),
            display_name: self.display_name.trim().to_string(),
            role: self.role,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Account {
    /// Change this account's role on behalf of `actor`.
    ///
    /// The actor needs `manage_users` and may not change their own role, so the
    /// last admin cannot lock everyone out by demoting themself.
    pub fn change_role(
        &mut self,
        role: Role,
        actor: &Capabilities,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !actor.allows(Permission::ManageUsers) {
            return Err(DomainError::Unauthorized);
        }
        if actor.account_id() == self.id {
            return Err(DomainError::conflict("cannot change your own role"));
        }
        if self.role != role {
            self.role = role;
            self.updated_at = now;
        }
        Ok(())
    }
}
