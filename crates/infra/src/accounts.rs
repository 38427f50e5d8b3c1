//! Account registry.
//!
//! Accounts carry the role that the identity provider puts into tokens. The
//! very first account is created through [`AccountDirectory::bootstrap_admin`];
//! every later one needs an actor holding `manage_users`.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use stocktally_auth::{Account, Capabilities, NewAccount, Permission, Role};
use stocktally_core::{AccountId, DomainError};

use crate::error::{ServiceError, ServiceResult};
use crate::store::{AccountStore, StoreError};

#[derive(Clone)]
pub struct AccountDirectory {
    store: Arc<dyn AccountStore>,
}

impl AccountDirectory {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Create the first account as an admin. Fails with a conflict once any
    /// account exists.
    #[instrument(skip(self, cmd), err)]
    pub async fn bootstrap_admin(&self, cmd: NewAccount) -> ServiceResult<Account> {
        let cmd = NewAccount {
            role: Role::Admin,
            ..cmd
        };
        let account = cmd.into_account(AccountId::new(), Utc::now())?;

        match self.store.insert_first_account(&account).await {
            Ok(()) => {
                info!(account_id = %account.id, "first admin account created");
                Ok(account)
            }
            Err(StoreError::Conflict(_)) => {
                warn!("setup attempted after accounts already exist");
                Err(DomainError::conflict("setup has already been completed").into())
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, actor, cmd), fields(actor = %actor.account_id()), err)]
    pub async fn register(&self, actor: &Capabilities, cmd: NewAccount) -> ServiceResult<Account> {
        actor.require(Permission::ManageUsers)?;
        let account = cmd.into_account(AccountId::new(), Utc::now())?;
        self.store
            .insert_account(&account)
            .await
            .map_err(conflict_as_domain)?;
        info!(account_id = %account.id, role = %account.role, "account registered");
        Ok(account)
    }

    /// Resolve the account a verified token refers to.
    ///
    /// No permission check: the result is what the caller's capabilities are
    /// built from.
    pub async fn find(&self, id: AccountId) -> ServiceResult<Option<Account>> {
        Ok(self.store.get_account(id).await?)
    }

    pub async fn list(&self, actor: &Capabilities) -> ServiceResult<Vec<Account>> {
        actor.require(Permission::ManageUsers)?;
        Ok(self.store.list_accounts().await?)
    }

    pub async fn get(&self, actor: &Capabilities, id: AccountId) -> ServiceResult<Account> {
        actor.require(Permission::ManageUsers)?;
        self.store
            .get_account(id)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }

    #[instrument(skip(self, actor), fields(actor = %actor.account_id()), err)]
    pub async fn change_role(
        &self,
        actor: &Capabilities,
        id: AccountId,
        role: Role,
    ) -> ServiceResult<Account> {
        actor.require(Permission::ManageUsers)?;
        let mut account = self.get(actor, id).await?;
        let before = account.role;
        account.change_role(role, actor, Utc::now())?;

        if account.role != before {
            self.store.update_account(&account).await.map_err(|e| match e {
                StoreError::NotFound => ServiceError::from(DomainError::not_found()),
                other => other.into(),
            })?;
            info!(account_id = %id, from = %before, to = %role, "role changed");
        }
        Ok(account)
    }
}

fn conflict_as_domain(err: StoreError) -> ServiceError {
    match err {
        StoreError::Conflict(msg) => DomainError::conflict(msg).into(),
        other => other.into(),
    }
}
