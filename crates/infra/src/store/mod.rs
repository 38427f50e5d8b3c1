//! Record store abstractions.
//!
//! Stock snapshots and movements are written through a [`StockTransaction`] so
//! that the snapshot upsert and the movement derivation it triggers commit (or
//! fail) together. Items and accounts are plain keyed records.

pub mod any;
pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use stocktally_auth::Account;
use stocktally_core::{AccountId, ItemId, SnapshotId};
use stocktally_inventory::{LiquorItem, MovementRecord, OtherStockItem, StockSnapshot};

pub use any::{AnyStockStore, AnyStockTx};
pub use in_memory::{InMemoryAccountStore, InMemoryItemStore, InMemoryStockStore, InMemoryStockTx};
pub use postgres::{
    PgStockTx, PostgresAccountStore, PostgresItemStore, PostgresStockStore, connect, ensure_schema,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// A uniqueness rule rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store was unreachable or rejected the operation.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Outcome of a conditional snapshot write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SnapshotWrite {
    /// Id of the stored snapshot (the existing one when it was overwritten).
    pub id: SnapshotId,
    /// `true` when no snapshot existed for `(date, item_id)` before this write.
    pub inserted: bool,
}

/// Daily stock storage.
#[async_trait]
pub trait StockStore: Send + Sync {
    type Tx: StockTransaction;

    /// Start a unit of work. Dropping the transaction without committing
    /// discards every write made through it.
    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    async fn list_snapshots_by_date(&self, date: NaiveDate) -> Result<Vec<StockSnapshot>, StoreError>;

    async fn list_movements_by_date(&self, date: NaiveDate) -> Result<Vec<MovementRecord>, StoreError>;
}

/// Reads and writes inside one stock transaction.
#[async_trait]
pub trait StockTransaction: Send {
    async fn find_snapshot(
        &mut self,
        item_id: ItemId,
        date: NaiveDate,
    ) -> Result<Option<StockSnapshot>, StoreError>;

    /// Insert `snapshot`, or overwrite the amount of the snapshot already stored
    /// for `(snapshot.date, snapshot.item_id)`, keeping its id and `created_at`.
    async fn upsert_snapshot(&mut self, snapshot: &StockSnapshot) -> Result<SnapshotWrite, StoreError>;

    async fn find_movement(
        &mut self,
        item_id: ItemId,
        date: NaiveDate,
    ) -> Result<Option<MovementRecord>, StoreError>;

    /// Insert `movement`, or overwrite the one keyed by `(date, item_id)`.
    async fn upsert_movement(&mut self, movement: &MovementRecord) -> Result<(), StoreError>;

    async fn commit(self) -> Result<(), StoreError>;
}

/// Liquor and other-stock item storage.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn insert_liquor(&self, item: &LiquorItem) -> Result<(), StoreError>;
    /// Fails with [`StoreError::NotFound`] when the item does not exist.
    async fn update_liquor(&self, item: &LiquorItem) -> Result<(), StoreError>;
    async fn delete_liquor(&self, id: ItemId) -> Result<(), StoreError>;
    async fn get_liquor(&self, id: ItemId) -> Result<Option<LiquorItem>, StoreError>;
    /// All liquor items ordered by name.
    async fn list_liquor(&self) -> Result<Vec<LiquorItem>, StoreError>;

    async fn insert_other(&self, item: &OtherStockItem) -> Result<(), StoreError>;
    async fn update_other(&self, item: &OtherStockItem) -> Result<(), StoreError>;
    async fn delete_other(&self, id: ItemId) -> Result<(), StoreError>;
    async fn get_other(&self, id: ItemId) -> Result<Option<OtherStockItem>, StoreError>;
    /// All other-stock items ordered by name.
    async fn list_other(&self) -> Result<Vec<OtherStockItem>, StoreError>;
}

/// Account storage.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the email is taken.
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError>;
    /// Insert only if no account exists at all; [`StoreError::Conflict`] otherwise.
    async fn insert_first_account(&self, account: &Account) -> Result<(), StoreError>;
    async fn update_account(&self, account: &Account) -> Result<(), StoreError>;
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;
    /// All accounts ordered by creation time.
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;
}
