//! Runtime-selected stock store.

use async_trait::async_trait;
use chrono::NaiveDate;

use stocktally_core::ItemId;
use stocktally_inventory::{MovementRecord, StockSnapshot};

use super::in_memory::InMemoryStockTx;
use super::postgres::PgStockTx;
use super::{
    InMemoryStockStore, PostgresStockStore, SnapshotWrite, StockStore, StockTransaction, StoreError,
};

/// Either stock store, chosen from configuration at startup.
#[derive(Debug, Clone)]
pub enum AnyStockStore {
    Memory(InMemoryStockStore),
    Postgres(PostgresStockStore),
}

pub enum AnyStockTx {
    Memory(InMemoryStockTx),
    Postgres(PgStockTx),
}

#[async_trait]
impl StockStore for AnyStockStore {
    type Tx = AnyStockTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        match self {
            AnyStockStore::Memory(s) => s.begin().await.map(AnyStockTx::Memory),
            AnyStockStore::Postgres(s) => s.begin().await.map(AnyStockTx::Postgres),
        }
    }

    async fn list_snapshots_by_date(&self, date: NaiveDate) -> Result<Vec<StockSnapshot>, StoreError> {
        match self {
            AnyStockStore::Memory(s) => s.list_snapshots_by_date(date).await,
            AnyStockStore::Postgres(s) => s.list_snapshots_by_date(date).await,
        }
    }

    async fn list_movements_by_date(&self, date: NaiveDate) -> Result<Vec<MovementRecord>, StoreError> {
        match self {
            AnyStockStore::Memory(s) => s.list_movements_by_date(date).await,
            AnyStockStore::Postgres(s) => s.list_movements_by_date(date).await,
        }
    }
}

#[async_trait]
impl StockTransaction for AnyStockTx {
    async fn find_snapshot(
        &mut self,
        item_id: ItemId,
        date: NaiveDate,
    ) -> Result<Option<StockSnapshot>, StoreError> {
        match self {
            AnyStockTx::Memory(tx) => tx.find_snapshot(item_id, date).await,
            AnyStockTx::Postgres(tx) => tx.find_snapshot(item_id, date).await,
        }
    }

    async fn upsert_snapshot(&mut self, snapshot: &StockSnapshot) -> Result<SnapshotWrite, StoreError> {
        match self {
            AnyStockTx::Memory(tx) => tx.upsert_snapshot(snapshot).await,
            AnyStockTx::Postgres(tx) => tx.upsert_snapshot(snapshot).await,
        }
    }

    async fn find_movement(
        &mut self,
        item_id: ItemId,
        date: NaiveDate,
    ) -> Result<Option<MovementRecord>, StoreError> {
        match self {
            AnyStockTx::Memory(tx) => tx.find_movement(item_id, date).await,
            AnyStockTx::Postgres(tx) => tx.find_movement(item_id, date).await,
        }
    }

    async fn upsert_movement(&mut self, movement: &MovementRecord) -> Result<(), StoreError> {
        match self {
            AnyStockTx::Memory(tx) => tx.upsert_movement(movement).await,
            AnyStockTx::Postgres(tx) => tx.upsert_movement(movement).await,
        }
    }

    async fn commit(self) -> Result<(), StoreError> {
        match self {
            AnyStockTx::Memory(tx) => tx.commit().await,
            AnyStockTx::Postgres(tx) => tx.commit().await,
        }
    }
}
