//! In-memory stores for tests/dev.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};

use stocktally_auth::Account;
use stocktally_core::{AccountId, ItemId};
use stocktally_inventory::{LiquorItem, MovementRecord, OtherStockItem, StockSnapshot};

use super::{AccountStore, ItemStore, SnapshotWrite, StockStore, StockTransaction, StoreError};

fn poisoned() -> StoreError {
    StoreError::Storage("in-memory store lock poisoned".to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Stock
// ─────────────────────────────────────────────────────────────────────────────

type DayKey = (NaiveDate, ItemId);

#[derive(Debug, Default)]
struct StockTables {
    snapshots: BTreeMap<DayKey, StockSnapshot>,
    movements: BTreeMap<DayKey, MovementRecord>,
}

/// In-memory stock store for tests and local development.
///
/// A transaction holds the table lock for its whole lifetime, so transactions
/// are serialized. Writes go to a per-transaction overlay that is merged into
/// the shared tables on commit; a dropped transaction leaves no trace.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockStore {
    tables: Arc<Mutex<StockTables>>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct InMemoryStockTx {
    guard: OwnedMutexGuard<StockTables>,
    pending: StockTables,
}

impl InMemoryStockTx {
    fn snapshot(&self, key: &DayKey) -> Option<&StockSnapshot> {
        self.pending
            .snapshots
            .get(key)
            .or_else(|| self.guard.snapshots.get(key))
    }

    fn movement(&self, key: &DayKey) -> Option<&MovementRecord> {
        self.pending
            .movements
            .get(key)
            .or_else(|| self.guard.movements.get(key))
    }
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    type Tx = InMemoryStockTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let guard = self.tables.clone().lock_owned().await;
        Ok(InMemoryStockTx {
            guard,
            pending: StockTables::default(),
        })
    }

    async fn list_snapshots_by_date(&self, date: NaiveDate) -> Result<Vec<StockSnapshot>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .snapshots
            .iter()
            .filter(|((d, _), _)| *d == date)
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn list_movements_by_date(&self, date: NaiveDate) -> Result<Vec<MovementRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .movements
            .iter()
            .filter(|((d, _), _)| *d == date)
            .map(|(_, m)| m.clone())
            .collect())
    }
}

#[async_trait]
impl StockTransaction for InMemoryStockTx {
    async fn find_snapshot(
        &mut self,
        item_id: ItemId,
        date: NaiveDate,
    ) -> Result<Option<StockSnapshot>, StoreError> {
        Ok(self.snapshot(&(date, item_id)).cloned())
    }

    async fn upsert_snapshot(&mut self, snapshot: &StockSnapshot) -> Result<SnapshotWrite, StoreError> {
        let key = (snapshot.date, snapshot.item_id);
        let (stored, inserted) = match self.snapshot(&key) {
            Some(existing) => {
                let mut stored = existing.clone();
                stored.overwrite(snapshot.amount, snapshot.updated_at);
                (stored, false)
            }
            None => (snapshot.clone(), true),
        };
        let id = stored.id;
        self.pending.snapshots.insert(key, stored);
        Ok(SnapshotWrite { id, inserted })
    }

    async fn find_movement(
        &mut self,
        item_id: ItemId,
        date: NaiveDate,
    ) -> Result<Option<MovementRecord>, StoreError> {
        Ok(self.movement(&(date, item_id)).cloned())
    }

    async fn upsert_movement(&mut self, movement: &MovementRecord) -> Result<(), StoreError> {
        let key = (movement.date, movement.item_id);
        let stored = match self.movement(&key) {
            Some(existing) => MovementRecord {
                id: existing.id,
                created_at: existing.created_at,
                ..movement.clone()
            },
            None => movement.clone(),
        };
        self.pending.movements.insert(key, stored);
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        let InMemoryStockTx { mut guard, pending } = self;
        guard.snapshots.extend(pending.snapshots);
        guard.movements.extend(pending.movements);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Items
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    liquor: RwLock<HashMap<ItemId, LiquorItem>>,
    other: RwLock<HashMap<ItemId, OtherStockItem>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn insert_new<V: Clone>(map: &RwLock<HashMap<ItemId, V>>, id: ItemId, value: &V) -> Result<(), StoreError> {
    let mut map = map.write().map_err(|_| poisoned())?;
    if map.contains_key(&id) {
        return Err(StoreError::Conflict(format!("item {id} already exists")));
    }
    map.insert(id, value.clone());
    Ok(())
}

fn replace_existing<V: Clone>(
    map: &RwLock<HashMap<ItemId, V>>,
    id: ItemId,
    value: &V,
) -> Result<(), StoreError> {
    let mut map = map.write().map_err(|_| poisoned())?;
    match map.get_mut(&id) {
        Some(slot) => {
            *slot = value.clone();
            Ok(())
        }
        None => Err(StoreError::NotFound),
    }
}

fn remove_existing<V>(map: &RwLock<HashMap<ItemId, V>>, id: ItemId) -> Result<(), StoreError> {
    let mut map = map.write().map_err(|_| poisoned())?;
    map.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn insert_liquor(&self, item: &LiquorItem) -> Result<(), StoreError> {
        insert_new(&self.liquor, item.id, item)
    }

    async fn update_liquor(&self, item: &LiquorItem) -> Result<(), StoreError> {
        replace_existing(&self.liquor, item.id, item)
    }

    async fn delete_liquor(&self, id: ItemId) -> Result<(), StoreError> {
        remove_existing(&self.liquor, id)
    }

    async fn get_liquor(&self, id: ItemId) -> Result<Option<LiquorItem>, StoreError> {
        let map = self.liquor.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn list_liquor(&self) -> Result<Vec<LiquorItem>, StoreError> {
        let map = self.liquor.read().map_err(|_| poisoned())?;
        let mut items: Vec<LiquorItem> = map.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn insert_other(&self, item: &OtherStockItem) -> Result<(), StoreError> {
        insert_new(&self.other, item.id, item)
    }

    async fn update_other(&self, item: &OtherStockItem) -> Result<(), StoreError> {
        replace_existing(&self.other, item.id, item)
    }

    async fn delete_other(&self, id: ItemId) -> Result<(), StoreError> {
        remove_existing(&self.other, id)
    }

    async fn get_other(&self, id: ItemId) -> Result<Option<OtherStockItem>, StoreError> {
        let map = self.other.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn list_other(&self) -> Result<Vec<OtherStockItem>, StoreError> {
        let map = self.other.read().map_err(|_| poisoned())?;
        let mut items: Vec<OtherStockItem> = map.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(items)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn ensure_email_free(map: &HashMap<AccountId, Account>, account: &Account) -> Result<(), StoreError> {
    if map
        .values()
        .any(|a| a.id != account.id && a.email == account.email)
    {
        return Err(StoreError::Conflict(format!(
            "email '{}' is already registered",
            account.email
        )));
    }
    Ok(())
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&account.id) {
            return Err(StoreError::Conflict(format!("account {} already exists", account.id)));
        }
        ensure_email_free(&map, account)?;
        map.insert(account.id, account.clone());
        Ok(())
    }

    async fn insert_first_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if !map.is_empty() {
            return Err(StoreError::Conflict("accounts already exist".to_string()));
        }
        map.insert(account.id, account.clone());
        Ok(())
    }

    async fn update_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if !map.contains_key(&account.id) {
            return Err(StoreError::NotFound);
        }
        ensure_email_free(&map, account)?;
        map.insert(account.id, account.clone());
        Ok(())
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut accounts: Vec<Account> = map.values().cloned().collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(accounts)
    }
}
