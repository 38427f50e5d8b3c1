//! Postgres-backed stores.
//!
//! All three stores share one [`PgPool`]. The schema is created with
//! [`ensure_schema`] on startup; every statement in it is idempotent.
//!
//! ## Snapshot upsert
//!
//! `(stock_date, item_id)` is unique in `stock_snapshots`, so the conditional
//! write is a single `INSERT .. ON CONFLICT DO UPDATE`. `xmax = 0` in the
//! `RETURNING` clause tells an inserted row apart from an updated one, which is
//! what decides whether the caller derives a movement.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::{Span, field, instrument};

use stocktally_auth::{Account, Role};
use stocktally_core::{AccountId, ItemId, MovementId, SnapshotId};
use stocktally_inventory::{
    BottleAmount, ItemType, LiquorItem, MovementRecord, OtherStockItem, StockAmount, StockSnapshot,
};

use super::{AccountStore, ItemStore, SnapshotWrite, StockStore, StockTransaction, StoreError};

const SCHEMA: &str = include_str!("schema.sql");

/// Open a connection pool.
#[instrument(skip(database_url), err)]
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Create tables and indexes if they do not exist yet.
#[instrument(skip(pool), err)]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Stock
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PostgresStockStore {
    pool: Arc<PgPool>,
}

impl PostgresStockStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

/// One open database transaction. Dropping it rolls back.
pub struct PgStockTx {
    tx: Transaction<'static, Postgres>,
}

const SNAPSHOT_COLUMNS: &str = "id, stock_date, item_id, item_type, bottles, milliliters, total_ml, quantity, created_at, updated_at";
const MOVEMENT_COLUMNS: &str = "id, stock_date, item_id, item_type, previous_stock, current_stock, difference, created_at, updated_at";

#[async_trait]
impl StockStore for PostgresStockStore {
    type Tx = PgStockTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        Ok(PgStockTx { tx })
    }

    #[instrument(skip(self), fields(%date, operation = field::Empty, count = field::Empty), err)]
    async fn list_snapshots_by_date(&self, date: NaiveDate) -> Result<Vec<StockSnapshot>, StoreError> {
        let span = Span::current();
        span.record("operation", "list_snapshots_by_date");

        let rows = sqlx::query(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM stock_snapshots WHERE stock_date = $1 ORDER BY item_id"
        ))
        .bind(date)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_snapshots_by_date", e))?;

        let snapshots = rows
            .iter()
            .map(|row| StockSnapshot::try_from(decode::<SnapshotRow>(row)?))
            .collect::<Result<Vec<StockSnapshot>, StoreError>>()?;

        span.record("count", snapshots.len());
        Ok(snapshots)
    }

    #[instrument(skip(self), fields(%date, operation = field::Empty, count = field::Empty), err)]
    async fn list_movements_by_date(&self, date: NaiveDate) -> Result<Vec<MovementRecord>, StoreError> {
        let span = Span::current();
        span.record("operation", "list_movements_by_date");

        let rows = sqlx::query(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE stock_date = $1 ORDER BY item_id"
        ))
        .bind(date)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_movements_by_date", e))?;

        let movements = rows
            .iter()
            .map(|row| MovementRecord::try_from(decode::<MovementRow>(row)?))
            .collect::<Result<Vec<MovementRecord>, StoreError>>()?;

        span.record("count", movements.len());
        Ok(movements)
    }
}

#[async_trait]
impl StockTransaction for PgStockTx {
    async fn find_snapshot(
        &mut self,
        item_id: ItemId,
        date: NaiveDate,
    ) -> Result<Option<StockSnapshot>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM stock_snapshots WHERE stock_date = $1 AND item_id = $2"
        ))
        .bind(date)
        .bind(item_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_snapshot", e))?;

        row.map(|row| StockSnapshot::try_from(decode::<SnapshotRow>(&row)?))
            .transpose()
    }

    #[instrument(
        skip(self, snapshot),
        fields(item_id = %snapshot.item_id, date = %snapshot.date, inserted = field::Empty),
        err
    )]
    async fn upsert_snapshot(&mut self, snapshot: &StockSnapshot) -> Result<SnapshotWrite, StoreError> {
        let columns = SnapshotColumns::from(&snapshot.amount);

        let row = sqlx::query(
            r#"
            INSERT INTO stock_snapshots (
                id, stock_date, item_id, item_type,
                bottles, milliliters, total_ml, quantity,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (stock_date, item_id)
            DO UPDATE SET
                item_type = EXCLUDED.item_type,
                bottles = EXCLUDED.bottles,
                milliliters = EXCLUDED.milliliters,
                total_ml = EXCLUDED.total_ml,
                quantity = EXCLUDED.quantity,
                updated_at = EXCLUDED.updated_at
            RETURNING id, (xmax = 0) AS inserted
            "#,
        )
        .bind(snapshot.id.as_uuid())
        .bind(snapshot.date)
        .bind(snapshot.item_id.as_uuid())
        .bind(snapshot.item_type().as_str())
        .bind(columns.bottles)
        .bind(columns.milliliters)
        .bind(columns.total_ml)
        .bind(columns.quantity)
        .bind(snapshot.created_at)
        .bind(snapshot.updated_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_snapshot", e))?;

        let id: uuid::Uuid = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("upsert_snapshot", e))?;
        let inserted: bool = row
            .try_get("inserted")
            .map_err(|e| map_sqlx_error("upsert_snapshot", e))?;

        Span::current().record("inserted", inserted);
        Ok(SnapshotWrite {
            id: SnapshotId::from_uuid(id),
            inserted,
        })
    }

    async fn find_movement(
        &mut self,
        item_id: ItemId,
        date: NaiveDate,
    ) -> Result<Option<MovementRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE stock_date = $1 AND item_id = $2"
        ))
        .bind(date)
        .bind(item_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_movement", e))?;

        row.map(|row| MovementRecord::try_from(decode::<MovementRow>(&row)?))
            .transpose()
    }

    #[instrument(
        skip(self, movement),
        fields(item_id = %movement.item_id, date = %movement.date),
        err
    )]
    async fn upsert_movement(&mut self, movement: &MovementRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, stock_date, item_id, item_type,
                previous_stock, current_stock, difference,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (stock_date, item_id)
            DO UPDATE SET
                item_type = EXCLUDED.item_type,
                previous_stock = EXCLUDED.previous_stock,
                current_stock = EXCLUDED.current_stock,
                difference = EXCLUDED.difference,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(movement.id.as_uuid())
        .bind(movement.date)
        .bind(movement.item_id.as_uuid())
        .bind(movement.item_type.as_str())
        .bind(amount_to_json(&movement.previous_stock)?)
        .bind(amount_to_json(&movement.current_stock)?)
        .bind(amount_to_json(&movement.difference)?)
        .bind(movement.created_at)
        .bind(movement.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_movement", e))?;

        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Items
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PostgresItemStore {
    pool: Arc<PgPool>,
}

impl PostgresItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl ItemStore for PostgresItemStore {
    #[instrument(skip(self, item), fields(item_id = %item.id), err)]
    async fn insert_liquor(&self, item: &LiquorItem) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO liquor_items (
                id, name, brand, category, bottles, milliliters, total_ml,
                threshold, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(&item.brand)
        .bind(&item.category)
        .bind(item.bottles)
        .bind(item.milliliters)
        .bind(item.total_ml)
        .bind(item.threshold)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_liquor", e))?;
        Ok(())
    }

    #[instrument(skip(self, item), fields(item_id = %item.id), err)]
    async fn update_liquor(&self, item: &LiquorItem) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE liquor_items SET
                name = $2, brand = $3, category = $4, bottles = $5,
                milliliters = $6, total_ml = $7, threshold = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(&item.brand)
        .bind(&item.category)
        .bind(item.bottles)
        .bind(item.milliliters)
        .bind(item.total_ml)
        .bind(item.threshold)
        .bind(item.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_liquor", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn delete_liquor(&self, id: ItemId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM liquor_items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_liquor", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get_liquor(&self, id: ItemId) -> Result<Option<LiquorItem>, StoreError> {
        let row = sqlx::query("SELECT * FROM liquor_items WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_liquor", e))?;

        row.map(|row| decode::<LiquorItemRow>(&row).map(Into::into))
            .transpose()
    }

    async fn list_liquor(&self) -> Result<Vec<LiquorItem>, StoreError> {
        let rows = sqlx::query("SELECT * FROM liquor_items ORDER BY name, id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_liquor", e))?;

        rows.iter()
            .map(|row| decode::<LiquorItemRow>(row).map(Into::into))
            .collect()
    }

    #[instrument(skip(self, item), fields(item_id = %item.id), err)]
    async fn insert_other(&self, item: &OtherStockItem) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO other_stock_items (
                id, name, category, quantity, unit, threshold, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.threshold)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_other", e))?;
        Ok(())
    }

    #[instrument(skip(self, item), fields(item_id = %item.id), err)]
    async fn update_other(&self, item: &OtherStockItem) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE other_stock_items SET
                name = $2, category = $3, quantity = $4, unit = $5,
                threshold = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.threshold)
        .bind(item.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_other", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn delete_other(&self, id: ItemId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM other_stock_items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_other", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get_other(&self, id: ItemId) -> Result<Option<OtherStockItem>, StoreError> {
        let row = sqlx::query("SELECT * FROM other_stock_items WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_other", e))?;

        row.map(|row| decode::<OtherStockItemRow>(&row).map(Into::into))
            .transpose()
    }

    async fn list_other(&self) -> Result<Vec<OtherStockItem>, StoreError> {
        let rows = sqlx::query("SELECT * FROM other_stock_items ORDER BY name, id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_other", e))?;

        rows.iter()
            .map(|row| decode::<OtherStockItemRow>(row).map(Into::into))
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: Arc<PgPool>,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

const INSERT_ACCOUNT: &str = r#"
    INSERT INTO accounts (id, email, display_name, role, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6)
"#;

#[async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self, account), fields(account_id = %account.id), err)]
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(INSERT_ACCOUNT)
            .bind(account.id.as_uuid())
            .bind(&account.email)
            .bind(&account.display_name)
            .bind(account.role.as_str())
            .bind(account.created_at)
            .bind(account.updated_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Conflict(format!("email '{}' is already registered", account.email))
                } else {
                    map_sqlx_error("insert_account", e)
                }
            })?;
        Ok(())
    }

    #[instrument(skip(self, account), fields(account_id = %account.id), err)]
    async fn insert_first_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        // Blocks concurrent writers until commit so two bootstraps cannot both
        // observe an empty table.
        sqlx::query("LOCK TABLE accounts IN EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_accounts", e))?;

        let exists: bool = sqlx::query("SELECT EXISTS (SELECT 1 FROM accounts) AS present")
            .fetch_one(&mut *tx)
            .await
            .and_then(|row| row.try_get("present"))
            .map_err(|e| map_sqlx_error("count_accounts", e))?;

        if exists {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::Conflict("accounts already exist".to_string()));
        }

        sqlx::query(INSERT_ACCOUNT)
            .bind(account.id.as_uuid())
            .bind(&account.email)
            .bind(&account.display_name)
            .bind(account.role.as_str())
            .bind(account.created_at)
            .bind(account.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_first_account", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    #[instrument(skip(self, account), fields(account_id = %account.id), err)]
    async fn update_account(&self, account: &Account) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                email = $2, display_name = $3, role = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.email)
        .bind(&account.display_name)
        .bind(account.role.as_str())
        .bind(account.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_account", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_account", e))?;

        row.map(|row| Account::try_from(decode::<AccountRow>(&row)?))
            .transpose()
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query("SELECT * FROM accounts ORDER BY created_at, id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_accounts", e))?;

        rows.iter()
            .map(|row| Account::try_from(decode::<AccountRow>(row)?))
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // unique violation
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Storage(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        _ => StoreError::Storage(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

fn decode<'r, T: FromRow<'r, PgRow>>(row: &'r PgRow) -> Result<T, StoreError> {
    T::from_row(row).map_err(|e| StoreError::Storage(format!("failed to decode row: {e}")))
}

fn amount_to_json(amount: &StockAmount) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(amount)
        .map_err(|e| StoreError::Storage(format!("failed to encode stock amount: {e}")))
}

fn amount_from_json(value: serde_json::Value) -> Result<StockAmount, StoreError> {
    serde_json::from_value(value)
        .map_err(|e| StoreError::Storage(format!("failed to decode stock amount: {e}")))
}

fn parse_item_type(raw: &str) -> Result<ItemType, StoreError> {
    raw.parse()
        .map_err(|e| StoreError::Storage(format!("unexpected item_type in row: {e}")))
}

// SQLx row types

struct SnapshotColumns {
    bottles: Option<i64>,
    milliliters: Option<i64>,
    total_ml: Option<i64>,
    quantity: Option<i64>,
}

impl From<&StockAmount> for SnapshotColumns {
    fn from(amount: &StockAmount) -> Self {
        match amount {
            StockAmount::Liquor(a) => SnapshotColumns {
                bottles: Some(a.bottles),
                milliliters: Some(a.milliliters),
                total_ml: Some(a.total_ml),
                quantity: None,
            },
            StockAmount::Other(q) => SnapshotColumns {
                bottles: None,
                milliliters: None,
                total_ml: None,
                quantity: Some(*q),
            },
        }
    }
}

#[derive(Debug)]
struct SnapshotRow {
    id: uuid::Uuid,
    stock_date: NaiveDate,
    item_id: uuid::Uuid,
    item_type: String,
    bottles: Option<i64>,
    milliliters: Option<i64>,
    total_ml: Option<i64>,
    quantity: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for SnapshotRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(SnapshotRow {
            id: row.try_get("id")?,
            stock_date: row.try_get("stock_date")?,
            item_id: row.try_get("item_id")?,
            item_type: row.try_get("item_type")?,
            bottles: row.try_get("bottles")?,
            milliliters: row.try_get("milliliters")?,
            total_ml: row.try_get("total_ml")?,
            quantity: row.try_get("quantity")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<SnapshotRow> for StockSnapshot {
    type Error = StoreError;

    fn try_from(row: SnapshotRow) -> Result<Self, Self::Error> {
        let amount = match parse_item_type(&row.item_type)? {
            ItemType::Liquor => StockAmount::Liquor(BottleAmount {
                bottles: row.bottles.unwrap_or(0),
                milliliters: row.milliliters.unwrap_or(0),
                total_ml: row.total_ml.unwrap_or(0),
            }),
            ItemType::Other => StockAmount::Other(row.quantity.unwrap_or(0)),
        };

        Ok(StockSnapshot {
            id: SnapshotId::from_uuid(row.id),
            date: row.stock_date,
            item_id: ItemId::from_uuid(row.item_id),
            amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug)]
struct MovementRow {
    id: uuid::Uuid,
    stock_date: NaiveDate,
    item_id: uuid::Uuid,
    item_type: String,
    previous_stock: serde_json::Value,
    current_stock: serde_json::Value,
    difference: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for MovementRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(MovementRow {
            id: row.try_get("id")?,
            stock_date: row.try_get("stock_date")?,
            item_id: row.try_get("item_id")?,
            item_type: row.try_get("item_type")?,
            previous_stock: row.try_get("previous_stock")?,
            current_stock: row.try_get("current_stock")?,
            difference: row.try_get("difference")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<MovementRow> for MovementRecord {
    type Error = StoreError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        Ok(MovementRecord {
            id: MovementId::from_uuid(row.id),
            date: row.stock_date,
            item_id: ItemId::from_uuid(row.item_id),
            item_type: parse_item_type(&row.item_type)?,
            previous_stock: amount_from_json(row.previous_stock)?,
            current_stock: amount_from_json(row.current_stock)?,
            difference: amount_from_json(row.difference)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug)]
struct LiquorItemRow {
    id: uuid::Uuid,
    name: String,
    brand: String,
    category: String,
    bottles: i64,
    milliliters: i64,
    total_ml: i64,
    threshold: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for LiquorItemRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(LiquorItemRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            brand: row.try_get("brand")?,
            category: row.try_get("category")?,
            bottles: row.try_get("bottles")?,
            milliliters: row.try_get("milliliters")?,
            total_ml: row.try_get("total_ml")?,
            threshold: row.try_get("threshold")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<LiquorItemRow> for LiquorItem {
    fn from(row: LiquorItemRow) -> Self {
        LiquorItem {
            id: ItemId::from_uuid(row.id),
            name: row.name,
            brand: row.brand,
            category: row.category,
            bottles: row.bottles,
            milliliters: row.milliliters,
            total_ml: row.total_ml,
            threshold: row.threshold,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug)]
struct OtherStockItemRow {
    id: uuid::Uuid,
    name: String,
    category: String,
    quantity: i64,
    unit: String,
    threshold: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for OtherStockItemRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(OtherStockItemRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            quantity: row.try_get("quantity")?,
            unit: row.try_get("unit")?,
            threshold: row.try_get("threshold")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<OtherStockItemRow> for OtherStockItem {
    fn from(row: OtherStockItemRow) -> Self {
        OtherStockItem {
            id: ItemId::from_uuid(row.id),
            name: row.name,
            category: row.category,
            quantity: row.quantity,
            unit: row.unit,
            threshold: row.threshold,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug)]
struct AccountRow {
    id: uuid::Uuid,
    email: String,
    display_name: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for AccountRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(AccountRow {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            display_name: row.try_get("display_name")?,
            role: row.try_get("role")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| StoreError::Storage(format!("unexpected role in row: {e}")))?;

        Ok(Account {
            id: AccountId::from_uuid(row.id),
            email: row.email,
            display_name: row.display_name,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocktally_inventory::DailyStockEntry;

    // Needs a reachable database:
    //   DATABASE_URL=postgres://... cargo test -p stocktally-infra -- --ignored
    async fn store() -> Option<PostgresStockStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = connect(&url, 2).await.ok()?;
        ensure_schema(&pool).await.ok()?;
        Some(PostgresStockStore::new(pool))
    }

    #[tokio::test]
    #[ignore]
    async fn snapshot_upsert_reports_insert_then_overwrite() {
        let Some(store) = store().await else {
            return;
        };
        let item = ItemId::new();
        let date: NaiveDate = "2024-01-02".parse().unwrap();

        // Never committed: the rollback on drop leaves the database clean.
        let mut tx = store.begin().await.unwrap();

        let first = StockSnapshot::from_entry(
            SnapshotId::new(),
            &DailyStockEntry::liquor(date, item, 4, 500),
            Utc::now(),
        );
        let write = tx.upsert_snapshot(&first).await.unwrap();
        assert!(write.inserted);
        assert_eq!(write.id, first.id);

        let second = StockSnapshot::from_entry(
            SnapshotId::new(),
            &DailyStockEntry::liquor(date, item, 3, 250),
            Utc::now(),
        );
        let write = tx.upsert_snapshot(&second).await.unwrap();
        assert!(!write.inserted);
        assert_eq!(write.id, first.id);

        let stored = tx.find_snapshot(item, date).await.unwrap().unwrap();
        assert_eq!(stored.id, first.id);
        assert_eq!(stored.amount, StockAmount::liquor(3, 250));
    }
}
