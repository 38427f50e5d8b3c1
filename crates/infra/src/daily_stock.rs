//! Daily stock recording and movement derivation.
//!
//! Recording stock for an item on a date is a conditional write: the first
//! entry for `(date, item_id)` inserts a snapshot and derives that day's
//! movement against the day before; later entries overwrite the snapshot in
//! place and leave the movement alone. Both steps share one store transaction.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument};

use stocktally_core::{ItemId, MovementId, SnapshotId};
use stocktally_inventory::{
    DailyStockEntry, ItemType, MovementRecord, StockSnapshot, derive_movement, movement::comparison_day,
};

use crate::error::ServiceResult;
use crate::store::{StockStore, StockTransaction, StoreError};

/// What a derivation attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derivation {
    /// A movement record was inserted or overwritten.
    Written(MovementRecord),
    /// The snapshot for the day before (or the day itself) is missing.
    Skipped,
}

pub struct DailyStockService<S> {
    store: S,
}

impl<S: StockStore> DailyStockService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Record stock on hand for one item on one date.
    ///
    /// Returns the id of the stored snapshot. The entry is validated before
    /// the store is touched.
    #[instrument(
        skip(self, entry),
        fields(item_id = %entry.item_id, date = %entry.date, item_type = %entry.item_type),
        err
    )]
    pub async fn record_daily_stock(&self, entry: DailyStockEntry) -> ServiceResult<SnapshotId> {
        entry.validate()?;

        let now = Utc::now();
        let mut tx = self.store.begin().await?;

        let snapshot = StockSnapshot::from_entry(SnapshotId::new(), &entry, now);
        let write = tx.upsert_snapshot(&snapshot).await?;

        if write.inserted {
            derive_in(&mut tx, entry.item_id, entry.item_type, entry.date).await?;
        } else {
            debug!("existing snapshot overwritten; movement left unchanged");
        }

        tx.commit().await?;

        info!(snapshot_id = %write.id, inserted = write.inserted, "daily stock recorded");
        Ok(write.id)
    }

    /// Recompute the movement for `(item_id, date)` from the stored snapshots.
    ///
    /// The item type is taken from that day's snapshot.
    #[instrument(skip(self), err)]
    pub async fn rederive_movement(&self, item_id: ItemId, date: NaiveDate) -> ServiceResult<Derivation> {
        let mut tx = self.store.begin().await?;

        let Some(current) = tx.find_snapshot(item_id, date).await? else {
            debug!("no snapshot for date; nothing to derive");
            return Ok(Derivation::Skipped);
        };

        let outcome = derive_in(&mut tx, item_id, current.item_type(), date).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    /// Movement records for exactly `date`.
    pub async fn get_stock_movement(&self, date: NaiveDate) -> ServiceResult<Vec<MovementRecord>> {
        let mut movements = self.store.list_movements_by_date(date).await?;
        movements.retain(|m| m.date == date);
        Ok(movements)
    }

    /// Snapshots recorded for exactly `date`.
    pub async fn get_daily_stock(&self, date: NaiveDate) -> ServiceResult<Vec<StockSnapshot>> {
        let mut snapshots = self.store.list_snapshots_by_date(date).await?;
        snapshots.retain(|s| s.date == date);
        Ok(snapshots)
    }
}

/// Derive and upsert the movement for `(item_id, date)` inside `tx`.
async fn derive_in<T: StockTransaction>(
    tx: &mut T,
    item_id: ItemId,
    item_type: ItemType,
    date: NaiveDate,
) -> Result<Derivation, StoreError> {
    let Some(prev_day) = comparison_day(date) else {
        return Ok(Derivation::Skipped);
    };

    let previous = tx.find_snapshot(item_id, prev_day).await?;
    let current = tx.find_snapshot(item_id, date).await?;

    let (Some(previous), Some(current)) = (previous, current) else {
        debug!(%item_id, %date, "comparison snapshot missing; movement not derived");
        return Ok(Derivation::Skipped);
    };

    let movement = derive_movement(item_type, &previous, &current);
    let now = Utc::now();

    let record = match tx.find_movement(item_id, date).await? {
        Some(mut existing) => {
            existing.item_type = item_type;
            existing.recompute(movement, now);
            existing
        }
        None => MovementRecord::new(MovementId::new(), date, item_id, item_type, movement, now),
    };
    tx.upsert_movement(&record).await?;

    debug!(%item_id, %date, difference = ?record.difference, "movement derived");
    Ok(Derivation::Written(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::store::InMemoryStockStore;
    use stocktally_core::DomainError;
    use stocktally_inventory::{BottleAmount, StockAmount};

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn service() -> DailyStockService<InMemoryStockStore> {
        DailyStockService::new(InMemoryStockStore::new())
    }

    #[tokio::test]
    async fn recording_twice_keeps_one_snapshot_and_latest_values() {
        let svc = service();
        let item = ItemId::new();

        svc.record_daily_stock(DailyStockEntry::liquor(day("2024-03-09"), item, 6, 0))
            .await
            .unwrap();
        let first = svc
            .record_daily_stock(DailyStockEntry::liquor(day("2024-03-10"), item, 5, 0))
            .await
            .unwrap();
        let second = svc
            .record_daily_stock(DailyStockEntry::liquor(day("2024-03-10"), item, 4, 100))
            .await
            .unwrap();
        assert_eq!(first, second);

        let snapshots = svc.get_daily_stock(day("2024-03-10")).await.unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].amount, StockAmount::liquor(4, 100));

        // The update did not re-derive: the movement still reflects the first entry.
        let movements = svc.get_stock_movement(day("2024-03-10")).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].current_stock, StockAmount::liquor(5, 0));
    }

    #[tokio::test]
    async fn difference_is_previous_minus_current() {
        let svc = service();
        let item = ItemId::new();

        svc.record_daily_stock(DailyStockEntry::liquor(day("2024-06-01"), item, 10, 0))
            .await
            .unwrap();
        svc.record_daily_stock(DailyStockEntry::liquor(day("2024-06-02"), item, 8, 375))
            .await
            .unwrap();

        let movements = svc.get_stock_movement(day("2024-06-02")).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(
            movements[0].difference,
            StockAmount::Liquor(BottleAmount {
                bottles: 2,
                milliliters: -375,
                total_ml: 1125,
            })
        );
        assert!(movements[0].is_consumption());
    }

    #[tokio::test]
    async fn two_day_scenario() {
        let svc = service();
        let item = ItemId::new();

        svc.record_daily_stock(DailyStockEntry::liquor(day("2024-01-01"), item, 5, 0))
            .await
            .unwrap();
        svc.record_daily_stock(DailyStockEntry::liquor(day("2024-01-02"), item, 4, 500))
            .await
            .unwrap();

        let m = &svc.get_stock_movement(day("2024-01-02")).await.unwrap()[0];
        assert_eq!(m.previous_stock, StockAmount::liquor(5, 0));
        assert_eq!(m.current_stock, StockAmount::liquor(4, 500));
        assert_eq!(
            m.difference,
            StockAmount::Liquor(BottleAmount {
                bottles: 1,
                milliliters: -500,
                total_ml: 250,
            })
        );
    }

    #[tokio::test]
    async fn no_previous_day_means_no_movement() {
        let svc = service();
        let item = ItemId::new();

        // 2024-01-01 is missing, so 2024-01-02 has nothing to compare against.
        svc.record_daily_stock(DailyStockEntry::other(day("2023-12-31"), item, 9))
            .await
            .unwrap();
        svc.record_daily_stock(DailyStockEntry::other(day("2024-01-02"), item, 7))
            .await
            .unwrap();

        assert!(svc.get_stock_movement(day("2024-01-02")).await.unwrap().is_empty());
        assert!(svc.get_stock_movement(day("2023-12-31")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn movements_do_not_leak_across_dates() {
        let svc = service();
        let item = ItemId::new();

        for (d, q) in [("2024-02-01", 10), ("2024-02-02", 8), ("2024-02-03", 11)] {
            svc.record_daily_stock(DailyStockEntry::other(day(d), item, q))
                .await
                .unwrap();
        }

        let feb2 = svc.get_stock_movement(day("2024-02-02")).await.unwrap();
        assert_eq!(feb2.len(), 1);
        assert_eq!(feb2[0].date, day("2024-02-02"));
        assert_eq!(feb2[0].difference, StockAmount::other(2));

        let feb3 = svc.get_stock_movement(day("2024-02-03")).await.unwrap();
        assert_eq!(feb3.len(), 1);
        assert_eq!(feb3[0].difference, StockAmount::other(-3));
        assert!(!feb3[0].is_consumption());
    }

    #[tokio::test]
    async fn shape_mismatch_rejected_before_store_access() {
        let svc = service();
        let mut entry = DailyStockEntry::other(day("2024-02-01"), ItemId::new(), 3);
        entry.item_type = ItemType::Liquor;

        let err = svc.record_daily_stock(entry).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
        assert!(svc.get_daily_stock(day("2024-02-01")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rederive_picks_up_same_day_correction() {
        let svc = service();
        let item = ItemId::new();

        svc.record_daily_stock(DailyStockEntry::other(day("2024-04-01"), item, 20))
            .await
            .unwrap();
        svc.record_daily_stock(DailyStockEntry::other(day("2024-04-02"), item, 15))
            .await
            .unwrap();
        svc.record_daily_stock(DailyStockEntry::other(day("2024-04-02"), item, 12))
            .await
            .unwrap();

        let outcome = svc.rederive_movement(item, day("2024-04-02")).await.unwrap();
        let Derivation::Written(record) = outcome else {
            panic!("expected a movement to be written");
        };
        assert_eq!(record.difference, StockAmount::other(8));

        let movements = svc.get_stock_movement(day("2024-04-02")).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].id, record.id);
    }

    #[tokio::test]
    async fn backfilling_previous_day_then_rederiving() {
        let svc = service();
        let item = ItemId::new();

        svc.record_daily_stock(DailyStockEntry::other(day("2024-04-02"), item, 15))
            .await
            .unwrap();
        assert_eq!(
            svc.rederive_movement(item, day("2024-04-02")).await.unwrap(),
            Derivation::Skipped
        );

        svc.record_daily_stock(DailyStockEntry::other(day("2024-04-01"), item, 18))
            .await
            .unwrap();
        let outcome = svc.rederive_movement(item, day("2024-04-02")).await.unwrap();
        assert!(matches!(outcome, Derivation::Written(ref r) if r.difference == StockAmount::other(3)));
    }

    #[tokio::test]
    async fn concurrent_first_entries_insert_once() {
        let svc = std::sync::Arc::new(service());
        let item = ItemId::new();
        let date = day("2024-07-07");

        let mut handles = Vec::new();
        for q in 0..8 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                svc.record_daily_stock(DailyStockEntry::other(date, item, q)).await
            }));
        }

        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap().unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(svc.get_daily_stock(date).await.unwrap().len(), 1);
    }
}
