//! Liquor and other-stock catalog.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use stocktally_core::{DomainError, ItemId};
use stocktally_inventory::{
    LiquorItem, LiquorItemPatch, LowStockAlert, NewLiquorItem, NewOtherStockItem, OtherStockItem,
    OtherStockItemPatch, low_stock_alerts,
};

use crate::error::{ServiceError, ServiceResult};
use crate::store::{ItemStore, StoreError};

/// Item CRUD plus the low stock report.
#[derive(Clone)]
pub struct ItemCatalog {
    store: Arc<dyn ItemStore>,
}

impl ItemCatalog {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, cmd), fields(name = %cmd.name), err)]
    pub async fn add_liquor(&self, cmd: NewLiquorItem) -> ServiceResult<LiquorItem> {
        let item = cmd.into_item(ItemId::new(), Utc::now())?;
        self.store.insert_liquor(&item).await?;
        info!(item_id = %item.id, "liquor item added");
        Ok(item)
    }

    #[instrument(skip(self, patch), err)]
    pub async fn update_liquor(&self, id: ItemId, patch: LiquorItemPatch) -> ServiceResult<LiquorItem> {
        let mut item = self.get_liquor(id).await?;
        patch.apply(&mut item, Utc::now())?;
        self.store
            .update_liquor(&item)
            .await
            .map_err(missing_as_domain)?;
        Ok(item)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_liquor(&self, id: ItemId) -> ServiceResult<()> {
        self.store
            .delete_liquor(id)
            .await
            .map_err(missing_as_domain)?;
        info!(item_id = %id, "liquor item deleted");
        Ok(())
    }

    pub async fn get_liquor(&self, id: ItemId) -> ServiceResult<LiquorItem> {
        self.store
            .get_liquor(id)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }

    pub async fn list_liquor(&self) -> ServiceResult<Vec<LiquorItem>> {
        Ok(self.store.list_liquor().await?)
    }

    #[instrument(skip(self, cmd), fields(name = %cmd.name), err)]
    pub async fn add_other(&self, cmd: NewOtherStockItem) -> ServiceResult<OtherStockItem> {
        let item = cmd.into_item(ItemId::new(), Utc::now())?;
        self.store.insert_other(&item).await?;
        info!(item_id = %item.id, "stock item added");
        Ok(item)
    }

    #[instrument(skip(self, patch), err)]
    pub async fn update_other(
        &self,
        id: ItemId,
        patch: OtherStockItemPatch,
    ) -> ServiceResult<OtherStockItem> {
        let mut item = self.get_other(id).await?;
        patch.apply(&mut item, Utc::now())?;
        self.store
            .update_other(&item)
            .await
            .map_err(missing_as_domain)?;
        Ok(item)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_other(&self, id: ItemId) -> ServiceResult<()> {
        self.store
            .delete_other(id)
            .await
            .map_err(missing_as_domain)?;
        info!(item_id = %id, "stock item deleted");
        Ok(())
    }

    pub async fn get_other(&self, id: ItemId) -> ServiceResult<OtherStockItem> {
        self.store
            .get_other(id)
            .await?
            .ok_or_else(|| DomainError::not_found().into())
    }

    pub async fn list_other(&self) -> ServiceResult<Vec<OtherStockItem>> {
        Ok(self.store.list_other().await?)
    }

    /// Every item currently below its threshold.
    pub async fn low_stock(&self) -> ServiceResult<Vec<LowStockAlert>> {
        let liquor = self.store.list_liquor().await?;
        let other = self.store.list_other().await?;
        Ok(low_stock_alerts(&liquor, &other))
    }
}

/// A row vanishing between read and write surfaces as a domain not-found.
fn missing_as_domain(err: StoreError) -> ServiceError {
    match err {
        StoreError::NotFound => DomainError::not_found().into(),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryItemStore;

    fn catalog() -> ItemCatalog {
        ItemCatalog::new(Arc::new(InMemoryItemStore::new()))
    }

    fn whisky(bottles: i64, ml: i64) -> NewLiquorItem {
        NewLiquorItem {
            name: "Whisky".to_string(),
            brand: "Glen".to_string(),
            category: "whisky".to_string(),
            bottles,
            milliliters: ml,
            threshold: 3,
        }
    }

    #[tokio::test]
    async fn add_computes_total_and_update_recomputes() {
        let cat = catalog();
        let item = cat.add_liquor(whisky(2, 250)).await.unwrap();
        assert_eq!(item.total_ml, 1750);

        let updated = cat
            .update_liquor(
                item.id,
                LiquorItemPatch {
                    bottles: Some(4),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.total_ml, 3250);
        assert_eq!(cat.get_liquor(item.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn list_is_ordered_by_name() {
        let cat = catalog();
        for name in ["Vodka", "Gin", "Rum"] {
            cat.add_other(NewOtherStockItem {
                name: name.to_string(),
                category: String::new(),
                quantity: 1,
                unit: "pcs".to_string(),
                threshold: 1,
            })
            .await
            .unwrap();
        }

        let names: Vec<String> = cat.list_other().await.unwrap().into_iter().map(|i| i.name).collect();
        assert_eq!(names, ["Gin", "Rum", "Vodka"]);
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let cat = catalog();
        let err = cat.delete_liquor(ItemId::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound)));
    }

    #[tokio::test]
    async fn invalid_item_rejected() {
        let cat = catalog();
        let err = cat.add_liquor(whisky(-1, 0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
        assert!(cat.list_liquor().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn low_stock_report_lists_items_below_threshold() {
        let cat = catalog();
        cat.add_liquor(whisky(2, 700)).await.unwrap();
        cat.add_liquor(NewLiquorItem {
            name: "Brandy".to_string(),
            threshold: 1,
            ..whisky(1, 0)
        })
        .await
        .unwrap();

        let alerts = cat.low_stock().await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].name, "Whisky");
        assert_eq!(alerts[0].current_stock, "2 bottles and 700ML");
        assert_eq!(alerts[0].threshold, "3 bottles");
    }
}
