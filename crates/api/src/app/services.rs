use std::sync::Arc;

use tracing::info;

use stocktally_infra::store::{
    AnyStockStore, InMemoryAccountStore, InMemoryItemStore, InMemoryStockStore,
    PostgresAccountStore, PostgresItemStore, PostgresStockStore, StoreError, connect,
    ensure_schema,
};
use stocktally_infra::{AccountDirectory, AppConfig, DailyStockService, ItemCatalog, StorageBackend};

/// Application services shared by every handler.
pub struct AppServices {
    pub catalog: ItemCatalog,
    pub daily_stock: DailyStockService<AnyStockStore>,
    pub accounts: AccountDirectory,
}

impl AppServices {
    /// Process-local storage; everything is lost on restart.
    pub fn in_memory() -> Self {
        Self {
            catalog: ItemCatalog::new(Arc::new(InMemoryItemStore::new())),
            daily_stock: DailyStockService::new(AnyStockStore::Memory(InMemoryStockStore::new())),
            accounts: AccountDirectory::new(Arc::new(InMemoryAccountStore::new())),
        }
    }

    /// Postgres storage. Creates the schema if it is missing.
    pub async fn postgres(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = connect(database_url, max_connections).await?;
        ensure_schema(&pool).await?;

        Ok(Self {
            catalog: ItemCatalog::new(Arc::new(PostgresItemStore::new(pool.clone()))),
            daily_stock: DailyStockService::new(AnyStockStore::Postgres(PostgresStockStore::new(
                pool.clone(),
            ))),
            accounts: AccountDirectory::new(Arc::new(PostgresAccountStore::new(pool))),
        })
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        match config.storage {
            StorageBackend::Memory => {
                info!("using in-memory storage");
                Ok(Self::in_memory())
            }
            StorageBackend::Postgres => {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    StoreError::Storage("database_url is not configured".to_string())
                })?;
                info!(max_connections = config.db_max_connections, "using postgres storage");
                Self::postgres(url, config.db_max_connections).await
            }
        }
    }
}
