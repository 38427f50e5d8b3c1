//! Infrastructure layer: stores, application services, configuration.

pub mod accounts;
pub mod catalog;
pub mod config;
pub mod daily_stock;
pub mod error;
pub mod store;

pub use accounts::AccountDirectory;
pub use catalog::ItemCatalog;
pub use config::{AppConfig, ConfigError, StorageBackend, load_config};
pub use daily_stock::{DailyStockService, Derivation};
pub use error::{ServiceError, ServiceResult};
