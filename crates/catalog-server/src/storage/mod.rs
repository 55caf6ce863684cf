//! Storage layer
//!
//! Two stores back the catalog: MySQL as the source of truth when reachable,
//! and a whole-file JSON snapshot as the best-effort fallback.

pub mod backup;
pub mod db;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{NewProduct, Product};

pub use backup::{BackupStore, IdMatch};
pub use db::Database;

/// Primary product store.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, StoreError>;
    async fn insert(&self, product: &NewProduct) -> Result<i64, StoreError>;
    async fn delete_by_id(&self, id: i64) -> Result<u64, StoreError>;
}
