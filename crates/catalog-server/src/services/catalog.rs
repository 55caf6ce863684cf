//! Catalog orchestration service
//!
//! Implements the dual-write / fallback-read policy over the two stores.
//! Requests that reach this layer always succeed: a primary failure degrades
//! to the snapshot, and the backup store absorbs its own failures.

use std::sync::Arc;

use tracing::warn;

use crate::storage::{BackupStore, IdMatch, ProductStore};
use crate::types::{NewProduct, Product};

/// Which store assigned the identifier returned from a create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateOutcome {
    pub id: i64,
    /// True when the primary insert failed and `id` is the backup's.
    pub degraded: bool,
}

pub struct CatalogService {
    primary: Arc<dyn ProductStore>,
    backup: Arc<BackupStore>,
}

impl CatalogService {
    pub fn new(primary: Arc<dyn ProductStore>, backup: Arc<BackupStore>) -> Self {
        Self { primary, backup }
    }

    /// Primary listing when reachable, backup snapshot otherwise. The two
    /// stores are never merged, so an empty primary and a dead primary with
    /// an empty snapshot look the same to clients.
    pub async fn list(&self) -> Vec<Product> {
        match self.primary.list().await {
            Ok(products) => products,
            Err(e) => {
                warn!("Primary store unavailable, serving backup snapshot: {e}");
                self.backup.read_all().await
            }
        }
    }

    /// Write the snapshot first, unconditionally, then attempt the primary
    /// insert. When both succeed the two copies keep different identifiers;
    /// the primary's wins in the response.
    pub async fn create(&self, product: NewProduct) -> CreateOutcome {
        let backup_id = self.backup.append(&product).await;

        match self.primary.insert(&product).await {
            Ok(id) => CreateOutcome {
                id,
                degraded: false,
            },
            Err(e) => {
                warn!("Primary insert failed, keeping backup id {backup_id}: {e}");
                CreateOutcome {
                    id: backup_id,
                    degraded: true,
                }
            }
        }
    }

    /// Best-effort removal from both stores. Reported as success regardless
    /// of whether either store contained a matching record.
    pub async fn delete(&self, raw_id: &str, mode: IdMatch) {
        self.backup.remove_by_id(raw_id, mode).await;

        match raw_id.trim().parse::<i64>() {
            Ok(id) => {
                if let Err(e) = self.primary.delete_by_id(id).await {
                    warn!("Primary delete of {id} failed: {e}");
                }
            }
            Err(_) => warn!("Id {raw_id:?} is not numeric, skipping primary delete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// In-memory stand-in for the MySQL store, with a kill switch.
    struct FakePrimary {
        rows: Mutex<Vec<Product>>,
        next_id: AtomicI64,
        down: AtomicBool,
    }

    impl FakePrimary {
        fn healthy() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                next_id: AtomicI64::new(1),
                down: AtomicBool::new(false),
            }
        }

        fn down() -> Self {
            let fake = Self::healthy();
            fake.down.store(true, Ordering::SeqCst);
            fake
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.down.load(Ordering::SeqCst) {
                Err(StoreError::Unavailable(sqlx::Error::PoolClosed))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ProductStore for FakePrimary {
        async fn list(&self) -> Result<Vec<Product>, StoreError> {
            self.check()?;
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn insert(&self, product: &NewProduct) -> Result<i64, StoreError> {
            self.check()?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.rows
                .lock()
                .unwrap()
                .push(product.clone().into_product(id));
            Ok(id)
        }

        async fn delete_by_id(&self, id: i64) -> Result<u64, StoreError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|p| p.id != id);
            Ok((before - rows.len()) as u64)
        }
    }

    fn service(primary: FakePrimary, dir: &TempDir) -> (CatalogService, Arc<BackupStore>) {
        let backup = Arc::new(BackupStore::new(dir.path().join("produtos_backup.json")));
        let service = CatalogService::new(Arc::new(primary), backup.clone());
        (service, backup)
    }

    fn novo(name: &str, price: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            category: Some("Natal".to_string()),
            price: Decimal::from_str(price).unwrap(),
            description: None,
        }
    }

    #[tokio::test]
    async fn list_serves_backup_when_primary_is_down() {
        let dir = tempfile::tempdir().unwrap();
        let (service, backup) = service(FakePrimary::down(), &dir);

        backup.append(&novo("panetone", "29.90")).await;
        backup.append(&novo("rabanada", "12.50")).await;
        let snapshot = backup.read_all().await;

        let listed = service.list().await;
        assert_eq!(listed, snapshot);
    }

    #[tokio::test]
    async fn list_never_merges_the_two_stores() {
        let dir = tempfile::tempdir().unwrap();
        let (service, backup) = service(FakePrimary::healthy(), &dir);

        // Only in the snapshot; a healthy primary must not surface it.
        backup.append(&novo("fantasma", "1.00")).await;

        assert!(service.list().await.is_empty());
    }

    #[tokio::test]
    async fn create_writes_both_stores() {
        let dir = tempfile::tempdir().unwrap();
        let (service, backup) = service(FakePrimary::healthy(), &dir);

        let outcome = service.create(novo("panetone", "29.90")).await;
        assert!(!outcome.degraded);

        let primary_rows = service.list().await;
        assert_eq!(primary_rows.len(), 1);
        assert_eq!(primary_rows[0].id, outcome.id);

        let snapshot = backup.read_all().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, primary_rows[0].name);
        assert_eq!(snapshot[0].category, primary_rows[0].category);
        assert_eq!(snapshot[0].price, primary_rows[0].price);
        assert_eq!(snapshot[0].description, primary_rows[0].description);
        // The two copies are allowed to disagree on the identifier.
    }

    #[tokio::test]
    async fn create_degrades_to_the_backup_id() {
        let dir = tempfile::tempdir().unwrap();
        let (service, backup) = service(FakePrimary::down(), &dir);

        let outcome = service.create(novo("panetone", "29.90")).await;
        assert!(outcome.degraded);

        let snapshot = backup.read_all().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, outcome.id);
        assert_eq!(snapshot[0].name, "panetone");
    }

    #[tokio::test]
    async fn delete_of_an_unknown_id_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let (service, backup) = service(FakePrimary::healthy(), &dir);

        service.delete("424242", IdMatch::Loose).await;
        service.delete("424242", IdMatch::Strict).await;
        service.delete("nem-um-numero", IdMatch::Strict).await;

        assert!(backup.read_all().await.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_the_record_from_the_backup() {
        let dir = tempfile::tempdir().unwrap();
        let (service, backup) = service(FakePrimary::down(), &dir);

        let outcome = service.create(novo("alvo", "5.00")).await;
        service.create(novo("resta", "6.00")).await;

        service.delete(&outcome.id.to_string(), IdMatch::Strict).await;

        let remaining = backup.read_all().await;
        assert_eq!(remaining.len(), 1);
        assert!(remaining.iter().all(|p| p.id != outcome.id));
    }

    #[tokio::test]
    async fn delete_reaches_the_primary_as_well() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _backup) = service(FakePrimary::healthy(), &dir);

        let outcome = service.create(novo("alvo", "5.00")).await;
        service.delete(&outcome.id.to_string(), IdMatch::Strict).await;

        assert!(service.list().await.is_empty());
    }
}
