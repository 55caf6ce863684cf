//! JSON snapshot fallback store
//!
//! A single file holding the whole product collection, rewritten wholesale
//! on every mutation. The medium is treated as unreliable: nothing here may
//! abort a request, so every failure is logged and absorbed.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::error::StoreError;
use crate::types::{NewProduct, Product};

/// Identifier matching policy for snapshot deletes.
///
/// The two delete routes match ids differently; both modes stay available
/// instead of being unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdMatch {
    /// Numeric comparison after coercing the raw path segment: `"123"`,
    /// `" 123 "` and `"123.0"` all match id 123. A segment that is not a
    /// number matches nothing.
    Loose,
    /// Exact string comparison against the id's decimal rendering.
    Strict,
}

impl IdMatch {
    fn matches(self, record_id: i64, raw: &str) -> bool {
        match self {
            IdMatch::Loose => raw
                .trim()
                .parse::<f64>()
                .map(|n| record_id as f64 == n)
                .unwrap_or(false),
            IdMatch::Strict => record_id.to_string() == raw,
        }
    }
}

pub struct BackupStore {
    path: PathBuf,
    last_id: AtomicI64,
    // Held across each read-modify-write so concurrent writers cannot drop
    // each other's appends.
    write_lock: Mutex<()>,
}

impl BackupStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_id: AtomicI64::new(0),
            write_lock: Mutex::new(()),
        }
    }

    /// Append `product` and return the assigned identifier.
    ///
    /// The id is handed out even when the rewrite fails; persistence is
    /// best-effort and callers must not assume it succeeded.
    pub async fn append(&self, product: &NewProduct) -> i64 {
        let id = self.next_id();
        let _guard = self.write_lock.lock().await;
        if let Err(e) = self.try_append(product.clone().into_product(id)).await {
            error!("Failed to write backup snapshot: {e}");
        }
        id
    }

    /// Full snapshot contents; empty when the file is missing, unreadable
    /// or unparsable.
    pub async fn read_all(&self) -> Vec<Product> {
        match self.load_existing().await {
            Ok(products) => products.unwrap_or_default(),
            Err(e) => {
                error!("Failed to read backup snapshot: {e}");
                Vec::new()
            }
        }
    }

    /// Drop every record whose id matches `raw_id` under `mode` and rewrite
    /// the snapshot. A missing snapshot is a no-op; failures are absorbed.
    pub async fn remove_by_id(&self, raw_id: &str, mode: IdMatch) {
        let _guard = self.write_lock.lock().await;
        if let Err(e) = self.try_remove(raw_id, mode).await {
            error!("Failed to remove {raw_id:?} from backup snapshot: {e}");
        }
    }

    /// Wall-clock milliseconds, bumped past the previous id so rapid appends
    /// within one millisecond still get distinct, increasing identifiers.
    fn next_id(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let mut last = self.last_id.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self
                .last_id
                .compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }

    async fn try_append(&self, product: Product) -> Result<(), StoreError> {
        let mut products = self.load_existing().await?.unwrap_or_default();
        products.push(product);
        self.persist(&products).await
    }

    async fn try_remove(&self, raw_id: &str, mode: IdMatch) -> Result<(), StoreError> {
        let Some(products) = self.load_existing().await? else {
            return Ok(());
        };

        let before = products.len();
        let remaining: Vec<Product> = products
            .into_iter()
            .filter(|p| !mode.matches(p.id, raw_id))
            .collect();
        debug!(
            "Snapshot delete of {raw_id:?}: {before} records before, {} after",
            remaining.len()
        );

        self.persist(&remaining).await
    }

    /// `None` when no snapshot exists yet.
    async fn load_existing(&self) -> Result<Option<Vec<Product>>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, products: &[Product]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(products)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
