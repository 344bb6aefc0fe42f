//! Catalog snapshot store
//!
//! Stale-while-revalidate storage for one product collection. Readers
//! always get the last installed snapshot; a fetch in flight never blocks
//! them. There is one logical writer (the fetch completion handler) and
//! snapshots are replaced atomically, so the only coordination needed is
//! a request sequence number: a response from request N is dropped if a
//! response from request M > N already landed.

use crate::product::Product;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// An immutable snapshot of one product collection
#[derive(Debug)]
pub struct CatalogSnapshot {
    /// Sequence number of the fetch that produced this snapshot; 0 for
    /// the initial empty snapshot
    pub seq: u64,
    /// Products in backend order
    pub products: Vec<Product>,
    /// Total reported by the backend (may exceed products.len() if the
    /// walk was capped)
    pub total: u64,
    /// When the snapshot was installed
    pub fetched_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    fn empty() -> Self {
        Self {
            seq: 0,
            products: Vec::new(),
            total: 0,
            fetched_at: Utc::now(),
        }
    }
}

/// Last-write-wins store for catalog snapshots
pub struct CatalogStore {
    snapshot: RwLock<Arc<CatalogSnapshot>>,
    next_seq: AtomicU64,
}

impl CatalogStore {
    /// Create a store holding an empty initial snapshot
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(CatalogSnapshot::empty())),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Claim a sequence number for a fetch about to start
    ///
    /// Call before issuing the request; pass the returned value to
    /// `install` when the response arrives.
    pub fn begin_request(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Install a fetched snapshot, last-write-wins
    ///
    /// Returns false (and leaves the current snapshot untouched) if a
    /// snapshot from a later request was already installed.
    pub async fn install(&self, seq: u64, products: Vec<Product>, total: u64) -> bool {
        let mut guard = self.snapshot.write().await;
        if seq <= guard.seq {
            debug!(
                stale_seq = seq,
                current_seq = guard.seq,
                "Ignoring stale catalog response"
            );
            return false;
        }

        let count = products.len();
        *guard = Arc::new(CatalogSnapshot {
            seq,
            products,
            total,
            fetched_at: Utc::now(),
        });
        info!(seq = seq, products = count, total = total, "Installed catalog snapshot");
        true
    }

    /// Current snapshot (cheap Arc clone; never blocks on a fetch)
    pub async fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.snapshot.read().await.clone()
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str) -> Product {
        Product {
            id: id.to_string(),
            title: id.to_string(),
            style: String::new(),
            shape: "round".to_string(),
            metals: vec![],
            price: 100.0,
            tags: vec![],
            quick_ship: false,
            listed_at: None,
            extra: serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn test_initial_snapshot_is_empty() {
        let store = CatalogStore::new();
        let snap = store.snapshot().await;
        assert_eq!(snap.seq, 0);
        assert!(snap.products.is_empty());
    }

    #[tokio::test]
    async fn test_install_replaces_snapshot() {
        let store = CatalogStore::new();
        let seq = store.begin_request();
        assert!(store.install(seq, vec![product("a")], 1).await);

        let snap = store.snapshot().await;
        assert_eq!(snap.seq, seq);
        assert_eq!(snap.products.len(), 1);
        assert_eq!(snap.total, 1);
    }

    #[tokio::test]
    async fn test_backend_total_can_exceed_snapshot_len() {
        // A capped page walk installs fewer products than the backend
        // reports; the snapshot keeps the backend total for display
        let store = CatalogStore::new();
        let seq = store.begin_request();
        assert!(store.install(seq, vec![product("a")], 12000).await);

        let snap = store.snapshot().await;
        assert_eq!(snap.products.len(), 1);
        assert_eq!(snap.total, 12000);
    }

    #[tokio::test]
    async fn test_stale_response_is_dropped() {
        let store = CatalogStore::new();
        let older = store.begin_request();
        let newer = store.begin_request();

        // Newer request completes first
        assert!(store.install(newer, vec![product("new")], 1).await);
        // Older response arrives late and must be ignored
        assert!(!store.install(older, vec![product("old")], 1).await);

        let snap = store.snapshot().await;
        assert_eq!(snap.seq, newer);
        assert_eq!(snap.products[0].id, "new");
    }

    #[tokio::test]
    async fn test_reader_sees_last_known_snapshot_during_refetch() {
        let store = CatalogStore::new();
        let seq = store.begin_request();
        store.install(seq, vec![product("a")], 1).await;

        // A new request has been claimed but not completed; readers keep
        // seeing the previous snapshot
        let _in_flight = store.begin_request();
        let snap = store.snapshot().await;
        assert_eq!(snap.products[0].id, "a");
    }
}
