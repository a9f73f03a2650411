//! In-memory lifecycle store for development and testing.
//!
//! Row locking is modelled with one async mutex per asset, held by the
//! transaction handle until commit or drop. Writes are staged on the handle
//! and applied together at commit.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use super::store::{ActorDirectory, LifecycleStore, StoreError};
use crate::models::{ActorProfile, Asset, AuditEntry, ServiceState};

#[derive(Default)]
struct Inner {
    assets: RwLock<HashMap<Uuid, Asset>>,
    audit: RwLock<Vec<AuditEntry>>,
    profiles: RwLock<HashMap<Uuid, ActorProfile>>,
    row_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
    fail_audit_appends: AtomicBool,
    fail_commits: AtomicBool,
    fail_pings: AtomicBool,
}

/// Shared in-memory store. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryLifecycleStore {
    inner: Arc<Inner>,
}

/// Transaction handle for [`InMemoryLifecycleStore`].
pub struct MemoryTx {
    row_guards: Vec<OwnedMutexGuard<()>>,
    staged_assets: Vec<(Asset, ServiceState)>,
    staged_audit: Vec<AuditEntry>,
}

impl InMemoryLifecycleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an asset, standing in for the inventory CRUD.
    pub async fn insert_asset(&self, asset: Asset) {
        self.inner.assets.write().await.insert(asset.id, asset);
    }

    pub async fn insert_profile(&self, profile: ActorProfile) {
        self.inner
            .profiles
            .write()
            .await
            .insert(profile.user_id, profile);
    }

    /// Makes every following `append_audit` fail with a backend error.
    pub fn fail_audit_appends(&self, fail: bool) {
        self.inner.fail_audit_appends.store(fail, Ordering::SeqCst);
    }

    /// Makes every following `commit` fail with a backend error.
    pub fn fail_commits(&self, fail: bool) {
        self.inner.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Makes `ping` report the store as unreachable.
    pub fn fail_pings(&self, fail: bool) {
        self.inner.fail_pings.store(fail, Ordering::SeqCst);
    }

    /// Total number of changelog entries across all assets.
    pub async fn audit_len(&self) -> usize {
        self.inner.audit.read().await.len()
    }

    async fn row_lock(&self, asset_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.inner.row_locks.lock().await;
        locks
            .entry(asset_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[async_trait]
impl LifecycleStore for InMemoryLifecycleStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        Ok(MemoryTx {
            row_guards: Vec::new(),
            staged_assets: Vec::new(),
            staged_audit: Vec::new(),
        })
    }

    async fn load_asset_for_update(
        &self,
        tx: &mut MemoryTx,
        company_id: Uuid,
        asset_id: Uuid,
    ) -> Result<Option<Asset>, StoreError> {
        // No lock entry for ids the caller cannot see
        if self.find_asset(company_id, asset_id).await?.is_none() {
            return Ok(None);
        }

        let guard = self.row_lock(asset_id).await.lock_owned().await;
        tx.row_guards.push(guard);

        self.find_asset(company_id, asset_id).await
    }

    async fn save_asset(
        &self,
        tx: &mut MemoryTx,
        asset: &Asset,
        expected: ServiceState,
    ) -> Result<(), StoreError> {
        let assets = self.inner.assets.read().await;
        match assets.get(&asset.id) {
            Some(current) if current.state() == expected => {
                tx.staged_assets.push((asset.clone(), expected));
                Ok(())
            }
            Some(_) => Err(StoreError::Conflict { asset_id: asset.id }),
            None => Err(StoreError::Backend(format!("asset {} vanished", asset.id))),
        }
    }

    async fn append_audit(&self, tx: &mut MemoryTx, entry: &AuditEntry) -> Result<(), StoreError> {
        if self.inner.fail_audit_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("audit append failed".to_string()));
        }
        tx.staged_audit.push(entry.clone());
        Ok(())
    }

    async fn commit(&self, tx: MemoryTx) -> Result<(), StoreError> {
        if self.inner.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("commit failed".to_string()));
        }

        let MemoryTx {
            row_guards,
            staged_assets,
            staged_audit,
        } = tx;

        let mut assets = self.inner.assets.write().await;
        for (asset, expected) in &staged_assets {
            let matches = assets
                .get(&asset.id)
                .map(|current| current.state() == *expected)
                .unwrap_or(false);
            if !matches {
                return Err(StoreError::Conflict { asset_id: asset.id });
            }
        }

        let mut audit = self.inner.audit.write().await;
        for (asset, _) in staged_assets {
            assets.insert(asset.id, asset);
        }
        audit.extend(staged_audit);

        drop(audit);
        drop(assets);
        drop(row_guards);
        Ok(())
    }

    async fn find_asset(
        &self,
        company_id: Uuid,
        asset_id: Uuid,
    ) -> Result<Option<Asset>, StoreError> {
        Ok(self
            .inner
            .assets
            .read()
            .await
            .get(&asset_id)
            .filter(|asset| asset.company_id == company_id)
            .cloned())
    }

    async fn list_audit(
        &self,
        company_id: Uuid,
        asset_id: Uuid,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        let mut entries: Vec<AuditEntry> = self
            .inner
            .audit
            .read()
            .await
            .iter()
            .filter(|e| e.asset_id == asset_id && e.company_id == company_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.inner.fail_pings.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("store unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ActorDirectory for InMemoryLifecycleStore {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<ActorProfile>, StoreError> {
        Ok(self.inner.profiles.read().await.get(&user_id).cloned())
    }
}
