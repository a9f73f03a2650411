//! Storage seams for the service lifecycle.
//!
//! ## Transaction semantics
//!
//! Mutations go through a transaction handle (`LifecycleStore::Tx`):
//!
//! 1. `begin()`
//! 2. `load_asset_for_update()` locks the asset row until the handle is
//!    committed or dropped, serializing transitions on the same asset
//! 3. `save_asset()` and `append_audit()` stage writes
//! 4. `commit()` makes all staged writes visible at once
//!
//! Dropping a handle without committing discards every staged write.
//!
//! `save_asset` is conditional on the stored service state matching
//! `expected`. A mismatch is reported as `StoreError::Conflict`.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ActorProfile, Asset, AuditEntry, ServiceState};

/// Errors returned by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored service state no longer matches what the caller read.
    #[error("asset {asset_id} was modified concurrently")]
    Conflict { asset_id: Uuid },

    /// Connection, query or serialization failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Asset and changelog persistence used by the lifecycle manager.
#[async_trait]
pub trait LifecycleStore: Send + Sync + 'static {
    /// Transaction handle.
    type Tx: Send;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    /// Loads an asset within the caller's tenant and locks it for the
    /// lifetime of `tx`. Returns `None` for unknown assets and for assets
    /// owned by another company.
    async fn load_asset_for_update(
        &self,
        tx: &mut Self::Tx,
        company_id: Uuid,
        asset_id: Uuid,
    ) -> Result<Option<Asset>, StoreError>;

    /// Writes the lifecycle fields of `asset` if its stored state is still `expected`.
    async fn save_asset(
        &self,
        tx: &mut Self::Tx,
        asset: &Asset,
        expected: ServiceState,
    ) -> Result<(), StoreError>;

    async fn append_audit(&self, tx: &mut Self::Tx, entry: &AuditEntry) -> Result<(), StoreError>;

    async fn commit(&self, tx: Self::Tx) -> Result<(), StoreError>;

    /// Reads an asset without locking.
    async fn find_asset(
        &self,
        company_id: Uuid,
        asset_id: Uuid,
    ) -> Result<Option<Asset>, StoreError>;

    /// Changelog entries of an asset, oldest first.
    async fn list_audit(
        &self,
        company_id: Uuid,
        asset_id: Uuid,
    ) -> Result<Vec<AuditEntry>, StoreError>;

    /// Cheap connectivity check for health probes.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Lookup of user profiles for audit attribution.
#[async_trait]
pub trait ActorDirectory: Send + Sync + 'static {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<ActorProfile>, StoreError>;
}
