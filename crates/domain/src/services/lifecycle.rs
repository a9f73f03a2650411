//! Out-of-service / return-to-service lifecycle manager.
//!
//! Each transition runs as one unit per asset: lock the asset, check its
//! state, write the new state and append the changelog entries, then commit.
//! Business failures (validation, not found, conflict) are returned to the
//! caller. Storage failures are logged as operational faults.

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::ValidationError;

use super::audit::audit_helpers;
use super::store::{ActorDirectory, LifecycleStore, StoreError};
use crate::models::{
    display_name_or_unknown, ActorContext, Asset, AuditEntry, MarkOutOfServiceRequest,
    ReturnToServiceRequest, TransitionError,
};

/// Errors returned by lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{0}")]
    Validation(String),

    #[error("asset {0} not found")]
    NotFound(Uuid),

    #[error("{0}")]
    Conflict(String),

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl From<ValidationError> for LifecycleError {
    fn from(err: ValidationError) -> Self {
        let message = err
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.code.to_string());
        LifecycleError::Validation(message)
    }
}

impl From<TransitionError> for LifecycleError {
    fn from(err: TransitionError) -> Self {
        LifecycleError::Conflict(err.to_string())
    }
}

/// Tunables for the lifecycle manager.
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Also write a prose `status_changed` entry next to each structured entry.
    pub record_status_summary: bool,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            record_status_summary: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionKind {
    OutOfService,
    ReturnToService,
}

impl TransitionKind {
    fn label(self) -> &'static str {
        match self {
            TransitionKind::OutOfService => "service_out",
            TransitionKind::ReturnToService => "service_return",
        }
    }

    /// The conflict a lost race maps to.
    fn conflict(self) -> TransitionError {
        match self {
            TransitionKind::OutOfService => TransitionError::AlreadyOutOfService,
            TransitionKind::ReturnToService => TransitionError::NotOutOfService,
        }
    }
}

/// Where in a transition a storage call failed.
#[derive(Debug, Clone, Copy)]
enum Stage {
    Begin,
    Load,
    Save,
    AppendAudit,
    Commit,
}

impl Stage {
    fn as_str(self) -> &'static str {
        match self {
            Stage::Begin => "begin",
            Stage::Load => "load",
            Stage::Save => "save",
            Stage::AppendAudit => "append_audit",
            Stage::Commit => "commit",
        }
    }

    /// A failed commit leaves the outcome unknown to us.
    fn consistency_risk(self) -> bool {
        matches!(self, Stage::Commit)
    }
}

/// Object-safe facade over the lifecycle manager for the HTTP layer.
#[async_trait]
pub trait AssetLifecycle: Send + Sync {
    async fn mark_out_of_service(
        &self,
        actor: &ActorContext,
        asset_id: Uuid,
        request: MarkOutOfServiceRequest,
    ) -> Result<Asset, LifecycleError>;

    async fn return_to_service(
        &self,
        actor: &ActorContext,
        asset_id: Uuid,
        request: ReturnToServiceRequest,
    ) -> Result<Asset, LifecycleError>;

    async fn service_status(
        &self,
        actor: &ActorContext,
        asset_id: Uuid,
    ) -> Result<Asset, LifecycleError>;

    async fn changelog(
        &self,
        actor: &ActorContext,
        asset_id: Uuid,
    ) -> Result<Vec<AuditEntry>, LifecycleError>;

    async fn store_healthy(&self) -> bool;
}

/// Owns the service lifecycle of inventory assets.
pub struct ServiceLifecycleManager<S, D> {
    store: S,
    directory: D,
    options: LifecycleOptions,
}

impl<S, D> ServiceLifecycleManager<S, D>
where
    S: LifecycleStore,
    D: ActorDirectory,
{
    pub fn new(store: S, directory: D, options: LifecycleOptions) -> Self {
        Self {
            store,
            directory,
            options,
        }
    }

    /// Pulls an asset out of service.
    pub async fn mark_out_of_service(
        &self,
        actor: &ActorContext,
        asset_id: Uuid,
        request: MarkOutOfServiceRequest,
    ) -> Result<Asset, LifecycleError> {
        let command = request.into_command()?;
        let actor_name = self.resolve_actor_name(actor).await?;
        let with_summary = self.options.record_status_summary;

        let asset = self
            .transition(actor, asset_id, TransitionKind::OutOfService, |current| {
                let now = Utc::now();
                let updated = current.mark_out_of_service(&command, now)?;
                let entries = audit_helpers::service_out(
                    &updated,
                    actor,
                    &actor_name,
                    &command,
                    now,
                    with_summary,
                );
                Ok((updated, entries))
            })
            .await?;

        info!(
            asset_id = %asset.id,
            company_id = %actor.company_id,
            user_id = %actor.user_id,
            reason = %command.reason,
            "Asset marked out of service"
        );
        Ok(asset)
    }

    /// Returns an asset to service, attributing verification to the actor.
    pub async fn return_to_service(
        &self,
        actor: &ActorContext,
        asset_id: Uuid,
        request: ReturnToServiceRequest,
    ) -> Result<Asset, LifecycleError> {
        let command = request.into_command()?;
        let verified_by = self.resolve_actor_name(actor).await?;
        let with_summary = self.options.record_status_summary;

        let asset = self
            .transition(actor, asset_id, TransitionKind::ReturnToService, |current| {
                let now = Utc::now();
                let updated = current.return_to_service(&command, &verified_by, now)?;
                let entries = audit_helpers::service_return(
                    &updated,
                    actor,
                    &verified_by,
                    &command,
                    now,
                    with_summary,
                );
                Ok((updated, entries))
            })
            .await?;

        info!(
            asset_id = %asset.id,
            company_id = %actor.company_id,
            user_id = %actor.user_id,
            verified_by = %verified_by,
            "Asset returned to service"
        );
        Ok(asset)
    }

    /// Current lifecycle view of an asset.
    pub async fn service_status(
        &self,
        actor: &ActorContext,
        asset_id: Uuid,
    ) -> Result<Asset, LifecycleError> {
        self.store
            .find_asset(actor.company_id, asset_id)
            .await?
            .ok_or(LifecycleError::NotFound(asset_id))
    }

    /// Changelog of an asset, oldest first.
    pub async fn changelog(
        &self,
        actor: &ActorContext,
        asset_id: Uuid,
    ) -> Result<Vec<AuditEntry>, LifecycleError> {
        if self
            .store
            .find_asset(actor.company_id, asset_id)
            .await?
            .is_none()
        {
            return Err(LifecycleError::NotFound(asset_id));
        }
        Ok(self.store.list_audit(actor.company_id, asset_id).await?)
    }

    async fn resolve_actor_name(&self, actor: &ActorContext) -> Result<String, LifecycleError> {
        let profile = self
            .directory
            .find_profile(actor.user_id)
            .await
            .map_err(|e| {
                error!(user_id = %actor.user_id, error = %e, "Failed to resolve actor profile");
                LifecycleError::Store(e)
            })?;
        Ok(display_name_or_unknown(profile.as_ref()))
    }

    /// Runs `build` against the locked asset and persists its result atomically.
    async fn transition<F>(
        &self,
        actor: &ActorContext,
        asset_id: Uuid,
        kind: TransitionKind,
        build: F,
    ) -> Result<Asset, LifecycleError>
    where
        F: FnOnce(&Asset) -> Result<(Asset, Vec<AuditEntry>), TransitionError> + Send,
    {
        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|e| self.store_failure(kind, asset_id, Stage::Begin, e))?;

        let current = self
            .store
            .load_asset_for_update(&mut tx, actor.company_id, asset_id)
            .await
            .map_err(|e| self.store_failure(kind, asset_id, Stage::Load, e))?
            .ok_or(LifecycleError::NotFound(asset_id))?;

        let expected = current.state();
        let (updated, entries) = build(&current).map_err(|e| {
            warn!(
                asset_id = %asset_id,
                action = kind.label(),
                state = %expected,
                "Rejected lifecycle transition: {}",
                e
            );
            LifecycleError::from(e)
        })?;

        self.store
            .save_asset(&mut tx, &updated, expected)
            .await
            .map_err(|e| self.store_failure(kind, asset_id, Stage::Save, e))?;

        for entry in &entries {
            self.store
                .append_audit(&mut tx, entry)
                .await
                .map_err(|e| self.store_failure(kind, asset_id, Stage::AppendAudit, e))?;
        }

        self.store
            .commit(tx)
            .await
            .map_err(|e| self.store_failure(kind, asset_id, Stage::Commit, e))?;

        Ok(updated)
    }

    fn store_failure(
        &self,
        kind: TransitionKind,
        asset_id: Uuid,
        stage: Stage,
        err: StoreError,
    ) -> LifecycleError {
        match err {
            StoreError::Conflict { .. } => {
                warn!(
                    asset_id = %asset_id,
                    action = kind.label(),
                    stage = stage.as_str(),
                    "Lost lifecycle race on asset"
                );
                LifecycleError::from(kind.conflict())
            }
            StoreError::Backend(_) => {
                error!(
                    asset_id = %asset_id,
                    action = kind.label(),
                    stage = stage.as_str(),
                    consistency_risk = stage.consistency_risk(),
                    error = %err,
                    "Lifecycle transition failed in storage"
                );
                LifecycleError::Store(err)
            }
        }
    }
}

#[async_trait]
impl<S, D> AssetLifecycle for ServiceLifecycleManager<S, D>
where
    S: LifecycleStore,
    D: ActorDirectory,
{
    async fn mark_out_of_service(
        &self,
        actor: &ActorContext,
        asset_id: Uuid,
        request: MarkOutOfServiceRequest,
    ) -> Result<Asset, LifecycleError> {
        ServiceLifecycleManager::mark_out_of_service(self, actor, asset_id, request).await
    }

    async fn return_to_service(
        &self,
        actor: &ActorContext,
        asset_id: Uuid,
        request: ReturnToServiceRequest,
    ) -> Result<Asset, LifecycleError> {
        ServiceLifecycleManager::return_to_service(self, actor, asset_id, request).await
    }

    async fn service_status(
        &self,
        actor: &ActorContext,
        asset_id: Uuid,
    ) -> Result<Asset, LifecycleError> {
        ServiceLifecycleManager::service_status(self, actor, asset_id).await
    }

    async fn changelog(
        &self,
        actor: &ActorContext,
        asset_id: Uuid,
    ) -> Result<Vec<AuditEntry>, LifecycleError> {
        ServiceLifecycleManager::changelog(self, actor, asset_id).await
    }

    async fn store_healthy(&self) -> bool {
        self.store.ping().await.is_ok()
    }
}
