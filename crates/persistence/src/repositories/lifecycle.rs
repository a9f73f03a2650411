//! PostgreSQL store for the asset service lifecycle.
//!
//! A transition holds `SELECT ... FOR UPDATE` on the asset row for the whole
//! transaction, so concurrent transitions on one asset run one after another.
//! The state update is additionally conditional on the state that was read.

use async_trait::async_trait;
use domain::models::{Asset, AuditEntry, ServiceState};
use domain::services::{LifecycleStore, StoreError};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::entities::{AssetChangelogEntity, AssetEntity};
use crate::metrics::QueryTimer;

const ASSET_COLUMNS: &str = r#"
    id, company_id, name, is_out_of_service, out_of_service_date, out_of_service_reason,
    return_to_service_verified, return_to_service_verified_at, return_to_service_verified_by,
    return_to_service_notes, updated_at
"#;

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Lifecycle store backed by the assets and asset_changelog tables.
#[derive(Clone)]
pub struct PgLifecycleStore {
    pool: PgPool,
}

impl PgLifecycleStore {
    /// Creates a new PgLifecycleStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LifecycleStore for PgLifecycleStore {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        self.pool.begin().await.map_err(backend)
    }

    async fn load_asset_for_update(
        &self,
        tx: &mut Self::Tx,
        company_id: Uuid,
        asset_id: Uuid,
    ) -> Result<Option<Asset>, StoreError> {
        let timer = QueryTimer::new("lock_asset_for_update");
        let result = sqlx::query_as::<_, AssetEntity>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1 AND company_id = $2 FOR UPDATE"
        ))
        .bind(asset_id)
        .bind(company_id)
        .fetch_optional(&mut **tx)
        .await;
        timer.record();

        Ok(result.map_err(backend)?.map(Asset::from))
    }

    async fn save_asset(
        &self,
        tx: &mut Self::Tx,
        asset: &Asset,
        expected: ServiceState,
    ) -> Result<(), StoreError> {
        let timer = QueryTimer::new("update_asset_service_state");
        let result = sqlx::query(
            r#"
            UPDATE assets
            SET is_out_of_service = $1,
                out_of_service_date = $2,
                out_of_service_reason = $3,
                return_to_service_verified = $4,
                return_to_service_verified_at = $5,
                return_to_service_verified_by = $6,
                return_to_service_notes = $7,
                updated_at = $8
            WHERE id = $9 AND company_id = $10 AND is_out_of_service = $11
            "#,
        )
        .bind(asset.is_out_of_service)
        .bind(asset.out_of_service_date)
        .bind(&asset.out_of_service_reason)
        .bind(asset.return_to_service_verified)
        .bind(asset.return_to_service_verified_at)
        .bind(&asset.return_to_service_verified_by)
        .bind(&asset.return_to_service_notes)
        .bind(asset.updated_at)
        .bind(asset.id)
        .bind(asset.company_id)
        .bind(expected.is_out_of_service())
        .execute(&mut **tx)
        .await;
        timer.record();

        if result.map_err(backend)?.rows_affected() == 0 {
            tracing::warn!(
                asset_id = %asset.id,
                expected = %expected,
                "Conditional asset update matched no row"
            );
            return Err(StoreError::Conflict { asset_id: asset.id });
        }
        Ok(())
    }

    async fn append_audit(&self, tx: &mut Self::Tx, entry: &AuditEntry) -> Result<(), StoreError> {
        let timer = QueryTimer::new("insert_asset_changelog");
        let result = sqlx::query(
            r#"
            INSERT INTO asset_changelog (
                id, asset_id, company_id, actor_id, actor_name, action, payload, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id)
        .bind(entry.asset_id)
        .bind(entry.company_id)
        .bind(entry.actor_id)
        .bind(&entry.actor_name)
        .bind(entry.action.to_string())
        .bind(&entry.payload)
        .bind(entry.timestamp)
        .execute(&mut **tx)
        .await;
        timer.record();

        result.map(|_| ()).map_err(backend)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), StoreError> {
        tx.commit().await.map_err(backend)
    }

    async fn find_asset(
        &self,
        company_id: Uuid,
        asset_id: Uuid,
    ) -> Result<Option<Asset>, StoreError> {
        let timer = QueryTimer::new("find_asset_by_id");
        let result = sqlx::query_as::<_, AssetEntity>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1 AND company_id = $2"
        ))
        .bind(asset_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result.map_err(backend)?.map(Asset::from))
    }

    async fn list_audit(
        &self,
        company_id: Uuid,
        asset_id: Uuid,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        let timer = QueryTimer::new("list_asset_changelog");
        let result = sqlx::query_as::<_, AssetChangelogEntity>(
            r#"
            SELECT id, asset_id, company_id, actor_id, actor_name, action, payload, created_at
            FROM asset_changelog
            WHERE asset_id = $1 AND company_id = $2
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(asset_id)
        .bind(company_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        result
            .map_err(backend)?
            .into_iter()
            .map(|row| AuditEntry::try_from(row).map_err(StoreError::Backend))
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(backend)
    }
}
