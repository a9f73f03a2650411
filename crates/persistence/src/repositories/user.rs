//! User directory for audit attribution.

use async_trait::async_trait;
use domain::models::ActorProfile;
use domain::services::{ActorDirectory, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UserProfileEntity;
use crate::metrics::QueryTimer;

/// Reads user names from the users table.
#[derive(Clone)]
pub struct UserDirectory {
    pool: PgPool,
}

impl UserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActorDirectory for UserDirectory {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<ActorProfile>, StoreError> {
        let timer = QueryTimer::new("find_user_profile");
        let result = sqlx::query_as::<_, UserProfileEntity>(
            r#"
            SELECT id, first_name, last_name
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        result
            .map(|row| row.map(ActorProfile::from))
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}
