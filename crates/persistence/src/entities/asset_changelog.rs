//! Asset changelog entity.

use chrono::{DateTime, Utc};
use domain::models::{AssetAction, AuditEntry};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database row mapping for the asset_changelog table.
#[derive(Debug, Clone, FromRow)]
pub struct AssetChangelogEntity {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub company_id: Uuid,
    pub actor_id: Uuid,
    pub actor_name: String,
    /// Stored as the snake_case action name.
    pub action: String,
    pub payload: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AssetChangelogEntity> for AuditEntry {
    type Error = String;

    fn try_from(entity: AssetChangelogEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            asset_id: entity.asset_id,
            company_id: entity.company_id,
            actor_id: entity.actor_id,
            actor_name: entity.actor_name,
            action: AssetAction::from_str(&entity.action)?,
            payload: entity.payload,
            timestamp: entity.created_at,
        })
    }
}
