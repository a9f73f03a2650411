//! Asset entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle columns of the assets table.
#[derive(Debug, Clone, FromRow)]
pub struct AssetEntity {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub is_out_of_service: bool,
    pub out_of_service_date: Option<NaiveDate>,
    pub out_of_service_reason: Option<String>,
    pub return_to_service_verified: Option<bool>,
    pub return_to_service_verified_at: Option<NaiveDate>,
    pub return_to_service_verified_by: Option<String>,
    pub return_to_service_notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<AssetEntity> for domain::models::Asset {
    fn from(entity: AssetEntity) -> Self {
        Self {
            id: entity.id,
            company_id: entity.company_id,
            name: entity.name,
            is_out_of_service: entity.is_out_of_service,
            out_of_service_date: entity.out_of_service_date,
            out_of_service_reason: entity.out_of_service_reason,
            return_to_service_verified: entity.return_to_service_verified,
            return_to_service_verified_at: entity.return_to_service_verified_at,
            return_to_service_verified_by: entity.return_to_service_verified_by,
            return_to_service_notes: entity.return_to_service_notes,
            updated_at: entity.updated_at,
        }
    }
}
