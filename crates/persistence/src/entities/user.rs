//! User profile entity (database row mapping).

use sqlx::FromRow;
use uuid::Uuid;

/// Name columns of the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserProfileEntity {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<UserProfileEntity> for domain::models::ActorProfile {
    fn from(entity: UserProfileEntity) -> Self {
        Self {
            user_id: entity.id,
            first_name: entity.first_name,
            last_name: entity.last_name,
        }
    }
}
