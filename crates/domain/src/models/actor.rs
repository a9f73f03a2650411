//! Acting user identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Label used when a profile cannot produce a full name.
pub const UNKNOWN_USER: &str = "Unknown User";

/// The user on whose behalf a lifecycle operation runs.
///
/// Built from the validated access token and passed explicitly into every
/// manager call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorContext {
    pub user_id: Uuid,
    pub company_id: Uuid,
}

impl ActorContext {
    pub fn new(user_id: Uuid, company_id: Uuid) -> Self {
        Self {
            user_id,
            company_id,
        }
    }
}

/// Profile fields used for audit attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorProfile {
    pub user_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ActorProfile {
    /// "First Last", or [`UNKNOWN_USER`] unless both names are present.
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().map(str::trim).unwrap_or_default();
        let last = self.last_name.as_deref().map(str::trim).unwrap_or_default();

        if first.is_empty() || last.is_empty() {
            UNKNOWN_USER.to_string()
        } else {
            format!("{} {}", first, last)
        }
    }
}

/// Display name for an optional profile lookup result.
pub fn display_name_or_unknown(profile: Option<&ActorProfile>) -> String {
    profile
        .map(ActorProfile::display_name)
        .unwrap_or_else(|| UNKNOWN_USER.to_string())
}
