//! Asset changelog (audit) domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use uuid::Uuid;

/// Changelog actions written by the service lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetAction {
    /// Structured out-of-service record.
    ServiceOut,
    /// Structured return-to-service record.
    ServiceReturn,
    /// Human-readable status summary.
    StatusChanged,
}

impl FromStr for AssetAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "service_out" => Ok(AssetAction::ServiceOut),
            "service_return" => Ok(AssetAction::ServiceReturn),
            "status_changed" => Ok(AssetAction::StatusChanged),
            _ => Err(format!("Unknown asset action: {}", s)),
        }
    }
}

impl std::fmt::Display for AssetAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AssetAction::ServiceOut => "service_out",
            AssetAction::ServiceReturn => "service_return",
            AssetAction::StatusChanged => "status_changed",
        };
        write!(f, "{}", s)
    }
}

/// Payload of a `service_out` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOutPayload {
    pub date: String,
    pub reason: String,
    pub reported_by: String,
    pub notes: Option<String>,
}

/// Payload of a `service_return` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceReturnPayload {
    pub date: String,
    pub resolved_by: String,
    pub verified_by: String,
    pub notes: Option<String>,
}

/// Payload of a `status_changed` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangedPayload {
    pub message: String,
    pub is_out_of_service: bool,
}

impl ServiceOutPayload {
    pub fn summary(&self) -> String {
        format!("Marked as out of service: {}", self.reason)
    }
}

impl ServiceReturnPayload {
    pub fn summary(&self) -> String {
        format!(
            "Returned to service (resolved by {}, verified by {})",
            self.resolved_by, self.verified_by
        )
    }
}

/// Immutable changelog entry.
///
/// The payload is the transition input as it was at write time; it is never
/// re-derived from the asset's current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub company_id: Uuid,
    pub actor_id: Uuid,
    pub actor_name: String,
    pub action: AssetAction,
    pub payload: JsonValue,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    /// Human-readable line for display.
    ///
    /// Falls back to the action name when the stored payload does not match
    /// the expected shape.
    pub fn summary(&self) -> String {
        let parsed = match self.action {
            AssetAction::ServiceOut => {
                serde_json::from_value::<ServiceOutPayload>(self.payload.clone())
                    .ok()
                    .map(|p| p.summary())
            }
            AssetAction::ServiceReturn => {
                serde_json::from_value::<ServiceReturnPayload>(self.payload.clone())
                    .ok()
                    .map(|p| p.summary())
            }
            AssetAction::StatusChanged => self
                .payload
                .get("message")
                .and_then(JsonValue::as_str)
                .map(String::from),
        };

        parsed.unwrap_or_else(|| self.action.to_string())
    }
}

/// Changelog item returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntryView {
    #[serde(flatten)]
    pub entry: AuditEntry,
    pub summary: String,
}

impl From<AuditEntry> for AuditEntryView {
    fn from(entry: AuditEntry) -> Self {
        let summary = entry.summary();
        Self { entry, summary }
    }
}

/// Response for an asset changelog listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogResponse {
    pub data: Vec<AuditEntryView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(action: AssetAction, payload: JsonValue) -> AuditEntry {
        AuditEntry {
            id: Uuid::new_v4(),
            asset_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            actor_id: Uuid::new_v4(),
            actor_name: "A. Patel".to_string(),
            action,
            payload,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_action_from_str_and_display() {
        for action in [
            AssetAction::ServiceOut,
            AssetAction::ServiceReturn,
            AssetAction::StatusChanged,
        ] {
            assert_eq!(AssetAction::from_str(&action.to_string()).unwrap(), action);
        }
        assert!(AssetAction::from_str("decommissioned").is_err());
    }

    #[test]
    fn test_service_out_summary() {
        let e = entry(
            AssetAction::ServiceOut,
            json!({"date": "2024-01-10", "reason": "sensor drift", "reportedBy": "J. Lee", "notes": null}),
        );
        assert_eq!(e.summary(), "Marked as out of service: sensor drift");
    }

    #[test]
    fn test_service_return_summary() {
        let e = entry(
            AssetAction::ServiceReturn,
            json!({"date": "2024-01-12", "resolvedBy": "J. Lee", "verifiedBy": "A. Patel", "notes": null}),
        );
        assert_eq!(
            e.summary(),
            "Returned to service (resolved by J. Lee, verified by A. Patel)"
        );
    }

    #[test]
    fn test_summary_falls_back_on_unexpected_payload() {
        let e = entry(AssetAction::ServiceOut, json!({"legacy": true}));
        assert_eq!(e.summary(), "service_out");
    }

    #[test]
    fn test_view_flattens_entry() {
        let e = entry(
            AssetAction::StatusChanged,
            json!({"message": "Marked as out of service: drift", "isOutOfService": true}),
        );
        let view = AuditEntryView::from(e);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["action"], "status_changed");
        assert_eq!(json["summary"], "Marked as out of service: drift");
        assert_eq!(json["actorName"], "A. Patel");
    }
}
