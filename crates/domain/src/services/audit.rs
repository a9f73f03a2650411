//! Changelog entry construction for lifecycle transitions.
//!
//! Entries are built here and handed to the store inside the same transaction
//! as the asset update.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::models::{
    ActorContext, Asset, AssetAction, AuditEntry, OutOfServiceCommand, ReturnToServiceCommand,
    ServiceOutPayload, ServiceReturnPayload, StatusChangedPayload,
};

/// Builder for changelog entries with a fluent API.
#[derive(Debug, Clone)]
pub struct AuditEntryBuilder {
    asset_id: Uuid,
    company_id: Uuid,
    actor_id: Uuid,
    actor_name: String,
    action: AssetAction,
    payload: JsonValue,
    timestamp: DateTime<Utc>,
}

impl AuditEntryBuilder {
    /// Start an entry for an action taken by `actor` on `asset`.
    pub fn user_action(
        asset: &Asset,
        actor: &ActorContext,
        actor_name: impl Into<String>,
        action: AssetAction,
    ) -> Self {
        Self {
            asset_id: asset.id,
            company_id: asset.company_id,
            actor_id: actor.user_id,
            actor_name: actor_name.into(),
            action,
            payload: JsonValue::Null,
            timestamp: Utc::now(),
        }
    }

    /// Attach a serializable payload.
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        self.payload = serde_json::to_value(payload).unwrap_or(JsonValue::Null);
        self
    }

    /// Override the entry timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn build(self) -> AuditEntry {
        AuditEntry {
            id: Uuid::new_v4(),
            asset_id: self.asset_id,
            company_id: self.company_id,
            actor_id: self.actor_id,
            actor_name: self.actor_name,
            action: self.action,
            payload: self.payload,
            timestamp: self.timestamp,
        }
    }
}

/// Helper functions for the entries each transition writes.
pub mod audit_helpers {
    use super::*;

    /// Entries for an out-of-service transition.
    ///
    /// The `status_changed` summary is only produced when `with_summary` is set.
    pub fn service_out(
        asset: &Asset,
        actor: &ActorContext,
        actor_name: &str,
        command: &OutOfServiceCommand,
        now: DateTime<Utc>,
        with_summary: bool,
    ) -> Vec<AuditEntry> {
        let payload = ServiceOutPayload {
            date: command.date_input.clone(),
            reason: command.reason.clone(),
            reported_by: command.reported_by.clone(),
            notes: command.notes.clone(),
        };

        let mut entries = vec![
            AuditEntryBuilder::user_action(asset, actor, actor_name, AssetAction::ServiceOut)
                .with_payload(&payload)
                .at(now)
                .build(),
        ];

        if with_summary {
            entries.push(status_changed(asset, actor, actor_name, payload.summary(), true, now));
        }
        entries
    }

    /// Entries for a return-to-service transition.
    pub fn service_return(
        asset: &Asset,
        actor: &ActorContext,
        actor_name: &str,
        command: &ReturnToServiceCommand,
        now: DateTime<Utc>,
        with_summary: bool,
    ) -> Vec<AuditEntry> {
        let payload = ServiceReturnPayload {
            date: command.date_input.clone(),
            resolved_by: command.resolved_by.clone(),
            verified_by: actor_name.to_string(),
            notes: command.notes.clone(),
        };

        let mut entries = vec![AuditEntryBuilder::user_action(
            asset,
            actor,
            actor_name,
            AssetAction::ServiceReturn,
        )
        .with_payload(&payload)
        .at(now)
        .build()];

        if with_summary {
            entries.push(status_changed(asset, actor, actor_name, payload.summary(), false, now));
        }
        entries
    }

    fn status_changed(
        asset: &Asset,
        actor: &ActorContext,
        actor_name: &str,
        message: String,
        is_out_of_service: bool,
        now: DateTime<Utc>,
    ) -> AuditEntry {
        AuditEntryBuilder::user_action(asset, actor, actor_name, AssetAction::StatusChanged)
            .with_payload(&StatusChangedPayload {
                message,
                is_out_of_service,
            })
            .at(now)
            .build()
    }
}
