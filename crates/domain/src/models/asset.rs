//! Asset lifecycle domain model.
//!
//! Only the fields owned by the out-of-service / return-to-service lifecycle
//! live here. Calibration and maintenance fields belong to the inventory CRUD.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::lifecycle_request::{OutOfServiceCommand, ReturnToServiceCommand};

/// Service state of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    InService,
    OutOfService,
}

impl ServiceState {
    /// Maps the persisted flag onto the state enum.
    pub fn from_flag(is_out_of_service: bool) -> Self {
        if is_out_of_service {
            ServiceState::OutOfService
        } else {
            ServiceState::InService
        }
    }

    pub fn is_out_of_service(self) -> bool {
        matches!(self, ServiceState::OutOfService)
    }
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceState::InService => write!(f, "in_service"),
            ServiceState::OutOfService => write!(f, "out_of_service"),
        }
    }
}

/// Rejected lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("already out of service")]
    AlreadyOutOfService,

    #[error("not out of service")]
    NotOutOfService,
}

/// Asset as seen by the service lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
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

impl Asset {
    /// A freshly registered asset. Every asset starts in service.
    pub fn new(company_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id,
            name: name.into(),
            is_out_of_service: false,
            out_of_service_date: None,
            out_of_service_reason: None,
            return_to_service_verified: None,
            return_to_service_verified_at: None,
            return_to_service_verified_by: None,
            return_to_service_notes: None,
            updated_at: Utc::now(),
        }
    }

    pub fn state(&self) -> ServiceState {
        ServiceState::from_flag(self.is_out_of_service)
    }

    /// Returns the asset as it looks after being pulled from service.
    ///
    /// Any verification data from a previous return is cleared so it cannot
    /// leak into the new out-of-service period.
    pub fn mark_out_of_service(
        &self,
        command: &OutOfServiceCommand,
        now: DateTime<Utc>,
    ) -> Result<Asset, TransitionError> {
        match self.state() {
            ServiceState::OutOfService => Err(TransitionError::AlreadyOutOfService),
            ServiceState::InService => Ok(Asset {
                is_out_of_service: true,
                out_of_service_date: Some(command.date),
                out_of_service_reason: Some(command.reason.clone()),
                return_to_service_verified: None,
                return_to_service_verified_at: None,
                return_to_service_verified_by: None,
                return_to_service_notes: None,
                updated_at: now,
                ..self.clone()
            }),
        }
    }

    /// Returns the asset as it looks after a verified return to service.
    ///
    /// The last out-of-service date and reason are kept as history until the
    /// next out-of-service event overwrites them.
    pub fn return_to_service(
        &self,
        command: &ReturnToServiceCommand,
        verified_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Asset, TransitionError> {
        match self.state() {
            ServiceState::InService => Err(TransitionError::NotOutOfService),
            ServiceState::OutOfService => Ok(Asset {
                is_out_of_service: false,
                return_to_service_verified: Some(true),
                return_to_service_verified_at: Some(command.date),
                return_to_service_verified_by: Some(verified_by.to_string()),
                return_to_service_notes: command.notes.clone(),
                updated_at: now,
                ..self.clone()
            }),
        }
    }

    /// True when no return-to-service field is set.
    pub fn return_fields_cleared(&self) -> bool {
        self.return_to_service_verified.is_none()
            && self.return_to_service_verified_at.is_none()
            && self.return_to_service_verified_by.is_none()
            && self.return_to_service_notes.is_none()
    }
}
