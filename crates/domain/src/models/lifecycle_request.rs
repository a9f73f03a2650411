//! Request payloads for the service lifecycle transitions.
//!
//! Requests arrive loosely typed (every field optional) and are turned into
//! commands by `into_command`, which checks fields in a fixed order and
//! reports the first failure.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::validation::{parse_service_date, require_present};
use validator::{Validate, ValidationError, ValidationErrors};

/// Request to pull an asset out of service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MarkOutOfServiceRequest {
    pub date: Option<String>,

    #[validate(length(max = 500, message = "reason must be at most 500 characters"))]
    pub reason: Option<String>,

    #[validate(length(max = 200, message = "reportedBy must be at most 200 characters"))]
    pub reported_by: Option<String>,

    #[validate(length(max = 2000, message = "notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Request to return an asset to service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReturnToServiceRequest {
    pub date: Option<String>,

    #[validate(length(max = 200, message = "resolvedBy must be at most 200 characters"))]
    pub resolved_by: Option<String>,

    #[validate(length(max = 2000, message = "notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Validated out-of-service input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutOfServiceCommand {
    pub date: NaiveDate,
    /// The date exactly as supplied, kept for the changelog payload.
    pub date_input: String,
    pub reason: String,
    pub reported_by: String,
    pub notes: Option<String>,
}

/// Validated return-to-service input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnToServiceCommand {
    pub date: NaiveDate,
    pub date_input: String,
    pub resolved_by: String,
    pub notes: Option<String>,
}

impl MarkOutOfServiceRequest {
    /// Checks `date`, `reason`, `reportedBy` in that order, then length limits.
    pub fn into_command(self) -> Result<OutOfServiceCommand, ValidationError> {
        let date_input = require_present("date", self.date.as_deref())?;
        let reason = require_present("reason", self.reason.as_deref())?;
        let reported_by = require_present("reportedBy", self.reported_by.as_deref())?;
        let date = parse_service_date(&date_input)?;
        self.validate().map_err(|e| first_field_error(&e))?;

        Ok(OutOfServiceCommand {
            date,
            date_input,
            reason,
            reported_by,
            notes: normalize_notes(self.notes),
        })
    }
}

impl ReturnToServiceRequest {
    /// Checks `date`, `resolvedBy` in that order, then length limits.
    pub fn into_command(self) -> Result<ReturnToServiceCommand, ValidationError> {
        let date_input = require_present("date", self.date.as_deref())?;
        let resolved_by = require_present("resolvedBy", self.resolved_by.as_deref())?;
        let date = parse_service_date(&date_input)?;
        self.validate().map_err(|e| first_field_error(&e))?;

        Ok(ReturnToServiceCommand {
            date,
            date_input,
            resolved_by,
            notes: normalize_notes(self.notes),
        })
    }
}

/// Blank notes are stored as absent.
fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

fn first_field_error(errors: &ValidationErrors) -> ValidationError {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .next()
        .cloned()
        .unwrap_or_else(|| ValidationError::new("invalid"))
}
