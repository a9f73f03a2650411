//! Asset service lifecycle endpoint handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::{
    Asset, AuditEntryView, ChangelogResponse, MarkOutOfServiceRequest, ReturnToServiceRequest,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Actor;
use crate::middleware::record_lifecycle_transition;

/// Takes an asset out of service.
///
/// POST /api/v1/assets/:asset_id/out-of-service
pub async fn mark_out_of_service(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(asset_id): Path<Uuid>,
    Json(request): Json<MarkOutOfServiceRequest>,
) -> Result<Json<Asset>, ApiError> {
    let result = state
        .lifecycle
        .mark_out_of_service(&actor, asset_id, request)
        .await
        .map_err(ApiError::from);

    record("service_out", &result);
    result.map(Json)
}

/// Returns an asset to service.
///
/// POST /api/v1/assets/:asset_id/return-to-service
pub async fn return_to_service(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(asset_id): Path<Uuid>,
    Json(request): Json<ReturnToServiceRequest>,
) -> Result<Json<Asset>, ApiError> {
    let result = state
        .lifecycle
        .return_to_service(&actor, asset_id, request)
        .await
        .map_err(ApiError::from);

    record("service_return", &result);
    result.map(Json)
}

/// GET /api/v1/assets/:asset_id/service-status
pub async fn service_status(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(asset_id): Path<Uuid>,
) -> Result<Json<Asset>, ApiError> {
    let asset = state.lifecycle.service_status(&actor, asset_id).await?;
    Ok(Json(asset))
}

/// Lists the changelog of an asset, oldest first.
///
/// GET /api/v1/assets/:asset_id/changelog
pub async fn changelog(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(asset_id): Path<Uuid>,
) -> Result<Json<ChangelogResponse>, ApiError> {
    let entries = state.lifecycle.changelog(&actor, asset_id).await?;
    Ok(Json(ChangelogResponse {
        data: entries.into_iter().map(AuditEntryView::from).collect(),
    }))
}

fn record(action: &'static str, result: &Result<Asset, ApiError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.outcome(),
    };
    record_lifecycle_transition(action, outcome);
}
