use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::drawing::{ExtractDrawingsResponse, ReconcileResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/drawings/extract",
    tag = "Drawings",
    operation_id = "extractDrawings",
    summary = "Rescan one node's drawings",
    description = "Lists the object store under the node's `pdf_url` prefix and replaces the \
        node's drawing list with every `.pdf` object found, even when none are found. \
        Calling it twice without store changes yields the same list.",
    params(("id" = String, Path, description = "Node ID")),
    responses(
        (status = 200, description = "Drawings extracted", body = ExtractDrawingsResponse),
        (status = 404, description = "Node not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Object store unreachable (STORE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn extract_drawings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExtractDrawingsResponse>, AppError> {
    let outcome = state.drawings.extract_drawings(&id).await?;
    Ok(Json(outcome.into()))
}

#[utoipa::path(
    post,
    path = "/reconcile",
    tag = "Drawings",
    operation_id = "reconcileDrawings",
    summary = "Rescan drawings for every node",
    description = "Lists the object store under each node's ID prefix. Nodes with at least one \
        drawing get their list replaced and appear in `details`; nodes with none are left \
        untouched. A node that fails is reported in `failures` without stopping the run.",
    responses(
        (status = 200, description = "Reconciliation summary", body = ReconcileResponse),
        (status = 500, description = "Nodes could not be enumerated (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn reconcile_drawings(
    State(state): State<AppState>,
) -> Result<Json<ReconcileResponse>, AppError> {
    let report = state.drawings.reconcile_all_drawings().await?;
    Ok(Json(report.into()))
}
