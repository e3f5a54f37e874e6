use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::drawing::DeleteNodeResponse;
use crate::models::node::{CreateNodeRequest, NodeListResponse, NodeResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Nodes",
    operation_id = "createNode",
    summary = "Create a node",
    description = "Registers a node with its primary PDF reference. The drawing list starts empty \
        and is filled by extraction or reconciliation.",
    request_body = CreateNodeRequest,
    responses(
        (status = 201, description = "Node created", body = NodeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Node ID already in use (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(node_id = %payload.id))]
pub async fn create_node(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateNodeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new_node = payload.validate()?;
    let node = state.nodes.create(new_node).await?;

    Ok((StatusCode::CREATED, Json(NodeResponse::from(node))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Nodes",
    operation_id = "listNodes",
    summary = "List all nodes",
    description = "Returns every node in enumeration order, with its cached drawing list.",
    responses(
        (status = 200, description = "List of nodes", body = NodeListResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn list_nodes(State(state): State<AppState>) -> Result<Json<NodeListResponse>, AppError> {
    let nodes: Vec<NodeResponse> = state
        .nodes
        .list_all()
        .await?
        .into_iter()
        .map(NodeResponse::from)
        .collect();
    let total = nodes.len() as u64;

    Ok(Json(NodeListResponse { nodes, total }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Nodes",
    operation_id = "getNode",
    summary = "Get a node by ID",
    params(("id" = String, Path, description = "Node ID")),
    responses(
        (status = 200, description = "Node details", body = NodeResponse),
        (status = 404, description = "Node not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<NodeResponse>, AppError> {
    let node = state
        .nodes
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Node '{id}' not found")))?;

    Ok(Json(node.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Nodes",
    operation_id = "deleteNode",
    summary = "Delete a node and its primary PDF",
    description = "Removes the node's primary PDF from the object store on a best-effort basis, \
        then deletes the node row. A store failure is reported in `artifact_error` and does not \
        block the row deletion.",
    params(("id" = String, Path, description = "Node ID")),
    responses(
        (status = 200, description = "Node deleted", body = DeleteNodeResponse),
        (status = 404, description = "Node not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Row deletion failed (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteNodeResponse>, AppError> {
    let outcome = state.drawings.delete_node(&id).await?;
    Ok(Json(outcome.into()))
}
