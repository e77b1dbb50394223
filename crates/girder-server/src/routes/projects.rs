//! Project routes: creation, lookup, and board ordering persistence.

use super::persist;
use crate::error::ApiError;
use crate::state::SharedState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use girder::domain::{ColumnId, NewProject, ProjectId, TicketsOrderUpdate};

// ── Request payload types ─────────────────────────────────────────────

/// Body of `POST /projects/create`.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    /// Project name.
    pub name: String,
    /// Requested key prefix, e.g. "DEMO".
    pub key: String,
}

/// Body of `POST /projects/update/tickets-order`.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketsOrderRequest {
    /// The project whose board is updated.
    pub project_id: ProjectId,
    /// The ordering mutation.
    pub update: TicketsOrderUpdate,
}

/// Body of `POST /projects/update/column-order`.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnOrderRequest {
    /// The project whose board is updated.
    pub project_id: ProjectId,
    /// The complete new column order.
    pub column_order: Vec<ColumnId>,
}

// ── Handlers ──────────────────────────────────────────────────────────

/// `GET /projects` — list all projects.
pub async fn list_projects(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let projects = state.store.read().await.list_projects().await?;
    Ok(Json(projects))
}

/// `GET /projects/{project_id}` — one project with its board.
pub async fn get_project(
    State(state): State<SharedState>,
    Path(project_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let project_id = ProjectId::new(project_id);
    let project = state.store.read().await.get_project(&project_id).await?;
    project
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("project not found: {project_id}")))
}

/// `POST /projects/create` — create a project with the default lanes.
pub async fn create_project(
    State(state): State<SharedState>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let project = {
        let mut store = state.store.write().await;
        store
            .create_project(NewProject {
                name: req.name,
                key: req.key,
            })
            .await?
    };
    persist(&state).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// `POST /projects/update/tickets-order` — persist a drag-and-drop
/// ticket ordering mutation.
pub async fn update_tickets_order(
    State(state): State<SharedState>,
    Json(req): Json<TicketsOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let project = {
        let mut store = state.store.write().await;
        store
            .update_tickets_order(&req.project_id, req.update)
            .await?
    };
    persist(&state).await?;
    Ok(Json(project))
}

/// `POST /projects/update/column-order` — persist a column reorder.
pub async fn update_column_order(
    State(state): State<SharedState>,
    Json(req): Json<ColumnOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let project = {
        let mut store = state.store.write().await;
        store
            .update_column_order(&req.project_id, req.column_order)
            .await?
    };
    persist(&state).await?;
    Ok(Json(project))
}
