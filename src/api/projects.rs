//! Project endpoints

use super::{
    error::ApiError,
    requests::{CreateProjectRequest, ListRequest, SearchRequest},
    AppState,
};
use crate::auth::AuthPayload;
use crate::db::Project;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use tracing::info;
use uuid::Uuid;

/// POST /v1/projects (admin)
pub async fn create_project(
    State(state): State<AppState>,
    AuthPayload(caller): AuthPayload,
    body: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<Json<Project>, ApiError> {
    let Json(req) = body?;
    let arg = req.validate().map_err(ApiError::BadRequest)?;

    let project = state.store.create_project(&arg)?;
    info!(
        project_id = %project.id,
        by = caller.username(),
        "Project created: {}",
        project.name
    );

    Ok(Json(project))
}

/// POST /v1/projects/all
pub async fn list_projects(
    State(state): State<AppState>,
    body: Result<Json<ListRequest>, JsonRejection>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let Json(req) = body?;
    let arg = req.validate().map_err(ApiError::BadRequest)?;

    Ok(Json(state.store.list_projects(&arg)?))
}

/// GET /v1/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Project>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.store.get_project(id)?))
}

/// POST /v1/projects/search - substring match on name
pub async fn search_projects(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let Json(req) = body?;
    let arg = req.validate().map_err(ApiError::BadRequest)?;

    Ok(Json(state.store.search_projects(&arg)?))
}

/// DELETE /v1/projects/:id (admin)
///
/// Refused with 403 while incomes still reference the project.
pub async fn delete_project(
    State(state): State<AppState>,
    AuthPayload(caller): AuthPayload,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Project>, ApiError> {
    let Path(id) = id?;

    let project = state.store.delete_project(id)?;
    info!(project_id = %id, by = caller.username(), "Project deleted");

    Ok(Json(project))
}
