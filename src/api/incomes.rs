//! Income endpoints

use super::{
    error::ApiError,
    requests::{CreateIncomeRequest, ListRequest, SearchRequest},
    AppState,
};
use crate::auth::AuthPayload;
use crate::db::Income;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

/// POST /v1/incomes (admin) - answers 201 Created
pub async fn create_income(
    State(state): State<AppState>,
    AuthPayload(caller): AuthPayload,
    body: Result<Json<CreateIncomeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Income>), ApiError> {
    let Json(req) = body?;
    let arg = req.validate().map_err(ApiError::BadRequest)?;

    let income = state.store.create_income(&arg)?;
    info!(
        income_id = %income.id,
        project_id = %income.project_id,
        by = caller.username(),
        "Income recorded for {}",
        income.payee
    );

    Ok((StatusCode::CREATED, Json(income)))
}

pub async fn list_incomes(
    State(state): State<AppState>,
    body: Result<Json<ListRequest>, JsonRejection>,
) -> Result<Json<Vec<Income>>, ApiError> {
    let Json(req) = body?;
    let arg = req.validate().map_err(ApiError::BadRequest)?;

    Ok(Json(state.store.list_incomes(&arg)?))
}

pub async fn get_income(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Income>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.store.get_income(id)?))
}

pub async fn search_incomes(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<Income>>, ApiError> {
    let Json(req) = body?;
    let arg = req.validate().map_err(ApiError::BadRequest)?;

    Ok(Json(state.store.search_incomes(&arg)?))
}

pub async fn delete_income(
    State(state): State<AppState>,
    AuthPayload(caller): AuthPayload,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Income>, ApiError> {
    let Path(id) = id?;

    let income = state.store.delete_income(id)?;
    info!(income_id = %id, by = caller.username(), "Income deleted");

    Ok(Json(income))
}
