//! Pay-out endpoints

use super::{
    error::ApiError,
    requests::{CreatePayOutRequest, ListRequest, SearchRequest},
    AppState,
};
use crate::auth::AuthPayload;
use crate::db::PayOut;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use tracing::info;
use uuid::Uuid;

pub async fn create_pay_out(
    State(state): State<AppState>,
    AuthPayload(caller): AuthPayload,
    body: Result<Json<CreatePayOutRequest>, JsonRejection>,
) -> Result<Json<PayOut>, ApiError> {
    let Json(req) = body?;
    let arg = req.validate().map_err(ApiError::BadRequest)?;

    let pay_out = state.store.create_pay_out(&arg)?;
    info!(
        pay_out_id = %pay_out.id,
        by = caller.username(),
        "Pay-out recorded for {}",
        pay_out.owner
    );

    Ok(Json(pay_out))
}

pub async fn list_pay_outs(
    State(state): State<AppState>,
    body: Result<Json<ListRequest>, JsonRejection>,
) -> Result<Json<Vec<PayOut>>, ApiError> {
    let Json(req) = body?;
    let arg = req.validate().map_err(ApiError::BadRequest)?;

    Ok(Json(state.store.list_pay_outs(&arg)?))
}

pub async fn get_pay_out(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<PayOut>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.store.get_pay_out(id)?))
}

pub async fn search_pay_outs(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<PayOut>>, ApiError> {
    let Json(req) = body?;
    let arg = req.validate().map_err(ApiError::BadRequest)?;

    Ok(Json(state.store.search_pay_outs(&arg)?))
}

pub async fn delete_pay_out(
    State(state): State<AppState>,
    AuthPayload(caller): AuthPayload,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<PayOut>, ApiError> {
    let Path(id) = id?;

    let pay_out = state.store.delete_pay_out(id)?;
    info!(pay_out_id = %id, by = caller.username(), "Pay-out deleted");

    Ok(Json(pay_out))
}
