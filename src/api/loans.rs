//! Loan endpoints

use super::{
    error::ApiError,
    requests::{CreateLoanRequest, ListRequest, SearchRequest},
    AppState,
};
use crate::auth::AuthPayload;
use crate::db::Loan;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use tracing::info;
use uuid::Uuid;

pub async fn create_loan(
    State(state): State<AppState>,
    AuthPayload(caller): AuthPayload,
    body: Result<Json<CreateLoanRequest>, JsonRejection>,
) -> Result<Json<Loan>, ApiError> {
    let Json(req) = body?;
    let arg = req.validate().map_err(ApiError::BadRequest)?;

    let loan = state.store.create_loan(&arg)?;
    info!(
        loan_id = %loan.id,
        by = caller.username(),
        "Loan recorded for {}",
        loan.borrower
    );

    Ok(Json(loan))
}

pub async fn list_loans(
    State(state): State<AppState>,
    body: Result<Json<ListRequest>, JsonRejection>,
) -> Result<Json<Vec<Loan>>, ApiError> {
    let Json(req) = body?;
    let arg = req.validate().map_err(ApiError::BadRequest)?;

    Ok(Json(state.store.list_loans(&arg)?))
}

pub async fn get_loan(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Loan>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.store.get_loan(id)?))
}

/// Substring match on borrower
pub async fn search_loans(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<Loan>>, ApiError> {
    let Json(req) = body?;
    let arg = req.validate().map_err(ApiError::BadRequest)?;

    Ok(Json(state.store.search_loans(&arg)?))
}

pub async fn delete_loan(
    State(state): State<AppState>,
    AuthPayload(caller): AuthPayload,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Loan>, ApiError> {
    let Path(id) = id?;

    let loan = state.store.delete_loan(id)?;
    info!(loan_id = %id, by = caller.username(), "Loan deleted");

    Ok(Json(loan))
}
