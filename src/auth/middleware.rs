//! Authentication & Authorization Middleware
//! Mission: Gate API endpoints on a verified bearer token, then on role

use crate::auth::{
    codec::TokenError,
    maker::TokenMaker,
    models::{Payload, UserRole},
};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

const AUTHORIZATION_TYPE_BEARER: &str = "bearer";

/// Authentication gate: verifies `Authorization: Bearer <token>` and attaches
/// the resulting [`Payload`] to the request extensions
pub async fn authenticate(
    State(token_maker): State<Arc<TokenMaker>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingHeader)?;

    let header = header.to_str().map_err(|_| AuthError::InvalidFormat)?;
    let payload = verify_authorization_header(&token_maker, header)?;

    req.extensions_mut().insert(payload);

    Ok(next.run(req).await)
}

/// Authorization gate: only admins pass. Must be layered inside [`authenticate`]
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AuthError> {
    let payload = req
        .extensions()
        .get::<Payload>()
        .ok_or(AuthError::MissingPayload)?;

    if payload.role() != UserRole::Admin {
        debug!(username = payload.username(), "Rejected non-admin request");
        return Err(AuthError::PermissionDenied);
    }

    Ok(next.run(req).await)
}

fn verify_authorization_header(
    token_maker: &TokenMaker,
    header: &str,
) -> Result<Payload, AuthError> {
    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(AuthError::InvalidFormat);
    }

    let authorization_type = fields[0].to_lowercase();
    if authorization_type != AUTHORIZATION_TYPE_BEARER {
        return Err(AuthError::UnsupportedType(authorization_type));
    }

    token_maker.verify_token(fields[1]).map_err(|e| {
        debug!("Rejected access token: {}", e);
        AuthError::Token(e)
    })
}

/// Claims of the authenticated caller, for handlers behind [`authenticate`]
#[derive(Debug, Clone)]
pub struct AuthPayload(pub Payload);

#[async_trait]
impl<S> FromRequestParts<S> for AuthPayload
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Payload>()
            .cloned()
            .map(AuthPayload)
            .ok_or(AuthError::MissingPayload)
    }
}

/// Gate rejections
#[derive(Debug)]
pub enum AuthError {
    MissingHeader,
    InvalidFormat,
    UnsupportedType(String),
    Token(TokenError),
    MissingPayload,
    PermissionDenied,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingHeader
            | AuthError::InvalidFormat
            | AuthError::UnsupportedType(_)
            | AuthError::Token(_) => StatusCode::UNAUTHORIZED,
            AuthError::MissingPayload | AuthError::PermissionDenied => StatusCode::FORBIDDEN,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingHeader => write!(f, "authorization header is not provided"),
            AuthError::InvalidFormat => write!(f, "invalid authorization header format"),
            AuthError::UnsupportedType(kind) => {
                write!(f, "unsupported authorization type {}", kind)
            }
            AuthError::Token(e) => write!(f, "{}", e),
            AuthError::MissingPayload => write!(f, "authorization payload is not found"),
            AuthError::PermissionDenied => write!(f, "permission denied"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
