//! HTTP API
//! Mission: Route `/v1` requests through the authentication and authorization
//! gates to the store-backed handlers
//!
//! Three tiers:
//! - public: health check, signup, login
//! - authenticated: any valid token (reads and searches)
//! - privileged: admin tokens only (creates and deletes)

pub mod error;
pub mod incomes;
pub mod loans;
pub mod pay_outs;
pub mod projects;
pub mod requests;

use crate::auth::{api as auth_api, authenticate, require_admin, TokenMaker};
use crate::db::Store;
use crate::middleware::request_logging;
use axum::{
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use chrono::Duration;
use error::ApiError;
use std::{any::Any, sync::Arc};
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, timeout::TimeoutLayer,
};
use tracing::error;

/// Per-request deadline unless configured otherwise
pub const DEFAULT_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(360);

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub token_maker: Arc<TokenMaker>,
    pub access_token_duration: Duration,
    pub request_timeout: std::time::Duration,
}

impl AppState {
    pub fn new(store: Store, token_maker: TokenMaker, access_token_duration: Duration) -> Self {
        Self {
            store: Arc::new(store),
            token_maker: Arc::new(token_maker),
            access_token_duration,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: std::time::Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/healthz", get(health_check))
        .route("/users/signup", post(auth_api::signup))
        .route("/users/login", post(auth_api::login));

    // Admin gate runs after the token gate below has attached the payload
    let privileged_routes = Router::new()
        .route("/projects", post(projects::create_project))
        .route("/projects/:id", delete(projects::delete_project))
        .route("/incomes", post(incomes::create_income))
        .route("/incomes/:id", delete(incomes::delete_income))
        .route("/loans", post(loans::create_loan))
        .route("/loans/:id", delete(loans::delete_loan))
        .route("/pay_outs", post(pay_outs::create_pay_out))
        .route("/pay_outs/:id", delete(pay_outs::delete_pay_out))
        .route_layer(middleware::from_fn(require_admin));

    let protected_routes = Router::new()
        .route("/users/me", get(auth_api::me))
        .route("/projects/all", post(projects::list_projects))
        .route("/projects/search", post(projects::search_projects))
        .route("/projects/:id", get(projects::get_project))
        .route("/incomes/all", post(incomes::list_incomes))
        .route("/incomes/search", post(incomes::search_incomes))
        .route("/incomes/:id", get(incomes::get_income))
        .route("/loans/all", post(loans::list_loans))
        .route("/loans/search", post(loans::search_loans))
        .route("/loans/:id", get(loans::get_loan))
        .route("/pay_outs/all", post(pay_outs::list_pay_outs))
        .route("/pay_outs/search", post(pay_outs::search_pay_outs))
        .route("/pay_outs/:id", get(pay_outs::get_pay_out))
        .merge(privileged_routes)
        .route_layer(middleware::from_fn_with_state(
            state.token_maker.clone(),
            authenticate,
        ));

    let v1 = Router::new().merge(public_routes).merge(protected_routes);
    let request_timeout = state.request_timeout;

    with_service_layers(Router::new().nest("/v1", v1).with_state(state), request_timeout)
}

/// Layers shared by every route. Outermost first: compression, request
/// logging, panic recovery, then the per-request deadline (408 on expiry).
fn with_service_layers(app: Router, request_timeout: std::time::Duration) -> Router {
    app.layer(TimeoutLayer::new(request_timeout))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(request_logging))
        .layer(CompressionLayer::new())
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);

    ApiError::Internal.into_response()
}

async fn health_check() -> &'static str {
    "ok"
}
