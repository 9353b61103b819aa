//! Drinks Service - coffee-shop menu catalog with permission-guarded writes.

pub mod auth;
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

use service_core::axum::{
    extract::Request,
    http::{header, Method},
    middleware::{from_fn, from_fn_with_state, Next},
    routing::{delete, get, patch, post, MethodRouter},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    error_envelope::error_envelope_middleware,
    metrics::metrics_middleware,
    tracing::{http_span, request_id_middleware},
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::permissions::{DELETE_DRINKS, GET_DRINKS_DETAIL, PATCH_DRINKS, POST_DRINKS};
use crate::auth::TokenValidator;
use crate::middleware::{authenticate, require_permission};
use crate::services::DrinkStore;

/// Everything a handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DrinkStore>,
    pub validator: Arc<TokenValidator>,
}

impl AppState {
    pub fn new(store: Arc<dyn DrinkStore>, validator: Arc<TokenValidator>) -> Self {
        Self { store, validator }
    }
}

/// Wraps a method route with token validation followed by the permission
/// check. Methods the route doesn't serve still answer 405 unauthenticated.
fn protected(
    state: &AppState,
    permission: &'static str,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    route
        .route_layer(from_fn(move |req: Request, next: Next| {
            require_permission(permission, req, next)
        }))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
}

async fn route_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("resource not found"))
}

pub fn build_router(state: AppState) -> Router {
    let drinks = get(handlers::list_drinks).merge(protected(
        &state,
        POST_DRINKS,
        post(handlers::create_drink),
    ));

    let drinks_detail = protected(&state, GET_DRINKS_DETAIL, get(handlers::list_drinks_detail));

    let drink = protected(&state, PATCH_DRINKS, patch(handlers::update_drink)).merge(protected(
        &state,
        DELETE_DRINKS,
        delete(handlers::delete_drink),
    ));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route("/drinks", drinks)
        .route("/drinks-detail", drinks_detail)
        .route("/drinks/:id", drink)
        .fallback(route_not_found)
        .with_state(state)
        .layer(from_fn(error_envelope_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(http_span))
        .layer(from_fn(request_id_middleware))
        // The public listing is meant for any origin; writes still need a token.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        )
}
