use serde_json::{json, Value};
use service_core::{
    axum::{extract::State, Json},
    error::AppError,
};

use crate::AppState;

/// Liveness plus a store round trip.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.store.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Store health check failed");
        AppError::ServiceUnavailable
    })?;

    Ok(Json(json!({
        "status": "ok",
        "service": "drinks-service",
        "version": env!("CARGO_PKG_VERSION")
    })))
}
