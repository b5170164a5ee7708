use crate::schemas::{AppState, HealthResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{debug, instrument, warn};

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 500, description = "Service is unhealthy", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let database = match state.db.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            warn!("Database ping failed: {}", e);
            "disconnected"
        }
    };
    debug!("Health check: database {}", database);

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    }))
}
