use crate::forms::{DriverCreationForm, DriverLicenseUpdateForm};
use crate::handlers::cars::{CreateCarRequest, UpdateCarRequest};
use crate::handlers::manufacturers::{CreateManufacturerRequest, UpdateManufacturerRequest};
use crate::templates::Templates;
use axum::{http::StatusCode, response::Json};
use common::{CarDto, DriverDto, ManufacturerDto, RecordCounts};
use model::{Constraint, StoreError};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::error;
use utoipa::{IntoParams, OpenApi, ToSchema};
use validator::Validate;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Compiled HTML templates
    pub templates: Templates,
    /// Upper bound for a single request
    pub request_timeout: Duration,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            success: false,
        }
    }
}

/// Error half of every JSON handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Maps a store failure onto the JSON error contract.
pub fn store_error(err: StoreError) -> ApiError {
    let (status, code) = match &err {
        StoreError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR".to_string()),
        StoreError::NotFound { entity, .. } => (
            StatusCode::NOT_FOUND,
            format!("{}_NOT_FOUND", entity.to_uppercase()),
        ),
        StoreError::ConstraintViolation { constraint, .. } => {
            let code = match constraint {
                Constraint::UniqueUsername => "USERNAME_ALREADY_EXISTS",
                Constraint::ManufacturerInUse => "MANUFACTURER_IN_USE",
            };
            (StatusCode::CONFLICT, code.to_string())
        }
        StoreError::PasswordHash(_) => {
            error!("Password hashing failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR".to_string())
        }
        StoreError::Database(_) => {
            error!("Database operation failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR".to_string())
        }
    };

    let message = match status {
        StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
        _ => err.to_string(),
    };
    (status, Json(ErrorResponse::new(message, code)))
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: u64 = 50;

/// Returns one page of already filtered records.
pub fn page_of<T>(records: Vec<T>, page: Option<u64>, limit: Option<u64>) -> Vec<T> {
    let page = page.unwrap_or(DEFAULT_PAGE).max(1);
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    let skip = (page - 1).saturating_mul(limit);
    records
        .into_iter()
        .skip(usize::try_from(skip).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect()
}

/// Query parameters for listing manufacturers
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ManufacturerQuery {
    /// Page number (default: 1)
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    /// Page size (default: 50)
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
    /// Case-insensitive substring of the manufacturer name
    pub name: Option<String>,
}

/// Query parameters for listing cars
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct CarQuery {
    /// Page number (default: 1)
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    /// Page size (default: 50)
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
    /// Case-insensitive substring of the car model
    pub model: Option<String>,
}

/// Query parameters for listing drivers
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct DriverQuery {
    /// Page number (default: 1)
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    /// Page size (default: 50)
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
    /// Case-insensitive substring of the username
    pub username: Option<String>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::manufacturers::get_manufacturers,
        crate::handlers::manufacturers::create_manufacturer,
        crate::handlers::manufacturers::get_manufacturer,
        crate::handlers::manufacturers::update_manufacturer,
        crate::handlers::manufacturers::delete_manufacturer,
        crate::handlers::cars::get_cars,
        crate::handlers::cars::create_car,
        crate::handlers::cars::get_car,
        crate::handlers::cars::update_car,
        crate::handlers::cars::delete_car,
        crate::handlers::cars::assign_driver,
        crate::handlers::cars::unassign_driver,
        crate::handlers::drivers::get_drivers,
        crate::handlers::drivers::create_driver,
        crate::handlers::drivers::get_driver,
        crate::handlers::drivers::delete_driver,
        crate::handlers::drivers::update_license,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            ManufacturerQuery,
            CarQuery,
            DriverQuery,
            ManufacturerDto,
            CarDto,
            DriverDto,
            RecordCounts,
            CreateManufacturerRequest,
            UpdateManufacturerRequest,
            CreateCarRequest,
            UpdateCarRequest,
            DriverCreationForm,
            DriverLicenseUpdateForm,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "manufacturers", description = "Manufacturer management endpoints"),
        (name = "cars", description = "Car management and driver assignment endpoints"),
        (name = "drivers", description = "Driver management endpoints"),
    ),
    info(
        title = "Taxi Service API",
        description = "Fleet management for a taxi service: manufacturers, cars and the drivers assigned to them",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
