use crate::forms::{DriverCreationForm, DriverLicenseUpdateForm};
use crate::schemas::{page_of, store_error, ApiError, ApiResponse, AppState, DriverQuery, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{search, DriverDto};
use model::store;
use tracing::{debug, error, info, instrument, trace, warn};

fn form_rejected(errors: crate::forms::FormErrors) -> ApiError {
    warn!("Driver form rejected: {}", errors);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(errors.to_string(), "VALIDATION_ERROR")),
    )
}

/// Create a new driver from the creation form
#[utoipa::path(
    post,
    path = "/api/v1/drivers",
    tag = "drivers",
    request_body = DriverCreationForm,
    responses(
        (status = 201, description = "Driver created successfully", body = ApiResponse<DriverDto>),
        (status = 400, description = "Form validation failed", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_driver(
    State(state): State<AppState>,
    Json(form): Json<DriverCreationForm>,
) -> Result<(StatusCode, Json<ApiResponse<DriverDto>>), ApiError> {
    trace!("Entering create_driver function");

    let new_driver = form.clean().map_err(form_rejected)?;
    debug!("Creating driver with username: {}", new_driver.username);

    match store::create_driver(&state.db, new_driver).await {
        Ok(driver) => {
            info!("Driver created successfully with ID: {}, username: {}", driver.id(), driver.username());
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::ok(DriverDto::from(driver), "Driver created successfully")),
            ))
        }
        Err(e) => {
            warn!("Failed to create driver '{}': {}", form.username, e);
            Err(store_error(e))
        }
    }
}

/// Get drivers, optionally filtered by username
#[utoipa::path(
    get,
    path = "/api/v1/drivers",
    tag = "drivers",
    params(DriverQuery),
    responses(
        (status = 200, description = "Drivers retrieved successfully", body = ApiResponse<Vec<DriverDto>>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_drivers(
    Valid(Query(query)): Valid<Query<DriverQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DriverDto>>>, ApiError> {
    trace!("Entering get_drivers function");

    let all = store::list_drivers(&state.db).await.map_err(|e| {
        error!("Failed to retrieve drivers: {}", e);
        store_error(e)
    })?;
    let found = search(all, query.username.as_deref());
    debug!("{} drivers match username filter {:?}", found.len(), query.username);

    let data: Vec<DriverDto> = page_of(found, query.page, query.limit)
        .into_iter()
        .map(DriverDto::from)
        .collect();
    info!("Successfully retrieved {} drivers", data.len());
    Ok(Json(ApiResponse::ok(data, "Drivers retrieved successfully")))
}

/// Get a specific driver by ID
#[utoipa::path(
    get,
    path = "/api/v1/drivers/{driver_id}",
    tag = "drivers",
    params(
        ("driver_id" = i32, Path, description = "Driver ID"),
    ),
    responses(
        (status = 200, description = "Driver retrieved successfully", body = ApiResponse<DriverDto>),
        (status = 404, description = "Driver not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_driver(
    Path(driver_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DriverDto>>, ApiError> {
    trace!("Entering get_driver function for driver_id: {}", driver_id);

    match store::get_driver(&state.db, driver_id).await {
        Ok(driver) => {
            debug!("Found driver: {}", driver);
            Ok(Json(ApiResponse::ok(DriverDto::from(driver), "Driver retrieved successfully")))
        }
        Err(e) => {
            warn!("Failed to retrieve driver {}: {}", driver_id, e);
            Err(store_error(e))
        }
    }
}

/// Change a driver's license number
#[utoipa::path(
    put,
    path = "/api/v1/drivers/{driver_id}/license",
    tag = "drivers",
    params(
        ("driver_id" = i32, Path, description = "Driver ID"),
    ),
    request_body = DriverLicenseUpdateForm,
    responses(
        (status = 200, description = "License number updated successfully", body = ApiResponse<DriverDto>),
        (status = 400, description = "Malformed license number", body = ErrorResponse),
        (status = 404, description = "Driver not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_license(
    Path(driver_id): Path<i32>,
    State(state): State<AppState>,
    Json(form): Json<DriverLicenseUpdateForm>,
) -> Result<Json<ApiResponse<DriverDto>>, ApiError> {
    trace!("Entering update_license function for driver_id: {}", driver_id);

    let license_number = form.clean().map_err(form_rejected)?;
    match store::update_license_number(&state.db, driver_id, license_number).await {
        Ok(driver) => {
            info!("License number of driver {} updated successfully", driver_id);
            Ok(Json(ApiResponse::ok(
                DriverDto::from(driver),
                "License number updated successfully",
            )))
        }
        Err(e) => {
            warn!("Failed to update license of driver {}: {}", driver_id, e);
            Err(store_error(e))
        }
    }
}

/// Delete a driver
#[utoipa::path(
    delete,
    path = "/api/v1/drivers/{driver_id}",
    tag = "drivers",
    params(
        ("driver_id" = i32, Path, description = "Driver ID"),
    ),
    responses(
        (status = 200, description = "Driver deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Driver not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_driver(
    Path(driver_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_driver function for driver_id: {}", driver_id);

    match store::delete_driver(&state.db, driver_id).await {
        Ok(()) => {
            info!("Driver with ID {} deleted successfully", driver_id);
            Ok(Json(ApiResponse::ok(
                format!("Driver {} deleted", driver_id),
                "Driver deleted successfully",
            )))
        }
        Err(e) => {
            warn!("Failed to delete driver {}: {}", driver_id, e);
            Err(store_error(e))
        }
    }
}
