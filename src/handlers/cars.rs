use crate::schemas::{page_of, store_error, ApiError, ApiResponse, AppState, CarQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{search, CarDto};
use model::store::{self, CarChanges, NewCar};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a new car
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateCarRequest {
    /// Car model (required)
    pub model: String,
    /// ID of an existing manufacturer
    pub manufacturer_id: i32,
}

/// Request body for updating a car
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateCarRequest {
    pub model: Option<String>,
    pub manufacturer_id: Option<i32>,
}

/// Create a new car
#[utoipa::path(
    post,
    path = "/api/v1/cars",
    tag = "cars",
    request_body = CreateCarRequest,
    responses(
        (status = 201, description = "Car created successfully", body = ApiResponse<CarDto>),
        (status = 400, description = "Invalid request or unknown manufacturer", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_car(
    State(state): State<AppState>,
    Json(request): Json<CreateCarRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CarDto>>), ApiError> {
    trace!("Entering create_car function");
    debug!("Creating car '{}' for manufacturer {}", request.model, request.manufacturer_id);

    let new = NewCar {
        model: request.model,
        manufacturer_id: request.manufacturer_id,
    };
    match store::create_car(&state.db, new).await {
        Ok(record) => {
            info!("Car created successfully with ID: {}", record.car.id);
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::ok(CarDto::from(record), "Car created successfully")),
            ))
        }
        Err(e) => {
            warn!("Failed to create car: {}", e);
            Err(store_error(e))
        }
    }
}

/// Get cars, optionally filtered by model
#[utoipa::path(
    get,
    path = "/api/v1/cars",
    tag = "cars",
    params(CarQuery),
    responses(
        (status = 200, description = "Cars retrieved successfully", body = ApiResponse<Vec<CarDto>>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_cars(
    Valid(Query(query)): Valid<Query<CarQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CarDto>>>, ApiError> {
    trace!("Entering get_cars function");

    let all = store::list_cars(&state.db).await.map_err(|e| {
        error!("Failed to retrieve cars: {}", e);
        store_error(e)
    })?;
    let found = search(all, query.model.as_deref());
    debug!("{} cars match model filter {:?}", found.len(), query.model);

    let data: Vec<CarDto> = page_of(found, query.page, query.limit)
        .into_iter()
        .map(CarDto::from)
        .collect();
    info!("Successfully retrieved {} cars", data.len());
    Ok(Json(ApiResponse::ok(data, "Cars retrieved successfully")))
}

/// Get a specific car by ID
#[utoipa::path(
    get,
    path = "/api/v1/cars/{car_id}",
    tag = "cars",
    params(
        ("car_id" = i32, Path, description = "Car ID"),
    ),
    responses(
        (status = 200, description = "Car retrieved successfully", body = ApiResponse<CarDto>),
        (status = 404, description = "Car not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_car(
    Path(car_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CarDto>>, ApiError> {
    trace!("Entering get_car function for car_id: {}", car_id);

    match store::get_car(&state.db, car_id).await {
        Ok(record) => {
            debug!("Found car: {}", record);
            Ok(Json(ApiResponse::ok(CarDto::from(record), "Car retrieved successfully")))
        }
        Err(e) => {
            warn!("Failed to retrieve car {}: {}", car_id, e);
            Err(store_error(e))
        }
    }
}

/// Update a car
#[utoipa::path(
    put,
    path = "/api/v1/cars/{car_id}",
    tag = "cars",
    params(
        ("car_id" = i32, Path, description = "Car ID"),
    ),
    request_body = UpdateCarRequest,
    responses(
        (status = 200, description = "Car updated successfully", body = ApiResponse<CarDto>),
        (status = 400, description = "Invalid request or unknown manufacturer", body = ErrorResponse),
        (status = 404, description = "Car not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_car(
    Path(car_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateCarRequest>,
) -> Result<Json<ApiResponse<CarDto>>, ApiError> {
    trace!("Entering update_car function for car_id: {}", car_id);

    let changes = CarChanges {
        model: request.model,
        manufacturer_id: request.manufacturer_id,
    };
    match store::update_car(&state.db, car_id, changes).await {
        Ok(record) => {
            info!("Car with ID {} updated successfully", car_id);
            Ok(Json(ApiResponse::ok(CarDto::from(record), "Car updated successfully")))
        }
        Err(e) => {
            warn!("Failed to update car {}: {}", car_id, e);
            Err(store_error(e))
        }
    }
}

/// Delete a car
#[utoipa::path(
    delete,
    path = "/api/v1/cars/{car_id}",
    tag = "cars",
    params(
        ("car_id" = i32, Path, description = "Car ID"),
    ),
    responses(
        (status = 200, description = "Car deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Car not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_car(
    Path(car_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_car function for car_id: {}", car_id);

    match store::delete_car(&state.db, car_id).await {
        Ok(()) => {
            info!("Car with ID {} deleted successfully", car_id);
            Ok(Json(ApiResponse::ok(format!("Car {} deleted", car_id), "Car deleted successfully")))
        }
        Err(e) => {
            warn!("Failed to delete car {}: {}", car_id, e);
            Err(store_error(e))
        }
    }
}

/// Assign a driver to a car
#[utoipa::path(
    post,
    path = "/api/v1/cars/{car_id}/drivers/{driver_id}",
    tag = "cars",
    params(
        ("car_id" = i32, Path, description = "Car ID"),
        ("driver_id" = i32, Path, description = "Driver ID"),
    ),
    responses(
        (status = 200, description = "Driver assigned to car", body = ApiResponse<CarDto>),
        (status = 404, description = "Car or driver not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn assign_driver(
    Path((car_id, driver_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CarDto>>, ApiError> {
    trace!("Entering assign_driver function for car {} and driver {}", car_id, driver_id);

    let added = store::assign_driver(&state.db, car_id, driver_id)
        .await
        .map_err(|e| {
            warn!("Failed to assign driver {} to car {}: {}", driver_id, car_id, e);
            store_error(e)
        })?;
    let record = store::get_car(&state.db, car_id).await.map_err(store_error)?;

    let message = if added {
        "Driver assigned to car"
    } else {
        "Driver was already assigned to car"
    };
    Ok(Json(ApiResponse::ok(CarDto::from(record), message)))
}

/// Remove a driver from a car
#[utoipa::path(
    delete,
    path = "/api/v1/cars/{car_id}/drivers/{driver_id}",
    tag = "cars",
    params(
        ("car_id" = i32, Path, description = "Car ID"),
        ("driver_id" = i32, Path, description = "Driver ID"),
    ),
    responses(
        (status = 200, description = "Driver removed from car", body = ApiResponse<CarDto>),
        (status = 404, description = "Car or driver not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn unassign_driver(
    Path((car_id, driver_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CarDto>>, ApiError> {
    trace!("Entering unassign_driver function for car {} and driver {}", car_id, driver_id);

    let removed = store::unassign_driver(&state.db, car_id, driver_id)
        .await
        .map_err(|e| {
            warn!("Failed to remove driver {} from car {}: {}", driver_id, car_id, e);
            store_error(e)
        })?;
    let record = store::get_car(&state.db, car_id).await.map_err(store_error)?;

    let message = if removed {
        "Driver removed from car"
    } else {
        "Driver was not assigned to car"
    };
    Ok(Json(ApiResponse::ok(CarDto::from(record), message)))
}
