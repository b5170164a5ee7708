use crate::schemas::{page_of, store_error, ApiError, ApiResponse, AppState, ManufacturerQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{search, ManufacturerDto};
use model::store::{self, ManufacturerChanges, NewManufacturer};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a new manufacturer
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateManufacturerRequest {
    /// Manufacturer name (required)
    pub name: String,
    /// Country of origin (required)
    pub country: String,
}

/// Request body for updating a manufacturer
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateManufacturerRequest {
    pub name: Option<String>,
    pub country: Option<String>,
}

/// Create a new manufacturer
#[utoipa::path(
    post,
    path = "/api/v1/manufacturers",
    tag = "manufacturers",
    request_body = CreateManufacturerRequest,
    responses(
        (status = 201, description = "Manufacturer created successfully", body = ApiResponse<ManufacturerDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_manufacturer(
    State(state): State<AppState>,
    Json(request): Json<CreateManufacturerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ManufacturerDto>>), ApiError> {
    trace!("Entering create_manufacturer function");
    debug!("Creating manufacturer: {} ({})", request.name, request.country);

    let new = NewManufacturer {
        name: request.name,
        country: request.country,
    };
    match store::create_manufacturer(&state.db, new).await {
        Ok(model) => {
            info!("Manufacturer created successfully with ID: {}", model.id);
            let response = ApiResponse::ok(ManufacturerDto::from(model), "Manufacturer created successfully");
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(e) => {
            warn!("Failed to create manufacturer: {}", e);
            Err(store_error(e))
        }
    }
}

/// Get manufacturers, optionally filtered by name
#[utoipa::path(
    get,
    path = "/api/v1/manufacturers",
    tag = "manufacturers",
    params(ManufacturerQuery),
    responses(
        (status = 200, description = "Manufacturers retrieved successfully", body = ApiResponse<Vec<ManufacturerDto>>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_manufacturers(
    Valid(Query(query)): Valid<Query<ManufacturerQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ManufacturerDto>>>, ApiError> {
    trace!("Entering get_manufacturers function");

    let all = store::list_manufacturers(&state.db).await.map_err(|e| {
        error!("Failed to retrieve manufacturers: {}", e);
        store_error(e)
    })?;
    let found = search(all, query.name.as_deref());
    debug!("{} manufacturers match name filter {:?}", found.len(), query.name);

    let data: Vec<ManufacturerDto> = page_of(found, query.page, query.limit)
        .into_iter()
        .map(ManufacturerDto::from)
        .collect();
    info!("Successfully retrieved {} manufacturers", data.len());
    Ok(Json(ApiResponse::ok(data, "Manufacturers retrieved successfully")))
}

/// Get a specific manufacturer by ID
#[utoipa::path(
    get,
    path = "/api/v1/manufacturers/{manufacturer_id}",
    tag = "manufacturers",
    params(
        ("manufacturer_id" = i32, Path, description = "Manufacturer ID"),
    ),
    responses(
        (status = 200, description = "Manufacturer retrieved successfully", body = ApiResponse<ManufacturerDto>),
        (status = 404, description = "Manufacturer not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_manufacturer(
    Path(manufacturer_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ManufacturerDto>>, ApiError> {
    trace!("Entering get_manufacturer function for manufacturer_id: {}", manufacturer_id);

    match store::get_manufacturer(&state.db, manufacturer_id).await {
        Ok(model) => {
            debug!("Found manufacturer: {}", model);
            Ok(Json(ApiResponse::ok(
                ManufacturerDto::from(model),
                "Manufacturer retrieved successfully",
            )))
        }
        Err(e) => {
            warn!("Failed to retrieve manufacturer {}: {}", manufacturer_id, e);
            Err(store_error(e))
        }
    }
}

/// Update a manufacturer
#[utoipa::path(
    put,
    path = "/api/v1/manufacturers/{manufacturer_id}",
    tag = "manufacturers",
    params(
        ("manufacturer_id" = i32, Path, description = "Manufacturer ID"),
    ),
    request_body = UpdateManufacturerRequest,
    responses(
        (status = 200, description = "Manufacturer updated successfully", body = ApiResponse<ManufacturerDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Manufacturer not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_manufacturer(
    Path(manufacturer_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateManufacturerRequest>,
) -> Result<Json<ApiResponse<ManufacturerDto>>, ApiError> {
    trace!("Entering update_manufacturer function for manufacturer_id: {}", manufacturer_id);

    let changes = ManufacturerChanges {
        name: request.name,
        country: request.country,
    };
    match store::update_manufacturer(&state.db, manufacturer_id, changes).await {
        Ok(model) => {
            info!("Manufacturer with ID {} updated successfully", manufacturer_id);
            Ok(Json(ApiResponse::ok(
                ManufacturerDto::from(model),
                "Manufacturer updated successfully",
            )))
        }
        Err(e) => {
            warn!("Failed to update manufacturer {}: {}", manufacturer_id, e);
            Err(store_error(e))
        }
    }
}

/// Delete a manufacturer that no car references
#[utoipa::path(
    delete,
    path = "/api/v1/manufacturers/{manufacturer_id}",
    tag = "manufacturers",
    params(
        ("manufacturer_id" = i32, Path, description = "Manufacturer ID"),
    ),
    responses(
        (status = 200, description = "Manufacturer deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Manufacturer not found", body = ErrorResponse),
        (status = 409, description = "Manufacturer is still referenced by cars", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_manufacturer(
    Path(manufacturer_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_manufacturer function for manufacturer_id: {}", manufacturer_id);

    match store::delete_manufacturer(&state.db, manufacturer_id).await {
        Ok(()) => {
            info!("Manufacturer with ID {} deleted successfully", manufacturer_id);
            Ok(Json(ApiResponse::ok(
                format!("Manufacturer {} deleted", manufacturer_id),
                "Manufacturer deleted successfully",
            )))
        }
        Err(e) => {
            warn!("Failed to delete manufacturer {}: {}", manufacturer_id, e);
            Err(store_error(e))
        }
    }
}
