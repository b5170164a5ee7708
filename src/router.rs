use crate::handlers::{
    admin::{driver_add, driver_add_form, driver_change, driver_changelist},
    cars::{assign_driver, create_car, delete_car, get_car, get_cars, unassign_driver, update_car},
    drivers::{create_driver, delete_driver, get_driver, get_drivers, update_license},
    health::health_check,
    manufacturers::{
        create_manufacturer, delete_manufacturer, get_manufacturer, get_manufacturers,
        update_manufacturer,
    },
    pages::{
        car_detail, car_list, driver_detail, driver_license_update, driver_license_update_form,
        driver_list, index, manufacturer_list, not_found,
    },
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // HTML pages
        .route("/", get(index))
        .route("/manufacturers/", get(manufacturer_list))
        .route("/cars/", get(car_list))
        .route("/cars/:car_id/", get(car_detail))
        .route("/drivers/", get(driver_list))
        .route("/drivers/:driver_id/", get(driver_detail))
        .route(
            "/drivers/:driver_id/update/",
            get(driver_license_update_form).post(driver_license_update),
        )
        // Admin pages
        .route("/admin/taxi/driver/", get(driver_changelist))
        .route("/admin/taxi/driver/add/", get(driver_add_form).post(driver_add))
        .route("/admin/taxi/driver/:driver_id/change/", get(driver_change))
        // Manufacturer CRUD routes
        .route("/api/v1/manufacturers", get(get_manufacturers).post(create_manufacturer))
        .route(
            "/api/v1/manufacturers/:manufacturer_id",
            get(get_manufacturer)
                .put(update_manufacturer)
                .delete(delete_manufacturer),
        )
        // Car CRUD and assignment routes
        .route("/api/v1/cars", get(get_cars).post(create_car))
        .route(
            "/api/v1/cars/:car_id",
            get(get_car).put(update_car).delete(delete_car),
        )
        .route(
            "/api/v1/cars/:car_id/drivers/:driver_id",
            post(assign_driver).delete(unassign_driver),
        )
        // Driver routes
        .route("/api/v1/drivers", get(get_drivers).post(create_driver))
        .route("/api/v1/drivers/:driver_id", get(get_driver).delete(delete_driver))
        .route("/api/v1/drivers/:driver_id/license", put(update_license))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
