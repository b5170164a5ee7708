use crate::router::create_router;
use crate::schemas::AppState;
use crate::templates::Templates;
use axum::Router;
use migration::{Migrator, MigratorTrait};
use model::store::{self, CarRecord, NewCar, NewDriver, NewManufacturer};
use model::{entities::manufacturer, Driver};
use sea_orm::{Database, DatabaseConnection};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Create an in-memory SQLite database for testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    // Run migrations
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Create AppState for testing
pub async fn setup_test_app_state() -> AppState {
    init_test_tracing();
    let db = setup_test_db().await;
    let templates = Templates::load().expect("Failed to load templates");

    AppState {
        db,
        templates,
        request_timeout: Duration::from_secs(30),
    }
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level is taken from RUST_LOG and defaults to WARN. Only the first
/// call installs the subscriber.
fn init_test_tracing() {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| match level.to_uppercase().as_str() {
            "ERROR" => Some(Level::ERROR),
            "WARN" => Some(Level::WARN),
            "INFO" => Some(Level::INFO),
            "DEBUG" => Some(Level::DEBUG),
            "TRACE" => Some(Level::TRACE),
            _ => None,
        })
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Create axum app for testing together with the state it serves
pub async fn setup_test_app() -> (Router, AppState) {
    let state = setup_test_app_state().await;
    let router = create_router(state.clone());
    (router, state)
}

/// Seeds Toyota (Japan), Ford (USA) and Tesla (USA).
pub async fn seed_manufacturers(db: &DatabaseConnection) -> Vec<manufacturer::Model> {
    let mut created = Vec::new();
    for (name, country) in [("Toyota", "Japan"), ("Ford", "USA"), ("Tesla", "USA")] {
        let manufacturer = store::create_manufacturer(
            db,
            NewManufacturer {
                name: name.to_string(),
                country: country.to_string(),
            },
        )
        .await
        .expect("Failed to create manufacturer");
        created.push(manufacturer);
    }
    created
}

/// Seeds Camry (Toyota), F150 (Ford) and Model S (Tesla).
pub async fn seed_cars(db: &DatabaseConnection) -> Vec<CarRecord> {
    let manufacturers = seed_manufacturers(db).await;
    let mut created = Vec::new();
    for (model, manufacturer) in [
        ("Camry", &manufacturers[0]),
        ("F150", &manufacturers[1]),
        ("Model S", &manufacturers[2]),
    ] {
        let car = store::create_car(
            db,
            NewCar {
                model: model.to_string(),
                manufacturer_id: manufacturer.id,
            },
        )
        .await
        .expect("Failed to create car");
        created.push(car);
    }
    created
}

/// Seeds Driver1..Driver3 with distinct license numbers.
pub async fn seed_drivers(db: &DatabaseConnection) -> Vec<Driver> {
    let mut created = Vec::new();
    for n in 1..=3 {
        let driver = store::create_driver(
            db,
            NewDriver::new(format!("Driver{}", n))
                .password("testpass123")
                .names(format!("First{}", n), format!("Last{}", n))
                .license_number(format!("LIC{:05}", n)),
        )
        .await
        .expect("Failed to create driver");
        created.push(driver);
    }
    created
}
