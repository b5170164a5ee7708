//! Record store operations for manufacturers, cars and drivers.
//!
//! Every write goes through here so the required-field, reference and
//! uniqueness rules hold no matter which surface (HTML form, JSON API, CLI)
//! the data came from.

use crate::driver::Driver;
use crate::entities::{account, car, car_driver, driver, manufacturer};
use crate::password;
use common::{CarDto, RecordCounts, Searchable};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, instrument, trace, warn};

/// Which storage constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Another account already uses the username.
    UniqueUsername,
    /// The manufacturer is still referenced by cars.
    ManufacturerInUse,
}

/// Error types for record store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// A required attribute is missing or a referenced record does not exist
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The requested record does not exist
    #[error("{entity} with id {id} does not exist")]
    NotFound { entity: &'static str, id: i32 },

    /// A uniqueness or referential constraint rejected the write
    #[error("{message}")]
    ConstraintViolation {
        constraint: Constraint,
        message: String,
    },

    /// Password hashing failed
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Type alias for Result with StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

fn required(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        warn!("Rejecting record with empty {}", field);
        return Err(StoreError::Validation {
            field,
            message: "This field is required.".to_string(),
        });
    }
    Ok(())
}

fn username_taken(err: DbErr, username: &str) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            warn!("Username '{}' already exists: {}", username, detail);
            StoreError::ConstraintViolation {
                constraint: Constraint::UniqueUsername,
                message: format!("Username '{}' already exists", username),
            }
        }
        _ => StoreError::Database(err),
    }
}

// ===================== Manufacturers =====================

/// Attributes for a new manufacturer.
#[derive(Debug, Clone)]
pub struct NewManufacturer {
    pub name: String,
    pub country: String,
}

/// Partial update of a manufacturer; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ManufacturerChanges {
    pub name: Option<String>,
    pub country: Option<String>,
}

#[instrument(skip(db))]
pub async fn create_manufacturer(
    db: &DatabaseConnection,
    new: NewManufacturer,
) -> Result<manufacturer::Model> {
    required("name", &new.name)?;
    required("country", &new.country)?;

    let model = manufacturer::ActiveModel {
        name: Set(new.name),
        country: Set(new.country),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Manufacturer created with ID: {}, display: {}", model.id, model);
    Ok(model)
}

/// All manufacturers ordered by name.
pub async fn list_manufacturers(db: &DatabaseConnection) -> Result<Vec<manufacturer::Model>> {
    let manufacturers = manufacturer::Entity::find()
        .order_by_asc(manufacturer::Column::Name)
        .order_by_asc(manufacturer::Column::Id)
        .all(db)
        .await?;
    debug!("Retrieved {} manufacturers", manufacturers.len());
    Ok(manufacturers)
}

pub async fn get_manufacturer(db: &DatabaseConnection, id: i32) -> Result<manufacturer::Model> {
    manufacturer::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound {
            entity: "Manufacturer",
            id,
        })
}

#[instrument(skip(db))]
pub async fn update_manufacturer(
    db: &DatabaseConnection,
    id: i32,
    changes: ManufacturerChanges,
) -> Result<manufacturer::Model> {
    let existing = get_manufacturer(db, id).await?;
    let mut active: manufacturer::ActiveModel = existing.into();

    if let Some(name) = changes.name {
        required("name", &name)?;
        active.name = Set(name);
    }
    if let Some(country) = changes.country {
        required("country", &country)?;
        active.country = Set(country);
    }

    let updated = active.update(db).await?;
    info!("Manufacturer with ID {} updated", id);
    Ok(updated)
}

/// Deletes a manufacturer. Refused while any car still references it.
#[instrument(skip(db))]
pub async fn delete_manufacturer(db: &DatabaseConnection, id: i32) -> Result<()> {
    let existing = get_manufacturer(db, id).await?;

    let cars = existing.find_related(car::Entity).count(db).await?;
    if cars > 0 {
        warn!("Manufacturer {} is referenced by {} cars, refusing delete", id, cars);
        return Err(StoreError::ConstraintViolation {
            constraint: Constraint::ManufacturerInUse,
            message: format!("Manufacturer '{}' is referenced by {} car(s)", existing, cars),
        });
    }

    existing.delete(db).await?;
    info!("Manufacturer with ID {} deleted", id);
    Ok(())
}

// ===================== Cars =====================

/// Attributes for a new car.
#[derive(Debug, Clone)]
pub struct NewCar {
    pub model: String,
    pub manufacturer_id: i32,
}

/// Partial update of a car; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct CarChanges {
    pub model: Option<String>,
    pub manufacturer_id: Option<i32>,
}

/// A car together with its manufacturer and assigned driver ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarRecord {
    pub car: car::Model,
    pub manufacturer: manufacturer::Model,
    pub driver_ids: Vec<i32>,
}

impl fmt::Display for CarRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.car, f)
    }
}

impl Searchable for CarRecord {
    const QUERY_PARAM: &'static str = car::Model::QUERY_PARAM;

    fn search_field(&self) -> &str {
        self.car.search_field()
    }
}

impl From<CarRecord> for CarDto {
    fn from(record: CarRecord) -> Self {
        Self {
            id: record.car.id,
            manufacturer: record.manufacturer.to_string(),
            model: record.car.model,
            manufacturer_id: record.manufacturer.id,
            driver_ids: record.driver_ids,
        }
    }
}

async fn ensure_manufacturer_exists(db: &DatabaseConnection, id: i32) -> Result<manufacturer::Model> {
    match get_manufacturer(db, id).await {
        Err(StoreError::NotFound { .. }) => {
            warn!("Car references unknown manufacturer {}", id);
            Err(StoreError::Validation {
                field: "manufacturer",
                message: format!("Manufacturer with id {} does not exist", id),
            })
        }
        other => other,
    }
}

#[instrument(skip(db))]
pub async fn create_car(db: &DatabaseConnection, new: NewCar) -> Result<CarRecord> {
    required("model", &new.model)?;
    let manufacturer = ensure_manufacturer_exists(db, new.manufacturer_id).await?;

    let car = car::ActiveModel {
        model: Set(new.model),
        manufacturer_id: Set(manufacturer.id),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Car created with ID: {}, model: {}", car.id, car.model);
    Ok(CarRecord {
        car,
        manufacturer,
        driver_ids: Vec::new(),
    })
}

/// All cars ordered by id, with manufacturer and assigned drivers.
pub async fn list_cars(db: &DatabaseConnection) -> Result<Vec<CarRecord>> {
    let rows = car::Entity::find()
        .find_also_related(manufacturer::Entity)
        .order_by_asc(car::Column::Id)
        .all(db)
        .await?;

    let mut assignments: HashMap<i32, Vec<i32>> = HashMap::new();
    for link in car_driver::Entity::find()
        .order_by_asc(car_driver::Column::DriverId)
        .all(db)
        .await?
    {
        assignments.entry(link.car_id).or_default().push(link.driver_id);
    }

    let mut records = Vec::with_capacity(rows.len());
    for (car, manufacturer) in rows {
        let Some(manufacturer) = manufacturer else {
            warn!("Car {} has no manufacturer, skipping", car.id);
            continue;
        };
        let driver_ids = assignments.remove(&car.id).unwrap_or_default();
        records.push(CarRecord {
            car,
            manufacturer,
            driver_ids,
        });
    }

    debug!("Retrieved {} cars", records.len());
    Ok(records)
}

pub async fn get_car(db: &DatabaseConnection, id: i32) -> Result<CarRecord> {
    let not_found = StoreError::NotFound { entity: "Car", id };
    let (car, manufacturer) = car::Entity::find_by_id(id)
        .find_also_related(manufacturer::Entity)
        .one(db)
        .await?
        .ok_or(not_found)?;
    let manufacturer = manufacturer.ok_or(StoreError::NotFound { entity: "Car", id })?;

    let driver_ids = car_driver::Entity::find()
        .filter(car_driver::Column::CarId.eq(id))
        .order_by_asc(car_driver::Column::DriverId)
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.driver_id)
        .collect();

    Ok(CarRecord {
        car,
        manufacturer,
        driver_ids,
    })
}

#[instrument(skip(db))]
pub async fn update_car(db: &DatabaseConnection, id: i32, changes: CarChanges) -> Result<CarRecord> {
    let existing = get_car(db, id).await?;
    let mut active: car::ActiveModel = existing.car.into();

    if let Some(model) = changes.model {
        required("model", &model)?;
        active.model = Set(model);
    }
    if let Some(manufacturer_id) = changes.manufacturer_id {
        ensure_manufacturer_exists(db, manufacturer_id).await?;
        active.manufacturer_id = Set(manufacturer_id);
    }

    active.update(db).await?;
    info!("Car with ID {} updated", id);
    get_car(db, id).await
}

/// Deletes a car and its driver assignments.
#[instrument(skip(db))]
pub async fn delete_car(db: &DatabaseConnection, id: i32) -> Result<()> {
    let txn = db.begin().await?;

    car_driver::Entity::delete_many()
        .filter(car_driver::Column::CarId.eq(id))
        .exec(&txn)
        .await?;
    let result = car::Entity::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        warn!("Car with ID {} not found for deletion", id);
        return Err(StoreError::NotFound { entity: "Car", id });
    }

    txn.commit().await?;
    info!("Car with ID {} deleted", id);
    Ok(())
}

/// Assigns a driver to a car. Returns false when it was already assigned.
#[instrument(skip(db))]
pub async fn assign_driver(db: &DatabaseConnection, car_id: i32, driver_id: i32) -> Result<bool> {
    get_car(db, car_id).await?;
    get_driver(db, driver_id).await?;

    let existing = car_driver::Entity::find_by_id((car_id, driver_id)).one(db).await?;
    if existing.is_some() {
        debug!("Driver {} already assigned to car {}", driver_id, car_id);
        return Ok(false);
    }

    car_driver::ActiveModel {
        car_id: Set(car_id),
        driver_id: Set(driver_id),
    }
    .insert(db)
    .await?;
    info!("Driver {} assigned to car {}", driver_id, car_id);
    Ok(true)
}

/// Removes a driver from a car. Returns false when it was not assigned.
#[instrument(skip(db))]
pub async fn unassign_driver(db: &DatabaseConnection, car_id: i32, driver_id: i32) -> Result<bool> {
    get_car(db, car_id).await?;
    get_driver(db, driver_id).await?;

    let result = car_driver::Entity::delete_by_id((car_id, driver_id))
        .exec(db)
        .await?;
    let removed = result.rows_affected > 0;
    if removed {
        info!("Driver {} removed from car {}", driver_id, car_id);
    } else {
        debug!("Driver {} was not assigned to car {}", driver_id, car_id);
    }
    Ok(removed)
}

/// Drivers assigned to a car, ordered by id.
pub async fn drivers_of(db: &DatabaseConnection, car: &CarRecord) -> Result<Vec<Driver>> {
    let rows = account::Entity::find()
        .filter(account::Column::Id.is_in(car.driver_ids.clone()))
        .find_also_related(driver::Entity)
        .order_by_asc(account::Column::Id)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(account, profile)| Driver::from_parts(account, profile))
        .collect())
}

/// Cars a driver is assigned to, ordered by id.
pub async fn cars_of(db: &DatabaseConnection, driver_id: i32) -> Result<Vec<CarRecord>> {
    let cars = list_cars(db).await?;
    Ok(cars
        .into_iter()
        .filter(|record| record.driver_ids.contains(&driver_id))
        .collect())
}

// ===================== Drivers =====================

/// Attributes for a new driver account.
///
/// Mirrors the generic account-creation path: only the username is
/// mandatory, the license number is taken as given (empty by default) and a
/// missing password leaves the account with an unusable one.
#[derive(Clone, Default)]
pub struct NewDriver {
    pub username: String,
    pub password: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub license_number: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl fmt::Debug for NewDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewDriver")
            .field("username", &self.username)
            .field("license_number", &self.license_number)
            .field("is_staff", &self.is_staff)
            .field("is_superuser", &self.is_superuser)
            .finish_non_exhaustive()
    }
}

impl NewDriver {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn names(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn license_number(mut self, license_number: impl Into<String>) -> Self {
        self.license_number = license_number.into();
        self
    }
}

/// Creates the account and its driver extension in one transaction.
#[instrument(skip(db, new), fields(username = %new.username))]
pub async fn create_driver(db: &DatabaseConnection, new: NewDriver) -> Result<Driver> {
    required("username", &new.username)?;

    trace!("Hashing password for new driver");
    let stored_password = match new.password.as_deref() {
        Some(raw) => password::make_password(raw)?,
        None => password::make_unusable_password(),
    };

    let txn = db.begin().await?;

    let account = account::ActiveModel {
        username: Set(new.username.clone()),
        password: Set(stored_password),
        first_name: Set(new.first_name),
        last_name: Set(new.last_name),
        email: Set(new.email),
        is_staff: Set(new.is_staff),
        is_superuser: Set(new.is_superuser),
        is_active: Set(true),
        date_joined: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| username_taken(e, &new.username))?;

    let profile = driver::ActiveModel {
        account_id: Set(account.id),
        license_number: Set(new.license_number),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!("Driver created with ID: {}, username: {}", account.id, account.username);
    Ok(Driver::from_parts(account, Some(profile)))
}

/// Creates a driver with staff and superuser rights.
pub async fn create_superuser(db: &DatabaseConnection, new: NewDriver) -> Result<Driver> {
    create_driver(
        db,
        NewDriver {
            is_staff: true,
            is_superuser: true,
            ..new
        },
    )
    .await
}

/// All drivers ordered by id.
pub async fn list_drivers(db: &DatabaseConnection) -> Result<Vec<Driver>> {
    let rows = account::Entity::find()
        .find_also_related(driver::Entity)
        .order_by_asc(account::Column::Id)
        .all(db)
        .await?;
    debug!("Retrieved {} drivers", rows.len());
    Ok(rows
        .into_iter()
        .map(|(account, profile)| Driver::from_parts(account, profile))
        .collect())
}

pub async fn get_driver(db: &DatabaseConnection, id: i32) -> Result<Driver> {
    let (account, profile) = account::Entity::find_by_id(id)
        .find_also_related(driver::Entity)
        .one(db)
        .await?
        .ok_or(StoreError::NotFound {
            entity: "Driver",
            id,
        })?;
    Ok(Driver::from_parts(account, profile))
}

/// Replaces a driver's license number. The caller validates the format.
#[instrument(skip(db))]
pub async fn update_license_number(
    db: &DatabaseConnection,
    id: i32,
    license_number: String,
) -> Result<Driver> {
    required("license_number", &license_number)?;
    let existing = get_driver(db, id).await?;

    let profile = driver::Entity::find_by_id(id).one(db).await?;
    match profile {
        Some(profile) => {
            let mut active: driver::ActiveModel = profile.into();
            active.license_number = Set(license_number);
            active.update(db).await?;
        }
        None => {
            driver::ActiveModel {
                account_id: Set(id),
                license_number: Set(license_number),
            }
            .insert(db)
            .await?;
        }
    }

    info!("License number updated for driver {}", existing.username());
    get_driver(db, id).await
}

/// Deletes a driver, its extension row and its car assignments.
#[instrument(skip(db))]
pub async fn delete_driver(db: &DatabaseConnection, id: i32) -> Result<()> {
    let txn = db.begin().await?;

    car_driver::Entity::delete_many()
        .filter(car_driver::Column::DriverId.eq(id))
        .exec(&txn)
        .await?;
    driver::Entity::delete_by_id(id).exec(&txn).await?;
    let result = account::Entity::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        warn!("Driver with ID {} not found for deletion", id);
        return Err(StoreError::NotFound {
            entity: "Driver",
            id,
        });
    }

    txn.commit().await?;
    info!("Driver with ID {} deleted", id);
    Ok(())
}

// ===================== Index =====================

pub async fn counts(db: &DatabaseConnection) -> Result<RecordCounts> {
    Ok(RecordCounts {
        manufacturers: manufacturer::Entity::find().count(db).await?,
        cars: car::Entity::find().count(db).await?,
        drivers: account::Entity::find().count(db).await?,
    })
}
