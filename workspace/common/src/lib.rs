//! Common transport-layer types shared by the taxi service crates.
//! The response shapes here are what the JSON API returns and what the HTML
//! templates are rendered from.

pub mod search;

pub use search::{search, Searchable};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ===================== Manufacturers =====================

/// Manufacturer response model.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ManufacturerDto {
    pub id: i32,
    pub name: String,
    pub country: String,
}

// ===================== Cars =====================

/// Car response model.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CarDto {
    pub id: i32,
    pub model: String,
    pub manufacturer_id: i32,
    /// Display name of the manufacturer, e.g. "Toyota Japan".
    pub manufacturer: String,
    /// Ids of the drivers assigned to this car.
    pub driver_ids: Vec<i32>,
}

// ===================== Drivers =====================

/// Driver response model. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DriverDto {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub license_number: String,
    pub is_staff: bool,
    /// Canonical detail page, e.g. "/drivers/3/".
    pub url: String,
}

/// Number of records of each kind, shown on the index page.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RecordCounts {
    pub manufacturers: u64,
    pub cars: u64,
    pub drivers: u64,
}
