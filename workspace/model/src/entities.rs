//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the taxi service here: manufacturers,
//! the cars they build, and the drivers (accounts plus a driver extension)
//! that get assigned to cars.

pub mod account;
pub mod car;
pub mod car_driver;
pub mod driver;
pub mod manufacturer;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::account::Entity as Account;
    pub use super::car::Entity as Car;
    pub use super::car_driver::Entity as CarDriver;
    pub use super::driver::Entity as Driver;
    pub use super::manufacturer::Entity as Manufacturer;
}
