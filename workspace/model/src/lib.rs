//! Persistence layer for the taxi service: SeaORM entities, password
//! hashing and the record store operations built on top of them.

pub mod driver;
pub mod entities;
pub mod password;
pub mod store;

pub use driver::Driver;
pub use store::{Constraint, StoreError};
