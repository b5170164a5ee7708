pub mod admin;
pub mod cars;
pub mod drivers;
pub mod health;
pub mod manufacturers;
pub mod pages;
