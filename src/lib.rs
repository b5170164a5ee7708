//! Taxi service: manufacturers, their cars and the drivers assigned to them.
//!
//! The crate serves HTML pages (public lists with search, detail pages and
//! driver admin pages) and a JSON API under `/api/v1`, both backed by the
//! record store in the `model` crate.

pub mod cli;
pub mod config;
pub mod forms;
pub mod handlers;
pub mod router;
pub mod schemas;
pub mod templates;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod tests;
