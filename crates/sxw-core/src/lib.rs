//! Core domain + application logic for the SX Wine storefront.
//!
//! This crate is framework-agnostic. The remote club API and the Telegram shell
//! live behind ports (traits) implemented in adapter crates.

pub mod api;
pub mod catalog;
pub mod config;
pub mod date;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod gate;
pub mod identity;
pub mod interest;
pub mod logging;
pub mod messaging;
pub mod model;
pub mod notify;
pub mod query;
pub mod route;
pub mod storefront;
pub mod views;

pub use errors::{Error, Result};
