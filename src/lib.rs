//! # Accommodation Gateway Library
//!
//! Backend of the accommodation registration form. Every route obtains a
//! bearer token for the booking platform, reshapes the submitted JSON and
//! forwards it, returning the platform's answer or a wrapped error.
//!
//! Modules:
//! - `auth`: client-credentials exchange and the lazily refreshed token manager
//! - `cache`: single-slot token store
//! - `booking`: authenticated booking API client and payload reshaping
//! - `server`: Axum routes consumed by the form
//! - `config`: service configuration

pub mod auth;
pub mod booking;
pub mod cache;
pub mod config;
pub mod helpers;
pub mod observability;
pub mod server;
#[cfg(test)]
mod tests;
pub mod utils;


pub use crate::auth::{AuthError, TokenManager, TokenProvider};
pub use crate::config::types::ServiceConfig;
