//! Mediastore API Library
//!
//! HTTP surface for the upload protocol and namespace registry, plus application setup.

pub mod auth;
pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;
mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
