//! Voxx API Integration
//!
//! Typed client for the remote Voxx telematics API.
//!
//! ## Endpoints
//!
//! - `POST /auth/login` - form-encoded credentials, returns token + account id
//! - `GET /devices/byaccount/{accountId}` - devices for an account
//! - `GET /devices/trips?deviceIds={id}` - trips for a device
//! - `GET /devices/tripDetails/{id}` - GPS fixes of one trip
//! - `POST /devices/command` - remote vehicle command
//!
//! Responses are validated against the schemas in `dto` before they become
//! [`crate::model`] values.

mod client;
mod command;
mod dto;
mod error;

pub use client::{LoginGrant, VoxxClient};
pub use command::{Command, UnknownCommand};
pub use error::{VoxxError, VoxxResult};
