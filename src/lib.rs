//! # Voxx Test Harness
//!
//! Operator tooling for exercising the Voxx telematics API: log in, look up
//! the devices of an account, list a device's trips, inspect one trip on a
//! map, and send remote commands to a vehicle.
//!
//! ## Modules
//!
//! - [`session`]: token + account id persistence behind a `SessionStore` trait
//! - [`voxx`]: typed client for the remote API
//! - [`track`]: chronological track planning and Leaflet/GeoJSON rendering
//! - [`harness`]: server-rendered web console built with Axum
//! - [`config`] / [`logging`]: TOML configuration and `tracing` setup
//! - [`model`] / [`format`]: domain values and their display formatting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use voxx_harness::config::VoxxConfig;
//! use voxx_harness::session::{FileSessionStore, SessionStore};
//! use voxx_harness::voxx::VoxxClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = VoxxClient::new(VoxxConfig::default())?;
//!     let sessions = FileSessionStore::new("session.json");
//!
//!     // Log in and keep the token for later runs
//!     let grant = client.login("operator@fleet.io", "secret").await?;
//!     sessions.set(grant.into_session()?).await?;
//!
//!     // List the account's devices
//!     let session = sessions.get().await?;
//!     let devices = client
//!         .list_devices_by_account(session.account_id(), session.token())
//!         .await?;
//!
//!     println!("Found {} devices", devices.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod format;
pub mod harness;
pub mod logging;
pub mod model;
pub mod session;
pub mod track;
pub mod voxx;

#[cfg(test)]
pub(crate) mod testing;

// Re-export top-level types for convenience
pub use config::{Config, ConfigError};

pub use harness::{build_router, serve, AppState, HarnessError};

pub use model::{Device, Trip, TripDetail, TripPoint};

pub use session::{FileSessionStore, MemorySessionStore, Session, SessionError, SessionStore};

pub use track::{RenderError, TrackPlan};

pub use voxx::{Command, VoxxClient, VoxxError};
