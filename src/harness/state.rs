//! Application State
//!
//! Shared state accessible by all harness handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::session::SessionStore;
use crate::voxx::VoxxClient;

use super::error::HarnessError;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Voxx API client
    pub client: Arc<VoxxClient>,
    /// Where the session token and account id live
    pub sessions: Arc<dyn SessionStore>,
    /// Sections with a request currently running
    pub in_flight: InFlight,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(client: VoxxClient, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            client: Arc::new(client),
            sessions,
            in_flight: InFlight::default(),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// One form on the harness page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Auth,
    Devices,
    Trips,
    Command,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Section::Auth => "Authentication",
            Section::Devices => "Device lookup",
            Section::Trips => "Trip",
            Section::Command => "Vehicle command",
        };
        f.write_str(label)
    }
}

/// At most one outstanding request per section
#[derive(Clone, Default)]
pub struct InFlight {
    active: Arc<Mutex<HashSet<Section>>>,
}

impl InFlight {
    /// Mark `section` busy until the returned guard is dropped
    pub fn begin(&self, section: Section) -> Result<FlightGuard, HarnessError> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(section) {
            tracing::debug!(section = %section, "Rejected overlapping request");
            return Err(HarnessError::Validation(format!(
                "{} request already in progress",
                section
            )));
        }

        Ok(FlightGuard {
            active: Arc::clone(&self.active),
            section,
        })
    }

    #[cfg(test)]
    fn is_busy(&self, section: Section) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&section)
    }
}

/// Releases its section on drop, including when the handler future is cancelled
pub struct FlightGuard {
    active: Arc<Mutex<HashSet<Section>>>,
    section: Section,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.section);
    }
}
