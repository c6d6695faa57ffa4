//! Voxx REST API Client
//!
//! HTTP client for the Voxx device/trip/command API. Every call is a single
//! request: no retries, no cancellation, transport-default timeouts.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::dto::{
    error_message, trip_points, CommandRequest, DevicesEnvelope, LoginEnvelope, TripsEnvelope,
};
use super::{Command, VoxxError, VoxxResult};
use crate::config::VoxxConfig;
use crate::model::{Device, Trip, TripDetail};
use crate::session::{Session, SessionError};

const PARTNER_ID_HEADER: &str = "partnerId";

/// Credentials returned by a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub access_token: String,
    pub account_id: String,
}

impl LoginGrant {
    /// Turn the grant into an authenticated session
    pub fn into_session(self) -> Result<Session, SessionError> {
        Session::authenticated(self.access_token, self.account_id)
    }
}

/// Voxx REST API client
#[derive(Debug, Clone)]
pub struct VoxxClient {
    client: Client,
    config: VoxxConfig,
}

impl VoxxClient {
    /// Create a new Voxx client with the given configuration
    pub fn new(config: VoxxConfig) -> VoxxResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("voxx-harness/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &VoxxConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn trip_detail_url(&self, trip_id: &str) -> String {
        format!(
            "{}/devices/tripDetails/{}",
            self.config.trip_detail_base().trim_end_matches('/'),
            urlencoding::encode(trip_id)
        )
    }

    /// Authenticate with username and password
    ///
    /// Sends the credentials form-encoded the same way a browser's
    /// `encodeURIComponent` would, with the partner id header attached.
    pub async fn login(&self, username: &str, password: &str) -> VoxxResult<LoginGrant> {
        let url = self.url("/auth/login");
        let body = format!(
            "username={}&password={}",
            urlencoding::encode(username),
            urlencoding::encode(password)
        );

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(PARTNER_ID_HEADER, &self.config.partner_id)
            .body(body)
            .send()
            .await
            .map_err(|e| VoxxError::Auth(format!("Login failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(&text);
            tracing::warn!(status = status.as_u16(), "Login rejected");
            return Err(VoxxError::Auth(if message.is_empty() {
                format!("Login failed: {}", status.as_u16())
            } else {
                format!("Login failed: {} {}", status.as_u16(), message)
            }));
        }

        let envelope: LoginEnvelope = response
            .json()
            .await
            .map_err(|e| VoxxError::Schema(e.to_string()))?;
        let (access_token, account_id) = envelope.into_parts().map_err(VoxxError::Schema)?;

        tracing::info!(account_id = %account_id, "Login succeeded");

        Ok(LoginGrant {
            access_token,
            account_id,
        })
    }

    /// List the devices registered to an account
    pub async fn list_devices_by_account(
        &self,
        account_id: &str,
        token: &str,
    ) -> VoxxResult<Vec<Device>> {
        let url = self.url(&format!(
            "/devices/byaccount/{}",
            urlencoding::encode(account_id)
        ));

        let envelope: DevicesEnvelope = self.get_json(&url, token).await?;
        let devices: Vec<Device> = envelope
            .results
            .unwrap_or_default()
            .devices
            .into_iter()
            .map(Device::from)
            .collect();

        tracing::debug!(account_id = %account_id, count = devices.len(), "Fetched devices");
        Ok(devices)
    }

    /// List the trips recorded for a device
    pub async fn list_trips(&self, device_id: &str, token: &str) -> VoxxResult<Vec<Trip>> {
        let url = self.url(&format!(
            "/devices/trips?deviceIds={}",
            urlencoding::encode(device_id)
        ));

        let envelope: TripsEnvelope = self.get_json(&url, token).await?;
        let trips: Vec<Trip> = envelope
            .results
            .unwrap_or_default()
            .trip_list
            .unwrap_or_default()
            .into_iter()
            .map(Trip::from)
            .collect();

        tracing::debug!(device_id = %device_id, count = trips.len(), "Fetched trips");
        Ok(trips)
    }

    /// Fetch one trip's GPS fixes together with the raw payload
    pub async fn get_trip_detail(&self, trip_id: &str, token: &str) -> VoxxResult<TripDetail> {
        let url = self.trip_detail_url(trip_id);

        let raw: serde_json::Value = self.get_json(&url, token).await?;
        let points = trip_points(&raw).unwrap_or_else(|reason| {
            tracing::warn!(trip_id = %trip_id, reason = %reason, "Trip detail has no usable point list");
            Vec::new()
        });

        tracing::debug!(trip_id = %trip_id, points = points.len(), "Fetched trip detail");
        Ok(TripDetail { points, raw })
    }

    /// Send a remote command to a device and return the API's answer verbatim
    pub async fn send_command(
        &self,
        device_id: &str,
        command: Command,
        param: Option<&str>,
        token: &str,
    ) -> VoxxResult<serde_json::Value> {
        require_token(token)?;
        let url = self.url("/devices/command");

        let body = CommandRequest {
            device_id,
            command,
            param: param.unwrap_or(""),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        tracing::info!(device_id = %device_id, command = %command, "Command sent");
        read_json(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, token: &str) -> VoxxResult<T> {
        require_token(token)?;

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .bearer_auth(token)
            .send()
            .await?;

        read_json(response).await
    }
}

fn require_token(token: &str) -> VoxxResult<()> {
    if token.trim().is_empty() {
        Err(VoxxError::MissingToken)
    } else {
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> VoxxResult<T> {
    let status = response.status();
    let path = response.url().path().to_string();

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), path = %path, "Voxx request failed");
        return Err(VoxxError::Status {
            status: status.as_u16(),
            message: error_message(&text),
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| VoxxError::Schema(e.to_string()))
}
