//! Voxx Test Harness web app
//!
//! Server-rendered operator console for the Voxx API, built with Axum.
//!
//! # Routes
//!
//! ## Sections
//! - `GET /` - Home page with every section
//! - `POST /auth/login` - Log in
//! - `POST /auth/logout` - Clear the session
//! - `GET /devices` - Devices of the logged-in account
//! - `GET /trips?deviceId=` - Trips of a device
//! - `POST /command` - Send a remote command
//!
//! ## Trip detail
//! - `GET /details/:id` - Raw payload and route map
//! - `GET /details/:id/track.geojson` - Sorted track as GeoJSON
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health` - Status details
//!
//! # Example
//!
//! ```rust,ignore
//! use voxx_harness::config::Config;
//! use voxx_harness::harness::{serve, AppState};
//! use voxx_harness::session::FileSessionStore;
//! use voxx_harness::voxx::VoxxClient;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_default();
//!     let client = VoxxClient::new(config.voxx.clone())?;
//!     let sessions = Arc::new(FileSessionStore::new(&config.session.path));
//!
//!     serve(AppState::new(client, sessions), &config.server).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod health;
pub mod layout;
pub mod sections;
pub mod state;

pub use error::{HarnessError, HarnessResult};
pub use state::{AppState, Section};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Build the harness router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let section_routes = Router::new()
        .route("/", get(sections::home))
        .route("/auth/login", post(sections::auth::login))
        .route("/auth/logout", post(sections::auth::logout))
        .route("/devices", get(sections::devices::fetch_devices))
        .route("/trips", get(sections::trips::fetch_trips))
        .route("/command", post(sections::command::send_command))
        .route("/details/:id", get(sections::trip_detail::trip_detail))
        .route(
            "/details/:id/track.geojson",
            get(sections::trip_detail::trip_track),
        );

    let health_routes = Router::new()
        .route("/live", get(health::liveness))
        .route("/", get(health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .merge(section_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Start the harness server
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<(), HarnessError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| HarnessError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Voxx Test Harness listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| HarnessError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Voxx Test Harness shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VoxxConfig;
    use crate::session::{MemorySessionStore, Session, SessionStore};
    use crate::testing::{StubVoxx, STUB_PASSWORD, STUB_TOKEN, STUB_USERNAME};
    use crate::voxx::VoxxClient;
    use axum::{
        body::Body,
        http::{header, Request, Response, StatusCode},
    };
    use tower::util::ServiceExt;

    struct TestApp {
        router: Router,
        stub: StubVoxx,
        store: Arc<MemorySessionStore>,
        in_flight: state::InFlight,
    }

    async fn create_test_app(session: Session) -> TestApp {
        let stub = StubVoxx::start().await;
        let client = VoxxClient::new(VoxxConfig::new(stub.base_url())).unwrap();
        let store = Arc::new(MemorySessionStore::with_session(session));
        let sessions: Arc<dyn SessionStore> = store.clone();

        let state = AppState::new(client, sessions);
        let in_flight = state.in_flight.clone();

        TestApp {
            router: build_router(state),
            stub,
            store,
            in_flight,
        }
    }

    fn logged_in() -> Session {
        Session::authenticated(STUB_TOKEN, "A1").unwrap()
    }

    async fn get(app: &TestApp, uri: &str) -> Response<Body> {
        app.router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_form(app: &TestApp, uri: &str, form: &str) -> Response<Body> {
        app.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(form.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn credentials(password: &str) -> String {
        format!(
            "username={}&password={}",
            urlencoding::encode(STUB_USERNAME),
            urlencoding::encode(password)
        )
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app(Session::anonymous()).await;
        let response = get(&app, "/health/live").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let app = create_test_app(logged_in()).await;
        let response = get(&app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["session"], "authenticated");
    }

    #[tokio::test]
    async fn test_home_page() {
        let app = create_test_app(Session::anonymous()).await;
        let response = get(&app, "/?deviceId=dev-100").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("<title>Voxx Test Harness</title>"));
        assert!(!html.contains("/auth/logout"));
        assert!(html.contains(r#"name="deviceId" type="text" value="dev-100""#));
    }

    #[tokio::test]
    async fn test_login_success_persists_session() {
        let app = create_test_app(Session::anonymous()).await;
        let response = post_form(&app, "/auth/login", &credentials(STUB_PASSWORD)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("Authenticated successfully!"));
        assert!(html.contains("Login successful"));
        assert!(html.contains("/auth/logout"));

        let session = app.store.get().await.unwrap();
        assert_eq!(session.token(), STUB_TOKEN);
        assert_eq!(session.account_id(), "A1");
    }

    #[tokio::test]
    async fn test_login_failure_keeps_previous_session() {
        let previous = Session::authenticated("old-token", "A9").unwrap();
        let app = create_test_app(previous.clone()).await;

        let response = post_form(&app, "/auth/login", &credentials("wrong")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("Authentication failed. Please check your credentials."));
        assert!(html.contains("Login failed: 401 Invalid credentials"));
        assert_eq!(app.store.get().await.unwrap(), previous);
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let app = create_test_app(Session::anonymous()).await;
        let response = post_form(&app, "/auth/login", "username=&password=").await;

        let html = body_text(response).await;
        assert!(html.contains("Please enter a username and password"));
        assert_eq!(app.stub.hits(), 0);
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let app = create_test_app(logged_in()).await;
        let response = post_form(&app, "/auth/logout", "").await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/?notice=logged_out"
        );
        assert!(!app.store.get().await.unwrap().is_authenticated());

        let html = body_text(get(&app, "/?notice=logged_out").await).await;
        assert!(html.contains("Logged out successfully"));
    }

    #[tokio::test]
    async fn test_unauthenticated_sections_make_no_requests() {
        let app = create_test_app(Session::anonymous()).await;

        let devices = body_text(get(&app, "/devices").await).await;
        assert!(devices.contains("Please login first"));

        let trips = body_text(get(&app, "/trips?deviceId=dev-100").await).await;
        assert!(trips.contains("Please login first"));

        let command = body_text(
            post_form(&app, "/command", "deviceId=dev-100&command=locate&param=").await,
        )
        .await;
        assert!(command.contains("Please login first"));

        let detail = body_text(get(&app, "/details/trip-0001").await).await;
        assert!(detail.contains("Error: Authorization token is missing"));

        assert_eq!(app.stub.hits(), 0);
    }

    #[tokio::test]
    async fn test_devices_table() {
        let app = create_test_app(logged_in()).await;
        let response = get(&app, "/devices").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert_eq!(html.matches(r#"href="/?deviceId="#).count(), 2);
        assert!(html.contains(r#"href="/?deviceId=dev-100""#));
        assert!(html.contains(r#"href="/?deviceId=200""#));
        assert!(html.contains(
            r#"<a href="/?deviceId=dev-100">dev-100</a></td><td>AIR-1</td><td>Van 1</td>"#
        ));
        assert!(html.contains(r#"<a href="/?deviceId=200">200</a></td><td>AIR-2</td><td>N/A</td>"#));
        assert!(html.contains("Found 2 devices"));
        assert_eq!(app.stub.hits(), 1);
    }

    #[tokio::test]
    async fn test_devices_fetch_clears_selection() {
        let app = create_test_app(logged_in()).await;
        let html = body_text(get(&app, "/devices?deviceId=dev-100").await).await;

        assert!(html.contains("Found 2 devices"));
        assert!(!html.contains(r#"value="dev-100""#));
        assert!(html.contains(r#"name="deviceId" type="text" value="""#));
    }

    #[tokio::test]
    async fn test_rejected_token_shows_fetch_error() {
        let app = create_test_app(Session::authenticated("stale", "A1").unwrap()).await;
        let html = body_text(get(&app, "/devices").await).await;

        assert!(html.contains("Failed to fetch devices"));
        assert!(html.contains("Token expired"));
    }

    #[tokio::test]
    async fn test_overlapping_request_rejected() {
        let app = create_test_app(logged_in()).await;
        let _busy = app.in_flight.begin(Section::Devices).unwrap();

        let html = body_text(get(&app, "/devices").await).await;
        assert!(html.contains("Device lookup request already in progress"));
        assert_eq!(app.stub.hits(), 0);

        let trips = body_text(get(&app, "/trips?deviceId=dev-100").await).await;
        assert!(trips.contains("trip-000..."));
    }

    #[tokio::test]
    async fn test_trips_table() {
        let app = create_test_app(logged_in()).await;
        let html = body_text(get(&app, "/trips?deviceId=dev-100").await).await;

        assert!(html.contains(r#"href="/details/trip-0001-aaaa-bbbb""#));
        assert!(html.contains("12.50 mi"));
        assert!(html.contains("21 ft"));
        assert!(html.contains("1 Main St"));
    }

    #[tokio::test]
    async fn test_trips_empty_and_missing_device() {
        let app = create_test_app(logged_in()).await;

        let empty = body_text(get(&app, "/trips?deviceId=other").await).await;
        assert!(empty.contains("No trips found"));

        let missing = body_text(get(&app, "/trips?deviceId=").await).await;
        assert!(missing.contains("Please enter device IDs"));
        assert_eq!(app.stub.hits(), 1);
    }

    #[tokio::test]
    async fn test_send_command() {
        let app = create_test_app(logged_in()).await;
        let html = body_text(
            post_form(&app, "/command", "deviceId=dev-100&command=req_fuel&param=").await,
        )
        .await;

        assert!(html.contains("Command req_fuel sent successfully"));
        assert!(html.contains("&quot;queued&quot;"));
    }

    #[tokio::test]
    async fn test_command_validation() {
        let app = create_test_app(logged_in()).await;

        let no_device =
            body_text(post_form(&app, "/command", "deviceId=&command=locate").await).await;
        assert!(no_device.contains("Please enter a device ID"));

        let bad_command =
            body_text(post_form(&app, "/command", "deviceId=dev-100&command=reboot").await).await;
        assert!(bad_command.contains("Please select a command"));

        assert_eq!(app.stub.hits(), 0);
    }

    #[tokio::test]
    async fn test_trip_detail_sorted_track() {
        let app = create_test_app(logged_in()).await;
        let response = get(&app, "/details/trip-0001").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("API : /v1/devices/tripDetails/trip-0001"));
        assert!(html.contains(r#""polyline":[[40.0,-75.0],[40.01,-75.01],[40.02,-75.02]]"#));
        assert!(html.contains("Max speed: 35 mph"));
    }

    #[tokio::test]
    async fn test_trip_detail_error() {
        let app = create_test_app(logged_in()).await;
        let html = body_text(get(&app, "/details/missing").await).await;

        assert!(html.contains("Error: Trip not found"));
        assert!(!html.contains("Request failed with status"));
    }

    #[tokio::test]
    async fn test_trip_detail_unexpected_shape() {
        let app = create_test_app(logged_in()).await;
        let response = get(&app, "/details/pending").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("&quot;processing&quot;"));
        assert!(html.contains("No GPS points to display"));
        assert!(!html.contains("Error:"));
    }

    #[tokio::test]
    async fn test_trip_track_geojson() {
        let app = create_test_app(logged_in()).await;
        let response = get(&app, "/details/trip-0001/track.geojson").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(
            body["features"][0]["geometry"]["coordinates"][0],
            serde_json::json!([-75.0, 40.0])
        );
    }

    #[tokio::test]
    async fn test_trip_track_requires_token() {
        let app = create_test_app(Session::anonymous()).await;
        let response = get(&app, "/details/trip-0001/track.geojson").await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"]["code"], "AUTH_ERROR");
        assert_eq!(body["error"]["message"], "Authorization token is missing");
        assert!(body["request_id"].is_string());
        assert_eq!(app.stub.hits(), 0);
    }

    #[tokio::test]
    async fn test_trip_track_api_error_is_json() {
        let app = create_test_app(logged_in()).await;
        let response = get(&app, "/details/missing/track.geojson").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"]["code"], "REQUEST_ERROR");
        assert_eq!(body["error"]["message"], "Trip not found");
    }
}
