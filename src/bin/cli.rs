//! Voxx CLI
//!
//! Terminal front end for the same operations the web harness offers:
//! - Log in and out
//! - List devices and trips
//! - Inspect a trip and export its route map
//! - Send remote commands

use anyhow::{bail, Context};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use voxx_harness::config::{generate_default_config, Config};
use voxx_harness::format::{
    format_distance, format_speed, format_trip_time, short_trip_id, DEFAULT_DISTANCE_DECIMALS,
};
use voxx_harness::logging;
use voxx_harness::model::NOT_AVAILABLE;
use voxx_harness::session::{FileSessionStore, Session, SessionStore};
use voxx_harness::track::{render_document, track_geojson, TrackPlan};
use voxx_harness::voxx::{Command, VoxxClient};

#[derive(Parser)]
#[command(name = "voxx-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Command-line harness for the Voxx telematics API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session
    Login {
        /// Account username
        #[arg(short, long, env = "VOXX_USERNAME")]
        username: String,
        /// Account password
        #[arg(short, long, env = "VOXX_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show session and configuration
    Status,

    /// List the devices of the logged-in account
    Devices,

    /// List the trips of a device
    Trips {
        /// Device id
        device_id: String,
    },

    /// Show one trip's track
    Trip {
        /// Trip id
        trip_id: String,
        /// Write a standalone route map to this HTML file
        #[arg(long)]
        map: Option<PathBuf>,
        /// Print the sorted track as GeoJSON
        #[arg(long)]
        geojson: bool,
        /// Print the raw API payload
        #[arg(long)]
        raw: bool,
    },

    /// Send a remote command to a device
    Command {
        /// Device id
        device_id: String,
        /// One of: locate, req_fuel, req_speed, req_odo, req_dtc
        command: Command,
        /// Optional command parameter
        param: Option<String>,
    },

    /// Generate default config file
    InitConfig {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    logging::init(&config.logging);

    let sessions = FileSessionStore::new(&config.session.path);
    let client = VoxxClient::new(config.voxx.clone()).context("Failed to build Voxx client")?;

    match cli.command {
        Commands::Login { username, password } => {
            if username.trim().is_empty() || password.is_empty() {
                bail!("Please enter a username and password");
            }

            let grant = client
                .login(username.trim(), &password)
                .await
                .context("Authentication failed. Please check your credentials.")?;
            let session = grant.into_session()?;
            let account_id = session.account_id().to_string();
            sessions.set(session).await?;

            println!("Authenticated successfully!");
            println!("  Account: {}", account_id);
        }

        Commands::Logout => {
            sessions.clear().await?;
            println!("Logged out successfully");
        }

        Commands::Status => {
            let session = sessions.get().await?;

            println!("Voxx CLI v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("API:          {}", config.voxx.base_url);
            println!("Trip details: {}", config.voxx.trip_detail_base());
            println!("Session file: {:?}", sessions.path());
            if session.is_authenticated() {
                println!("Session:      authenticated (account {})", session.account_id());
            } else {
                println!("Session:      not logged in");
            }
        }

        Commands::Devices => {
            let session = require_login(&sessions).await?;
            let devices = client
                .list_devices_by_account(session.account_id(), session.token())
                .await
                .context("Failed to fetch devices")?;

            if devices.is_empty() {
                println!("No devices found");
                return Ok(());
            }

            println!("Found {} devices", devices.len());
            println!();
            println!("{:<24} {:<16} {}", "DeviceId", "Airid", "Name");
            println!("{}", "-".repeat(56));
            for device in devices {
                println!(
                    "{:<24} {:<16} {}",
                    device.device_id, device.air_id, device.name
                );
            }
        }

        Commands::Trips { device_id } => {
            let session = require_login(&sessions).await?;
            if device_id.trim().is_empty() {
                bail!("Please enter device IDs");
            }

            let trips = client
                .list_trips(device_id.trim(), session.token())
                .await
                .context("Failed to fetch trips")?;

            if trips.is_empty() {
                println!("No trips found");
                return Ok(());
            }

            println!(
                "{:<12} {:<26} {:<26} {:<24} {:<24} {}",
                "TripId", "Start", "End", "Started From", "Ended At", "Miles"
            );
            println!("{}", "-".repeat(124));
            for trip in trips {
                let time = |t: Option<chrono::DateTime<chrono::Utc>>| {
                    t.map(|t| format_trip_time(&t.with_timezone(&Local)))
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
                };
                let street = |a: &Option<voxx_harness::model::Address>| {
                    a.as_ref()
                        .map(|a| a.street.clone())
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
                };
                let miles = format_distance(trip.distance, DEFAULT_DISTANCE_DECIMALS)
                    .unwrap_or_else(|_| NOT_AVAILABLE.to_string());

                println!(
                    "{:<12} {:<26} {:<26} {:<24} {:<24} {}",
                    short_trip_id(&trip.trip_id),
                    time(trip.start),
                    time(trip.end),
                    street(&trip.start_address),
                    street(&trip.end_address),
                    miles
                );
            }
        }

        Commands::Trip {
            trip_id,
            map,
            geojson,
            raw,
        } => {
            let session = sessions.get().await?;
            if session.token().is_empty() {
                bail!("Authorization token is missing");
            }

            let detail = client
                .get_trip_detail(&trip_id, session.token())
                .await
                .with_context(|| format!("Failed to fetch trip {}", trip_id))?;
            let plan = TrackPlan::from_points(&detail.points);

            if raw {
                println!("{}", serde_json::to_string_pretty(&detail.raw)?);
                return Ok(());
            }

            if geojson {
                println!("{}", serde_json::to_string_pretty(&track_geojson(&plan))?);
                return Ok(());
            }

            print_trip_summary(&trip_id, &plan);

            if let Some(path) = map {
                let html = render_document(&format!("Trip {}", short_trip_id(&trip_id)), &plan)?;
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, html)?;
                println!();
                println!("Route map written to {:?}", path);
            }
        }

        Commands::Command {
            device_id,
            command,
            param,
        } => {
            let session = require_login(&sessions).await?;
            if device_id.trim().is_empty() {
                bail!("Please enter a device ID");
            }

            let param = param.as_deref().map(str::trim).filter(|p| !p.is_empty());
            let response = client
                .send_command(device_id.trim(), command, param, session.token())
                .await
                .context("Failed to send command")?;

            println!("Command {} sent successfully", command);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::InitConfig { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Stored session, or an error before any request is made
async fn require_login(sessions: &FileSessionStore) -> anyhow::Result<Session> {
    let session = sessions.get().await?;
    if !session.is_authenticated() {
        bail!("Please login first");
    }
    Ok(session)
}

fn print_trip_summary(trip_id: &str, plan: &TrackPlan) {
    println!("API : /v1/devices/tripDetails/{}", trip_id);
    println!();

    if plan.is_empty() {
        println!("No GPS points to display");
    } else {
        println!("Points:    {}", plan.points.len());
        if let (Some(start), Some(end)) = (plan.start(), plan.end()) {
            println!(
                "Start:     {} ({:.5}, {:.5})",
                format_trip_time(&start.time.with_timezone(&Local)),
                start.position.lat,
                start.position.lng
            );
            println!(
                "End:       {} ({:.5}, {:.5})",
                format_trip_time(&end.time.with_timezone(&Local)),
                end.position.lat,
                end.position.lng
            );
        }
        println!("Max speed: {} mph", format_speed(plan.max_speed as f64));
    }

    if plan.skipped > 0 {
        println!(
            "Skipped:   {} point(s) without a usable position or time",
            plan.skipped
        );
    }
}
