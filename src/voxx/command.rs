//! Remote vehicle commands

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of commands the device endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Ask the unit for its current position
    Locate,
    /// Request fuel level
    ReqFuel,
    /// Request current speed
    ReqSpeed,
    /// Request odometer reading
    ReqOdo,
    /// Request diagnostic trouble codes
    ReqDtc,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Locate,
        Command::ReqFuel,
        Command::ReqSpeed,
        Command::ReqOdo,
        Command::ReqDtc,
    ];

    /// Wire name of the command
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Locate => "locate",
            Command::ReqFuel => "req_fuel",
            Command::ReqSpeed => "req_speed",
            Command::ReqOdo => "req_odo",
            Command::ReqDtc => "req_dtc",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown command '{0}'. Expected one of: locate, req_fuel, req_speed, req_odo, req_dtc")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|command| command.as_str() == s.trim())
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}
