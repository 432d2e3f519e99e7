//! Helpers shared across CLI commands.

use std::fs;
use std::path::Path;

use bustrack::config::ConfigFile;
use bustrack::geo::Coordinate;
use bustrack::routing::{
    DirectionsOracle, ReqwestClient, RoutingError, RoutingOracle, StraightLineOracle,
};
use serde::de::DeserializeOwned;

use crate::error::CliError;

/// Routing oracle chosen from config and flags.
pub enum CliOracle {
    /// Directions API over HTTP.
    Directions(DirectionsOracle<ReqwestClient>),
    /// Great-circle distance, no network.
    Offline(StraightLineOracle),
}

impl RoutingOracle for CliOracle {
    async fn road_distance_meters(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<f64, RoutingError> {
        match self {
            CliOracle::Directions(oracle) => oracle.road_distance_meters(origin, destination).await,
            CliOracle::Offline(oracle) => oracle.road_distance_meters(origin, destination).await,
        }
    }
}

/// Builds the oracle; `offline` skips the network entirely.
pub fn resolve_oracle(config: &ConfigFile, offline: bool) -> Result<CliOracle, CliError> {
    if offline {
        return Ok(CliOracle::Offline(StraightLineOracle));
    }

    let api_key = config.routing.api_key.clone().ok_or_else(|| {
        CliError::Config(
            "routing.api_key is not set. \
             Run 'bustrack config set routing.api_key <key>' or pass --offline"
                .to_string(),
        )
    })?;
    let client = ReqwestClient::with_timeout(config.routing.timeout_secs)
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(CliOracle::Directions(DirectionsOracle::with_base_url(
        client,
        api_key,
        config.routing.base_url.clone(),
    )))
}

/// Reads a JSON Lines file. Blank lines and `#` comments are skipped.
///
/// Returns `(line_number, decoded)` pairs; undecodable lines are returned as
/// errors so callers can decide whether to skip them.
pub fn read_json_lines<T: DeserializeOwned>(
    path: &Path,
) -> Result<Vec<(usize, Result<T, CliError>)>, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            let decoded = serde_json::from_str(line).map_err(|e| CliError::Input {
                path: path.to_path_buf(),
                line: number,
                message: e.to_string(),
            });
            (number, decoded)
        })
        .collect())
}

/// Reads a whole-file JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|e| CliError::Input {
        path: path.to_path_buf(),
        line: e.line(),
        message: e.to_string(),
    })
}

/// Formats meters for display: `850 m` or `2.3 km`.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}
