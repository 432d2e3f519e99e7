//! `bustrack eta`: one-shot display ETA.

use bustrack::config::ConfigFile;
use bustrack::eta::compute_eta;
use bustrack::geo::{distance_meters, Coordinate};
use tracing::debug;

use super::common::{format_distance, resolve_oracle};
use crate::error::CliError;

/// Arguments for a single ETA query.
#[derive(Debug, Clone)]
pub struct EtaArgs {
    pub rider: Coordinate,
    pub bus: Coordinate,
    pub speed_kmh: f64,
    pub emergency: bool,
    pub offline: bool,
}

pub async fn run(config: &ConfigFile, args: EtaArgs) -> Result<(), CliError> {
    let oracle = resolve_oracle(config, args.offline)?;
    debug!(rider = %args.rider, bus = %args.bus, speed_kmh = args.speed_kmh, "Computing ETA");

    let eta = compute_eta(
        &oracle,
        config.alerts.eta_config(),
        args.emergency,
        args.rider,
        args.bus,
        args.speed_kmh,
    )
    .await;

    println!(
        "Distance: {}",
        format_distance(distance_meters(args.rider, args.bus))
    );
    println!("ETA:      {}", eta);
    Ok(())
}
