//! `bustrack monitor`: replay location records through a monitoring session.

use std::path::PathBuf;

use bustrack::config::{config_directory, ConfigFile};
use bustrack::feed::LocationRecord;
use bustrack::geo::Coordinate;
use bustrack::monitor::{BusMonitor, MonitorConfig, SnapshotOutcome};
use bustrack::proximity::AlertRadius;
use bustrack::storage::{JsonFileStore, KeyValueStore, RiderPreferences};
use tracing::warn;

use super::common::{format_distance, read_json_lines, resolve_oracle};
use crate::error::CliError;

const PREFERENCES_FILE: &str = "preferences.json";

/// Arguments for a replay.
#[derive(Debug, Clone)]
pub struct MonitorArgs {
    pub records: PathBuf,
    pub bus_id: String,
    pub rider: Coordinate,
    pub radius: Option<AlertRadius>,
    pub offline: bool,
    pub auto_acknowledge: bool,
}

pub async fn run(config: &ConfigFile, args: MonitorArgs) -> Result<(), CliError> {
    let preferences = RiderPreferences::new(JsonFileStore::open(
        config_directory().join(PREFERENCES_FILE),
    )?);
    let radius = resolve_radius(&preferences, args.radius, config.alerts.radius)?;
    preferences.set_last_bus_id(&args.bus_id)?;

    let oracle = resolve_oracle(config, args.offline)?;
    let monitor = BusMonitor::new(
        MonitorConfig::new(args.bus_id.clone(), radius).with_eta(config.alerts.eta_config()),
        oracle,
    );
    monitor.set_rider_position(args.rider);

    println!(
        "Monitoring bus {} within {} of {}",
        args.bus_id, radius, args.rider
    );

    for (line, record) in read_json_lines::<LocationRecord>(&args.records)? {
        let snapshot = match record.and_then(|r| Ok(r.into_snapshot(args.bus_id.clone())?)) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(line, error = %e, "Skipping record");
                continue;
            }
        };
        let time = snapshot.timestamp.format("%H:%M:%S").to_string();

        let transition = match monitor.apply_snapshot(snapshot) {
            SnapshotOutcome::Applied(transition) => transition,
            SnapshotOutcome::Stale => {
                println!("{}  (stale, ignored)", time);
                continue;
            }
            SnapshotOutcome::OtherBus | SnapshotOutcome::Closed => continue,
        };
        monitor.refresh_eta().await;

        let view = monitor.view();
        println!(
            "{}  {:>8}  {:<10}  ETA {}",
            time,
            view.distance_m.map(format_distance).unwrap_or_default(),
            view.alert_state,
            view.eta_text().unwrap_or_default()
        );

        if transition.is_some_and(|t| t.fired()) {
            println!("  >> Bus {} is within {}", args.bus_id, radius);
            if args.auto_acknowledge && monitor.acknowledge_alert() {
                println!("  >> Alert acknowledged");
            }
        }
    }

    monitor.close();
    let view = monitor.view();
    println!("Alerts fired: {}", view.alerts_fired);
    Ok(())
}

/// Radius for this run: the flag (remembered for next time), then the
/// rider's stored choice, then `[alerts] radius_m`.
fn resolve_radius<S: KeyValueStore>(
    preferences: &RiderPreferences<S>,
    requested: Option<AlertRadius>,
    configured: AlertRadius,
) -> Result<AlertRadius, CliError> {
    match requested {
        Some(radius) => {
            preferences.set_alert_radius(radius)?;
            Ok(radius)
        }
        None => Ok(preferences.alert_radius_or(configured)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bustrack::storage::MemoryStore;

    #[test]
    fn test_configured_radius_used_without_preference() {
        let preferences = RiderPreferences::new(MemoryStore::new());
        let radius = resolve_radius(&preferences, None, AlertRadius::FiveKm).unwrap();
        assert_eq!(radius, AlertRadius::FiveKm);
    }

    #[test]
    fn test_flag_overrides_and_is_remembered() {
        let preferences = RiderPreferences::new(MemoryStore::new());
        let radius =
            resolve_radius(&preferences, Some(AlertRadius::ThreeKm), AlertRadius::FiveKm).unwrap();
        assert_eq!(radius, AlertRadius::ThreeKm);

        // Stored choice now wins over the configured radius
        let radius = resolve_radius(&preferences, None, AlertRadius::FiveKm).unwrap();
        assert_eq!(radius, AlertRadius::ThreeKm);
    }
}
