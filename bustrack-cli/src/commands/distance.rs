//! `bustrack distance`: great-circle distance between two points.

use bustrack::geo::{distance_meters, Coordinate};

use super::common::format_distance;
use crate::error::CliError;

pub fn run(from: Coordinate, to: Coordinate) -> Result<(), CliError> {
    let meters = distance_meters(from, to);
    println!("{} ({:.1} m)", format_distance(meters), meters);
    Ok(())
}
