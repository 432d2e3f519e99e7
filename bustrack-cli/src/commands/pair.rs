//! `bustrack pair`: replay scanner events through the pairing flow.

use std::path::PathBuf;

use bustrack::config::ConfigFile;
use bustrack::pairing::{
    ConductorRecord, MemoryBusRecords, MemoryConductorDirectory, PairingController, PairingNotice,
    ScanOutcome,
};
use bustrack::scan::ScanEvent;
use tokio::sync::mpsc;
use tracing::warn;

use super::common::{read_json, read_json_lines};
use crate::error::CliError;

/// Arguments for a pairing replay.
#[derive(Debug, Clone)]
pub struct PairArgs {
    pub scans: PathBuf,
    pub bus_id: String,
    pub conductors: PathBuf,
    pub confirm: bool,
    pub display: (f64, f64),
}

pub async fn run(config: &ConfigFile, args: PairArgs) -> Result<(), CliError> {
    let conductors: Vec<ConductorRecord> = read_json(&args.conductors)?;
    let directory = MemoryConductorDirectory::new(conductors);
    let (width, height) = args.display;
    let viewport = config.scanner.viewport_for(width, height);

    let (tx, mut notices) = mpsc::unbounded_channel();
    let controller = PairingController::new(
        args.bus_id.clone(),
        viewport,
        directory,
        MemoryBusRecords::with_buses([args.bus_id.clone()]),
    )
    .with_notices(tx);

    println!(
        "Pairing bus {} (scan window {:.0}x{:.0} at {:.0},{:.0})",
        args.bus_id, viewport.width, viewport.height, viewport.origin_x, viewport.origin_y
    );

    let mut paired = false;
    for (line, event) in read_json_lines::<ScanEvent>(&args.scans)? {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!(line, error = %e, "Skipping scan event");
                continue;
            }
        };

        match controller.handle_scan(&event).await {
            ScanOutcome::Ignored => println!("line {}: ignored, pairing in progress", line),
            ScanOutcome::Dropped(reason) => println!("line {}: dropped ({:?})", line, reason),
            ScanOutcome::Abandoned => println!("line {}: abandoned", line),
            ScanOutcome::Rejected(_) => {}
            ScanOutcome::AwaitingConfirmation(record) => {
                println!("line {}: pair {} ({}) with this bus?", line, record.name, record.id);
                if args.confirm {
                    paired = controller.confirm().await?.is_paired();
                } else {
                    controller.cancel();
                    println!("  cancelled (pass --confirm to accept)");
                }
            }
        }
        drain(&mut notices);

        if paired {
            break;
        }
    }

    if !paired {
        println!("No conductor paired");
    }
    Ok(())
}

fn drain(notices: &mut mpsc::UnboundedReceiver<PairingNotice>) {
    while let Ok(notice) = notices.try_recv() {
        println!("  {}", notice);
    }
}
