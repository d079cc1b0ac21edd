mod angular_map;
mod config;
mod constants;
mod crc;
mod driver_threads;
mod error;
mod numeric;
mod packet;
mod scan;
mod serial;
mod source;
mod stats;
mod synchronizer;
#[cfg(test)]
mod time;

use crate::driver_threads::{broadcast_snapshots, ingest_stream, ThreadTiming};
use crate::serial::{flush, open_port};
use crossbeam_channel::{bounded, Receiver};
use ld06_data::Snapshot;
use std::sync::Arc;

pub use crate::angular_map::{Acquisition, AngularMap};
pub use crate::config::DriverConfig;
pub use crate::driver_threads::{join, DriverThreads};
pub use crate::error::{LidarError, Result};
pub use crate::packet::decode_frame_bytes;
pub use crate::scan::{decode_samples, DecodedSample};
pub use crate::source::ByteSource;
pub use crate::stats::IngestStats;
pub use crate::synchronizer::{FrameSynchronizer, IterFrames};

/// Function to launch the LD06 driver.
///
/// Opens `config.port`, drops whatever the sensor sent before, and starts the
/// ingest and broadcast threads. Snapshots of the angular map arrive on the
/// returned receiver every `broadcast_period_ms`.
pub fn run_driver(config: &DriverConfig) -> Result<(DriverThreads, Receiver<Snapshot>)> {
    config.validate()?;
    let mut port = open_port(config)?;
    log::info!(
        "Opened LiDAR port {} at {} baud",
        config.port,
        config.baud_rate
    );
    flush(&mut port)?;
    run_driver_with_source(port, config)
}

/// Same as [`run_driver`] on an already opened byte source.
pub fn run_driver_with_source<S: ByteSource + 'static>(
    mut source: S,
    config: &DriverConfig,
) -> Result<(DriverThreads, Receiver<Snapshot>)> {
    config.validate()?;
    let timing = ThreadTiming::from(config);

    // Fully initialised before either thread can observe it.
    let map = Arc::new(AngularMap::new());
    let stats = Arc::new(IngestStats::new());

    let (ingest_terminator_tx, ingest_terminator_rx) = bounded(10);
    let (broadcast_terminator_tx, broadcast_terminator_rx) = bounded(10);
    let (snapshot_tx, snapshot_rx) = bounded::<Snapshot>(config.snapshot_queue_depth);

    let ingest_thread = {
        let map = Arc::clone(&map);
        let stats = Arc::clone(&stats);
        std::thread::Builder::new()
            .name("ld06-ingest".to_string())
            .spawn(move || {
                ingest_stream(&mut source, map, stats, timing, ingest_terminator_rx);
            })?
    };

    let broadcast_thread = {
        let map = Arc::clone(&map);
        let stats = Arc::clone(&stats);
        std::thread::Builder::new()
            .name("ld06-broadcast".to_string())
            .spawn(move || {
                broadcast_snapshots(map, stats, timing, snapshot_tx, broadcast_terminator_rx);
            })?
    };

    log::info!("LD06 driver started");

    let driver_threads = DriverThreads {
        ingest_terminator_tx,
        broadcast_terminator_tx,
        ingest_thread: Some(ingest_thread),
        broadcast_thread: Some(broadcast_thread),
        map,
        stats,
    };

    Ok((driver_threads, snapshot_rx))
}
