use crate::angular_map::{Acquisition, AngularMap};
use crate::config::DriverConfig;
use crate::constants::READ_CHUNK_SIZE;
use crate::error::LidarError;
use crate::source::ByteSource;
use crate::stats::IngestStats;
use crate::synchronizer::FrameSynchronizer;
use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use ld06_data::{ScanFrame, Snapshot};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

// Upper bound on a single sleep of the broadcast thread so it notices
// termination requests promptly.
const BROADCAST_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Timing knobs of the two driver threads.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ThreadTiming {
    pub(crate) write_lock_timeout: Duration,
    pub(crate) snapshot_lock_timeout: Duration,
    pub(crate) broadcast_period: Duration,
    pub(crate) ingest_burst: Duration,
    pub(crate) ingest_yield: Duration,
}

impl From<&DriverConfig> for ThreadTiming {
    fn from(config: &DriverConfig) -> Self {
        Self {
            write_lock_timeout: config.write_lock_timeout(),
            snapshot_lock_timeout: config.snapshot_lock_timeout(),
            broadcast_period: config.broadcast_period(),
            ingest_burst: config.ingest_burst(),
            ingest_yield: config.ingest_yield(),
        }
    }
}

/// Struct that contains driver threads.
pub struct DriverThreads {
    pub(crate) ingest_terminator_tx: Sender<bool>,
    pub(crate) broadcast_terminator_tx: Sender<bool>,
    pub(crate) ingest_thread: Option<JoinHandle<()>>,
    pub(crate) broadcast_thread: Option<JoinHandle<()>>,
    pub(crate) map: Arc<AngularMap>,
    pub(crate) stats: Arc<IngestStats>,
}

impl DriverThreads {
    /// The map written by the ingest thread.
    pub fn map(&self) -> &Arc<AngularMap> {
        &self.map
    }

    pub fn stats(&self) -> &Arc<IngestStats> {
        &self.stats
    }
}

/// Writes one validated frame into the map, dropping it on lock timeout.
pub(crate) fn store_frame(
    map: &AngularMap,
    stats: &IngestStats,
    frame: &ScanFrame,
    timeout: Duration,
) {
    match map.write_frame(frame, timeout) {
        Acquisition::Acquired(written) => {
            stats.record_frame(frame.speed);
            log::trace!(
                "Frame {:.2}..{:.2} deg stored, {} points",
                frame.start_angle,
                frame.end_angle,
                written
            );
        }
        Acquisition::TimedOut => {
            stats.record_dropped_frame();
            log::debug!("Map lock timed out, frame dropped");
        }
    }
}

/// Feeds a chunk of raw bytes through the synchroniser into the map.
pub(crate) fn ingest_bytes(
    synchronizer: &mut FrameSynchronizer,
    bytes: &[u8],
    map: &AngularMap,
    stats: &IngestStats,
    timeout: Duration,
) {
    for result in synchronizer.iter_frames(bytes) {
        match result {
            Ok(frame) => store_frame(map, stats, &frame, timeout),
            Err(e @ LidarError::ChecksumMismatch { .. }) => {
                stats.record_crc_failure();
                log::trace!("{e}");
            }
            Err(e) => log::trace!("Frame discarded: {e}"),
        }
    }
}

pub(crate) fn ingest_stream<S: ByteSource>(
    source: &mut S,
    map: Arc<AngularMap>,
    stats: Arc<IngestStats>,
    timing: ThreadTiming,
    terminator_rx: Receiver<bool>,
) {
    let mut synchronizer = FrameSynchronizer::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let mut source_failing = false;

    while !do_terminate(&terminator_rx) {
        let burst_start = Instant::now();
        while burst_start.elapsed() < timing.ingest_burst {
            let n_read = match source.read_available(&mut chunk) {
                Ok(n) => {
                    if source_failing {
                        source_failing = false;
                        log::info!("LiDAR input recovered");
                    }
                    n
                }
                Err(e) => {
                    stats.record_read_error();
                    if !source_failing {
                        source_failing = true;
                        log::warn!("Failed to read LiDAR input: {e}");
                    }
                    0
                }
            };
            if n_read == 0 {
                break;
            }
            stats.record_bytes(n_read);
            ingest_bytes(
                &mut synchronizer,
                &chunk[..n_read],
                &map,
                &stats,
                timing.write_lock_timeout,
            );
        }
        std::thread::sleep(timing.ingest_yield);
    }
    log::info!("Ingest thread exiting");
}

/// Takes one snapshot and offers it to the consumer queue.
pub(crate) fn publish_snapshot(
    map: &AngularMap,
    stats: &IngestStats,
    timeout: Duration,
    snapshot_tx: &Sender<Snapshot>,
) {
    let snapshot = match map.try_snapshot(timeout) {
        Acquisition::Acquired(snapshot) => snapshot,
        Acquisition::TimedOut => {
            stats.record_skipped_snapshot();
            log::debug!("Map lock timed out, snapshot skipped");
            return;
        }
    };
    match snapshot_tx.try_send(snapshot) {
        Ok(()) => stats.record_published_snapshot(),
        Err(TrySendError::Full(_)) => {
            stats.record_skipped_snapshot();
            log::debug!("Snapshot queue full, snapshot skipped");
        }
        Err(TrySendError::Disconnected(_)) => {
            stats.record_skipped_snapshot();
            log::trace!("No snapshot receiver");
        }
    }
}

pub(crate) fn broadcast_snapshots(
    map: Arc<AngularMap>,
    stats: Arc<IngestStats>,
    timing: ThreadTiming,
    snapshot_tx: Sender<Snapshot>,
    terminator_rx: Receiver<bool>,
) {
    let mut next_tick = Instant::now() + timing.broadcast_period;
    while !do_terminate(&terminator_rx) {
        let now = Instant::now();
        if now < next_tick {
            std::thread::sleep((next_tick - now).min(BROADCAST_POLL_INTERVAL));
            continue;
        }
        next_tick += timing.broadcast_period;
        if next_tick < now {
            // fell behind by more than a period, don't burst to catch up
            next_tick = now + timing.broadcast_period;
        }
        publish_snapshot(&map, &stats, timing.snapshot_lock_timeout, &snapshot_tx);
    }
    log::info!("Broadcast thread exiting");
}

pub(crate) fn do_terminate(terminator_rx: &Receiver<bool>) -> bool {
    match terminator_rx.try_recv() {
        Ok(terminate) => terminate,
        Err(TryRecvError::Empty) => false,
        // the owning DriverThreads is gone
        Err(TryRecvError::Disconnected) => true,
    }
}

/// Function to join driver threads.
/// This function is automatically called when `driver_threads` is dropped.
pub fn join(driver_threads: &mut DriverThreads) {
    // A send only fails once the thread has already exited.
    let _ = driver_threads.ingest_terminator_tx.send(true);
    let _ = driver_threads.broadcast_terminator_tx.send(true);

    if let Some(thread) = driver_threads.ingest_thread.take() {
        if thread.join().is_err() {
            log::error!("Ingest thread panicked");
        }
    }
    if let Some(thread) = driver_threads.broadcast_thread.take() {
        if thread.join().is_err() {
            log::error!("Broadcast thread panicked");
        }
    }
}

impl Drop for DriverThreads {
    fn drop(&mut self) {
        join(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::tests::build_frame;
    use crate::source::mock::MockSource;
    use crossbeam_channel::bounded;
    use ld06_data::SAMPLES_PER_FRAME;

    const TIMEOUT: Duration = Duration::from_millis(5);

    fn timing() -> ThreadTiming {
        ThreadTiming::from(&DriverConfig::default())
    }

    #[test]
    fn test_do_terminate() {
        let (tx, rx) = bounded(10);
        assert!(!do_terminate(&rx));
        tx.send(false).unwrap();
        assert!(!do_terminate(&rx));
        tx.send(true).unwrap();
        assert!(do_terminate(&rx));
        drop(tx);
        assert!(do_terminate(&rx));
    }

    #[test]
    fn test_ingest_bytes_counts_outcomes() {
        let map = AngularMap::new();
        let stats = IngestStats::new();
        let mut synchronizer = FrameSynchronizer::new();

        let good = build_frame(0, 1200, [(1000, 10); SAMPLES_PER_FRAME]);
        let mut bad = build_frame(1200, 2400, [(1000, 10); SAMPLES_PER_FRAME]);
        bad[10] ^= 0x80;

        let mut stream = vec![0x00, 0x01];
        stream.extend_from_slice(&good);
        stream.extend_from_slice(&bad);
        ingest_bytes(&mut synchronizer, &stream, &map, &stats, TIMEOUT);

        let counters = stats.counters();
        assert_eq!(counters.frames_decoded, 1);
        assert_eq!(counters.crc_failures, 1);
        assert_eq!(counters.last_speed, 3600);
        // nothing from the corrupted frame reached the map
        let indices: Vec<u16> = map.snapshot(TIMEOUT).iter().map(|e| e.index).collect();
        assert_eq!(indices, (0..12).collect::<Vec<u16>>());
    }

    #[test]
    fn test_lock_timeouts_degrade() {
        let map = AngularMap::new();
        let stats = IngestStats::new();
        let packet = build_frame(0, 1200, [(1000, 10); SAMPLES_PER_FRAME]);
        let frame = crate::packet::validate_frame(&packet).unwrap();
        let (tx, rx) = bounded::<Snapshot>(1);

        let guard = map.lock_slots();
        store_frame(&map, &stats, &frame, Duration::from_millis(1));
        publish_snapshot(&map, &stats, Duration::from_millis(1), &tx);
        drop(guard);

        let counters = stats.counters();
        assert_eq!(counters.frames_decoded, 0);
        assert_eq!(counters.dropped_frames, 1);
        assert_eq!(counters.skipped_snapshots, 1);
        assert!(rx.try_recv().is_err());
        assert!(map.snapshot(TIMEOUT).is_empty());
    }

    #[test]
    fn test_publish_snapshot_skips_when_queue_full() {
        let map = AngularMap::new();
        let stats = IngestStats::new();
        let (tx, rx) = bounded::<Snapshot>(1);

        publish_snapshot(&map, &stats, TIMEOUT, &tx);
        publish_snapshot(&map, &stats, TIMEOUT, &tx);
        assert_eq!(stats.counters().snapshots_published, 1);
        assert_eq!(stats.counters().skipped_snapshots, 1);

        drop(rx);
        publish_snapshot(&map, &stats, TIMEOUT, &tx);
        assert_eq!(stats.counters().skipped_snapshots, 2);
    }

    #[test]
    fn test_ingest_stream_until_terminated() {
        let source = MockSource::new();
        let map = Arc::new(AngularMap::new());
        let stats = Arc::new(IngestStats::new());
        let (terminator_tx, terminator_rx) = bounded(10);

        let mut stream = Vec::new();
        for start in [0u16, 1200, 2400] {
            stream.extend_from_slice(&build_frame(
                start,
                start + 1200,
                [(1500, 40); SAMPLES_PER_FRAME],
            ));
        }
        source.inject(&stream);

        let thread = {
            let mut source = source.clone();
            let map = Arc::clone(&map);
            let stats = Arc::clone(&stats);
            std::thread::spawn(move || {
                ingest_stream(&mut source, map, stats, timing(), terminator_rx);
            })
        };

        let deadline = Instant::now() + Duration::from_secs(2);
        while stats.counters().frames_decoded < 3 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        terminator_tx.send(true).unwrap();
        thread.join().unwrap();

        let counters = stats.counters();
        assert_eq!(counters.frames_decoded, 3);
        assert_eq!(counters.bytes_received, stream.len() as u64);
        assert_eq!(source.pending(), 0);
        assert_eq!(map.snapshot(TIMEOUT).len(), 36);
    }

    #[test]
    fn test_ingest_stream_survives_failing_source() {
        let source = MockSource::new();
        source.fail_next_reads(usize::MAX);
        let map = Arc::new(AngularMap::new());
        let stats = Arc::new(IngestStats::new());
        let (terminator_tx, terminator_rx) = bounded(10);

        let thread = {
            let mut source = source.clone();
            let map = Arc::clone(&map);
            let stats = Arc::clone(&stats);
            std::thread::spawn(move || {
                ingest_stream(&mut source, map, stats, timing(), terminator_rx);
            })
        };

        let deadline = Instant::now() + Duration::from_secs(2);
        while stats.counters().read_errors < 3 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(stats.counters().read_errors >= 3);

        // recovers once the source delivers again
        source.fail_next_reads(0);
        source.inject(&build_frame(0, 1200, [(1500, 40); SAMPLES_PER_FRAME]));
        let deadline = Instant::now() + Duration::from_secs(2);
        while stats.counters().frames_decoded < 1 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }

        terminator_tx.send(true).unwrap();
        thread.join().unwrap();
        assert_eq!(stats.counters().frames_decoded, 1);
        assert_eq!(map.snapshot(TIMEOUT).len(), 12);
    }

    #[test]
    fn test_broadcast_snapshots_on_cadence() {
        let map = Arc::new(AngularMap::new());
        let stats = Arc::new(IngestStats::new());
        let (terminator_tx, terminator_rx) = bounded(10);
        let (snapshot_tx, snapshot_rx) = bounded(4);
        let packet = build_frame(9000, 10200, [(800, 30); SAMPLES_PER_FRAME]);
        let frame = crate::packet::validate_frame(&packet).unwrap();
        store_frame(&map, &stats, &frame, TIMEOUT);

        let timing = ThreadTiming {
            broadcast_period: Duration::from_millis(10),
            ..timing()
        };
        let thread = {
            let map = Arc::clone(&map);
            let stats = Arc::clone(&stats);
            std::thread::spawn(move || {
                broadcast_snapshots(map, stats, timing, snapshot_tx, terminator_rx);
            })
        };

        let snapshot = snapshot_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = snapshot_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        terminator_tx.send(true).unwrap();
        thread.join().unwrap();

        assert_eq!(snapshot.len(), 12);
        assert_eq!(snapshot[0].index, 90);
        assert_eq!(second, snapshot);
        assert!(stats.counters().snapshots_published >= 2);
    }
}
