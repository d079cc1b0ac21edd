use crossbeam_utils::CachePadded;
use ld06_data::IngestCounters;
use std::sync::atomic::{AtomicU16, AtomicU64, Ordering};

/// Counters shared by the ingest and broadcast threads.
///
/// Producer-side and consumer-side counters sit on separate cache lines so the
/// ingest loop does not bounce lines with the broadcast thread.
#[derive(Default)]
pub struct IngestStats {
    bytes_received: CachePadded<AtomicU64>,
    read_errors: CachePadded<AtomicU64>,
    frames_decoded: CachePadded<AtomicU64>,
    crc_failures: CachePadded<AtomicU64>,
    dropped_frames: CachePadded<AtomicU64>,
    last_speed: CachePadded<AtomicU16>,
    snapshots_published: CachePadded<AtomicU64>,
    skipped_snapshots: CachePadded<AtomicU64>,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_bytes(&self, n: usize) {
        self.bytes_received.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_frame(&self, speed: u16) {
        self.frames_decoded.fetch_add(1, Ordering::Relaxed);
        self.last_speed.store(speed, Ordering::Relaxed);
    }

    pub(crate) fn record_crc_failure(&self) {
        self.crc_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped_frame(&self) {
        self.dropped_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_published_snapshot(&self) {
        self.snapshots_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped_snapshot(&self) {
        self.skipped_snapshots.fetch_add(1, Ordering::Relaxed);
    }

    pub fn counters(&self) -> IngestCounters {
        IngestCounters {
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            crc_failures: self.crc_failures.load(Ordering::Relaxed),
            dropped_frames: self.dropped_frames.load(Ordering::Relaxed),
            snapshots_published: self.snapshots_published.load(Ordering::Relaxed),
            skipped_snapshots: self.skipped_snapshots.load(Ordering::Relaxed),
            last_speed: self.last_speed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = IngestStats::new();
        assert_eq!(stats.counters(), IngestCounters::default());

        stats.record_bytes(47);
        stats.record_bytes(3);
        stats.record_read_error();
        stats.record_frame(3600);
        stats.record_crc_failure();
        stats.record_dropped_frame();
        stats.record_published_snapshot();
        stats.record_skipped_snapshot();
        stats.record_skipped_snapshot();

        let counters = stats.counters();
        assert_eq!(counters.bytes_received, 50);
        assert_eq!(counters.read_errors, 1);
        assert_eq!(counters.frames_decoded, 1);
        assert_eq!(counters.crc_failures, 1);
        assert_eq!(counters.dropped_frames, 1);
        assert_eq!(counters.snapshots_published, 1);
        assert_eq!(counters.skipped_snapshots, 2);
        assert_eq!(counters.last_speed, 3600);
    }
}
