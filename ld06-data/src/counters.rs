#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Point-in-time copy of the ingestion counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IngestCounters {
    /// Raw bytes pulled from the serial source.
    pub bytes_received: u64,
    /// Reads from the serial source that returned an error.
    pub read_errors: u64,
    /// Frames whose samples were written into the map.
    pub frames_decoded: u64,
    /// Candidate frames discarded because of a CRC mismatch.
    pub crc_failures: u64,
    /// Valid frames dropped because the map lock timed out.
    pub dropped_frames: u64,
    /// Snapshots handed to the consumer channel.
    pub snapshots_published: u64,
    /// Broadcast ticks that produced nothing (lock timeout or full queue).
    pub skipped_snapshots: u64,
    /// Rotation speed reported by the last valid frame, in degrees per second.
    pub last_speed: u16,
}
