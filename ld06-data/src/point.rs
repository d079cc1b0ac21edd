#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One angular observation held in a bucket of the angular map.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LidarPoint {
    /// Interpolated angle in degrees, within [0, 360).
    pub angle: f32,
    /// Distance to the reflecting object in mm. Never zero for a valid point.
    pub distance: u16,
    /// Signal strength reported by the sensor, passed through untouched.
    pub quality: u8,
    /// Set once any observation has been written to the bucket.
    pub valid: bool,
    /// Monotonic time of the most recent write, in ms since the map was created.
    pub last_update_ms: u64,
}

impl LidarPoint {
    /// Content of a bucket that has never been written.
    pub const INVALID: LidarPoint = LidarPoint {
        angle: 0.,
        distance: 0,
        quality: 0,
        valid: false,
        last_update_ms: 0,
    };
}

/// A valid bucket of the angular map, as returned by a snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapEntry {
    /// Bucket index, `round(angle) mod 360`.
    pub index: u16,
    pub point: LidarPoint,
}

impl MapEntry {
    /// Milliseconds elapsed between the last write and `now_ms`.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.point.last_update_ms)
    }
}

/// Valid buckets of the angular map in ascending index order.
pub type Snapshot = Vec<MapEntry>;
