use crate::constants::MAP_SLOTS;
use crate::scan::{DecodedSample, Ld06Scan};
use ld06_data::{LidarPoint, MapEntry, ScanFrame, Snapshot};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Outcome of a lock attempt bounded by a timeout.
#[derive(Clone, Debug, PartialEq)]
pub enum Acquisition<T> {
    Acquired(T),
    TimedOut,
}

impl<T> Acquisition<T> {
    pub fn is_acquired(&self) -> bool {
        matches!(self, Acquisition::Acquired(_))
    }
}

impl<T: Default> Acquisition<T> {
    pub fn unwrap_or_default(self) -> T {
        match self {
            Acquisition::Acquired(value) => value,
            Acquisition::TimedOut => T::default(),
        }
    }
}

/// One point per integer degree behind a single mutex with bounded waits.
pub struct AngularMap {
    slots: Mutex<[LidarPoint; MAP_SLOTS]>,
    epoch: Instant,
}

impl AngularMap {
    /// Creates a map with every bucket invalid.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new([LidarPoint::INVALID; MAP_SLOTS]),
            epoch: Instant::now(),
        }
    }

    /// Milliseconds since the map was created, on the clock used for
    /// `last_update_ms`.
    pub fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Stores one sample in bucket `sample.index % 360`, stamped with
    /// [`AngularMap::now_ms`]. A zero distance leaves the bucket untouched.
    pub fn write(&self, sample: DecodedSample, timeout: Duration) -> Acquisition<()> {
        if sample.distance == 0 {
            return Acquisition::Acquired(());
        }
        let Some(mut slots) = self.slots.try_lock_for(timeout) else {
            return Acquisition::TimedOut;
        };
        store(&mut slots, sample, self.now_ms());
        Acquisition::Acquired(())
    }

    /// Writes every non-empty sample of `frame` under a single lock
    /// acquisition and returns how many buckets were written.
    ///
    /// Samples are applied in wire order, so when two of them round to the
    /// same bucket the later one is what remains.
    pub fn write_frame(&self, frame: &ScanFrame, timeout: Duration) -> Acquisition<usize> {
        let Some(mut slots) = self.slots.try_lock_for(timeout) else {
            return Acquisition::TimedOut;
        };
        let now = self.now_ms();
        let mut written = 0;
        for sample in frame.decoded_samples() {
            store(&mut slots, sample, now);
            written += 1;
        }
        Acquisition::Acquired(written)
    }

    /// Copies every valid bucket, in index order.
    pub fn try_snapshot(&self, timeout: Duration) -> Acquisition<Snapshot> {
        let Some(slots) = self.slots.try_lock_for(timeout) else {
            return Acquisition::TimedOut;
        };
        let mut snapshot = Snapshot::with_capacity(MAP_SLOTS);
        snapshot.extend(
            slots
                .iter()
                .enumerate()
                .filter(|(_, point)| point.valid)
                .map(|(index, point)| MapEntry {
                    index: index as u16,
                    point: *point,
                }),
        );
        Acquisition::Acquired(snapshot)
    }

    #[cfg(test)]
    pub(crate) fn lock_slots(&self) -> parking_lot::MutexGuard<'_, [LidarPoint; MAP_SLOTS]> {
        self.slots.lock()
    }

    /// Like [`AngularMap::try_snapshot`], but an empty snapshot on timeout.
    pub fn snapshot(&self, timeout: Duration) -> Snapshot {
        self.try_snapshot(timeout).unwrap_or_default()
    }
}

fn store(slots: &mut [LidarPoint; MAP_SLOTS], sample: DecodedSample, now: u64) {
    slots[sample.index % MAP_SLOTS] = LidarPoint {
        angle: sample.angle,
        distance: sample.distance,
        quality: sample.quality,
        valid: true,
        last_update_ms: now,
    };
}

impl Default for AngularMap {
    fn default() -> Self {
        Self::new()
    }
}
