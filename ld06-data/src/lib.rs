pub mod counters;
pub mod frame;
pub mod point;

pub use counters::IngestCounters;
pub use frame::{FrameSample, ScanFrame, SAMPLES_PER_FRAME};
pub use point::{LidarPoint, MapEntry, Snapshot};
