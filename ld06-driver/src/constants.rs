pub(crate) const FRAME_HEADER: u8 = 0x54;
pub(crate) const FRAME_SIZE: usize = 47;
// Header through timestamp; the trailing CRC byte is excluded.
pub(crate) const CRC_COVERED_SIZE: usize = FRAME_SIZE - 1;
pub(crate) const SAMPLE_SIZE: usize = 3;

pub(crate) const OFFSET_VERSION: usize = 1;
pub(crate) const OFFSET_SPEED: usize = 2;
pub(crate) const OFFSET_START_ANGLE: usize = 4;
pub(crate) const OFFSET_SAMPLES: usize = 6;
pub(crate) const OFFSET_END_ANGLE: usize = 42;
pub(crate) const OFFSET_TIMESTAMP: usize = 44;
pub(crate) const OFFSET_CRC: usize = 46;

pub(crate) const MAP_SLOTS: usize = 360;
pub(crate) const FULL_TURN_DEGREES: f32 = 360.;
pub(crate) const CENTIDEGREES_PER_DEGREE: f32 = 100.;

pub(crate) const LD06_BAUD_RATE: u32 = 230_400;
pub(crate) const READ_CHUNK_SIZE: usize = 256;
