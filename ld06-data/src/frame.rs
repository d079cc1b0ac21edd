#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of distance samples carried by one LD06 frame.
pub const SAMPLES_PER_FRAME: usize = 12;

/// One distance/quality pair of a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameSample {
    /// Distance in mm. Zero means no reflection.
    pub distance: u16,
    /// Signal strength.
    pub quality: u8,
}

/// Struct to hold one CRC-validated LD06 frame.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanFrame {
    /// Version/length byte. Read but never checked.
    pub version: u8,
    /// Rotation speed in degrees per second.
    pub speed: u16,
    /// Angle of the first sample in degrees, within [0, 360).
    pub start_angle: f32,
    /// Angle of the last sample in degrees, within [0, 360).
    pub end_angle: f32,
    pub samples: [FrameSample; SAMPLES_PER_FRAME],
    /// Sensor timestamp in ms. Wraps around on the sensor side.
    pub timestamp: u16,
    pub crc: u8,
}

impl ScanFrame {
    /// Head revolutions per second.
    pub fn rotation_hz(&self) -> f32 {
        self.speed as f32 / 360.
    }
}
