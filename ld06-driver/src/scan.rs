use crate::numeric::{angle_step, bucket_index, wrap_degrees};
use ld06_data::ScanFrame;

/// One non-empty sample of a frame, with its interpolated angle and bucket.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodedSample {
    /// Bucket of the angular map, `round(angle) mod 360`.
    pub index: usize,
    /// Angle in degrees, within [0, 360).
    pub angle: f32,
    pub distance: u16,
    pub quality: u8,
}

pub(crate) trait Ld06Scan {
    fn angle_step(&self) -> f32;
    fn sample_angle(&self, idx: usize) -> f32;
    fn decoded_samples(&self) -> impl Iterator<Item = DecodedSample> + '_;
}

impl Ld06Scan for ScanFrame {
    fn angle_step(&self) -> f32 {
        angle_step(self.start_angle, self.end_angle)
    }

    fn sample_angle(&self, idx: usize) -> f32 {
        wrap_degrees(self.start_angle + self.angle_step() * (idx as f32))
    }

    /// Samples in wire order. Zero distances mean "no return" and are skipped.
    fn decoded_samples(&self) -> impl Iterator<Item = DecodedSample> + '_ {
        self.samples
            .iter()
            .enumerate()
            .filter(|(_, sample)| sample.distance > 0)
            .map(|(idx, sample)| {
                let angle = self.sample_angle(idx);
                DecodedSample {
                    index: bucket_index(angle),
                    angle,
                    distance: sample.distance,
                    quality: sample.quality,
                }
            })
    }
}

/// Decodes the non-empty samples of a validated frame, in wire order.
pub fn decode_samples(frame: &ScanFrame) -> impl Iterator<Item = DecodedSample> + '_ {
    frame.decoded_samples()
}
