use crate::constants::{CENTIDEGREES_PER_DEGREE, FULL_TURN_DEGREES, MAP_SLOTS};
use ld06_data::SAMPLES_PER_FRAME;

pub(crate) fn to_u16(lo: u8, hi: u8) -> u16 {
    ((hi as u16) << 8) | (lo as u16)
}

pub(crate) fn wrap_degrees(degree: f32) -> f32 {
    degree % FULL_TURN_DEGREES
}

pub(crate) fn to_angle(lo: u8, hi: u8) -> f32 {
    wrap_degrees(to_u16(lo, hi) as f32 / CENTIDEGREES_PER_DEGREE)
}

/// Angular distance between consecutive samples. Handles a single wrap past 360.
pub(crate) fn angle_step(start_angle: f32, end_angle: f32) -> f32 {
    let angle_shift = if end_angle >= start_angle {
        0.
    } else {
        FULL_TURN_DEGREES
    };
    (end_angle - start_angle + angle_shift) / (SAMPLES_PER_FRAME as f32)
}

/// Map bucket for an angle in [0, 360), rounding half up.
pub(crate) fn bucket_index(degree: f32) -> usize {
    ((degree + 0.5) as usize) % MAP_SLOTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_u16() {
        assert_eq!(to_u16(0x10, 0x27), 10000);
        assert_eq!(to_u16(0xFF, 0x00), 0x00FF);
    }

    #[test]
    fn test_to_angle_wraps() {
        assert_eq!(to_angle(0xB0, 0x04), 12.);
        // 360.00 degrees is reported as 0
        assert_eq!(to_angle(0xA0, 0x8C), 0.);
        // 365.00 degrees
        assert!((to_angle(0x94, 0x8E) - 5.).abs() < 1e-4);
    }

    #[test]
    fn test_angle_step() {
        assert_eq!(angle_step(0., 12.), 1.);
        assert_eq!(angle_step(5., 5.), 0.);
        assert!((angle_step(359., 1.) - 2. / 12.).abs() < 1e-5);
    }

    #[test]
    fn test_bucket_index() {
        assert_eq!(bucket_index(0.), 0);
        assert_eq!(bucket_index(0.49), 0);
        assert_eq!(bucket_index(0.5), 1);
        assert_eq!(bucket_index(179.6), 180);
        assert_eq!(bucket_index(359.4), 359);
        assert_eq!(bucket_index(359.5), 0);
        assert_eq!(bucket_index(359.99), 0);
    }
}
