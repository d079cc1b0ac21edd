use crate::constants::{
    CRC_COVERED_SIZE, FRAME_HEADER, FRAME_SIZE, OFFSET_CRC, OFFSET_END_ANGLE, OFFSET_SAMPLES,
    OFFSET_SPEED, OFFSET_START_ANGLE, OFFSET_TIMESTAMP, OFFSET_VERSION, SAMPLE_SIZE,
};
use crate::crc::{calc_crc8, check};
use crate::error::{LidarError, Result};
use crate::numeric::{to_angle, to_u16};
use ld06_data::{FrameSample, ScanFrame, SAMPLES_PER_FRAME};

pub(crate) fn sample_index(idx: usize) -> usize {
    OFFSET_SAMPLES + idx * SAMPLE_SIZE
}

pub(crate) fn err_if_checksum_mismatched(packet: &[u8; FRAME_SIZE]) -> Result<()> {
    match check(packet) {
        true => Ok(()),
        false => Err(LidarError::ChecksumMismatch {
            expected: packet[OFFSET_CRC],
            calculated: calc_crc8(&packet[..CRC_COVERED_SIZE]),
        }),
    }
}

/// Reads every field of a 47-byte LD06 frame at its wire offset.
///
/// The CRC is not checked here; see [`validate_frame`].
pub(crate) fn parse_frame(packet: &[u8; FRAME_SIZE]) -> ScanFrame {
    let samples: [FrameSample; SAMPLES_PER_FRAME] = std::array::from_fn(|idx| {
        let i = sample_index(idx);
        FrameSample {
            distance: to_u16(packet[i], packet[i + 1]),
            quality: packet[i + 2],
        }
    });

    ScanFrame {
        version: packet[OFFSET_VERSION],
        speed: to_u16(packet[OFFSET_SPEED], packet[OFFSET_SPEED + 1]),
        start_angle: to_angle(packet[OFFSET_START_ANGLE], packet[OFFSET_START_ANGLE + 1]),
        end_angle: to_angle(packet[OFFSET_END_ANGLE], packet[OFFSET_END_ANGLE + 1]),
        samples,
        timestamp: to_u16(packet[OFFSET_TIMESTAMP], packet[OFFSET_TIMESTAMP + 1]),
        crc: packet[OFFSET_CRC],
    }
}

/// Checks the header and CRC of a candidate frame and parses it.
pub(crate) fn validate_frame(packet: &[u8; FRAME_SIZE]) -> Result<ScanFrame> {
    if packet[0] != FRAME_HEADER {
        return Err(LidarError::InvalidHeader(packet[0]));
    }
    err_if_checksum_mismatched(packet)?;
    Ok(parse_frame(packet))
}

/// Same as [`validate_frame`] for a slice of unknown length.
pub fn decode_frame_bytes(bytes: &[u8]) -> Result<ScanFrame> {
    let packet: &[u8; FRAME_SIZE] = bytes
        .try_into()
        .map_err(|_| LidarError::InvalidFrameLength(bytes.len()))?;
    validate_frame(packet)
}
