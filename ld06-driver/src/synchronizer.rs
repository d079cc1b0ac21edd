use crate::constants::{FRAME_HEADER, FRAME_SIZE};
use crate::error::Result;
use crate::packet::validate_frame;
use ld06_data::ScanFrame;

/// Byte-level frame synchroniser for the LD06 stream.
///
/// While idle, bytes are discarded until the 0x54 header shows up. From there
/// exactly 47 bytes are accumulated and handed to CRC validation, after which
/// the synchroniser is idle again whatever the outcome. A header byte that
/// turns up inside a payload is only noticed through the CRC failure; the
/// stream realigns on the next header seen while idle. The version/length
/// byte is never used to cross-check the frame length.
pub struct FrameSynchronizer {
    buffer: [u8; FRAME_SIZE],
    cursor: usize,
}

impl FrameSynchronizer {
    pub const fn new() -> Self {
        Self {
            buffer: [0; FRAME_SIZE],
            cursor: 0,
        }
    }

    /// Drops any partially accumulated frame.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn is_mid_frame(&self) -> bool {
        self.cursor > 0
    }

    /// Feeds one byte. Returns the validation outcome once 47 bytes of a
    /// candidate frame have been collected.
    pub fn push_byte(&mut self, byte: u8) -> Option<Result<ScanFrame>> {
        if self.cursor == 0 {
            if byte == FRAME_HEADER {
                self.buffer[0] = byte;
                self.cursor = 1;
            }
            return None;
        }

        self.buffer[self.cursor] = byte;
        self.cursor += 1;
        if self.cursor < FRAME_SIZE {
            return None;
        }

        self.cursor = 0;
        Some(validate_frame(&self.buffer))
    }

    /// Feeds bytes until one candidate frame completes or the input runs out.
    ///
    /// Returns the outcome for that candidate, if any, along with the bytes
    /// that were not consumed.
    pub fn push_bytes<'b>(&mut self, bytes: &'b [u8]) -> (Option<Result<ScanFrame>>, &'b [u8]) {
        for (i, byte) in bytes.iter().enumerate() {
            if let Some(result) = self.push_byte(*byte) {
                return (Some(result), &bytes[i + 1..]);
            }
        }
        (None, &[])
    }

    /// Iterator over the outcome of every candidate frame found in `bytes`.
    pub fn iter_frames<'a, 'b>(&'a mut self, bytes: &'b [u8]) -> IterFrames<'a, 'b> {
        IterFrames {
            synchronizer: self,
            bytes,
        }
    }
}

impl Default for FrameSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

pub struct IterFrames<'a, 'b> {
    synchronizer: &'a mut FrameSynchronizer,
    bytes: &'b [u8],
}

impl Iterator for IterFrames<'_, '_> {
    type Item = Result<ScanFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bytes.is_empty() {
            return None;
        }
        let result;
        (result, self.bytes) = self.synchronizer.push_bytes(self.bytes);
        result
    }
}
