use std::io;

pub type Result<T> = std::result::Result<T, LidarError>;

#[derive(Debug, thiserror::Error)]
pub enum LidarError {
    #[error("Frame must be always 47 bytes. Actually {0} bytes.")]
    InvalidFrameLength(usize),

    #[error("Frame must start with 0x54. Observed = {0:#04X}.")]
    InvalidHeader(u8),

    #[error("Checksum mismatched. Calculated = {calculated:02X}, expected = {expected:02X}.")]
    ChecksumMismatch { expected: u8, calculated: u8 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error(transparent)]
    Serial(#[from] serialport::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}
