use crate::constants::LD06_BAUD_RATE;
use crate::error::{LidarError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Driver settings, loadable from TOML. Missing fields take LD06 defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Serial port name such as `/dev/ttyUSB0`.
    pub port: String,
    pub baud_rate: u32,
    /// Read timeout handed to the serial port.
    pub serial_timeout_ms: u64,
    /// Longest the ingest thread waits for the map lock before dropping a frame.
    pub write_lock_timeout_ms: u64,
    /// Longest the broadcast thread waits for the map lock before skipping a tick.
    pub snapshot_lock_timeout_ms: u64,
    /// Snapshot cadence.
    pub broadcast_period_ms: u64,
    /// Longest stretch the ingest thread drains input before yielding.
    pub ingest_burst_ms: u64,
    /// Pause between ingest bursts.
    pub ingest_yield_ms: u64,
    /// Snapshots buffered for a slow consumer before new ones are skipped.
    pub snapshot_queue_depth: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: LD06_BAUD_RATE,
            serial_timeout_ms: 10,
            write_lock_timeout_ms: 5,
            snapshot_lock_timeout_ms: 50,
            broadcast_period_ms: 50,
            ingest_burst_ms: 20,
            ingest_yield_ms: 1,
            snapshot_queue_depth: 4,
        }
    }
}

impl DriverConfig {
    /// Default configuration for the given port.
    pub fn for_port(port: &str) -> Self {
        Self {
            port: port.to_string(),
            ..Self::default()
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: DriverConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("serial_timeout_ms", self.serial_timeout_ms),
            ("write_lock_timeout_ms", self.write_lock_timeout_ms),
            ("snapshot_lock_timeout_ms", self.snapshot_lock_timeout_ms),
            ("broadcast_period_ms", self.broadcast_period_ms),
            ("ingest_burst_ms", self.ingest_burst_ms),
            ("ingest_yield_ms", self.ingest_yield_ms),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, value)| *value == 0) {
            return Err(LidarError::InvalidConfig(format!("{name} must be non-zero")));
        }
        if self.baud_rate == 0 {
            return Err(LidarError::InvalidConfig(
                "baud_rate must be non-zero".to_string(),
            ));
        }
        if self.snapshot_queue_depth == 0 {
            return Err(LidarError::InvalidConfig(
                "snapshot_queue_depth must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn serial_timeout(&self) -> Duration {
        Duration::from_millis(self.serial_timeout_ms)
    }

    pub fn write_lock_timeout(&self) -> Duration {
        Duration::from_millis(self.write_lock_timeout_ms)
    }

    pub fn snapshot_lock_timeout(&self) -> Duration {
        Duration::from_millis(self.snapshot_lock_timeout_ms)
    }

    pub fn broadcast_period(&self) -> Duration {
        Duration::from_millis(self.broadcast_period_ms)
    }

    pub fn ingest_burst(&self) -> Duration {
        Duration::from_millis(self.ingest_burst_ms)
    }

    pub fn ingest_yield(&self) -> Duration {
        Duration::from_millis(self.ingest_yield_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_ld06() {
        let config = DriverConfig::default();
        assert_eq!(config.baud_rate, 230_400);
        assert_eq!(config.write_lock_timeout(), Duration::from_millis(5));
        assert_eq!(config.snapshot_lock_timeout(), Duration::from_millis(50));
        assert_eq!(config.broadcast_period(), Duration::from_millis(50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = DriverConfig::from_toml_str(
            r#"
            port = "/dev/ttyS2"
            broadcast_period_ms = 100
            "#,
        )
        .unwrap();
        assert_eq!(config.port, "/dev/ttyS2");
        assert_eq!(config.broadcast_period_ms, 100);
        assert_eq!(config.baud_rate, 230_400);
        assert_eq!(config.ingest_yield_ms, 1);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            DriverConfig::from_toml_str("write_lock_timeout_ms = 0"),
            Err(LidarError::InvalidConfig(_))
        ));
        assert!(matches!(
            DriverConfig::from_toml_str("snapshot_queue_depth = 0"),
            Err(LidarError::InvalidConfig(_))
        ));
        assert!(matches!(
            DriverConfig::from_toml_str("baud_rate = \"fast\""),
            Err(LidarError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_for_port() {
        let config = DriverConfig::for_port("/dev/ttyAMA0");
        assert_eq!(config.port, "/dev/ttyAMA0");
        assert_eq!(config.ingest_burst_ms, 20);
    }
}
