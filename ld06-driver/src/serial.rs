use crate::config::DriverConfig;
use crate::error::Result;
use crate::source::ByteSource;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::Read;

/// Opens the LiDAR UART as 8N1 without flow control.
pub(crate) fn open_port(config: &DriverConfig) -> Result<Box<dyn SerialPort>> {
    let port = serialport::new(config.port.as_str(), config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(config.serial_timeout())
        .open()?;
    Ok(port)
}

pub(crate) fn get_n_read(port: &mut Box<dyn SerialPort>) -> Result<usize> {
    let n_u32: u32 = port.bytes_to_read()?;
    Ok(n_u32.try_into().unwrap_or(0))
}

/// Discards whatever the sensor sent before the driver started.
pub(crate) fn flush(port: &mut Box<dyn SerialPort>) -> Result<()> {
    let n_read: usize = get_n_read(port).unwrap_or(0);
    if n_read == 0 {
        return Ok(());
    }
    let mut packet: Vec<u8> = vec![0; n_read];
    port.read_exact(packet.as_mut_slice())?;
    log::debug!("Flushed {} stale bytes", n_read);
    Ok(())
}

pub(crate) fn read_available(port: &mut Box<dyn SerialPort>, buffer: &mut [u8]) -> Result<usize> {
    let n_read = get_n_read(port)?.min(buffer.len());
    if n_read == 0 {
        return Ok(0);
    }
    let n = port.read(&mut buffer[..n_read])?;
    Ok(n)
}

impl ByteSource for Box<dyn SerialPort> {
    fn read_available(&mut self, buffer: &mut [u8]) -> Result<usize> {
        read_available(self, buffer)
    }
}
