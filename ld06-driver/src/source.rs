use crate::error::Result;

/// A stream of bytes with no framing guarantees, such as a UART.
pub trait ByteSource: Send {
    /// Copies bytes that are already available into `buffer` without waiting
    /// for more. Returns 0 when nothing is pending.
    fn read_available(&mut self, buffer: &mut [u8]) -> Result<usize>;
}
