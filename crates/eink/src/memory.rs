//! External framebuffer memory
//!
//! Small microcontrollers cannot always hold a tri-color framebuffer in RAM.
//! [`ExternalMemory`] describes a byte-addressable device that can hold it
//! instead, and [`SpiSram`] implements it for Microchip 23K-series SPI SRAMs.
//!
//! Multi-byte values are stored big-endian: `write16(a, 0x12AB)` puts `0x12`
//! at `a` and `0xAB` at `a + 1`.

use core::fmt::Debug;
use embedded_hal::spi::{Operation, SpiDevice};

use crate::command::*;

/// Byte-addressable storage outside the MCU
pub trait ExternalMemory {
    /// Error type for memory operations
    type Error: Debug;

    /// Prepare the device for use (mode registers and the like)
    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Device size in bytes
    fn capacity(&self) -> usize;

    /// Fill `buf` with the bytes starting at `address`
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Store `data` starting at `address`
    fn write(&mut self, address: u32, data: &[u8]) -> Result<(), Self::Error>;

    /// Store a single byte
    fn write8(&mut self, address: u32, value: u8) -> Result<(), Self::Error> {
        self.write(address, &[value])
    }

    /// Load a big-endian 16-bit value
    fn read16(&mut self, address: u32) -> Result<u16, Self::Error> {
        let mut buf = [0u8; 2];
        self.read(address, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Store a big-endian 16-bit value
    fn write16(&mut self, address: u32, value: u16) -> Result<(), Self::Error> {
        self.write(address, &value.to_be_bytes())
    }
}

/// Errors from [`SpiSram`]
#[derive(Debug, PartialEq)]
pub enum SramError<E> {
    /// SPI communication error
    Spi(E),
    /// Access past the end of the device
    OutOfRange {
        /// First byte address of the access
        address: u32,
        /// Length of the access in bytes
        len: usize,
    },
}

impl<E: Debug> core::fmt::Display for SramError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SramError::Spi(e) => write!(f, "SPI error: {e:?}"),
            SramError::OutOfRange { address, len } => {
                write!(f, "Access of {len} bytes at {address:#06x} is out of range")
            }
        }
    }
}

impl<E: Debug> core::error::Error for SramError<E> {}

/// Microchip 23K-series serial SRAM
///
/// Uses 16-bit addresses and sequential mode, so every access is a single SPI
/// transaction regardless of length.
pub struct SpiSram<SPI> {
    spi: SPI,
    capacity: usize,
}

impl<SPI> SpiSram<SPI>
where
    SPI: SpiDevice,
{
    /// 23K640: 64 Kbit
    pub const K640_CAPACITY: usize = 8 * 1024;
    /// 23K256: 256 Kbit
    pub const K256_CAPACITY: usize = 32 * 1024;

    /// Create a driver for a device of `capacity` bytes
    pub fn new(spi: SPI, capacity: usize) -> Self {
        Self {
            spi,
            capacity: capacity.min(1 << 16),
        }
    }

    /// 23K640 driver
    pub fn k640(spi: SPI) -> Self {
        Self::new(spi, Self::K640_CAPACITY)
    }

    /// Give the SPI device back
    pub fn release(self) -> SPI {
        self.spi
    }

    fn header(
        &self,
        command: u8,
        address: u32,
        len: usize,
    ) -> Result<[u8; 3], SramError<SPI::Error>> {
        let end = address as usize + len;
        if end > self.capacity {
            return Err(SramError::OutOfRange { address, len });
        }
        let [hi, lo] = (address as u16).to_be_bytes();
        Ok([command, hi, lo])
    }
}

impl<SPI> ExternalMemory for SpiSram<SPI>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
{
    type Error = SramError<SPI::Error>;

    fn init(&mut self) -> Result<(), Self::Error> {
        log::debug!("Switching SRAM to sequential mode");
        self.spi
            .write(&[SRAM_WRSR, SRAM_SEQUENTIAL_MODE])
            .map_err(SramError::Spi)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        let header = self.header(SRAM_READ, address, buf.len())?;
        self.spi
            .transaction(&mut [Operation::Write(&header), Operation::Read(buf)])
            .map_err(SramError::Spi)
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<(), Self::Error> {
        let header = self.header(SRAM_WRITE, address, data.len())?;
        self.spi
            .transaction(&mut [Operation::Write(&header), Operation::Write(data)])
            .map_err(SramError::Spi)
    }
}
