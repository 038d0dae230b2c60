//! Byte transports for the panel bus
//!
//! The framer only needs to clock bytes out MSB first. [`HardwareSpi`] does that
//! with an `embedded-hal` [`SpiBus`]; [`BitBang`] toggles a clock and data pin
//! directly for boards without a free SPI peripheral.
//!
//! Chip-select is not part of the transport: the framer drives it so it can
//! hold the panel selected across a command and its data burst.

use core::fmt::Debug;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

/// A bus that can shift single bytes to the panel
pub trait Transport {
    /// Error type for transfers
    type Error: Debug;

    /// Shift one byte out and return the byte shifted in
    fn transfer(&mut self, byte: u8) -> Result<u8, Self::Error>;

    /// Shift a run of bytes out, discarding what comes back
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        for &byte in bytes {
            self.transfer(byte)?;
        }
        Ok(())
    }

    /// Block until every queued byte has left the wire
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Transport over a hardware SPI bus
///
/// The bus must be configured for mode 0, MSB first.
pub struct HardwareSpi<SPI> {
    spi: SPI,
}

impl<SPI> HardwareSpi<SPI>
where
    SPI: SpiBus,
{
    /// Wrap a SPI bus
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Give the bus back
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Transport for HardwareSpi<SPI>
where
    SPI: SpiBus,
    SPI::Error: Debug,
{
    type Error = SPI::Error;

    fn transfer(&mut self, byte: u8) -> Result<u8, Self::Error> {
        let mut word = [byte];
        self.spi.transfer_in_place(&mut word)?;
        Ok(word[0])
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.spi.write(bytes)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.spi.flush()
    }
}

/// Software SPI on two output pins
///
/// Write-only: there is no MISO line, so [`Transport::transfer`] always
/// returns 0.
pub struct BitBang<SCK, MOSI> {
    sck: SCK,
    mosi: MOSI,
}

impl<SCK, MOSI, PinErr> BitBang<SCK, MOSI>
where
    SCK: OutputPin<Error = PinErr>,
    MOSI: OutputPin<Error = PinErr>,
{
    /// Create a bit-banged transport from a clock and a data pin
    pub fn new(sck: SCK, mosi: MOSI) -> Self {
        Self { sck, mosi }
    }

    /// Give the pins back
    pub fn release(self) -> (SCK, MOSI) {
        (self.sck, self.mosi)
    }
}

impl<SCK, MOSI, PinErr> Transport for BitBang<SCK, MOSI>
where
    SCK: OutputPin<Error = PinErr>,
    MOSI: OutputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = PinErr;

    fn transfer(&mut self, byte: u8) -> Result<u8, Self::Error> {
        let mut bit = 0x80u8;
        while bit != 0 {
            self.sck.set_low()?;
            if byte & bit != 0 {
                self.mosi.set_high()?;
            } else {
                self.mosi.set_low()?;
            }
            // Panel samples on the rising edge
            self.sck.set_high()?;
            bit >>= 1;
        }
        Ok(0)
    }
}
