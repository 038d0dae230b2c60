//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait and the [`Interface`] struct
//! that frames commands and data for the panel controller.
//!
//! ## Hardware Requirements
//!
//! The controller requires:
//! - A byte [`Transport`] (hardware SPI or bit-banged)
//! - 4 GPIO pins:
//!   - **CS**: Chip select (output, active low)
//!   - **DC**: Data/Command select (output, low=command, high=data)
//!   - **RST**: Reset (output, active low)
//!   - **BUSY**: Busy status (input, active high)
//!
//! ## Framing
//!
//! A command byte is always clocked with DC low and CS freshly asserted. The
//! command may keep CS held so that a data burst follows in the same frame;
//! releasing CS ends the frame.
//!
//! ## Example
//!
//! ```rust,ignore
//! use eink::{HardwareSpi, Interface};
//!
//! let mut interface = Interface::new(HardwareSpi::new(spi_bus), cs, dc, rst, busy);
//!
//! // Command with a parameter byte
//! interface.send_command_with_data(0x50, &[0x97])?;
//!
//! // Wait for display ready
//! interface.busy_wait(&mut delay, 30_000)?;
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::transport::Transport;

/// Trait for the command/data framer in front of the panel controller
///
/// This trait abstracts over different hardware implementations,
/// allowing the [`Display`](crate::display::Display) to work with any
/// transport + GPIO combination.
pub trait DisplayInterface {
    /// Error type for interface operations
    type Error: Debug;

    /// Send a command byte to the controller
    ///
    /// The implementation must:
    /// 1. Release and re-assert CS so the command starts a fresh frame
    /// 2. Set DC low (command mode)
    /// 3. Send the command byte
    /// 4. Release CS if `release` is true, otherwise keep it held for data
    fn send_command(&mut self, command: u8, release: bool) -> Result<(), Self::Error>;

    /// Switch to data mode while CS is held
    fn start_data(&mut self) -> Result<(), Self::Error>;

    /// Send data bytes without ending the frame
    fn write_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Finish the frame: wait for the transport to drain, then release CS
    fn release(&mut self) -> Result<(), Self::Error>;

    /// Send data bytes and end the frame
    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.start_data()?;
        self.write_data(data)?;
        self.release()
    }

    /// Send a command followed by its data bytes in one frame
    fn send_command_with_data(&mut self, command: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.send_command(command, false)?;
        self.send_data(data)
    }

    /// Perform hardware reset
    ///
    /// The implementation must:
    /// 1. Set RST high and hold 1ms
    /// 2. Set RST low and hold 10ms
    /// 3. Set RST high
    fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error>;

    /// Wait for busy pin to go low (with timeout)
    ///
    /// Polls the BUSY pin every millisecond until it goes low (display ready).
    ///
    /// # Errors
    ///
    /// Returns [`InterfaceError::Timeout`] (or the implementation's
    /// equivalent) if BUSY is still high after `timeout_ms` polls.
    fn busy_wait<D: DelayNs>(&mut self, delay: &mut D, timeout_ms: u32)
    -> Result<(), Self::Error>;
}

/// Default bound on [`DisplayInterface::busy_wait`], in milliseconds
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 30_000;

/// Errors that can occur at the interface level
///
/// Generic over transport and GPIO error types.
#[derive(Debug, PartialEq)]
pub enum InterfaceError<BusErr, PinErr> {
    /// Transport error
    Bus(BusErr),
    /// GPIO pin error
    Pin(PinErr),
    /// Timeout waiting for busy pin
    Timeout,
}

impl<BusErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<BusErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InterfaceError::Bus(e) => write!(f, "Bus error: {e:?}"),
            InterfaceError::Pin(e) => write!(f, "Pin error: {e:?}"),
            InterfaceError::Timeout => write!(f, "Timeout waiting for display"),
        }
    }
}

impl<BusErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<BusErr, PinErr> {}

/// Four-wire command/data framer
///
/// Implements [`DisplayInterface`] on top of any [`Transport`] and
/// embedded-hal v1.0 GPIO pins.
///
/// ## Type Parameters
///
/// * `T` - Byte transport implementing [`Transport`]
/// * `CS` - Chip select pin implementing [`OutputPin`]
/// * `DC` - Data/Command pin implementing [`OutputPin`]
/// * `RST` - Reset pin implementing [`OutputPin`]
/// * `BUSY` - Busy pin implementing [`InputPin`]
pub struct Interface<T, CS, DC, RST, BUSY> {
    /// Byte transport
    transport: T,
    /// Chip select pin (active low)
    cs: CS,
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
    /// Reset pin (active low)
    rst: RST,
    /// Busy pin (active high)
    busy: BUSY,
}

impl<T, CS, DC, RST, BUSY> Interface<T, CS, DC, RST, BUSY>
where
    T: Transport,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
{
    /// Create a new Interface
    ///
    /// # Arguments
    ///
    /// * `transport` - Byte transport (see [`HardwareSpi`](crate::transport::HardwareSpi)
    ///   and [`BitBang`](crate::transport::BitBang))
    /// * `cs` - Chip select pin (output, active low)
    /// * `dc` - Data/Command pin (output, low=command, high=data)
    /// * `rst` - Reset pin (output, active low)
    /// * `busy` - Busy pin (input, active high)
    pub fn new(transport: T, cs: CS, dc: DC, rst: RST, busy: BUSY) -> Self {
        Self {
            transport,
            cs,
            dc,
            rst,
            busy,
        }
    }
}

impl<T, CS, DC, RST, BUSY, PinErr> DisplayInterface for Interface<T, CS, DC, RST, BUSY>
where
    T: Transport,
    CS: OutputPin<Error = PinErr>,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<T::Error, PinErr>;

    fn send_command(&mut self, command: u8, release: bool) -> Result<(), Self::Error> {
        self.cs.set_high().map_err(InterfaceError::Pin)?;
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.cs.set_low().map_err(InterfaceError::Pin)?;

        self.transport
            .transfer(command)
            .map_err(InterfaceError::Bus)?;

        if release {
            self.release()?;
        }
        Ok(())
    }

    fn start_data(&mut self) -> Result<(), Self::Error> {
        self.dc.set_high().map_err(InterfaceError::Pin)
    }

    fn write_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.transport.write(data).map_err(InterfaceError::Bus)
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        // Release CS even if the transport failed to drain
        let flushed = self.transport.flush().map_err(InterfaceError::Bus);
        self.cs.set_high().map_err(InterfaceError::Pin)?;
        flushed
    }

    fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Self::Error> {
        // Reset sequence: HIGH -> wait 1ms -> LOW -> wait 10ms -> HIGH
        log::debug!("Pulsing panel reset");
        self.rst.set_high().map_err(InterfaceError::Pin)?;
        delay.delay_ms(1);
        self.rst.set_low().map_err(InterfaceError::Pin)?;
        delay.delay_ms(10);
        self.rst.set_high().map_err(InterfaceError::Pin)
    }

    fn busy_wait<D: DelayNs>(
        &mut self,
        delay: &mut D,
        timeout_ms: u32,
    ) -> Result<(), Self::Error> {
        let mut iterations = 0u32;

        loop {
            match self.busy.is_high() {
                Ok(true) => {
                    if iterations >= timeout_ms {
                        log::warn!("Panel still busy after {timeout_ms}ms");
                        return Err(InterfaceError::Timeout);
                    }
                    delay.delay_ms(1);
                    iterations += 1;
                }
                Ok(false) => return Ok(()),
                Err(e) => return Err(InterfaceError::Pin(e)),
            }
        }
    }
}
