//! Framebuffer driver for SPI e-Paper panels
//!
//! A driver for IL0373 and SSD16xx-style e-paper controllers that keeps the
//! image in a column-major framebuffer of 16-bit words, one word per 8
//! vertically stacked pixels. The low byte of each word is the black/white
//! plane and the high byte the highlight (red or yellow) plane.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Rotation-aware horizontal and vertical line primitives
//! - Framebuffer held in MCU memory or in an external SPI SRAM
//! - Hardware SPI or bit-banged transport
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use embedded_hal::spi::SpiBus;
//! use eink::{
//!     Builder, Color, Dimensions, Display, GraphicDisplay, HardwareSpi, Interface, PlaneCommands,
//!     ResidentBuffer, Rotation,
//! };
//!
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiBus for MockSpi {
//! #     fn read(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn write(&mut self, _words: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn transfer(&mut self, _r: &mut [u8], _w: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let mut delay = MockDelay;
//! let interface = Interface::new(HardwareSpi::new(MockSpi), MockPin, MockPin, MockPin, MockPin);
//! let dims = match Dimensions::new(104, 212) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new()
//!     .dimensions(dims)
//!     .plane_commands(PlaneCommands::IL0373_TRICOLOR)
//!     .build()
//! {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut words = [0u16; 104 * 27];
//! let store = match ResidentBuffer::new(&mut words[..], dims) {
//!     Ok(store) => store,
//!     Err(_) => return,
//! };
//! let mut display = GraphicDisplay::new(Display::new(interface, config), store);
//! let _ = display.initialize(true, &mut delay);
//!
//! display.set_rotation(Rotation::Rotate90);
//! let _ = display.draw_fast_hline(0, 10, 50, Color::Black);
//! let _ = display.draw_fast_vline(20, 0, 30, Color::Highlight);
//! let _ = display.present();
//! ```

#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

/// Pixel colors
pub mod color;
/// Controller command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Framebuffer storage
pub mod framebuffer;
/// Coordinate rotation, clipping and addressing
pub mod geometry;
/// Drawing front-end
pub mod graphics;
/// Hardware interface abstraction
pub mod interface;
/// External SPI memory
pub mod memory;
/// Byte transports
pub mod transport;

#[cfg(test)]
mod mock;

pub use color::Color;
pub use config::{Builder, Config, Dimensions, MAX_HEIGHT, MAX_WIDTH, PlaneCommands, Rotation};
pub use display::Display;
pub use error::{BuilderError, Error};
pub use framebuffer::{ExternalBuffer, FrameStore, Layout, PAGE_SIZE, ResidentBuffer, StoreError};
pub use graphics::{DisplayError, GraphicDisplay};
pub use interface::{DEFAULT_BUSY_TIMEOUT_MS, DisplayInterface, Interface, InterfaceError};
pub use memory::{ExternalMemory, SpiSram, SramError};
pub use transport::{BitBang, HardwareSpi, Transport};
