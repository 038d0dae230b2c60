//! Recording fakes for the embedded-hal traits used in unit tests

extern crate std;

use core::convert::Infallible;
use std::cell::RefCell;
use std::rc::Rc;
use std::vec;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::spi::{self, Operation, SpiBus, SpiDevice};

use crate::command::*;

/// One observable bus event
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Pin(&'static str, bool),
    Byte(u8),
    Flush,
}

/// Shared, ordered log of pin changes and bytes on the wire
#[derive(Clone, Default)]
pub struct PinLog(Rc<RefCell<Vec<Event>>>);

impl PinLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<(&'static str, bool)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match *event {
                Event::Pin(name, high) => Some((name, high)),
                _ => None,
            })
            .collect()
    }

    pub fn all(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.0
            .borrow()
            .iter()
            .filter_map(|event| match *event {
                Event::Byte(byte) => Some(byte),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Split the byte stream into `(command, data)` frames.
    ///
    /// A frame starts at a byte clocked with DC low and ends when CS goes
    /// high. Panics if a byte is clocked while CS is released.
    pub fn frames(&self) -> Vec<(u8, Vec<u8>)> {
        let mut frames: Vec<(u8, Vec<u8>)> = Vec::new();
        let mut cs_low = false;
        let mut dc_high = false;
        for event in self.all() {
            match event {
                Event::Pin("cs", high) => cs_low = !high,
                Event::Pin("dc", high) => dc_high = high,
                Event::Byte(byte) => {
                    assert!(cs_low, "byte {byte:#04x} clocked with CS released");
                    if dc_high {
                        frames
                            .last_mut()
                            .expect("data before any command")
                            .1
                            .push(byte);
                    } else {
                        frames.push((byte, Vec::new()));
                    }
                }
                _ => {}
            }
        }
        frames
    }

    /// Last level written to a pin, if any
    pub fn level(&self, pin: &str) -> Option<bool> {
        self.events()
            .into_iter()
            .rev()
            .find(|(name, _)| *name == pin)
            .map(|(_, high)| high)
    }
}

/// SPI bus that logs every byte and echoes it back
#[derive(Clone)]
pub struct RecordingSpi {
    log: PinLog,
}

impl RecordingSpi {
    pub fn new() -> Self {
        Self { log: PinLog::new() }
    }

    pub fn on(log: &PinLog) -> Self {
        Self { log: log.clone() }
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.log.bytes()
    }
}

impl spi::ErrorType for RecordingSpi {
    type Error = Infallible;
}

impl SpiBus for RecordingSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        words.fill(0);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for &byte in words {
            self.log.push(Event::Byte(byte));
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.write(write)?;
        read.fill(0);
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for &byte in words.iter() {
            self.log.push(Event::Byte(byte));
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.log.push(Event::Flush);
        Ok(())
    }
}

/// Output pin that logs its level changes
pub struct RecordingPin {
    name: &'static str,
    log: PinLog,
}

impl RecordingPin {
    pub fn new(name: &'static str, log: &PinLog) -> Self {
        Self {
            name,
            log: log.clone(),
        }
    }
}

impl digital::ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.push(Event::Pin(self.name, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.push(Event::Pin(self.name, true));
        Ok(())
    }
}

/// Busy input that reads high for a fixed number of polls, then low
pub struct BusyPin {
    remaining: Option<u32>,
}

impl BusyPin {
    pub fn ready() -> Self {
        Self { remaining: Some(0) }
    }

    pub fn busy_for(polls: u32) -> Self {
        Self {
            remaining: Some(polls),
        }
    }

    pub fn stuck() -> Self {
        Self { remaining: None }
    }
}

impl digital::ErrorType for BusyPin {
    type Error = Infallible;
}

impl InputPin for BusyPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        match self.remaining.as_mut() {
            None => Ok(true),
            Some(0) => Ok(false),
            Some(n) => {
                *n -= 1;
                Ok(true)
            }
        }
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Delay that only counts elapsed nanoseconds
#[derive(Default)]
pub struct CountingDelay {
    pub elapsed_ns: u64,
}

impl CountingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}

/// In-memory model of a 23K-series SPI SRAM behind a `SpiDevice`
#[derive(Clone)]
pub struct FakeSram {
    pub memory: Rc<RefCell<Vec<u8>>>,
    pub status: Rc<RefCell<u8>>,
    pub transactions: Rc<RefCell<usize>>,
}

impl FakeSram {
    pub fn new(capacity: usize) -> Self {
        Self {
            memory: Rc::new(RefCell::new(vec![0; capacity])),
            status: Rc::new(RefCell::new(0)),
            transactions: Rc::new(RefCell::new(0)),
        }
    }
}

impl spi::ErrorType for FakeSram {
    type Error = Infallible;
}

impl SpiDevice for FakeSram {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        *self.transactions.borrow_mut() += 1;
        let mut memory = self.memory.borrow_mut();
        let mut header: Vec<u8> = Vec::new();
        let mut cursor = 0usize;
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    for &byte in bytes.iter() {
                        match header.first() {
                            Some(&SRAM_WRSR) => *self.status.borrow_mut() = byte,
                            Some(_) if header.len() < 3 => {
                                header.push(byte);
                                if header.len() == 3 {
                                    cursor = usize::from(header[1]) << 8 | usize::from(header[2]);
                                }
                            }
                            Some(&SRAM_WRITE) => {
                                memory[cursor] = byte;
                                cursor += 1;
                            }
                            Some(_) => panic!("unexpected payload byte {byte:#04x}"),
                            None => header.push(byte),
                        }
                    }
                }
                Operation::Read(buf) => {
                    assert_eq!(header.first(), Some(&SRAM_READ));
                    for byte in buf.iter_mut() {
                        *byte = memory[cursor];
                        cursor += 1;
                    }
                }
                _ => unimplemented!("unused by the driver"),
            }
        }
        Ok(())
    }
}
