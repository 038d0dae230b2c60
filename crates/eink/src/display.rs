//! Core display operations

use embedded_hal::delay::DelayNs;

use crate::config::Config;
use crate::error::Error;
use crate::framebuffer::{FrameStore, Layout, PAGE_SIZE};
use crate::interface::DisplayInterface;

/// Core display driver
///
/// Owns the command/data framer and the panel configuration, and knows how
/// to stream a [`FrameStore`] to the controller. Drawing lives in
/// [`GraphicDisplay`](crate::graphics::GraphicDisplay).
pub struct Display<I>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display instance
    pub fn new(interface: I, config: Config) -> Self {
        Self { interface, config }
    }

    /// Bring the bus to a known state and wait for the panel
    ///
    /// Releases chip-select, optionally pulses the reset line, then waits for
    /// BUSY to clear (bounded by [`Config::busy_timeout_ms`]).
    pub fn initialize<D: DelayNs>(&mut self, reset: bool, delay: &mut D) -> Result<(), I::Error> {
        log::debug!(
            "Initializing {}x{} panel (reset: {reset})",
            self.config.dimensions.width,
            self.config.dimensions.height
        );
        self.interface.release()?;
        if reset {
            self.interface.reset(delay)?;
        }
        self.wait_while_busy(delay)
    }

    /// Wait for the panel to finish its current operation
    pub fn wait_while_busy<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), I::Error> {
        self.interface.busy_wait(delay, self.config.busy_timeout_ms)
    }

    /// Stream the whole framebuffer to the controller RAM
    ///
    /// The black/white plane is always written; the highlight plane only when
    /// the configuration names a command for it. Chip-select is released
    /// before returning, also when streaming fails part-way.
    pub fn present<S: FrameStore>(
        &mut self,
        store: &mut S,
    ) -> Result<(), Error<I::Error, S::Error>> {
        let commands = self.config.plane_commands;
        log::debug!(
            "Presenting {} words ({:?}, highlight: {})",
            store.word_count(),
            store.layout(),
            commands.highlight.is_some()
        );

        match store.layout() {
            Layout::Resident => {
                self.stream_plane(store, commands.black_white, |word| word as u8)?;
                if let Some(command) = commands.highlight {
                    self.stream_plane(store, command, |word| (word >> 8) as u8)?;
                }
            }
            Layout::Paged => {
                let total = store.word_count() * 2;
                let mut page = [0u8; PAGE_SIZE];
                let mut offset = 0;
                while offset < total {
                    let len = (total - offset).min(PAGE_SIZE);
                    store
                        .read_bytes(offset, &mut page[..len])
                        .map_err(Error::Store)?;
                    log::trace!("Streaming page at byte {offset} ({len} bytes)");

                    // Odd bytes are black/white, even bytes highlight
                    self.stream_page(commands.black_white, &page[..len], 1)
                        .map_err(Error::Interface)?;
                    if let Some(command) = commands.highlight {
                        self.stream_page(command, &page[..len], 0)
                            .map_err(Error::Interface)?;
                    }
                    offset += len;
                }
            }
        }
        Ok(())
    }

    /// Send one plane of a resident store: `command`, then one byte per word
    fn stream_plane<S, F>(
        &mut self,
        store: &mut S,
        command: u8,
        plane: F,
    ) -> Result<(), Error<I::Error, S::Error>>
    where
        S: FrameStore,
        F: Fn(u16) -> u8,
    {
        self.interface
            .send_command(command, false)
            .map_err(Error::Interface)?;

        // Release chip-select whatever happened while the frame was open
        let result = self.stream_words(store, plane);
        let released = self.interface.release().map_err(Error::Interface);
        result.and(released)
    }

    fn stream_words<S, F>(
        &mut self,
        store: &mut S,
        plane: F,
    ) -> Result<(), Error<I::Error, S::Error>>
    where
        S: FrameStore,
        F: Fn(u16) -> u8,
    {
        self.interface.start_data().map_err(Error::Interface)?;

        let mut chunk = [0u8; PAGE_SIZE];
        let total = store.word_count();
        let mut index = 0;
        while index < total {
            let len = (total - index).min(PAGE_SIZE);
            for (i, byte) in chunk[..len].iter_mut().enumerate() {
                *byte = plane(store.read_word(index + i).map_err(Error::Store)?);
            }
            self.interface
                .write_data(&chunk[..len])
                .map_err(Error::Interface)?;
            index += len;
        }
        Ok(())
    }

    /// Send every other byte of `page`, starting at `first`, after `command`
    fn stream_page(&mut self, command: u8, page: &[u8], first: usize) -> Result<(), I::Error> {
        self.interface.send_command(command, false)?;

        let mut plane = [0u8; PAGE_SIZE / 2];
        let mut len = 0;
        for &byte in page.iter().skip(first).step_by(2) {
            plane[len] = byte;
            len += 1;
        }

        let result = self
            .interface
            .start_data()
            .and_then(|()| self.interface.write_data(&plane[..len]));
        let released = self.interface.release();
        result.and(released)
    }

    /// Send a command to the display controller
    pub fn send_command(&mut self, cmd: u8) -> Result<(), I::Error> {
        self.interface.send_command(cmd, true)
    }

    /// Send a command followed by its parameters
    pub fn send_command_with_data(&mut self, cmd: u8, data: &[u8]) -> Result<(), I::Error> {
        self.interface.send_command_with_data(cmd, data)
    }

    /// Get display dimensions
    pub fn dimensions(&self) -> &crate::config::Dimensions {
        &self.config.dimensions
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Access the underlying interface mutably
    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::command::*;
    use crate::config::{Builder, Dimensions, PlaneCommands};
    use crate::framebuffer::{ExternalBuffer, ResidentBuffer, StoreError};
    use crate::interface::{Interface, InterfaceError};
    use crate::memory::SpiSram;
    use crate::mock::{BusyPin, CountingDelay, FakeSram, PinLog, RecordingPin, RecordingSpi};
    use crate::transport::HardwareSpi;
    use std::vec;
    use std::vec::Vec;

    type TestInterface = Interface<
        HardwareSpi<RecordingSpi>,
        RecordingPin,
        RecordingPin,
        RecordingPin,
        BusyPin,
    >;

    fn display(log: &PinLog, commands: PlaneCommands, busy: BusyPin) -> Display<TestInterface> {
        let interface = Interface::new(
            HardwareSpi::new(RecordingSpi::on(log)),
            RecordingPin::new("cs", log),
            RecordingPin::new("dc", log),
            RecordingPin::new("rst", log),
            busy,
        );
        let config = Builder::new()
            .dimensions(Dimensions::new(10, 16).unwrap())
            .plane_commands(commands)
            .busy_timeout_ms(100)
            .build()
            .unwrap();
        Display::new(interface, config)
    }

    fn pattern() -> [u16; 20] {
        core::array::from_fn(|i| ((i as u16 * 7) << 8) | (i as u16 * 3 + 1))
    }

    #[test]
    fn test_initialize_resets_and_waits() {
        let log = PinLog::new();
        let mut display = display(&log, PlaneCommands::IL0373_MONO, BusyPin::busy_for(3));
        let mut delay = CountingDelay::new();

        display.initialize(true, &mut delay).unwrap();

        assert_eq!(
            log.events(),
            vec![("cs", true), ("rst", true), ("rst", false), ("rst", true)]
        );
        assert_eq!(delay.elapsed_ms(), 1 + 10 + 3);
    }

    #[test]
    fn test_initialize_without_reset_times_out() {
        let log = PinLog::new();
        let mut display = display(&log, PlaneCommands::IL0373_MONO, BusyPin::stuck());
        let mut delay = CountingDelay::new();

        assert_eq!(
            display.initialize(false, &mut delay),
            Err(InterfaceError::Timeout)
        );
        assert_eq!(log.events(), vec![("cs", true)]);
    }

    #[test]
    fn test_controller_commands_pass_through() {
        let log = PinLog::new();
        let mut display = display(&log, PlaneCommands::IL0373_MONO, BusyPin::ready());

        display.send_command(0x12).unwrap();
        assert_eq!(log.level("cs"), Some(true));
        display.send_command_with_data(0x50, &[0x97]).unwrap();

        assert_eq!(log.frames(), vec![(0x12, vec![]), (0x50, vec![0x97])]);
        assert_eq!(log.level("cs"), Some(true));
    }

    #[test]
    fn test_present_resident_streams_planes() {
        let log = PinLog::new();
        let mut display = display(&log, PlaneCommands::IL0373_TRICOLOR, BusyPin::ready());
        let words = pattern();
        let mut store = ResidentBuffer::new(words, *display.dimensions()).unwrap();

        display.present(&mut store).unwrap();

        let low: Vec<u8> = words.iter().map(|w| *w as u8).collect();
        let high: Vec<u8> = words.iter().map(|w| (w >> 8) as u8).collect();
        assert_eq!(
            log.frames(),
            vec![
                (IL0373_DATA_START_TRANSMISSION_1, low),
                (IL0373_DATA_START_TRANSMISSION_2, high),
            ]
        );
        assert_eq!(log.level("cs"), Some(true));
    }

    #[test]
    fn test_present_resident_mono_skips_highlight() {
        let log = PinLog::new();
        let mut display = display(&log, PlaneCommands::SSD16XX_MONO, BusyPin::ready());
        let mut store = ResidentBuffer::new(pattern(), *display.dimensions()).unwrap();

        display.present(&mut store).unwrap();

        let frames = log.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].0, SSD16XX_WRITE_RAM_BW);
        assert_eq!(frames[0].1.len(), store.word_count());
    }

    #[test]
    fn test_present_paged_deinterleaves_each_page() {
        let log = PinLog::new();
        let mut display = display(&log, PlaneCommands::SSD16XX_TRICOLOR, BusyPin::ready());
        let dims = *display.dimensions();
        let fake = FakeSram::new(128);
        let mut store = ExternalBuffer::new(SpiSram::new(fake, 128), 0, dims).unwrap();
        for (i, word) in pattern().iter().enumerate() {
            store.write_word(i, *word).unwrap();
        }

        display.present(&mut store).unwrap();

        // 20 words = 40 bytes: a single page
        let words = pattern();
        let low: Vec<u8> = words.iter().map(|w| *w as u8).collect();
        let high: Vec<u8> = words.iter().map(|w| (w >> 8) as u8).collect();
        assert_eq!(
            log.frames(),
            vec![(SSD16XX_WRITE_RAM_BW, low), (SSD16XX_WRITE_RAM_RED, high)]
        );
    }

    #[test]
    fn test_present_paged_repeats_commands_per_page() {
        let log = PinLog::new();
        let interface = Interface::new(
            HardwareSpi::new(RecordingSpi::on(&log)),
            RecordingPin::new("cs", &log),
            RecordingPin::new("dc", &log),
            RecordingPin::new("rst", &log),
            BusyPin::ready(),
        );
        let dims = Dimensions::new(25, 16).unwrap();
        let config = Builder::new()
            .dimensions(dims)
            .plane_commands(PlaneCommands::IL0373_TRICOLOR)
            .build()
            .unwrap();
        let mut display = Display::new(interface, config);
        let mut store =
            ExternalBuffer::new(SpiSram::new(FakeSram::new(256), 256), 0, dims).unwrap();
        store.fill(0xF00F).unwrap();

        display.present(&mut store).unwrap();

        // 50 words = 100 bytes: pages of 64 and 36 bytes
        let frames = log.frames();
        let lens: Vec<(u8, usize)> = frames.iter().map(|(c, d)| (*c, d.len())).collect();
        assert_eq!(
            lens,
            vec![
                (IL0373_DATA_START_TRANSMISSION_1, 32),
                (IL0373_DATA_START_TRANSMISSION_2, 32),
                (IL0373_DATA_START_TRANSMISSION_1, 18),
                (IL0373_DATA_START_TRANSMISSION_2, 18),
            ]
        );
        assert!(frames[0].1.iter().all(|&b| b == 0x0F));
        assert!(frames[1].1.iter().all(|&b| b == 0xF0));
    }

    /// Store that fails after a fixed number of reads
    struct FailingStore {
        reads_left: usize,
    }

    impl FrameStore for FailingStore {
        type Error = StoreError<()>;

        fn word_count(&self) -> usize {
            20
        }

        fn layout(&self) -> Layout {
            Layout::Resident
        }

        fn read_word(&mut self, index: usize) -> Result<u16, Self::Error> {
            if self.reads_left == 0 {
                return Err(StoreError::Memory(()));
            }
            self.reads_left -= 1;
            Ok(index as u16)
        }

        fn write_word(&mut self, _index: usize, _word: u16) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_present_releases_cs_on_store_error() {
        let log = PinLog::new();
        let mut display = display(&log, PlaneCommands::IL0373_TRICOLOR, BusyPin::ready());
        let mut store = FailingStore { reads_left: 5 };

        let result = display.present(&mut store);

        assert!(matches!(result, Err(Error::Store(StoreError::Memory(())))));
        assert_eq!(log.level("cs"), Some(true));
        // Only the black/white command made it out, with no data
        assert_eq!(
            log.frames(),
            vec![(IL0373_DATA_START_TRANSMISSION_1, Vec::new())]
        );
    }
}
