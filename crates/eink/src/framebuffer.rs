//! Framebuffer storage
//!
//! The framebuffer is `ceil(height / 8) * width` 16-bit words, column-major.
//! Word `i` packs eight vertically adjacent pixels: the black/white plane in
//! the low byte and the highlight plane in the high byte.
//!
//! Two stores share the [`FrameStore`] interface:
//!
//! - [`ResidentBuffer`] keeps the words in MCU memory
//! - [`ExternalBuffer`] proxies every word through an [`ExternalMemory`]
//!   device, stored big-endian at `base + 2 * i`
//!
//! The store only knows words; pixel addressing lives in
//! [`geometry`](crate::geometry).

use core::fmt::Debug;

use crate::config::Dimensions;
use crate::memory::ExternalMemory;

/// Bytes of an external framebuffer resident at once while flushing
pub const PAGE_SIZE: usize = 64;

/// How a store is streamed to the panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Plane by plane, reading words directly
    Resident,
    /// Page by page, de-interleaving the stored image
    Paged,
}

/// Errors from framebuffer stores
#[derive(Debug, PartialEq)]
pub enum StoreError<E> {
    /// Word index past the end of the framebuffer
    OutOfBounds {
        /// Offending word index
        index: usize,
    },
    /// Backing buffer or device smaller than the framebuffer
    CapacityExceeded {
        /// Bytes the framebuffer needs
        required: usize,
        /// Bytes available
        capacity: usize,
    },
    /// External memory error
    Memory(E),
}

impl<E: Debug> core::fmt::Display for StoreError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StoreError::OutOfBounds { index } => write!(f, "Word {index} is out of bounds"),
            StoreError::CapacityExceeded { required, capacity } => write!(
                f,
                "Framebuffer needs {required} bytes, storage has {capacity}"
            ),
            StoreError::Memory(e) => write!(f, "Memory error: {e:?}"),
        }
    }
}

impl<E: Debug> core::error::Error for StoreError<E> {}

/// Word-addressed framebuffer storage
pub trait FrameStore {
    /// Error type for store operations
    type Error: Debug;

    /// Number of 16-bit words held
    fn word_count(&self) -> usize;

    /// How [`Display::present`](crate::display::Display::present) streams this store
    fn layout(&self) -> Layout;

    /// Prepare the backing storage
    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Load word `index`
    fn read_word(&mut self, index: usize) -> Result<u16, Self::Error>;

    /// Store word `index`
    fn write_word(&mut self, index: usize, word: u16) -> Result<(), Self::Error>;

    /// Read, transform and write back word `index`
    fn modify_word<F>(&mut self, index: usize, f: F) -> Result<(), Self::Error>
    where
        F: FnOnce(u16) -> u16,
    {
        let word = self.read_word(index)?;
        self.write_word(index, f(word))
    }

    /// Set every word to `word`
    fn fill(&mut self, word: u16) -> Result<(), Self::Error> {
        for index in 0..self.word_count() {
            self.write_word(index, word)?;
        }
        Ok(())
    }

    /// Copy the big-endian byte image starting at byte `offset` into `buf`
    ///
    /// Even offsets hold highlight bytes, odd offsets black/white bytes.
    /// `buf` must not extend past `2 * word_count()` bytes.
    fn read_bytes(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error> {
        for (i, byte) in buf.iter_mut().enumerate() {
            let position = offset + i;
            let [hi, lo] = self.read_word(position / 2)?.to_be_bytes();
            *byte = if position % 2 == 0 { hi } else { lo };
        }
        Ok(())
    }
}

/// Framebuffer held in MCU memory
///
/// Generic over the buffer type, so a `static` array, a stack array or (with
/// the `std` feature) a `Vec` all work.
///
/// ```
/// use eink::{Dimensions, FrameStore, ResidentBuffer};
///
/// let dims = Dimensions::new(16, 16).unwrap();
/// let store = ResidentBuffer::new([0u16; 32], dims).unwrap();
/// assert_eq!(store.word_count(), 32);
/// ```
pub struct ResidentBuffer<B> {
    words: B,
    len: usize,
}

impl<B> ResidentBuffer<B>
where
    B: AsRef<[u16]> + AsMut<[u16]>,
{
    /// Wrap a word buffer for a panel of `dimensions`
    ///
    /// Extra words past the framebuffer are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CapacityExceeded`] if the buffer is too small.
    pub fn new(
        words: B,
        dimensions: Dimensions,
    ) -> Result<Self, StoreError<core::convert::Infallible>> {
        let len = dimensions.word_count();
        let available = words.as_ref().len();
        if available < len {
            return Err(StoreError::CapacityExceeded {
                required: len * 2,
                capacity: available * 2,
            });
        }
        Ok(Self { words, len })
    }

    /// The framebuffer words
    pub fn words(&self) -> &[u16] {
        &self.words.as_ref()[..self.len]
    }

    /// Give the buffer back
    pub fn release(self) -> B {
        self.words
    }
}

#[cfg(feature = "std")]
impl ResidentBuffer<std::vec::Vec<u16>> {
    /// Allocate a cleared framebuffer for a panel of `dimensions`
    pub fn allocate(dimensions: Dimensions) -> Self {
        let len = dimensions.word_count();
        Self {
            words: std::vec![0; len],
            len,
        }
    }
}

impl<B> FrameStore for ResidentBuffer<B>
where
    B: AsRef<[u16]> + AsMut<[u16]>,
{
    type Error = StoreError<core::convert::Infallible>;

    fn word_count(&self) -> usize {
        self.len
    }

    fn layout(&self) -> Layout {
        Layout::Resident
    }

    fn read_word(&mut self, index: usize) -> Result<u16, Self::Error> {
        self.words()
            .get(index)
            .copied()
            .ok_or(StoreError::OutOfBounds { index })
    }

    fn write_word(&mut self, index: usize, word: u16) -> Result<(), Self::Error> {
        let len = self.len;
        match self.words.as_mut()[..len].get_mut(index) {
            Some(slot) => {
                *slot = word;
                Ok(())
            }
            None => Err(StoreError::OutOfBounds { index }),
        }
    }

    fn fill(&mut self, word: u16) -> Result<(), Self::Error> {
        let len = self.len;
        self.words.as_mut()[..len].fill(word);
        Ok(())
    }
}

/// Framebuffer held in an external memory device
///
/// Every word access goes to the device; nothing is cached between calls.
pub struct ExternalBuffer<M> {
    memory: M,
    base: u32,
    len: usize,
}

impl<M> ExternalBuffer<M>
where
    M: ExternalMemory,
{
    /// Place a framebuffer for a panel of `dimensions` at `base` in `memory`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CapacityExceeded`] if the image does not fit
    /// between `base` and the end of the device.
    pub fn new(memory: M, base: u32, dimensions: Dimensions) -> Result<Self, StoreError<M::Error>> {
        let len = dimensions.word_count();
        let required = base as usize + dimensions.byte_count();
        let capacity = memory.capacity();
        if required > capacity {
            return Err(StoreError::CapacityExceeded { required, capacity });
        }
        Ok(Self { memory, base, len })
    }

    /// Give the memory device back
    pub fn release(self) -> M {
        self.memory
    }

    fn address(&self, index: usize) -> Result<u32, StoreError<M::Error>> {
        if index >= self.len {
            return Err(StoreError::OutOfBounds { index });
        }
        Ok(self.base + (index as u32) * 2)
    }
}

impl<M> FrameStore for ExternalBuffer<M>
where
    M: ExternalMemory,
{
    type Error = StoreError<M::Error>;

    fn word_count(&self) -> usize {
        self.len
    }

    fn layout(&self) -> Layout {
        Layout::Paged
    }

    fn init(&mut self) -> Result<(), Self::Error> {
        self.memory.init().map_err(StoreError::Memory)
    }

    fn read_word(&mut self, index: usize) -> Result<u16, Self::Error> {
        let address = self.address(index)?;
        self.memory.read16(address).map_err(StoreError::Memory)
    }

    fn write_word(&mut self, index: usize, word: u16) -> Result<(), Self::Error> {
        let address = self.address(index)?;
        self.memory.write16(address, word).map_err(StoreError::Memory)
    }

    fn fill(&mut self, word: u16) -> Result<(), Self::Error> {
        let mut page = [0u8; PAGE_SIZE];
        for pair in page.chunks_exact_mut(2) {
            pair.copy_from_slice(&word.to_be_bytes());
        }

        let total = self.len * 2;
        let mut offset = 0;
        while offset < total {
            let chunk = (total - offset).min(PAGE_SIZE);
            self.memory
                .write(self.base + offset as u32, &page[..chunk])
                .map_err(StoreError::Memory)?;
            offset += chunk;
        }
        Ok(())
    }

    fn read_bytes(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error> {
        if offset + buf.len() > self.len * 2 {
            return Err(StoreError::OutOfBounds {
                index: (offset + buf.len()) / 2,
            });
        }
        self.memory
            .read(self.base + offset as u32, buf)
            .map_err(StoreError::Memory)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::memory::SpiSram;
    use crate::mock::FakeSram;
    use std::vec;

    fn dims() -> Dimensions {
        Dimensions::new(4, 16).unwrap()
    }

    #[test]
    fn test_resident_rejects_short_buffer() {
        let result = ResidentBuffer::new([0u16; 7], dims());
        assert!(matches!(
            result,
            Err(StoreError::CapacityExceeded {
                required: 16,
                capacity: 14
            })
        ));
    }

    #[test]
    fn test_resident_bounds() {
        let mut store = ResidentBuffer::new([0u16; 10], dims()).unwrap();
        assert_eq!(store.word_count(), 8);
        store.write_word(7, 0x1234).unwrap();
        assert_eq!(store.read_word(7), Ok(0x1234));
        assert_eq!(store.read_word(8), Err(StoreError::OutOfBounds { index: 8 }));
        assert_eq!(
            store.write_word(8, 1),
            Err(StoreError::OutOfBounds { index: 8 })
        );
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_allocate_sizes_for_partial_blocks() {
        let dims = Dimensions::new(104, 212).unwrap();
        let mut store = ResidentBuffer::allocate(dims);

        assert_eq!(store.word_count(), 104 * 27);
        assert!(store.words().iter().all(|&w| w == 0));
        store.write_word(104 * 27 - 1, 0xFFFF).unwrap();
        assert_eq!(store.release().len(), 104 * 27);
    }

    #[test]
    fn test_resident_byte_image_is_big_endian() {
        let mut store = ResidentBuffer::new([0u16; 8], dims()).unwrap();
        store.write_word(0, 0xA1B2).unwrap();
        store.write_word(1, 0xC3D4).unwrap();

        let mut buf = [0u8; 3];
        store.read_bytes(1, &mut buf).unwrap();
        assert_eq!(buf, [0xB2, 0xC3, 0xD4]);
    }

    #[test]
    fn test_external_words_round_trip() {
        let fake = FakeSram::new(64);
        let sram = SpiSram::new(fake.clone(), 64);
        let mut store = ExternalBuffer::new(sram, 8, dims()).unwrap();

        store.modify_word(3, |word| word | 0x8001).unwrap();
        assert_eq!(store.read_word(3), Ok(0x8001));
        // base 8 + 3 words
        assert_eq!(fake.memory.borrow()[14..16], [0x80, 0x01]);
    }

    #[test]
    fn test_external_capacity_check() {
        let sram = SpiSram::new(FakeSram::new(64), 64);
        let result = ExternalBuffer::new(sram, 56, dims());
        assert!(matches!(
            result,
            Err(StoreError::CapacityExceeded {
                required: 72,
                capacity: 64
            })
        ));
    }

    #[test]
    fn test_external_fill() {
        let fake = FakeSram::new(256);
        let sram = SpiSram::new(fake.clone(), 256);
        let dims = Dimensions::new(40, 16).unwrap();
        let mut store = ExternalBuffer::new(sram, 0, dims).unwrap();

        store.fill(0x00FF).unwrap();

        let memory = fake.memory.borrow();
        let expected: std::vec::Vec<u8> = [0x00, 0xFF].repeat(80);
        assert_eq!(memory[..160], expected[..]);
        assert_eq!(memory[160..], vec![0u8; 96][..]);
    }
}
