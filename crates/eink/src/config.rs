//! Display configuration types and builder

use crate::command::*;
use crate::interface::DEFAULT_BUSY_TIMEOUT_MS;
pub use crate::error::{BuilderError, MAX_HEIGHT, MAX_WIDTH};

/// Panel dimensions in native (unrotated) orientation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    /// Width in pixels (number of framebuffer columns)
    pub width: u16,
    /// Height in pixels (8 pixels packed per framebuffer word)
    pub height: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// Heights that are not a multiple of 8 are accepted, but see
    /// [`column_stride`](Self::column_stride) for how their columns overlap.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if:
    /// - width == 0 or width > MAX_WIDTH
    /// - height < 8 or height > MAX_HEIGHT
    pub fn new(width: u16, height: u16) -> Result<Self, BuilderError> {
        if width == 0 || width > MAX_WIDTH {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        if height < 8 || height > MAX_HEIGHT {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Words between two horizontally adjacent pixels (`height / 8`)
    ///
    /// This rounds down. When `height` is not a multiple of 8, the partial
    /// last block of column `x` shares a word with the first block of column
    /// `x + 1`, and the trailing words of the buffer are never addressed.
    pub fn column_stride(&self) -> usize {
        self.height as usize / 8
    }

    /// Number of 16-bit framebuffer words (`ceil(height / 8) * width`)
    pub fn word_count(&self) -> usize {
        (self.height as usize).div_ceil(8) * self.width as usize
    }

    /// Size of the framebuffer image in bytes, both planes interleaved
    pub fn byte_count(&self) -> usize {
        self.word_count() * 2
    }
}

/// Display rotation relative to native orientation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate 90 degrees clockwise
    Rotate90,
    /// Rotate 180 degrees
    Rotate180,
    /// Rotate 270 degrees clockwise
    Rotate270,
}

impl Rotation {
    /// Whether logical x/y are swapped relative to the panel
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Rotate90 | Rotation::Rotate270)
    }
}

/// RAM write commands for the two framebuffer planes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneCommands {
    /// Command that starts the black/white plane transfer
    pub black_white: u8,
    /// Command that starts the highlight plane transfer, if the panel has one
    pub highlight: Option<u8>,
}

impl PlaneCommands {
    /// IL0373 black/white panel
    pub const IL0373_MONO: Self = Self {
        black_white: IL0373_DATA_START_TRANSMISSION_1,
        highlight: None,
    };

    /// IL0373 tri-color panel
    pub const IL0373_TRICOLOR: Self = Self {
        black_white: IL0373_DATA_START_TRANSMISSION_1,
        highlight: Some(IL0373_DATA_START_TRANSMISSION_2),
    };

    /// SSD1675/SSD1680 black/white panel
    pub const SSD16XX_MONO: Self = Self {
        black_white: SSD16XX_WRITE_RAM_BW,
        highlight: None,
    };

    /// SSD1675/SSD1680 tri-color panel
    pub const SSD16XX_TRICOLOR: Self = Self {
        black_white: SSD16XX_WRITE_RAM_BW,
        highlight: Some(SSD16XX_WRITE_RAM_RED),
    };
}

/// Display configuration
///
/// Use `Builder` to create a Config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Panel dimensions
    pub dimensions: Dimensions,
    /// Rotation applied to draw calls until changed at runtime
    pub rotation: Rotation,
    /// RAM write commands for each plane
    pub plane_commands: PlaneCommands,
    /// Upper bound on a single busy wait, in milliseconds
    pub busy_timeout_ms: u32,
}

impl Config {
    /// Get the rotated dimensions based on rotation setting
    pub fn rotated_dimensions(&self) -> Dimensions {
        rotated(self.dimensions, self.rotation)
    }

    /// Whether the panel has a second (highlight) plane
    pub fn supports_highlight(&self) -> bool {
        self.plane_commands.highlight.is_some()
    }
}

pub(crate) fn rotated(dimensions: Dimensions, rotation: Rotation) -> Dimensions {
    if rotation.swaps_axes() {
        Dimensions {
            width: dimensions.height,
            height: dimensions.width,
        }
    } else {
        dimensions
    }
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```
/// use eink::{Builder, Dimensions, PlaneCommands, Rotation};
///
/// let config = Builder::new()
///     .dimensions(Dimensions::new(104, 212).unwrap())
///     .plane_commands(PlaneCommands::IL0373_TRICOLOR)
///     .rotation(Rotation::Rotate90)
///     .build()
///     .expect("valid configuration");
/// assert!(config.supports_highlight());
/// ```
pub struct Builder {
    /// Panel dimensions (required)
    dimensions: Option<Dimensions>,
    /// Initial rotation
    rotation: Rotation,
    /// Plane RAM write commands
    plane_commands: PlaneCommands,
    /// Busy wait bound in milliseconds
    busy_timeout_ms: u32,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            dimensions: None,
            rotation: Rotation::Rotate0,
            plane_commands: PlaneCommands::IL0373_MONO,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set panel dimensions (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set initial rotation
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the plane RAM write commands
    pub fn plane_commands(mut self, commands: PlaneCommands) -> Self {
        self.plane_commands = commands;
        self
    }

    /// Set the busy wait timeout
    pub fn busy_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.busy_timeout_ms = timeout_ms;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingDimensions` if dimensions were not set
    pub fn build(self) -> Result<Config, BuilderError> {
        Ok(Config {
            dimensions: self.dimensions.ok_or(BuilderError::MissingDimensions)?,
            rotation: self.rotation,
            plane_commands: self.plane_commands,
            busy_timeout_ms: self.busy_timeout_ms,
        })
    }
}
