//! Drawing front-end
//!
//! This module provides the [`GraphicDisplay`] struct which owns a
//! [`Display`](crate::display::Display), its framebuffer store and the current
//! rotation. It implements the two line primitives every higher-level shape is
//! built from and, with the `graphics` feature, the
//! [`DrawTarget`](embedded_graphics_core::draw_target::DrawTarget) trait from
//! the embedded-graphics ecosystem.
//!
//! ## Example
//!
//! ```rust,ignore
//! use eink::{Color, GraphicDisplay, ResidentBuffer, Rotation};
//! use embedded_graphics::{
//!     pixelcolor::BinaryColor,
//!     prelude::*,
//!     primitives::{PrimitiveStyle, Rectangle},
//! };
//!
//! static mut WORDS: [u16; 104 * 27] = [0; 104 * 27];
//!
//! let store = ResidentBuffer::new(unsafe { &mut WORDS[..] }, dims)?;
//! let mut display = GraphicDisplay::new(Display::new(interface, config), store);
//! display.initialize(true, &mut delay)?;
//!
//! display.set_rotation(Rotation::Rotate90);
//! display.draw_fast_hline(0, 10, 50, Color::Black)?;
//!
//! Rectangle::new(Point::new(10, 20), Size::new(30, 20))
//!     .into_styled(PrimitiveStyle::with_fill(Color::Highlight))
//!     .draw(&mut display)?;
//!
//! display.present()?;
//! ```

use embedded_hal::delay::DelayNs;

use crate::color::Color;
use crate::config::{Dimensions, Rotation, rotated};
use crate::display::Display;
use crate::error::Error;
use crate::framebuffer::FrameStore;
use crate::geometry::{self, Run};
use crate::interface::DisplayInterface;

/// Error type of [`GraphicDisplay`] operations
pub type DisplayError<I, S> = Error<<I as DisplayInterface>::Error, <S as FrameStore>::Error>;

/// Display with a framebuffer and rotation state
///
/// ## Type Parameters
///
/// * `I` - Interface type implementing [`DisplayInterface`](crate::interface::DisplayInterface)
/// * `S` - Framebuffer store implementing [`FrameStore`](crate::framebuffer::FrameStore)
pub struct GraphicDisplay<I, S>
where
    I: DisplayInterface,
    S: FrameStore,
{
    /// The underlying display driver
    display: Display<I>,
    /// Framebuffer
    store: S,
    /// Rotation applied to draw calls
    rotation: Rotation,
}

impl<I, S> GraphicDisplay<I, S>
where
    I: DisplayInterface,
    S: FrameStore,
{
    /// Create a new GraphicDisplay
    ///
    /// The store must have been sized for the display's dimensions. The
    /// initial rotation comes from the display configuration.
    pub fn new(display: Display<I>, store: S) -> Self {
        let rotation = display.config().rotation;
        Self {
            display,
            store,
            rotation,
        }
    }

    /// Prepare the store and the panel
    ///
    /// Initializes the framebuffer's backing storage (external memory mode
    /// registers), then releases the bus, optionally pulses reset and waits
    /// for the panel to become ready.
    pub fn initialize<D: DelayNs>(
        &mut self,
        reset: bool,
        delay: &mut D,
    ) -> Result<(), DisplayError<I, S>> {
        self.store.init().map_err(Error::Store)?;
        self.display
            .initialize(reset, delay)
            .map_err(Error::Interface)
    }

    /// Draw a horizontal run of `width` pixels in logical coordinates
    ///
    /// Pixels off the panel are clipped. Returns the number of pixels drawn,
    /// which is 0 when nothing is left after clipping or the color is not
    /// supported by the panel.
    pub fn draw_fast_hline(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        color: Color,
    ) -> Result<usize, DisplayError<I, S>> {
        self.draw_run(Run::horizontal(x, y, width), color)
    }

    /// Draw a vertical run of `height` pixels in logical coordinates
    ///
    /// See [`draw_fast_hline`](Self::draw_fast_hline) for the return value.
    pub fn draw_fast_vline(
        &mut self,
        x: i32,
        y: i32,
        height: i32,
        color: Color,
    ) -> Result<usize, DisplayError<I, S>> {
        self.draw_run(Run::vertical(x, y, height), color)
    }

    fn draw_run(&mut self, run: Run, color: Color) -> Result<usize, DisplayError<I, S>> {
        if color == Color::Highlight && !self.supports_highlight() {
            log::debug!("Dropping highlight run on a panel without a highlight plane");
            return Ok(0);
        }

        let dimensions = *self.display.dimensions();
        let Some(span) = run.rotate(self.rotation, dimensions).clip(dimensions) else {
            log::trace!("Run {run:?} clipped away at {:?}", self.rotation);
            return Ok(0);
        };

        geometry::apply(&mut self.store, span, color, dimensions).map_err(Error::Store)
    }

    /// Read back a pixel in logical coordinates
    ///
    /// Returns `None` off the panel. A pixel with its highlight bit set reads
    /// as [`Color::Highlight`] whatever its black/white bit holds.
    pub fn pixel(&mut self, x: i32, y: i32) -> Result<Option<Color>, DisplayError<I, S>> {
        let dimensions = *self.display.dimensions();
        let Some((index, mask)) = geometry::locate(x, y, self.rotation, dimensions) else {
            return Ok(None);
        };
        let word = self.store.read_word(index).map_err(Error::Store)?;
        Ok(Some(Color::from_word(word, mask)))
    }

    /// Fill the whole framebuffer
    ///
    /// [`Color::Invert`] flips every black/white bit; highlight is ignored on
    /// panels without a highlight plane.
    pub fn clear(&mut self, color: Color) -> Result<(), DisplayError<I, S>> {
        match color {
            Color::Invert => {
                for index in 0..self.store.word_count() {
                    self.store
                        .modify_word(index, |word| color.apply(word, 0xFF))
                        .map_err(Error::Store)?;
                }
                Ok(())
            }
            Color::Highlight if !self.supports_highlight() => Ok(()),
            _ => self.store.fill(color.fill_word()).map_err(Error::Store),
        }
    }

    /// Stream the framebuffer to the panel
    pub fn present(&mut self) -> Result<(), DisplayError<I, S>> {
        self.display.present(&mut self.store)
    }

    /// Set the rotation used by subsequent draw calls
    ///
    /// Pixels already drawn keep their place on the panel.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// Current rotation
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Logical dimensions under the current rotation
    pub fn rotated_dimensions(&self) -> Dimensions {
        rotated(*self.display.dimensions(), self.rotation)
    }

    /// Whether [`Color::Highlight`] can be drawn on this panel
    pub fn supports_highlight(&self) -> bool {
        self.display.config().supports_highlight()
    }

    /// Access the underlying Display
    pub fn display(&self) -> &Display<I> {
        &self.display
    }

    /// Access the underlying Display mutably
    ///
    /// Use this to send controller-specific commands (refresh, sleep) that
    /// are outside this crate.
    pub fn display_mut(&mut self) -> &mut Display<I> {
        &mut self.display
    }

    /// Access the framebuffer store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the display and the store back
    pub fn release(self) -> (Display<I>, S) {
        (self.display, self.store)
    }
}

#[cfg(feature = "graphics")]
mod draw_target {
    use embedded_graphics_core::{
        Pixel,
        draw_target::DrawTarget,
        geometry::{OriginDimensions, Size},
        primitives::Rectangle,
    };

    use super::{DisplayError, GraphicDisplay};
    use crate::color::Color;
    use crate::framebuffer::FrameStore;
    use crate::interface::DisplayInterface;

    impl<I, S> DrawTarget for GraphicDisplay<I, S>
    where
        I: DisplayInterface,
        S: FrameStore,
    {
        type Color = Color;
        type Error = DisplayError<I, S>;

        fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
        where
            Iter: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                self.draw_fast_hline(point.x, point.y, 1, color)?;
            }
            Ok(())
        }

        fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
            let width = i32::try_from(area.size.width).unwrap_or(i32::MAX);
            for row in 0..area.size.height {
                let y = area.top_left.y.saturating_add_unsigned(row);
                self.draw_fast_hline(area.top_left.x, y, width, color)?;
            }
            Ok(())
        }

        fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
            GraphicDisplay::clear(self, color)
        }
    }

    impl<I, S> OriginDimensions for GraphicDisplay<I, S>
    where
        I: DisplayInterface,
        S: FrameStore,
    {
        fn size(&self) -> Size {
            let rotated = self.rotated_dimensions();
            Size::new(u32::from(rotated.width), u32::from(rotated.height))
        }
    }
}
