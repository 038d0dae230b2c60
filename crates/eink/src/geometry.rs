//! Rotation-aware run geometry
//!
//! Draw calls arrive as horizontal or vertical runs in logical (rotated)
//! coordinates. A [`Run`] is first mapped onto the native panel axes with
//! [`Run::rotate`], which may swap its axis, then clamped to the panel with
//! [`Run::clip`]. Only the resulting [`Span`] ever touches the framebuffer.
//!
//! Native pixel `(x, y)` lives in word `x * (height / 8) + y / 8`, at bit
//! `7 - (y & 7)` of the black/white plane (and `15 - (y & 7)` of the highlight
//! plane). Arithmetic before clipping is done in `i64`, so no `i32` input can
//! overflow it.

use crate::color::Color;
use crate::config::{Dimensions, Rotation};
use crate::framebuffer::FrameStore;

/// Direction of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Along x
    Horizontal,
    /// Along y
    Vertical,
}

/// A run of pixels before clipping
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Run {
    /// Start column
    pub x: i64,
    /// Start row
    pub y: i64,
    /// Pixel count; zero or negative runs draw nothing
    pub len: i64,
    /// Direction
    pub axis: Axis,
}

/// A run clamped to the panel, in native coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    /// Start column
    pub x: usize,
    /// Start row
    pub y: usize,
    /// Pixel count, at least 1
    pub len: usize,
    /// Direction
    pub axis: Axis,
}

impl Run {
    /// Horizontal run of `len` pixels starting at `(x, y)`
    pub fn horizontal(x: i32, y: i32, len: i32) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            len: len.into(),
            axis: Axis::Horizontal,
        }
    }

    /// Vertical run of `len` pixels starting at `(x, y)`
    pub fn vertical(x: i32, y: i32, len: i32) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            len: len.into(),
            axis: Axis::Vertical,
        }
    }

    /// Map a logical run onto native panel coordinates
    ///
    /// 90 and 270 degree rotations swap the axis: a logical horizontal run
    /// becomes a native vertical one and vice versa. The start point is moved
    /// to the run's lowest native coordinate, so the pixels covered are the
    /// same set the logical run names.
    pub fn rotate(self, rotation: Rotation, dimensions: Dimensions) -> Self {
        let width = i64::from(dimensions.width);
        let height = i64::from(dimensions.height);
        let Run { x, y, len, axis } = self;
        let shift = len - 1;

        let (x, y, axis) = match (rotation, axis) {
            (Rotation::Rotate0, _) => (x, y, axis),
            (Rotation::Rotate90, Axis::Horizontal) => (width - y - 1, x, Axis::Vertical),
            (Rotation::Rotate90, Axis::Vertical) => {
                (width - y - 1 - shift, x, Axis::Horizontal)
            }
            (Rotation::Rotate180, Axis::Horizontal) => {
                (width - x - 1 - shift, height - y - 1, Axis::Horizontal)
            }
            (Rotation::Rotate180, Axis::Vertical) => {
                (width - x - 1, height - y - 1 - shift, Axis::Vertical)
            }
            (Rotation::Rotate270, Axis::Horizontal) => (y, height - x - 1 - shift, Axis::Vertical),
            (Rotation::Rotate270, Axis::Vertical) => (y, height - x - 1, Axis::Horizontal),
        };

        Run { x, y, len, axis }
    }

    /// Clamp to the panel
    ///
    /// Returns `None` when the run misses the panel entirely or its length
    /// drops to zero or below.
    pub fn clip(self, dimensions: Dimensions) -> Option<Span> {
        let width = i64::from(dimensions.width);
        let height = i64::from(dimensions.height);

        // (fixed coordinate, its bound, run start, run bound)
        let (fixed, fixed_bound, start, bound) = match self.axis {
            Axis::Horizontal => (self.y, height, self.x, width),
            Axis::Vertical => (self.x, width, self.y, height),
        };

        if fixed < 0 || fixed >= fixed_bound {
            return None;
        }

        let mut start = start;
        let mut len = self.len;
        if start < 0 {
            len += start;
            start = 0;
        }
        if start + len > bound {
            len = bound - start;
        }
        if len <= 0 {
            return None;
        }

        let (x, y) = match self.axis {
            Axis::Horizontal => (start, fixed),
            Axis::Vertical => (fixed, start),
        };
        Some(Span {
            x: x as usize,
            y: y as usize,
            len: len as usize,
            axis: self.axis,
        })
    }
}

/// Word holding native pixel `(x, y)`
pub fn word_index(x: usize, y: usize, dimensions: Dimensions) -> usize {
    x * dimensions.column_stride() + y / 8
}

/// Black/white plane bit of row `y` within its word
pub fn row_mask(y: usize) -> u8 {
    1 << (7 - (y & 7))
}

/// Word index and row mask of a logical pixel, or `None` if off-panel
pub fn locate(x: i32, y: i32, rotation: Rotation, dimensions: Dimensions) -> Option<(usize, u8)> {
    let span = Run::horizontal(x, y, 1)
        .rotate(rotation, dimensions)
        .clip(dimensions)?;
    Some((word_index(span.x, span.y, dimensions), row_mask(span.y)))
}

/// Paint a clipped span into the framebuffer
///
/// Each touched word is read, modified and written back before moving to the
/// next one. Returns the number of pixels covered.
pub fn apply<S: FrameStore>(
    store: &mut S,
    span: Span,
    color: Color,
    dimensions: Dimensions,
) -> Result<usize, S::Error> {
    match span.axis {
        Axis::Horizontal => {
            // Every pixel is in a different column, always at the same row
            let mask = row_mask(span.y);
            let stride = dimensions.column_stride();
            let mut index = word_index(span.x, span.y, dimensions);
            for _ in 0..span.len {
                store.modify_word(index, |word| color.apply(word, mask))?;
                index += stride;
            }
        }
        Axis::Vertical => {
            let end = span.y + span.len;
            let mut y = span.y;
            while y < end {
                let block_end = ((y / 8 + 1) * 8).min(end);
                let mask = if y % 8 == 0 && block_end - y == 8 {
                    0xFF
                } else {
                    (y..block_end).fold(0u8, |mask, row| mask | row_mask(row))
                };
                let index = word_index(span.x, y, dimensions);
                store.modify_word(index, |word| color.apply(word, mask))?;
                y = block_end;
            }
        }
    }
    Ok(span.len)
}
