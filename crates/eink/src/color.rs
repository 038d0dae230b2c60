//! Pixel colors and their effect on the framebuffer planes

/// Color of a draw request
///
/// Black and White are absolute: they leave the pixel showing exactly that
/// color, clearing any highlight. Invert flips the black/white bit only.
/// Highlight sets the bit in the second plane and needs a tri-color panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Color {
    /// Black ink
    Black,
    /// No ink
    #[default]
    White,
    /// Flip the black/white state
    Invert,
    /// Highlight ink (red or yellow, depending on the panel)
    Highlight,
}

impl Color {
    /// Apply this color to the rows selected by `mask` in a framebuffer word
    ///
    /// `mask` addresses the black/white plane (low byte); the highlight plane
    /// uses the same mask shifted into the high byte.
    pub(crate) fn apply(self, word: u16, mask: u8) -> u16 {
        let mask = u16::from(mask);
        match self {
            Color::Black => (word | mask) & !(mask << 8),
            Color::White => word & !(mask | (mask << 8)),
            Color::Invert => word ^ mask,
            Color::Highlight => word | (mask << 8),
        }
    }

    /// Read the color stored for the row selected by `mask`
    ///
    /// The highlight plane wins over the black/white plane.
    pub(crate) fn from_word(word: u16, mask: u8) -> Self {
        let mask = u16::from(mask);
        if word & (mask << 8) != 0 {
            Color::Highlight
        } else if word & mask != 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    /// Word a whole framebuffer fill with this color stores
    pub(crate) fn fill_word(self) -> u16 {
        self.apply(0x0000, 0xFF)
    }
}

#[cfg(feature = "graphics")]
impl embedded_graphics_core::pixelcolor::PixelColor for Color {
    type Raw = ();
}

#[cfg(feature = "graphics")]
impl From<embedded_graphics_core::pixelcolor::BinaryColor> for Color {
    fn from(color: embedded_graphics_core::pixelcolor::BinaryColor) -> Self {
        use embedded_graphics_core::pixelcolor::BinaryColor;

        match color {
            BinaryColor::On => Color::Black,
            BinaryColor::Off => Color::White,
        }
    }
}
