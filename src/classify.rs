//! Background pixel classification.
//!
//! A pixel is background when all three colour channels sit beyond a fixed
//! threshold: below [`BLACK_THRESHOLD`] for dark backgrounds, above
//! [`WHITE_THRESHOLD`] for light ones. Both comparisons are strict. Alpha is
//! never consulted.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Channels strictly below this value count as black background.
pub const BLACK_THRESHOLD: u8 = 30;

/// Channels strictly above this value count as white background.
pub const WHITE_THRESHOLD: u8 = 225;

/// Decides whether an RGB triple belongs to the background.
pub trait PixelPredicate {
    /// Returns `true` if the pixel should be made transparent.
    fn is_background(&self, r: u8, g: u8, b: u8) -> bool;
}

impl<F> PixelPredicate for F
where
    F: Fn(u8, u8, u8) -> bool,
{
    fn is_background(&self, r: u8, g: u8, b: u8) -> bool {
        self(r, g, b)
    }
}

/// Which solid background colour to knock out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackgroundVariant {
    /// Near-black pixels (`r, g, b < 30`).
    #[default]
    Black,
    /// Near-white pixels (`r, g, b > 225`).
    White,
}

impl BackgroundVariant {
    /// Both variants, in menu order.
    pub const ALL: [Self; 2] = [Self::Black, Self::White];

    /// Classify a pixel under this variant.
    #[must_use]
    pub const fn is_background(self, r: u8, g: u8, b: u8) -> bool {
        match self {
            Self::Black => r < BLACK_THRESHOLD && g < BLACK_THRESHOLD && b < BLACK_THRESHOLD,
            Self::White => r > WHITE_THRESHOLD && g > WHITE_THRESHOLD && b > WHITE_THRESHOLD,
        }
    }

    /// Short machine name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
        }
    }

    /// Human-readable title for status output.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Black => "Black background",
            Self::White => "White background",
        }
    }
}

impl PixelPredicate for BackgroundVariant {
    fn is_background(&self, r: u8, g: u8, b: u8) -> bool {
        BackgroundVariant::is_background(*self, r, g, b)
    }
}

impl fmt::Display for BackgroundVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackgroundVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "black" | "dark" => Ok(Self::Black),
            "white" | "light" => Ok(Self::White),
            _ => Err(Error::UnknownVariant(s.to_string())),
        }
    }
}
