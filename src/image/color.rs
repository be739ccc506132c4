//! Pixel layouts and conversion into the matcher's channel order.
//!
//! The matcher scores 3-channel BGR data. Capture backends and decoders hand
//! out RGB(A) or gray buffers; everything is converted with [`to_bgr`] before
//! it reaches the matcher.

use crate::image::{ImageView, OwnedImage};
use crate::util::{ClickMatchError, ClickMatchResult};

/// Number of channels in the matcher's canonical layout.
pub const MATCH_CHANNELS: usize = 3;

/// Interleaved 8-bit pixel layout of a raw buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// Single luminance channel.
    Gray,
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
    /// Blue, green, red (the matcher's layout).
    Bgr,
    /// Blue, green, red, alpha.
    Bgra,
}

impl PixelFormat {
    /// Returns the number of interleaved channels.
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgb | PixelFormat::Bgr => 3,
            PixelFormat::Rgba | PixelFormat::Bgra => 4,
        }
    }

    fn bgr(self, px: &[u8]) -> [u8; 3] {
        match self {
            PixelFormat::Gray => [px[0]; 3],
            PixelFormat::Rgb | PixelFormat::Rgba => [px[2], px[1], px[0]],
            PixelFormat::Bgr | PixelFormat::Bgra => [px[0], px[1], px[2]],
        }
    }
}

/// Converts a view in `format` into a contiguous BGR image.
///
/// Alpha is dropped without premultiplication; gray is replicated into all
/// three channels.
pub fn to_bgr(src: ImageView<'_>, format: PixelFormat) -> ClickMatchResult<OwnedImage> {
    if src.channels() != format.channels() {
        return Err(ClickMatchError::InvalidInput(
            "pixel format does not match view channel count",
        ));
    }

    let width = src.width();
    let height = src.height();
    let channels = format.channels();
    let mut out = Vec::with_capacity(width * height * MATCH_CHANNELS);
    for y in 0..height {
        let row = src
            .row(y)
            .ok_or(ClickMatchError::InvalidInput("row out of bounds"))?;
        for px in row.chunks_exact(channels) {
            out.extend_from_slice(&format.bgr(px));
        }
    }
    OwnedImage::new(out, width, height, MATCH_CHANNELS)
}
