//! Interleaved 8-bit image views and owned buffers.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer of interleaved channel
//! samples. The stride counts elements (bytes) between the starts of
//! consecutive rows, so a stride larger than `width * channels` represents
//! padded rows, as produced by some capture backends.

use crate::util::{ClickMatchError, ClickMatchResult};

pub mod color;
pub(crate) mod integral;

/// Width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Size {
    /// Creates a size from width and height.
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Returns true if `other` fits inside `self` in both dimensions.
    pub fn contains(&self, other: Size) -> bool {
        other.width <= self.width && other.height <= self.height
    }
}

/// Borrowed interleaved image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
}

impl<'a> ImageView<'a> {
    /// Creates a contiguous view with `stride == width * channels`.
    pub fn from_slice(
        data: &'a [u8],
        width: usize,
        height: usize,
        channels: usize,
    ) -> ClickMatchResult<Self> {
        let row_len = row_len(width, height, channels)?;
        Self::new(data, width, height, channels, row_len)
    }

    /// Creates a view with an explicit stride in elements.
    pub fn new(
        data: &'a [u8],
        width: usize,
        height: usize,
        channels: usize,
        stride: usize,
    ) -> ClickMatchResult<Self> {
        let needed = required_len(width, height, channels, stride)?;
        if data.len() < needed {
            return Err(ClickMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the image size in pixels.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns the number of interleaved channels per pixel.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the channel samples of the pixel at `(x, y)` if in bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<&'a [u8]> {
        if x >= self.width {
            return None;
        }
        let start = x * self.channels;
        self.row(y)?.get(start..start + self.channels)
    }

    /// Returns the samples of row `y`, `width * channels` elements long.
    pub fn row(&self, y: usize) -> Option<&'a [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width * self.channels)?;
        self.data.get(start..end)
    }
}

/// Owned contiguous interleaved image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
    channels: usize,
}

impl OwnedImage {
    /// Creates an owned image, validating the buffer length.
    pub fn new(
        data: Vec<u8>,
        width: usize,
        height: usize,
        channels: usize,
    ) -> ClickMatchResult<Self> {
        let row_len = row_len(width, height, channels)?;
        let needed = required_len(width, height, channels, row_len)?;
        if data.len() != needed {
            if data.len() < needed {
                return Err(ClickMatchError::BufferTooSmall {
                    needed,
                    got: data.len(),
                });
            }
            return Err(ClickMatchError::InvalidInput(
                "buffer length does not match image dimensions",
            ));
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            channels: self.channels,
            stride: self.width * self.channels,
        }
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the image size in pixels.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns the number of interleaved channels per pixel.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the contiguous sample buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

fn row_len(width: usize, height: usize, channels: usize) -> ClickMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(ClickMatchError::InvalidDimensions { width, height });
    }
    if channels == 0 {
        return Err(ClickMatchError::InvalidInput("channel count must be non-zero"));
    }
    width
        .checked_mul(channels)
        .ok_or(ClickMatchError::InvalidDimensions { width, height })
}

fn required_len(
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
) -> ClickMatchResult<usize> {
    let row_len = row_len(width, height, channels)?;
    if stride < row_len {
        return Err(ClickMatchError::InvalidStride { row_len, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(row_len))
        .ok_or(ClickMatchError::InvalidDimensions { width, height })
}
