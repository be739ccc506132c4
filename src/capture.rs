//! Screen capture boundary.
//!
//! A [`ScreenCapturer`] hands back a raw [`Frame`] in whatever layout the
//! platform produces; converting it to the matcher's layout is the caller's
//! job (see [`Frame::to_bgr`]).

use crate::image::color::{to_bgr, PixelFormat};
use crate::image::{ImageView, OwnedImage, Size};
use crate::util::{ClickMatchError, ClickMatchResult};
use std::path::Path;

/// Raw full-screen raster as delivered by a capture backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    width: usize,
    height: usize,
    format: PixelFormat,
}

impl Frame {
    /// Wraps a contiguous buffer, validating its length against the layout.
    pub fn new(
        data: Vec<u8>,
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> ClickMatchResult<Self> {
        ImageView::from_slice(&data, width, height, format.channels())?;
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// Returns the frame size in pixels.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns the pixel layout of the raw buffer.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Converts the frame into the matcher's BGR layout.
    pub fn to_bgr(&self) -> ClickMatchResult<OwnedImage> {
        let view = ImageView::from_slice(
            &self.data,
            self.width,
            self.height,
            self.format.channels(),
        )?;
        to_bgr(view, self.format)
    }
}

/// Produces one full-screen frame per call.
pub trait ScreenCapturer {
    /// Captures the current screen contents.
    ///
    /// Platform problems are reported as
    /// [`ClickMatchError::CaptureFailure`].
    fn capture(&mut self) -> ClickMatchResult<Frame>;
}

/// Capturer that returns the same pre-recorded frame on every call.
#[derive(Clone, Debug)]
pub struct StaticCapturer {
    frame: Frame,
}

impl StaticCapturer {
    /// Serves `frame` on every capture.
    pub fn new(frame: Frame) -> Self {
        Self { frame }
    }

    /// Loads a saved screenshot from disk.
    ///
    /// Any problem reading or decoding the file is a capture failure, since
    /// the file stands in for the screen.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ClickMatchResult<Self> {
        let path = path.as_ref();
        let img = ::image::ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|err| ClickMatchError::CaptureFailure {
                reason: format!("{}: {err}", path.display()),
            })?
            .decode()
            .map_err(|err| ClickMatchError::CaptureFailure {
                reason: format!("{}: {err}", path.display()),
            })?
            .to_rgba8();
        let (width, height) = (img.width() as usize, img.height() as usize);
        Ok(Self::new(Frame::new(
            img.into_raw(),
            width,
            height,
            PixelFormat::Rgba,
        )?))
    }
}

impl ScreenCapturer for StaticCapturer {
    fn capture(&mut self) -> ClickMatchResult<Frame> {
        Ok(self.frame.clone())
    }
}
