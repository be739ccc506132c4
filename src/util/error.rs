//! Error types for clickmatch.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for clickmatch operations.
pub type ClickMatchResult<T> = std::result::Result<T, ClickMatchError>;

/// Errors that can occur while loading, matching, capturing or clicking.
///
/// A score below the threshold is not an error; see
/// [`Decision::Rejected`](crate::gate::Decision::Rejected).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClickMatchError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Image dimensions are zero or overflow.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is shorter than a row of pixels.
    #[error("stride {stride} is smaller than row length {row_len}")]
    InvalidStride { row_len: usize, stride: usize },
    /// Backing buffer cannot hold the described image.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Threshold is NaN or outside `[0, 1]`.
    #[error("threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),
    /// Frame and template have different channel counts.
    #[error("channel mismatch: frame has {frame}, template has {template}")]
    ChannelMismatch { frame: usize, template: usize },
    /// The template file does not exist.
    #[error("template not found: {}", path.display())]
    PathNotFound { path: PathBuf },
    /// The template file exists but could not be decoded as an image.
    #[error("failed to decode {}: {reason}", path.display())]
    DecodeFailure { path: PathBuf, reason: String },
    /// The screen could not be captured.
    #[error("screen capture failed: {reason}")]
    CaptureFailure { reason: String },
    /// The frame is smaller than the template in at least one dimension.
    #[error(
        "frame {frame_width}x{frame_height} is smaller than template \
         {template_width}x{template_height}"
    )]
    IncompatibleDimensions {
        frame_width: usize,
        frame_height: usize,
        template_width: usize,
        template_height: usize,
    },
    /// The click could not be injected.
    #[error("click injection failed: {reason}")]
    InjectionFailure { reason: String },
}
