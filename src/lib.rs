//! ClickMatch finds a reference image on the screen and clicks its center.
//!
//! A run loads a template, captures one frame, scores every placement with
//! zero-mean normalized cross-correlation, and clicks the center of the best
//! placement when its score clears a threshold. Capture and input injection
//! sit behind the [`ScreenCapturer`] and [`ClickDispatcher`] traits; the
//! `desktop` feature provides `xcap`/`enigo` backends for them, and the
//! `rayon` feature parallelizes the scan.

pub mod action;
mod candidate;
pub mod capture;
pub mod gate;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod pipeline;
#[cfg(feature = "desktop")]
pub mod platform;
pub mod resolve;
pub mod search;
pub mod template;
mod trace;
pub mod util;

pub use action::{ClickDispatcher, DryRunDispatcher};
pub use capture::{Frame, ScreenCapturer, StaticCapturer};
pub use gate::{Decision, DecisionGate, Threshold};
pub use image::color::PixelFormat;
pub use image::{ImageView, OwnedImage, Size};
pub use pipeline::{Outcome, Pipeline, PipelineConfig, RunReport, RunState, Stage};
#[cfg(feature = "desktop")]
pub use platform::{EnigoDispatcher, XcapCapturer};
pub use resolve::{resolve, Target};
pub use search::{Location, MatchConfig, MatchResult, Matcher};
pub use template::{load_template, Template};
pub use util::{ClickMatchError, ClickMatchResult};
