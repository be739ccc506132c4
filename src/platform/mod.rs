//! Desktop backends: `xcap` for capture and `enigo` for input injection.

use crate::action::ClickDispatcher;
use crate::capture::{Frame, ScreenCapturer};
use crate::image::color::PixelFormat;
use crate::resolve::Target;
use crate::trace::trace_event;
use crate::util::{ClickMatchError, ClickMatchResult};
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use xcap::Monitor;

/// Captures the primary monitor, or the first one reported when none is
/// flagged primary.
///
/// Absolute click coordinates are relative to the primary display, so the
/// captured frame must come from it for targets to line up.
#[derive(Clone, Copy, Debug, Default)]
pub struct XcapCapturer;

impl XcapCapturer {
    /// Creates a capturer for the primary display.
    pub fn new() -> Self {
        Self
    }
}

fn capture_failure(err: impl std::fmt::Display) -> ClickMatchError {
    ClickMatchError::CaptureFailure {
        reason: err.to_string(),
    }
}

impl ScreenCapturer for XcapCapturer {
    fn capture(&mut self) -> ClickMatchResult<Frame> {
        let monitors = Monitor::all().map_err(capture_failure)?;
        let monitor = select_primary(&monitors, |m| m.is_primary().unwrap_or(false))
            .ok_or_else(|| capture_failure("no monitor available"))?;
        let img = monitor.capture_image().map_err(capture_failure)?;
        let (width, height) = (img.width() as usize, img.height() as usize);
        trace_event!("screen_captured", width = width, height = height);
        Frame::new(img.into_raw(), width, height, PixelFormat::Rgba)
    }
}

/// Returns the first item flagged primary, falling back to the first item.
fn select_primary<T>(items: &[T], is_primary: impl Fn(&T) -> bool) -> Option<&T> {
    items
        .iter()
        .find(|item| is_primary(item))
        .or_else(|| items.first())
}

/// Clicks with the left mouse button through `enigo`.
///
/// The connection to the input system is opened on the first click, so a
/// missing permission surfaces as a click failure.
#[derive(Default)]
pub struct EnigoDispatcher {
    enigo: Option<Enigo>,
}

fn injection_failure(err: impl std::fmt::Display) -> ClickMatchError {
    ClickMatchError::InjectionFailure {
        reason: err.to_string(),
    }
}

impl EnigoDispatcher {
    /// Creates a dispatcher; nothing is opened until the first click.
    pub fn new() -> Self {
        Self::default()
    }

    fn connection(&mut self) -> ClickMatchResult<&mut Enigo> {
        if self.enigo.is_none() {
            self.enigo = Some(Enigo::new(&Settings::default()).map_err(injection_failure)?);
        }
        self.enigo
            .as_mut()
            .ok_or_else(|| injection_failure("input connection unavailable"))
    }
}

impl ClickDispatcher for EnigoDispatcher {
    fn click(&mut self, target: Target) -> ClickMatchResult<()> {
        let x = i32::try_from(target.x)
            .map_err(|_| injection_failure(format!("x coordinate {} out of range", target.x)))?;
        let y = i32::try_from(target.y)
            .map_err(|_| injection_failure(format!("y coordinate {} out of range", target.y)))?;
        let enigo = self.connection()?;
        enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(injection_failure)?;
        enigo
            .button(Button::Left, Direction::Click)
            .map_err(injection_failure)
    }
}
