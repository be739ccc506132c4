//! Conversion of a match location into a click target.

use crate::image::Size;
use crate::search::Location;

/// Screen coordinate at which a click is issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Target {
    /// Horizontal screen coordinate.
    pub x: usize,
    /// Vertical screen coordinate.
    pub y: usize,
}

/// Returns the center of a `size` region whose top-left corner is `location`.
///
/// Halves are floored, so even-sized templates resolve to the pixel just
/// below and right of the geometric center.
pub fn resolve(location: Location, size: Size) -> Target {
    Target {
        x: location.x + size.width / 2,
        y: location.y + size.height / 2,
    }
}
