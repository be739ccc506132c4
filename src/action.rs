//! Input injection boundary.

use crate::resolve::Target;
use crate::trace::trace_event;
use crate::util::ClickMatchResult;

/// Issues a primary-button click at a screen coordinate.
pub trait ClickDispatcher {
    /// Clicks at `target`.
    ///
    /// Platform or permission problems are reported as
    /// [`ClickMatchError::InjectionFailure`](crate::ClickMatchError::InjectionFailure).
    fn click(&mut self, target: Target) -> ClickMatchResult<()>;
}

/// Dispatcher that records targets instead of injecting input.
#[derive(Clone, Debug, Default)]
pub struct DryRunDispatcher {
    clicks: Vec<Target>,
}

impl DryRunDispatcher {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every target that would have been clicked, in order.
    pub fn clicks(&self) -> &[Target] {
        &self.clicks
    }
}

impl ClickDispatcher for DryRunDispatcher {
    fn click(&mut self, target: Target) -> ClickMatchResult<()> {
        trace_event!("dry_run_click", x = target.x, y = target.y);
        self.clicks.push(target);
        Ok(())
    }
}
