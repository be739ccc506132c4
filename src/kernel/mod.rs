//! Correlation kernel implementations.
//!
//! Every kernel computes the same normalized cross-correlation coefficient.
//! Means are taken per channel, and the numerator and both variance sums are
//! accumulated across all channels before normalizing.

use crate::candidate::Peak;
use crate::image::integral::ChannelMoments;
use crate::image::ImageView;
use crate::template::plan::centered_sum_sq;
use crate::template::TemplatePlan;
use crate::util::{ClickMatchError, ClickMatchResult};

/// Kernel trait for scoring and scan operations.
pub trait Kernel {
    /// Computes the score at a single placement (top-left coordinates) with
    /// the direct formula.
    fn score_at(
        frame: ImageView<'_>,
        plan: &TemplatePlan,
        x: usize,
        y: usize,
    ) -> ClickMatchResult<f64>;

    /// Scans every placement where the template fits and returns the best
    /// peak, ties going to the first placement in raster order.
    fn scan_full(frame: ImageView<'_>, plan: &TemplatePlan) -> ClickMatchResult<Peak>;
}

pub mod scalar;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Returns the largest valid placement `(max_x, max_y)` of `plan` in `frame`.
pub(crate) fn placement_range(
    frame: ImageView<'_>,
    plan: &TemplatePlan,
) -> ClickMatchResult<(usize, usize)> {
    if frame.channels() != plan.channels() {
        return Err(ClickMatchError::ChannelMismatch {
            frame: frame.channels(),
            template: plan.channels(),
        });
    }
    let (frame_width, frame_height) = (frame.width(), frame.height());
    let (template_width, template_height) = (plan.width(), plan.height());
    if frame_width < template_width || frame_height < template_height {
        return Err(ClickMatchError::IncompatibleDimensions {
            frame_width,
            frame_height,
            template_width,
            template_height,
        });
    }
    Ok((frame_width - template_width, frame_height - template_height))
}

/// Turns a numerator and per-channel window moments into a score.
///
/// Degenerate cases, where the coefficient is undefined:
/// - flat template: `1.0` if the window is flat with the same color, else `0.0`;
/// - flat window against a textured template: `0.0`.
pub(crate) fn finish_score(
    plan: &TemplatePlan,
    dot: f64,
    moments: impl Iterator<Item = ChannelMoments>,
) -> f64 {
    let n = plan.pixel_count() as u128;
    let mut var_i = 0.0f64;
    let mut same_color = true;
    for (c, m) in moments.enumerate() {
        var_i += centered_sum_sq(n, m.sum, m.sum_sq);
        same_color &= plan.sums()[c] == m.sum;
    }
    let window_flat = var_i == 0.0;

    if plan.is_flat() {
        return if window_flat && same_color { 1.0 } else { 0.0 };
    }
    if window_flat {
        return 0.0;
    }

    let score = dot / (plan.var_t() * var_i).sqrt();
    if score.is_finite() {
        score.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
