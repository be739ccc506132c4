//! Scalar reference kernel.

use crate::candidate::{BestPeak, Peak};
use crate::image::integral::{BandStats, ChannelMoments};
use crate::image::ImageView;
use crate::kernel::{finish_score, placement_range, Kernel};
use crate::template::TemplatePlan;
use crate::util::{ClickMatchError, ClickMatchResult};

/// Single-threaded normalized cross-correlation kernel.
///
/// `scan_full` slides a band of template-height rows down the frame, takes
/// window moments from its column sums and computes only the numerator per
/// placement; `score_at` evaluates everything
/// directly and serves as the reference.
pub struct ZnccScalar;

impl Kernel for ZnccScalar {
    fn score_at(
        frame: ImageView<'_>,
        plan: &TemplatePlan,
        x: usize,
        y: usize,
    ) -> ClickMatchResult<f64> {
        let (max_x, max_y) = placement_range(frame, plan)?;
        if x > max_x || y > max_y {
            return Err(ClickMatchError::InvalidInput("placement outside the frame"));
        }

        let channels = plan.channels();
        let row_len = plan.width() * channels;
        let zero_mean = plan.zero_mean();
        let mut moments = vec![ChannelMoments { sum: 0, sum_sq: 0 }; channels];
        let mut dot = 0.0f64;
        for ty in 0..plan.height() {
            let window = window_row(frame, x * channels, y + ty, row_len)?;
            let tpl_row = &zero_mean[ty * row_len..(ty + 1) * row_len];
            for (i, (&t, &value)) in tpl_row.iter().zip(window).enumerate() {
                let v = value as u64;
                let m = &mut moments[i % channels];
                m.sum += v;
                m.sum_sq += v * v;
                dot += t * value as f64;
            }
        }

        Ok(finish_score(plan, dot, moments.into_iter()))
    }

    fn scan_full(frame: ImageView<'_>, plan: &TemplatePlan) -> ClickMatchResult<Peak> {
        let (max_x, max_y) = placement_range(frame, plan)?;

        let mut best = BestPeak::new();
        for peak in scan_rows(frame, plan, 0, max_y + 1, max_x)? {
            best.push(peak);
        }
        best.into_peak()
            .ok_or(ClickMatchError::InvalidInput("no placements were scored"))
    }
}

/// Scores placement rows `[start, end)` and returns each row's best peak in
/// row order.
pub(crate) fn scan_rows(
    frame: ImageView<'_>,
    plan: &TemplatePlan,
    start: usize,
    end: usize,
    max_x: usize,
) -> ClickMatchResult<Vec<Peak>> {
    let mut winners = Vec::with_capacity(end.saturating_sub(start));
    if start >= end {
        return Ok(winners);
    }
    let mut band = BandStats::new(frame, plan.height(), start)?;
    for y in start..end {
        if y > start {
            band.advance(frame)?;
        }
        let mut best = BestPeak::new();
        for x in 0..=max_x {
            let score = score_window(frame, plan, &band, x)?;
            best.push(Peak { x, y, score });
        }
        winners.extend(best.into_peak());
    }
    Ok(winners)
}

fn score_window(
    frame: ImageView<'_>,
    plan: &TemplatePlan,
    band: &BandStats,
    x: usize,
) -> ClickMatchResult<f64> {
    let (width, height) = (plan.width(), plan.height());
    let y = band.top();
    let channels = band.channels();
    // Flat templates are scored from the moments alone.
    let dot = if plan.is_flat() {
        0.0
    } else {
        let row_len = width * channels;
        let zero_mean = plan.zero_mean();
        let mut dot = 0.0f64;
        for ty in 0..height {
            let window = window_row(frame, x * channels, y + ty, row_len)?;
            let tpl_row = &zero_mean[ty * row_len..(ty + 1) * row_len];
            dot += tpl_row
                .iter()
                .zip(window)
                .map(|(&t, &v)| t * v as f64)
                .sum::<f64>();
        }
        dot
    };

    let moments = (0..channels).map(|c| band.moments(c, x, width));
    Ok(finish_score(plan, dot, moments))
}

fn window_row<'a>(
    frame: ImageView<'a>,
    start: usize,
    y: usize,
    len: usize,
) -> ClickMatchResult<&'a [u8]> {
    frame
        .row(y)
        .and_then(|row| row.get(start..start + len))
        .ok_or(ClickMatchError::InvalidInput("window outside the frame"))
}
