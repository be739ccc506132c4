//! Rayon-parallel kernel (feature-gated).
//!
//! Blocks of placement rows are scored in parallel, each with its own sliding
//! band; row winners are then reduced in row order, so the result is
//! identical to the scalar scan including the raster-order tie-break.

use crate::candidate::{BestPeak, Peak};
use crate::image::ImageView;
use crate::kernel::scalar::{scan_rows, ZnccScalar};
use crate::kernel::{placement_range, Kernel};
use crate::template::TemplatePlan;
use crate::util::{ClickMatchError, ClickMatchResult};
use rayon::prelude::*;

/// Placement rows handed to one task; each task builds its own band.
const ROWS_PER_TASK: usize = 16;

/// Row-parallel normalized cross-correlation kernel.
pub struct ZnccRayon;

impl Kernel for ZnccRayon {
    fn score_at(
        frame: ImageView<'_>,
        plan: &TemplatePlan,
        x: usize,
        y: usize,
    ) -> ClickMatchResult<f64> {
        ZnccScalar::score_at(frame, plan, x, y)
    }

    fn scan_full(frame: ImageView<'_>, plan: &TemplatePlan) -> ClickMatchResult<Peak> {
        let (max_x, max_y) = placement_range(frame, plan)?;
        let rows = max_y + 1;

        let block_winners: Vec<Vec<Peak>> = (0..rows.div_ceil(ROWS_PER_TASK))
            .into_par_iter()
            .map(|block| {
                let start = block * ROWS_PER_TASK;
                scan_rows(frame, plan, start, (start + ROWS_PER_TASK).min(rows), max_x)
            })
            .collect::<ClickMatchResult<_>>()?;

        let mut best = BestPeak::new();
        for peak in block_winners.into_iter().flatten() {
            best.push(peak);
        }
        best.into_peak()
            .ok_or(ClickMatchError::InvalidInput("no placements were scored"))
    }
}
