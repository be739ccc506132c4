//! Template plan precomputation for normalized cross-correlation.

use crate::image::ImageView;
use crate::util::{ClickMatchError, ClickMatchResult};

/// Precomputed per-channel statistics and zero-mean buffer.
///
/// The plan lets a kernel evaluate the correlation numerator as a plain dot
/// product of the zero-mean template with raw window samples, since the
/// window mean term cancels against a zero-sum template.
#[derive(Clone, Debug)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    channels: usize,
    sums: Vec<u64>,
    means: Vec<f64>,
    zero_mean: Vec<f64>,
    var_t: f64,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    pub fn from_view(tpl: ImageView<'_>) -> ClickMatchResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let channels = tpl.channels();
        let count = width
            .checked_mul(height)
            .ok_or(ClickMatchError::InvalidDimensions { width, height })?;

        let mut sums = vec![0u64; channels];
        let mut sums_sq = vec![0u64; channels];
        for y in 0..height {
            let row = tpl
                .row(y)
                .ok_or(ClickMatchError::InvalidInput("template row out of bounds"))?;
            for px in row.chunks_exact(channels) {
                for (c, &value) in px.iter().enumerate() {
                    let v = value as u64;
                    sums[c] += v;
                    sums_sq[c] += v * v;
                }
            }
        }

        let n = count as u128;
        let means: Vec<f64> = sums.iter().map(|&s| s as f64 / count as f64).collect();
        let var_t: f64 = sums
            .iter()
            .zip(&sums_sq)
            .map(|(&s, &s2)| centered_sum_sq(n, s, s2))
            .sum();

        let mut zero_mean = Vec::with_capacity(count * channels);
        for y in 0..height {
            let row = tpl
                .row(y)
                .ok_or(ClickMatchError::InvalidInput("template row out of bounds"))?;
            for px in row.chunks_exact(channels) {
                for (c, &value) in px.iter().enumerate() {
                    zero_mean.push(value as f64 - means[c]);
                }
            }
        }

        Ok(Self {
            width,
            height,
            channels,
            sums,
            means,
            zero_mean,
            var_t,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the number of pixels in the template.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Returns the per-channel mean intensities.
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Returns the exact per-channel sums of the template samples.
    pub fn sums(&self) -> &[u64] {
        &self.sums
    }

    /// Returns the zero-mean template samples, interleaved and row-major.
    pub fn zero_mean(&self) -> &[f64] {
        &self.zero_mean
    }

    /// Returns the sum of squared deviations across all channels.
    pub fn var_t(&self) -> f64 {
        self.var_t
    }

    /// Returns true if every channel is constant over the template.
    pub fn is_flat(&self) -> bool {
        self.var_t == 0.0
    }
}

/// Sum of squared deviations from the mean, `sum_sq - sum^2 / n`, computed
/// from exact integer moments. Returns exactly `0.0` for a constant channel.
pub(crate) fn centered_sum_sq(n: u128, sum: u64, sum_sq: u64) -> f64 {
    let scaled = n * sum_sq as u128 - (sum as u128) * (sum as u128);
    scaled as f64 / n as f64
}
