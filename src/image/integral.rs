//! Per-channel window moments over a sliding band of rows.
//!
//! Sums and sums of squares are kept as exact integers so that window
//! flatness can be decided without a floating-point epsilon. Only one band of
//! `band_height` rows is summarized at a time, so memory grows with the frame
//! width and not its area.

use crate::image::ImageView;
use crate::util::{ClickMatchError, ClickMatchResult};

/// Integer first and second moments of one channel over a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ChannelMoments {
    pub sum: u64,
    pub sum_sq: u64,
}

/// Column sums of the rows `[top, top + band_height)` with horizontal prefix
/// sums over them.
///
/// Prefix entry `x` holds the total over columns `[0, x)`, so any window of
/// the band is answered with two lookups per channel.
pub(crate) struct BandStats {
    width: usize,
    channels: usize,
    band_height: usize,
    top: usize,
    col_sum: Vec<u64>,
    col_sum_sq: Vec<u64>,
    prefix_sum: Vec<u64>,
    prefix_sum_sq: Vec<u64>,
}

impl BandStats {
    /// Summarizes rows `[top, top + band_height)` of `view`.
    pub(crate) fn new(view: ImageView<'_>, band_height: usize, top: usize) -> ClickMatchResult<Self> {
        let width = view.width();
        let channels = view.channels();
        let len = width * channels;
        let mut band = Self {
            width,
            channels,
            band_height,
            top,
            col_sum: vec![0; len],
            col_sum_sq: vec![0; len],
            prefix_sum: vec![0; len + channels],
            prefix_sum_sq: vec![0; len + channels],
        };
        for y in top..top + band_height {
            let row = band_row(view, y)?;
            for (i, &value) in row.iter().enumerate() {
                let v = value as u64;
                band.col_sum[i] += v;
                band.col_sum_sq[i] += v * v;
            }
        }
        band.rebuild_prefix();
        Ok(band)
    }

    /// Returns the first row covered by the band.
    pub(crate) fn top(&self) -> usize {
        self.top
    }

    /// Returns the number of channels covered by the band.
    pub(crate) fn channels(&self) -> usize {
        self.channels
    }

    /// Slides the band one row down.
    pub(crate) fn advance(&mut self, view: ImageView<'_>) -> ClickMatchResult<()> {
        let leaving = band_row(view, self.top)?;
        let entering = band_row(view, self.top + self.band_height)?;
        for (i, (&old, &new)) in leaving.iter().zip(entering).enumerate() {
            let (old, new) = (old as u64, new as u64);
            self.col_sum[i] = self.col_sum[i] - old + new;
            self.col_sum_sq[i] = self.col_sum_sq[i] - old * old + new * new;
        }
        self.top += 1;
        self.rebuild_prefix();
        Ok(())
    }

    /// Returns the moments of channel `c` over columns `[x, x + w)` of the
    /// band.
    ///
    /// The columns must lie inside the view the band was built from.
    #[inline]
    pub(crate) fn moments(&self, c: usize, x: usize, w: usize) -> ChannelMoments {
        let left = x * self.channels + c;
        let right = (x + w) * self.channels + c;
        ChannelMoments {
            sum: self.prefix_sum[right] - self.prefix_sum[left],
            sum_sq: self.prefix_sum_sq[right] - self.prefix_sum_sq[left],
        }
    }

    fn rebuild_prefix(&mut self) {
        let channels = self.channels;
        for x in 0..self.width {
            for c in 0..channels {
                let i = x * channels + c;
                self.prefix_sum[i + channels] = self.prefix_sum[i] + self.col_sum[i];
                self.prefix_sum_sq[i + channels] = self.prefix_sum_sq[i] + self.col_sum_sq[i];
            }
        }
    }
}

fn band_row(view: ImageView<'_>, y: usize) -> ClickMatchResult<&[u8]> {
    view.row(y)
        .ok_or(ClickMatchError::InvalidInput("band row outside the frame"))
}

#[cfg(test)]
mod tests {
    use super::{BandStats, ChannelMoments};
    use crate::image::ImageView;

    #[allow(clippy::too_many_arguments)]
    fn direct(
        data: &[u8],
        width: usize,
        channels: usize,
        c: usize,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
    ) -> ChannelMoments {
        let mut expected = ChannelMoments { sum: 0, sum_sq: 0 };
        for yy in y..y + h {
            for xx in x..x + w {
                let v = data[(yy * width + xx) * channels + c] as u64;
                expected.sum += v;
                expected.sum_sq += v * v;
            }
        }
        expected
    }

    #[test]
    fn sliding_band_matches_direct_sums() {
        let (width, height, channels, band_height) = (6, 7, 2, 3);
        let data: Vec<u8> = (0..width * height * channels)
            .map(|i| ((i * 37 + 11) % 251) as u8)
            .collect();
        let view = ImageView::from_slice(&data, width, height, channels).unwrap();

        let mut band = BandStats::new(view, band_height, 0).unwrap();
        for top in 0..=height - band_height {
            if top > 0 {
                band.advance(view).unwrap();
            }
            assert_eq!(band.top(), top);
            for (x, w) in [(0, 6), (1, 3), (5, 1), (2, 2)] {
                for c in 0..channels {
                    assert_eq!(
                        band.moments(c, x, w),
                        direct(&data, width, channels, c, x, top, w, band_height),
                        "top {top}, x {x}, w {w}, c {c}"
                    );
                }
            }
        }
    }

    #[test]
    fn band_can_start_mid_frame() {
        let (width, height) = (4, 5);
        let data: Vec<u8> = (0..width * height).map(|i| (i * 13) as u8).collect();
        let view = ImageView::from_slice(&data, width, height, 1).unwrap();
        let band = BandStats::new(view, 2, 3).unwrap();
        assert_eq!(band.moments(0, 1, 3), direct(&data, width, 1, 0, 1, 3, 3, 2));
    }

    #[test]
    fn advancing_past_the_frame_fails() {
        let data = [1u8; 6];
        let view = ImageView::from_slice(&data, 3, 2, 1).unwrap();
        let mut band = BandStats::new(view, 2, 0).unwrap();
        assert!(band.advance(view).is_err());
    }

    #[test]
    fn padded_rows_are_ignored() {
        // Stride 4 with one padding byte per row.
        let data = [1u8, 2, 3, 200, 4, 5, 6, 200];
        let view = ImageView::new(&data, 3, 2, 1, 4).unwrap();
        let band = BandStats::new(view, 2, 0).unwrap();
        assert_eq!(band.moments(0, 0, 3).sum, 21);
    }
}
