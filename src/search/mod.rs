//! Exhaustive single-match search.
//!
//! The [`Matcher`] owns a compiled [`TemplatePlan`] and scores every
//! placement of the template in a frame, returning the global maximum.

use crate::image::{ImageView, Size};
#[cfg(feature = "rayon")]
use crate::kernel::rayon::ZnccRayon;
use crate::kernel::scalar::ZnccScalar;
use crate::kernel::Kernel;
use crate::template::{Template, TemplatePlan};
use crate::trace::{trace_event, trace_span};
use crate::util::ClickMatchResult;

/// Configuration for a match call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchConfig {
    /// Score rows in parallel. Ignored without the `rayon` feature.
    pub parallel: bool,
}

/// Top-left pixel of a template placement in frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    /// Column of the placement.
    pub x: usize,
    /// Row of the placement.
    pub y: usize,
}

/// Best placement found in a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchResult {
    /// Top-left corner of the best-aligned window.
    pub location: Location,
    /// Normalized correlation coefficient in `[-1, 1]`.
    pub score: f64,
}

/// Template matcher for a single template.
pub struct Matcher {
    plan: TemplatePlan,
    cfg: MatchConfig,
}

impl Matcher {
    /// Compiles a matcher for `template` with the default configuration.
    pub fn new(template: &Template) -> ClickMatchResult<Self> {
        Ok(Self {
            plan: TemplatePlan::from_view(template.view())?,
            cfg: MatchConfig::default(),
        })
    }

    /// Replaces the match configuration.
    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Returns the size of the compiled template.
    pub fn template_size(&self) -> Size {
        Size::new(self.plan.width(), self.plan.height())
    }

    /// Finds the best placement of the template in `frame`.
    ///
    /// `frame` must use the template's channel layout (BGR for templates
    /// built through [`Template`]). Fails with
    /// [`IncompatibleDimensions`](crate::ClickMatchError::IncompatibleDimensions)
    /// when the frame is smaller than the template in either dimension.
    pub fn match_frame(&self, frame: ImageView<'_>) -> ClickMatchResult<MatchResult> {
        let _span = trace_span!(
            "match_frame",
            frame_width = frame.width(),
            frame_height = frame.height(),
            parallel = self.cfg.parallel
        )
        .entered();

        let peak = self.scan(frame)?;
        trace_event!("best_match", x = peak.x, y = peak.y, score = peak.score);
        Ok(MatchResult {
            location: Location {
                x: peak.x,
                y: peak.y,
            },
            score: peak.score,
        })
    }

    #[cfg(feature = "rayon")]
    fn scan(&self, frame: ImageView<'_>) -> ClickMatchResult<crate::candidate::Peak> {
        if self.cfg.parallel {
            ZnccRayon::scan_full(frame, &self.plan)
        } else {
            ZnccScalar::scan_full(frame, &self.plan)
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn scan(&self, frame: ImageView<'_>) -> ClickMatchResult<crate::candidate::Peak> {
        ZnccScalar::scan_full(frame, &self.plan)
    }
}

#[cfg(test)]
mod tests {
    use super::{Location, Matcher};
    use crate::image::color::PixelFormat;
    use crate::image::{OwnedImage, Size};
    use crate::template::Template;
    use crate::util::ClickMatchError;

    fn swatch_frame() -> OwnedImage {
        // 4x4 white BGR frame with a 2x2 red swatch at (1, 1).
        let mut data = vec![255u8; 4 * 4 * 3];
        for y in 1..3 {
            for x in 1..3 {
                let idx = (y * 4 + x) * 3;
                data[idx..idx + 3].copy_from_slice(&[0, 0, 255]);
            }
        }
        OwnedImage::new(data, 4, 4, 3).unwrap()
    }

    #[test]
    fn solid_swatch_is_found_by_color() {
        let template = Template::new(&[255, 0, 0].repeat(4), 2, 2, PixelFormat::Rgb).unwrap();
        let matcher = Matcher::new(&template).unwrap();
        assert_eq!(matcher.template_size(), Size::new(2, 2));

        let frame = swatch_frame();
        let result = matcher.match_frame(frame.view()).unwrap();
        assert_eq!(result.location, Location { x: 1, y: 1 });
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn solid_swatch_of_another_color_scores_zero() {
        let template = Template::new(&[0, 255, 0].repeat(4), 2, 2, PixelFormat::Rgb).unwrap();
        let matcher = Matcher::new(&template).unwrap();
        let result = matcher.match_frame(swatch_frame().view()).unwrap();
        assert_eq!(result.score, 0.0);
        assert_eq!(result.location, Location { x: 0, y: 0 });
    }

    #[test]
    fn frame_smaller_than_template_is_rejected() {
        let template = Template::new(&[0u8; 3 * 3], 3, 3, PixelFormat::Gray).unwrap();
        let matcher = Matcher::new(&template).unwrap();
        let frame = OwnedImage::new(vec![0u8; 4 * 2 * 3], 4, 2, 3).unwrap();
        let err = matcher.match_frame(frame.view()).unwrap_err();
        assert_eq!(
            err,
            ClickMatchError::IncompatibleDimensions {
                frame_width: 4,
                frame_height: 2,
                template_width: 3,
                template_height: 3,
            }
        );
    }

    #[test]
    fn channel_layout_must_agree() {
        let template = Template::new(&[1, 2, 3, 4], 2, 2, PixelFormat::Gray).unwrap();
        let matcher = Matcher::new(&template).unwrap();
        let frame = OwnedImage::new(vec![0u8; 16], 4, 4, 1).unwrap();
        let err = matcher.match_frame(frame.view()).unwrap_err();
        assert_eq!(
            err,
            ClickMatchError::ChannelMismatch {
                frame: 1,
                template: 3
            }
        );
    }
}
