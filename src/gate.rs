//! Threshold decision on the best match.

use crate::image::Size;
use crate::resolve::{resolve, Target};
use crate::search::MatchResult;
use crate::util::{ClickMatchError, ClickMatchResult};
use std::fmt;

/// Minimum accepted score, validated to lie in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    /// Threshold used when none is configured.
    pub const DEFAULT: Threshold = Threshold(0.8);

    /// Creates a threshold, rejecting NaN and values outside `[0, 1]`.
    pub fn new(value: f64) -> ClickMatchResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ClickMatchError::InvalidThreshold(value));
        }
        Ok(Self(value))
    }

    /// Returns the raw value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

/// Result of gating a match.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decision {
    /// The score cleared the threshold; click here.
    Accepted(Target),
    /// The score fell short. This is a normal outcome, not an error.
    Rejected { score: f64, threshold: Threshold },
}

impl Decision {
    /// Returns true for [`Decision::Accepted`].
    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accepted(_))
    }
}

/// Accept/reject policy for best matches.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DecisionGate {
    threshold: Threshold,
}

impl DecisionGate {
    /// Creates a gate with a fixed threshold.
    pub fn new(threshold: Threshold) -> Self {
        Self { threshold }
    }

    /// Returns the configured threshold.
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Accepts `result` iff `score >= threshold` and resolves the center of
    /// the matched `template_size` region.
    pub fn accept(&self, result: &MatchResult, template_size: Size) -> Decision {
        if result.score >= self.threshold.value() {
            Decision::Accepted(resolve(result.location, template_size))
        } else {
            Decision::Rejected {
                score: result.score,
                threshold: self.threshold,
            }
        }
    }
}
