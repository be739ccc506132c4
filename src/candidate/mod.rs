//! Best-peak tracking over a raster scan.

/// Scored placement of the template's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the placement.
    pub x: usize,
    /// Y coordinate (row) of the placement.
    pub y: usize,
    /// Correlation score at the placement.
    pub score: f64,
}

/// Keeps the highest-scoring peak seen so far.
///
/// Only a strictly greater score replaces the current best, so when peaks
/// are pushed in raster order the first maximal placement wins ties.
#[derive(Debug, Default)]
pub(crate) struct BestPeak {
    best: Option<Peak>,
}

impl BestPeak {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, peak: Peak) {
        match self.best {
            Some(best) if peak.score <= best.score => {}
            _ => self.best = Some(peak),
        }
    }

    pub(crate) fn into_peak(self) -> Option<Peak> {
        self.best
    }
}

#[cfg(test)]
mod tests {
    use super::{BestPeak, Peak};

    #[test]
    fn first_of_equal_scores_is_kept() {
        let mut best = BestPeak::new();
        best.push(Peak { x: 0, y: 0, score: 0.2 });
        best.push(Peak { x: 3, y: 0, score: 0.9 });
        best.push(Peak { x: 1, y: 1, score: 0.9 });
        best.push(Peak { x: 2, y: 1, score: -0.5 });
        assert_eq!(best.into_peak(), Some(Peak { x: 3, y: 0, score: 0.9 }));
    }

    #[test]
    fn empty_tracker_has_no_peak() {
        assert_eq!(BestPeak::new().into_peak(), None);
    }
}
