//! Bounded backward search for XABCD quintuples
//!
//! Starting from a freshly confirmed D, the search walks the pivot store
//! backwards: C among the pivots of the opposite kind before D, B among the
//! pivots of D's kind before C, A like C, X like B. Each level considers
//! at most `breadth` candidates, most recent first, so one D costs at most
//! `breadth^4` classifications. The first quintuple that classifies wins.

use std::collections::VecDeque;

use log::trace;

use super::{HarmonicPattern, RatioClassifier, XabcdRatios};
use crate::{
    pivots::{PivotPoint, PivotStore},
    Direction, Period,
};

/// Candidates considered per level unless configured otherwise
pub const DEFAULT_SEARCH_BREADTH: usize = 5;

/// Upper bound for the breadth tunable (16^4 = 65536 evaluations per D)
pub const MAX_SEARCH_BREADTH: usize = 16;

#[derive(Debug, Clone)]
pub struct CandidateSearch {
    breadth: usize,
    classifier: RatioClassifier,
}

impl Default for CandidateSearch {
    fn default() -> Self {
        Self::new(
            Period::new_const(DEFAULT_SEARCH_BREADTH),
            RatioClassifier::default(),
        )
    }
}

impl CandidateSearch {
    pub fn new(breadth: Period, classifier: RatioClassifier) -> Self {
        Self {
            breadth: breadth.get(),
            classifier,
        }
    }

    #[inline]
    pub fn breadth(&self) -> usize {
        self.breadth
    }

    #[inline]
    pub fn classifier(&self) -> &RatioClassifier {
        &self.classifier
    }

    /// Worst-case number of quintuples classified for one D
    #[inline]
    pub fn max_evaluations(&self) -> usize {
        self.breadth.pow(4)
    }

    /// First classifying quintuple ending at `d`, if any.
    ///
    /// A pivot-low D searches for a bullish pattern, a pivot-high D for a
    /// bearish one. The returned pattern is not yet registered.
    pub fn find_pattern(&self, store: &PivotStore, d: &PivotPoint) -> Option<HarmonicPattern> {
        self.search(store, d).0
    }

    /// Same as [`find_pattern`](Self::find_pattern), also reporting how many
    /// quintuples were classified.
    pub(crate) fn search(
        &self,
        store: &PivotStore,
        d: &PivotPoint,
    ) -> (Option<HarmonicPattern>, usize) {
        let direction = Direction::closing_at(d.kind);
        // C and A alternate against D; B and X share D's kind
        let swing = store.of_kind(d.kind.opposite());
        let base = store.of_kind(d.kind);
        let n = self.breadth;
        let mut evaluated = 0;

        for c in recent_before(swing, d.position, n) {
            for b in recent_before(base, c.position, n) {
                for a in recent_before(swing, b.position, n) {
                    for x in recent_before(base, a.position, n) {
                        evaluated += 1;
                        let ratios = match XabcdRatios::from_pivots(x, a, b, c, d) {
                            Ok(r) => r,
                            Err(e) => {
                                trace!(
                                    "skipping candidate X={} A={} for D={}: {e}",
                                    x.position,
                                    a.position,
                                    d.position
                                );
                                continue;
                            }
                        };
                        if let Some(kind) = self.classifier.classify_ratios(&ratios) {
                            let pattern =
                                HarmonicPattern::new([*x, *a, *b, *c, *d], kind, direction, ratios);
                            return (Some(pattern), evaluated);
                        }
                    }
                }
            }
        }

        (None, evaluated)
    }
}

/// Up to `take` pivots strictly before `position`, most recent first.
/// Relies on the store keeping each sequence in position order.
fn recent_before(
    seq: &VecDeque<PivotPoint>,
    position: usize,
    take: usize,
) -> impl Iterator<Item = &PivotPoint> + '_ {
    seq.iter()
        .rev()
        .skip_while(move |p| p.position >= position)
        .take(take)
}

// ============================================================
// TESTS
// ============================================================
