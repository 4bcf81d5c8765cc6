//! Harmonic XABCD pattern recognition
//!
//! - [`ratios`]: Fibonacci ratio templates and the classifier
//! - [`search`]: bounded backward search for XABCD quintuples
//! - [`registry`]: deduplicated pattern retention and notification
//!
//! Bullish patterns close at a pivot-low (X, B, D are lows; A, C are highs).
//! Bearish patterns are the mirror image.

pub mod ratios;
pub mod registry;
pub mod search;

pub use ratios::*;
pub use registry::*;
pub use search::*;

use serde::{Deserialize, Serialize};

use crate::{pivots::PivotPoint, Direction};

/// Identity used for deduplication: one pattern per (D, name, direction)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternKey {
    pub d_position: usize,
    pub kind: HarmonicKind,
    pub direction: Direction,
}

/// A classified five-point structure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarmonicPattern {
    pub x: PivotPoint,
    pub a: PivotPoint,
    pub b: PivotPoint,
    pub c: PivotPoint,
    pub d: PivotPoint,
    pub kind: HarmonicKind,
    pub direction: Direction,
    pub ratios: XabcdRatios,
    /// Flips to true once, when observers have been handed the pattern
    pub notified: bool,
}

impl HarmonicPattern {
    pub fn new(
        [x, a, b, c, d]: [PivotPoint; 5],
        kind: HarmonicKind,
        direction: Direction,
        ratios: XabcdRatios,
    ) -> Self {
        debug_assert!(
            x.position < a.position
                && a.position < b.position
                && b.position < c.position
                && c.position < d.position
        );
        Self {
            x,
            a,
            b,
            c,
            d,
            kind,
            direction,
            ratios,
            notified: false,
        }
    }

    #[inline]
    pub fn key(&self) -> PatternKey {
        PatternKey {
            d_position: self.d.position,
            kind: self.kind,
            direction: self.direction,
        }
    }

    /// Points in X, A, B, C, D order
    #[inline]
    pub fn points(&self) -> [PivotPoint; 5] {
        [self.x, self.a, self.b, self.c, self.d]
    }

    #[inline]
    pub fn start_position(&self) -> usize {
        self.x.position
    }

    #[inline]
    pub fn end_position(&self) -> usize {
        self.d.position
    }

    /// e.g. "Bullish Gartley"
    pub fn label(&self) -> String {
        format!("{} {}", self.direction, self.kind)
    }

    /// e.g. "Bullish Gartley pattern detected at 124.92"
    pub fn alert_message(&self) -> String {
        format!(
            "{} {} pattern detected at {:.2}",
            self.direction, self.kind, self.d.price
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivots::PivotKind;

    fn bullish_gartley() -> HarmonicPattern {
        let p = |price, position, kind| PivotPoint::new(price, position, None, kind);
        HarmonicPattern::new(
            [
                p(100.0, 4, PivotKind::Low),
                p(200.0, 8, PivotKind::High),
                p(134.0, 12, PivotKind::Low),
                p(162.38, 16, PivotKind::High),
                p(124.9184, 20, PivotKind::Low),
            ],
            HarmonicKind::Gartley,
            Direction::Bullish,
            XabcdRatios::from_prices(100.0, 200.0, 134.0, 162.38, 124.9184).unwrap(),
        )
    }

    #[test]
    fn test_alert_message_format() {
        let pattern = bullish_gartley();
        assert_eq!(
            pattern.alert_message(),
            "Bullish Gartley pattern detected at 124.92"
        );
        assert_eq!(pattern.label(), "Bullish Gartley");
    }

    #[test]
    fn test_key_and_span() {
        let pattern = bullish_gartley();
        let key = pattern.key();
        assert_eq!(key.d_position, 20);
        assert_eq!(key.kind, HarmonicKind::Gartley);
        assert_eq!(key.direction, Direction::Bullish);
        assert_eq!(pattern.start_position(), 4);
        assert_eq!(pattern.end_position(), 20);
        assert!(!pattern.notified);
        assert_eq!(pattern.points()[2].price, 134.0);
    }
}
