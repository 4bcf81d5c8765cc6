//! Pivot point detection and bounded pivot retention
//!
//! A pivot is a bar whose high (or low) is strictly beyond every bar within
//! `strength` positions on either side. Confirmation therefore always lags
//! the newest observed bar by `strength` positions.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{Period, PriceBar, PriceBarExt};

/// Default number of pivots retained per side
pub const DEFAULT_PIVOT_CAPACITY: usize = 20;

// ============================================================
// PIVOT POINT
// ============================================================

/// Which extreme a pivot marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PivotKind {
    High,
    Low,
}

impl PivotKind {
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            PivotKind::High => PivotKind::Low,
            PivotKind::Low => PivotKind::High,
        }
    }
}

/// A confirmed local price extreme
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotPoint {
    pub price: f64,
    /// Index of the pivot bar in the source bar sequence
    pub position: usize,
    /// Unix milliseconds, when the source bar carried a timestamp
    pub timestamp: Option<i64>,
    pub kind: PivotKind,
}

impl PivotPoint {
    pub fn new(price: f64, position: usize, timestamp: Option<i64>, kind: PivotKind) -> Self {
        Self {
            price,
            position,
            timestamp,
            kind,
        }
    }

    #[inline]
    pub fn is_high(&self) -> bool {
        matches!(self.kind, PivotKind::High)
    }

    #[inline]
    pub fn is_low(&self) -> bool {
        matches!(self.kind, PivotKind::Low)
    }
}

/// Pivots confirmed by a single call to [`ExtremumDetector::observe`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PivotEvents {
    pub high: Option<PivotPoint>,
    pub low: Option<PivotPoint>,
}

impl PivotEvents {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.high.is_none() && self.low.is_none()
    }

    /// High first, then low
    pub fn iter(&self) -> impl Iterator<Item = &PivotPoint> {
        self.high.iter().chain(self.low.iter())
    }
}

// ============================================================
// EXTREMUM DETECTOR
// ============================================================

#[derive(Debug, Clone, Copy)]
struct WindowBar {
    high: f64,
    low: f64,
    timestamp: Option<i64>,
    position: usize,
    /// Finite, non-negative, consistent OHLC; only valid bars can be pivots
    valid: bool,
}

/// Sliding-window pivot detector over a single timeframe
#[derive(Debug, Clone)]
pub struct ExtremumDetector {
    strength: Period,
    window: VecDeque<WindowBar>,
    next_position: usize,
}

impl ExtremumDetector {
    pub fn new(strength: Period) -> Self {
        Self {
            strength,
            window: VecDeque::with_capacity(strength.get() * 2 + 1),
            next_position: 0,
        }
    }

    #[inline]
    pub fn strength(&self) -> usize {
        self.strength.get()
    }

    /// True once `2 * strength` prior bars have been seen
    #[inline]
    pub fn is_warm(&self) -> bool {
        self.window.len() == self.window_size()
    }

    #[inline]
    fn window_size(&self) -> usize {
        self.strength.get() * 2 + 1
    }

    /// Feed the next closed bar.
    ///
    /// The bar's own position is used when it has one, otherwise positions
    /// continue from the previous bar. Ordering is the caller's contract; the
    /// engine enforces it before calling here.
    pub fn observe<T: PriceBar>(&mut self, bar: &T) -> PivotEvents {
        let position = bar.position().unwrap_or(self.next_position);
        self.next_position = position.saturating_add(1);

        self.window.push_back(WindowBar {
            high: bar.high(),
            low: bar.low(),
            timestamp: bar.timestamp(),
            position,
            valid: is_sound(bar),
        });
        if self.window.len() > self.window_size() {
            self.window.pop_front();
        }
        if !self.is_warm() {
            return PivotEvents::default();
        }

        let n = self.strength.get();
        let center = self.window[n];
        if !center.valid {
            return PivotEvents::default();
        }

        // Strict comparisons: ties and NaN both fail
        let is_high = self
            .window
            .iter()
            .enumerate()
            .all(|(i, w)| i == n || center.high > w.high);
        let is_low = self
            .window
            .iter()
            .enumerate()
            .all(|(i, w)| i == n || center.low < w.low);

        PivotEvents {
            high: is_high.then(|| {
                PivotPoint::new(center.high, center.position, center.timestamp, PivotKind::High)
            }),
            low: is_low.then(|| {
                PivotPoint::new(center.low, center.position, center.timestamp, PivotKind::Low)
            }),
        }
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.next_position = 0;
    }
}

#[inline]
fn is_sound<T: PriceBar>(bar: &T) -> bool {
    bar.validate().is_ok()
        && [bar.open(), bar.high(), bar.low(), bar.close()]
            .iter()
            .all(|p| *p >= 0.0)
}

// ============================================================
// PIVOT STORE
// ============================================================

/// Two bounded, position-ordered pivot sequences.
///
/// Eviction is FIFO by arrival and never looks at price.
#[derive(Debug, Clone)]
pub struct PivotStore {
    highs: VecDeque<PivotPoint>,
    lows: VecDeque<PivotPoint>,
    capacity: usize,
}

impl Default for PivotStore {
    fn default() -> Self {
        Self::with_capacity(Period::new_const(DEFAULT_PIVOT_CAPACITY))
    }
}

impl PivotStore {
    pub fn with_capacity(capacity: Period) -> Self {
        let capacity = capacity.get();
        Self {
            highs: VecDeque::with_capacity(capacity + 1),
            lows: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a pivot-high, returning the evicted entry if over capacity
    pub fn add_high(&mut self, pivot: PivotPoint) -> Option<PivotPoint> {
        debug_assert!(pivot.is_high());
        Self::push(&mut self.highs, pivot, self.capacity)
    }

    /// Append a pivot-low, returning the evicted entry if over capacity
    pub fn add_low(&mut self, pivot: PivotPoint) -> Option<PivotPoint> {
        debug_assert!(pivot.is_low());
        Self::push(&mut self.lows, pivot, self.capacity)
    }

    /// Append to the sequence matching the pivot's kind
    pub fn add(&mut self, pivot: PivotPoint) -> Option<PivotPoint> {
        match pivot.kind {
            PivotKind::High => self.add_high(pivot),
            PivotKind::Low => self.add_low(pivot),
        }
    }

    fn push(
        seq: &mut VecDeque<PivotPoint>,
        pivot: PivotPoint,
        capacity: usize,
    ) -> Option<PivotPoint> {
        seq.push_back(pivot);
        if seq.len() > capacity {
            seq.pop_front()
        } else {
            None
        }
    }

    #[inline]
    pub fn highs(&self) -> &VecDeque<PivotPoint> {
        &self.highs
    }

    #[inline]
    pub fn lows(&self) -> &VecDeque<PivotPoint> {
        &self.lows
    }

    #[inline]
    pub fn of_kind(&self, kind: PivotKind) -> &VecDeque<PivotPoint> {
        match kind {
            PivotKind::High => &self.highs,
            PivotKind::Low => &self.lows,
        }
    }

    #[inline]
    pub fn len_highs(&self) -> usize {
        self.highs.len()
    }

    #[inline]
    pub fn len_lows(&self) -> usize {
        self.lows.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.highs.clear();
        self.lows.clear();
    }
}

// ============================================================
// TESTS
// ============================================================
