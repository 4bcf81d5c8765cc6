//! # YAHPD - Yet Another Harmonic Pattern Detector
//!
//! Pivot detection and five-point harmonic pattern recognition (Gartley, Bat,
//! Crab, Butterfly) over a stream of price bars.
//!
//! ## Quick Start
//!
//! ```rust
//! use yahpd::prelude::*;
//!
//! // Any bar type implementing PriceBar works; Bar is provided
//! let bars: Vec<Bar> = vec![
//!     Bar::new(100.0, 101.0, 99.0, 100.5),
//!     Bar::new(100.5, 102.0, 100.0, 101.5),
//! ];
//!
//! let mut engine = EngineBuilder::new()
//!     .strength(5)
//!     .observer(AlertLogger::default())
//!     .build()
//!     .unwrap();
//!
//! for bar in &bars {
//!     let events = engine.observe(bar).unwrap();
//!     for pattern in &events.patterns {
//!         println!("{}", pattern.alert_message());
//!     }
//! }
//! ```
//!
//! ## Pipeline
//!
//! Each bar runs one synchronous pass:
//! [`ExtremumDetector`](pivots::ExtremumDetector) →
//! [`PivotStore`](pivots::PivotStore) →
//! [`CandidateSearch`](harmonic::CandidateSearch) →
//! [`RatioClassifier`](harmonic::RatioClassifier) →
//! [`PatternRegistry`](harmonic::PatternRegistry) →
//! [`PatternObserver`](observers::PatternObserver)s.

use std::collections::HashMap;

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

pub mod harmonic;
pub mod observers;
pub mod params;
pub mod pivots;
pub mod render;

pub mod prelude {
    pub use crate::{
        // Harmonic recognition
        harmonic::{
            CandidateSearch, HarmonicKind, HarmonicPattern, PatternKey, PatternRegistry,
            RatioClassifier, RatioTarget, RatioTemplate, XabcdRatios,
        },
        // Observers
        observers::{AlertLogger, EventLog, PatternObserver},
        // Parameters
        params::{get_flag, get_period, ParamMeta, ParamType, Parameterized},
        // Pivots
        pivots::{ExtremumDetector, PivotEvents, PivotKind, PivotPoint, PivotStore},
        // Chart layout
        render::{DrawingPlan, InstrumentScales, ScaleProvider},
        // Parallel
        scan_parallel,
        // Types
        Bar,
        BarEvents,
        BarEventsIter,
        Direction,
        // Engine
        EngineBuilder,
        EngineConfig,
        EngineEvent,
        HarmonicEngine,
        // Errors
        HarmonicError,
        Period,
        PriceBar,
        PriceBarExt,
        Result,
        ScanError,
        ScanResult,
    };
}

use harmonic::{
    CandidateSearch, HarmonicKind, HarmonicPattern, PatternRegistry, RatioClassifier,
    DEFAULT_SEARCH_BREADTH, MAX_SEARCH_BREADTH,
};
use observers::PatternObserver;
use params::{get_flag, get_period, ParamMeta, Parameterized};
use pivots::{
    ExtremumDetector, PivotEvents, PivotKind, PivotPoint, PivotStore, DEFAULT_PIVOT_CAPACITY,
};

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, HarmonicError>;

/// Errors that can occur during pivot and pattern detection
#[derive(Debug, Clone, thiserror::Error)]
pub enum HarmonicError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Bars delivered out of order; the engine halts until rewound
    #[error("Invalid sequence at position {position}: {reason}")]
    InvalidSequence {
        position: usize,
        reason: &'static str,
    },

    /// A ratio denominator is zero; handled inside the candidate search
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),

    #[error("Invalid OHLC at index {index}: {reason}")]
    InvalidOHLC { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(HarmonicError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// BAR TRAITS
// ============================================================

/// Core price bar trait
pub trait PriceBar {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;

    /// Unix milliseconds
    fn timestamp(&self) -> Option<i64> {
        None
    }

    /// Index in the source bar sequence. When absent the engine numbers bars
    /// consecutively from the previous one.
    fn position(&self) -> Option<usize> {
        None
    }
}

/// Extension trait with computed properties for price bars
pub trait PriceBarExt: PriceBar {
    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    /// Validate OHLC data consistency
    fn validate(&self) -> Result<()> {
        let prices = [self.open(), self.high(), self.low(), self.close()];
        if prices.iter().any(|p| p.is_nan()) {
            return Err(HarmonicError::InvalidOHLC {
                index: 0,
                reason: "NaN in OHLC",
            });
        }
        if prices.iter().any(|p| p.is_infinite()) {
            return Err(HarmonicError::InvalidOHLC {
                index: 0,
                reason: "Infinite value in OHLC",
            });
        }
        if self.range() < 0.0 {
            return Err(HarmonicError::InvalidOHLC {
                index: 0,
                reason: "high < low",
            });
        }
        Ok(())
    }
}

impl<T: PriceBar> PriceBarExt for T {}

/// Plain owned bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub position: Option<usize>,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            timestamp: None,
            position: None,
        }
    }

    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

impl PriceBar for Bar {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    fn position(&self) -> Option<usize> {
        self.position
    }
}

// ============================================================
// DIRECTION & EVENTS
// ============================================================

/// Direction of the reversal a pattern anticipates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }

    /// Bullish patterns close at a pivot-low, bearish at a pivot-high
    #[inline]
    pub fn closing_at(kind: PivotKind) -> Self {
        match kind {
            PivotKind::Low => Direction::Bullish,
            PivotKind::High => Direction::Bearish,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Bullish => "Bullish",
            Direction::Bearish => "Bearish",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What the engine reports to observers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    PivotConfirmed(PivotPoint),
    PatternDetected(HarmonicPattern),
}

impl EngineEvent {
    /// Pivot position, or D position for patterns
    pub fn position(&self) -> usize {
        match self {
            EngineEvent::PivotConfirmed(p) => p.position,
            EngineEvent::PatternDetected(p) => p.d.position,
        }
    }
}

/// Everything produced by one bar
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarEvents {
    /// Position assigned to the observed bar
    pub position: usize,
    pub pivots: PivotEvents,
    pub patterns: Vec<HarmonicPattern>,
}

impl BarEvents {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pivots.is_empty() && self.patterns.is_empty()
    }

    /// Events in emission order: pivots (high, low), then patterns
    pub fn events(&self) -> Vec<EngineEvent> {
        self.pivots
            .iter()
            .map(|p| EngineEvent::PivotConfirmed(*p))
            .chain(self.patterns.iter().map(|p| EngineEvent::PatternDetected(*p)))
            .collect()
    }
}

// ============================================================
// CONFIGURATION
// ============================================================

/// Default pivot strength (bars on each side of a pivot)
pub const DEFAULT_STRENGTH: usize = 5;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bars required on each side of a pivot
    pub strength: Period,
    pub detect_bullish: bool,
    pub detect_bearish: bool,
    /// Candidates per search level; worst case `search_breadth^4` per D
    pub search_breadth: Period,
    /// Pivots retained per side
    pub pivot_capacity: Period,
    /// Reject NaN/infinite/inverted bars up front in [`HarmonicEngine::scan`]
    pub validate_data: bool,
    /// Restrict classification to these templates
    pub pattern_filter: Option<Vec<HarmonicKind>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strength: Period::new_const(DEFAULT_STRENGTH),
            detect_bullish: true,
            detect_bearish: true,
            search_breadth: Period::new_const(DEFAULT_SEARCH_BREADTH),
            pivot_capacity: Period::new_const(DEFAULT_PIVOT_CAPACITY),
            validate_data: false,
            pattern_filter: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, period) in [
            ("strength", self.strength),
            ("search_breadth", self.search_breadth),
            ("pivot_capacity", self.pivot_capacity),
        ] {
            if period.get() == 0 {
                return Err(HarmonicError::InvalidConfig(format!("{name} must be > 0")));
            }
        }
        if self.search_breadth.get() > MAX_SEARCH_BREADTH {
            return Err(HarmonicError::InvalidConfig(format!(
                "search_breadth {} exceeds maximum {MAX_SEARCH_BREADTH}",
                self.search_breadth.get()
            )));
        }
        if let Some(filter) = &self.pattern_filter {
            if filter.is_empty() {
                return Err(HarmonicError::InvalidConfig(
                    "pattern_filter must name at least one pattern".into(),
                ));
            }
        }
        Ok(())
    }

    fn classifier(&self) -> RatioClassifier {
        match &self.pattern_filter {
            Some(kinds) => RatioClassifier::with_kinds(kinds),
            None => RatioClassifier::default(),
        }
    }
}

const ENGINE_PARAMS: &[ParamMeta] = &[
    ParamMeta::period(
        "strength",
        DEFAULT_STRENGTH as f64,
        (1.0, 20.0, 1.0),
        "Bars required on each side of a pivot",
    ),
    ParamMeta::period(
        "search_breadth",
        DEFAULT_SEARCH_BREADTH as f64,
        (1.0, MAX_SEARCH_BREADTH as f64, 1.0),
        "Candidates considered per XABCD search level",
    ),
    ParamMeta::period(
        "pivot_capacity",
        DEFAULT_PIVOT_CAPACITY as f64,
        (5.0, 100.0, 5.0),
        "Pivots retained per side",
    ),
    ParamMeta::flag("detect_bullish", true, "Search for bullish patterns at pivot-lows"),
    ParamMeta::flag("detect_bearish", true, "Search for bearish patterns at pivot-highs"),
];

impl Parameterized for EngineConfig {
    fn param_meta() -> &'static [ParamMeta] {
        ENGINE_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        for meta in Self::param_meta() {
            if let Some(&value) = params.get(meta.name) {
                meta.validate(value)?;
            }
        }
        let config = Self {
            strength: get_period(params, "strength", DEFAULT_STRENGTH)?,
            search_breadth: get_period(params, "search_breadth", DEFAULT_SEARCH_BREADTH)?,
            pivot_capacity: get_period(params, "pivot_capacity", DEFAULT_PIVOT_CAPACITY)?,
            detect_bullish: get_flag(params, "detect_bullish", true),
            detect_bearish: get_flag(params, "detect_bearish", true),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }
}

// ============================================================
// HARMONIC ENGINE
// ============================================================

/// Stateful pattern engine for one instrument on one timeframe
pub struct HarmonicEngine {
    config: EngineConfig,
    detector: ExtremumDetector,
    store: PivotStore,
    search: CandidateSearch,
    registry: PatternRegistry,
    observers: Vec<Box<dyn PatternObserver>>,
    last_position: Option<usize>,
    last_timestamp: Option<i64>,
    fault: Option<HarmonicError>,
}

impl HarmonicEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, Vec::new()))
    }

    fn from_parts(config: EngineConfig, observers: Vec<Box<dyn PatternObserver>>) -> Self {
        Self {
            detector: ExtremumDetector::new(config.strength),
            store: PivotStore::with_capacity(config.pivot_capacity),
            search: CandidateSearch::new(config.search_breadth, config.classifier()),
            registry: PatternRegistry::new(),
            observers,
            last_position: None,
            last_timestamp: None,
            fault: None,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn pivots(&self) -> &PivotStore {
        &self.store
    }

    #[inline]
    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// All patterns registered so far, in detection order
    #[inline]
    pub fn patterns(&self) -> &[HarmonicPattern] {
        self.registry.patterns()
    }

    /// True after a sequence fault, until [`rewind`](Self::rewind) or [`reset`](Self::reset)
    #[inline]
    pub fn is_halted(&self) -> bool {
        self.fault.is_some()
    }

    pub fn add_observer<O: PatternObserver + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    // ===========================================
    // STREAMING
    // ===========================================

    /// Process the next closed bar.
    ///
    /// Fails only on ordering violations. Malformed prices simply produce no
    /// pivot.
    pub fn observe<T: PriceBar>(&mut self, bar: &T) -> Result<BarEvents> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        let position = match self.check_sequence(bar) {
            Ok(position) => position,
            Err(e) => {
                warn!("halting harmonic engine: {e}");
                self.fault = Some(e.clone());
                return Err(e);
            }
        };

        let pivots = self.detector.observe(bar);
        let mut events = BarEvents {
            position,
            pivots,
            patterns: Vec::new(),
        };
        if pivots.is_empty() {
            return Ok(events);
        }

        for pivot in pivots.iter() {
            debug!(
                "pivot {:?} confirmed at position {} price {}",
                pivot.kind, pivot.position, pivot.price
            );
            self.store.add(*pivot);
            self.emit(&EngineEvent::PivotConfirmed(*pivot));
        }

        if self.config.detect_bullish {
            if let Some(d) = pivots.low {
                events.patterns.extend(self.detect_at(&d));
            }
        }
        if self.config.detect_bearish {
            if let Some(d) = pivots.high {
                events.patterns.extend(self.detect_at(&d));
            }
        }

        Ok(events)
    }

    /// Search, register and announce a pattern closing at `d`
    fn detect_at(&mut self, d: &PivotPoint) -> Option<HarmonicPattern> {
        // At most one pattern per D point
        if self.registry.contains_d_position(d.position) {
            return None;
        }

        let (found, evaluated) = self.search.search(&self.store, d);
        trace!("classified {evaluated} quintuples for D at {}", d.position);

        let pattern = found?;
        let key = pattern.key();
        if !self.registry.register(pattern) {
            return None;
        }
        info!(
            "{} registered: X={} A={} B={} C={} D={}",
            pattern.label(),
            pattern.x.position,
            pattern.a.position,
            pattern.b.position,
            pattern.c.position,
            pattern.d.position
        );

        let observers = &mut self.observers;
        self.registry.notify(&key, |p| {
            let event = EngineEvent::PatternDetected(*p);
            for observer in observers.iter_mut() {
                observer.on_event(&event);
            }
        });
        self.registry.get(&key).copied()
    }

    fn emit(&mut self, event: &EngineEvent) {
        for observer in self.observers.iter_mut() {
            observer.on_event(event);
        }
    }

    /// Resolve the bar's position and reject anything but the next bar
    fn check_sequence<T: PriceBar>(&mut self, bar: &T) -> Result<usize> {
        let expected = match self.last_position {
            Some(last) => match last.checked_add(1) {
                Some(next) => Some(next),
                None => {
                    return Err(HarmonicError::InvalidSequence {
                        position: last,
                        reason: "no position after the previous bar",
                    });
                }
            },
            None => None,
        };
        let position = match (bar.position(), expected) {
            (Some(got), Some(expected)) if got < expected => {
                return Err(HarmonicError::InvalidSequence {
                    position: got,
                    reason: "position precedes the previous bar",
                });
            }
            (Some(got), Some(expected)) if got > expected => {
                return Err(HarmonicError::InvalidSequence {
                    position: got,
                    reason: "gap in bar positions",
                });
            }
            (Some(got), _) => got,
            (None, Some(expected)) => expected,
            (None, None) => 0,
        };

        if let (Some(ts), Some(last)) = (bar.timestamp(), self.last_timestamp) {
            if ts <= last {
                return Err(HarmonicError::InvalidSequence {
                    position,
                    reason: "timestamp not after the previous bar",
                });
            }
        }

        self.last_position = Some(position);
        self.last_timestamp = bar.timestamp().or(self.last_timestamp);
        Ok(position)
    }

    /// Forget the bar stream but keep registered patterns, so replayed
    /// history never announces a pattern twice.
    pub fn rewind(&mut self) {
        self.detector.reset();
        self.store.clear();
        self.last_position = None;
        self.last_timestamp = None;
        self.fault = None;
    }

    /// Forget everything, including registered patterns
    pub fn reset(&mut self) {
        self.rewind();
        self.registry.clear();
    }

    // ===========================================
    // BATCH
    // ===========================================

    /// Feed every bar and return the newly registered patterns.
    pub fn scan<T: PriceBar>(&mut self, bars: &[T]) -> Result<Vec<HarmonicPattern>> {
        if self.config.validate_data {
            validate_bars(bars)?;
        }

        let mut found = Vec::new();
        for bar in bars {
            found.extend(self.observe(bar)?.patterns);
        }
        Ok(found)
    }

    /// Iterate bars with their per-bar events.
    pub fn iter<'a, T: PriceBar>(&'a mut self, bars: &'a [T]) -> BarEventsIter<'a, T> {
        BarEventsIter {
            engine: self,
            bars: bars.iter(),
        }
    }
}

fn validate_bars<T: PriceBar>(bars: &[T]) -> Result<()> {
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            HarmonicError::InvalidOHLC { reason, .. } => {
                HarmonicError::InvalidOHLC { index: i, reason }
            }
            other => other,
        })?;
    }
    Ok(())
}

// ============================================================
// BAR EVENTS ITERATOR
// ============================================================

/// Iterator feeding bars into an engine one at a time
pub struct BarEventsIter<'a, T: PriceBar> {
    engine: &'a mut HarmonicEngine,
    bars: std::slice::Iter<'a, T>,
}

impl<'a, T: PriceBar> Iterator for BarEventsIter<'a, T> {
    type Item = Result<BarEvents>;

    fn next(&mut self) -> Option<Self::Item> {
        let bar = self.bars.next()?;
        Some(self.engine.observe(bar))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.bars.size_hint()
    }
}

impl<'a, T: PriceBar> ExactSizeIterator for BarEventsIter<'a, T> {}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating HarmonicEngine instances
pub struct EngineBuilder {
    config: EngineConfig,
    observers: Vec<Box<dyn PatternObserver>>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            observers: Vec::new(),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Bars on each side of a pivot (validated in `build`)
    pub fn strength(mut self, strength: usize) -> Self {
        self.config.strength = Period::new_const(strength);
        self
    }

    pub fn detect_bullish(mut self, enable: bool) -> Self {
        self.config.detect_bullish = enable;
        self
    }

    pub fn detect_bearish(mut self, enable: bool) -> Self {
        self.config.detect_bearish = enable;
        self
    }

    /// Candidates per search level (validated in `build`)
    pub fn search_breadth(mut self, breadth: usize) -> Self {
        self.config.search_breadth = Period::new_const(breadth);
        self
    }

    /// Pivots retained per side (validated in `build`)
    pub fn pivot_capacity(mut self, capacity: usize) -> Self {
        self.config.pivot_capacity = Period::new_const(capacity);
        self
    }

    /// Enable/disable data validation in `scan`
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Classify against these templates only
    pub fn only_patterns(mut self, kinds: impl IntoIterator<Item = HarmonicKind>) -> Self {
        self.config.pattern_filter = Some(kinds.into_iter().collect());
        self
    }

    pub fn observer<O: PatternObserver + 'static>(mut self, observer: O) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<HarmonicEngine> {
        self.config.validate()?;
        Ok(HarmonicEngine::from_parts(self.config, self.observers))
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of scanning a single instrument
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub patterns: Vec<HarmonicPattern>,
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: HarmonicError,
}

/// Scan several instruments in parallel, one fresh engine per instrument
pub fn scan_parallel<'a, T, I>(
    config: &EngineConfig,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: PriceBar + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            HarmonicEngine::new(config.clone())
                .and_then(|mut engine| engine.scan(bars))
                .map(|patterns| ScanResult {
                    symbol: symbol.to_string(),
                    patterns,
                })
                .map_err(|error| ScanError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
