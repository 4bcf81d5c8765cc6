//! Chart layout for detected patterns
//!
//! Nothing here draws. [`DrawingPlan`] describes what a charting host should
//! draw for one pattern, in pivot coordinates, and [`ScaleProvider`] supplies
//! the per-instrument price step used for vertical offsets.

use serde::{Deserialize, Serialize};

use crate::harmonic::HarmonicPattern;
use crate::pivots::PivotPoint;

/// Marker half-height, in price steps
pub const MARKER_HALF_HEIGHT: f64 = 10.0;
/// Label offset above the marker, in price steps
pub const LABEL_OFFSET: f64 = 5.0;
/// Marker width: three calendar days past D
pub const MARKER_SPAN_MS: i64 = 3 * 24 * 60 * 60 * 1000;

// ============================================================
// PRICE SCALES
// ============================================================

/// Price step for an instrument
pub trait ScaleProvider {
    fn scale_for(&self, instrument: &str) -> f64;
}

impl<F> ScaleProvider for F
where
    F: Fn(&str) -> f64,
{
    fn scale_for(&self, instrument: &str) -> f64 {
        self(instrument)
    }
}

/// Futures root symbols and their price steps
const DEFAULT_SCALES: &[(&str, f64)] = &[
    ("GC", 1.0),
    ("6E", 0.0001),
    ("6B", 0.0001),
    ("6A", 0.0001),
    ("6J", 0.0001),
    ("6C", 0.0001),
    ("6S", 0.0001),
    ("NQ", 0.25),
    ("ES", 0.25),
    ("YM", 1.0),
    ("RTY", 0.1),
    ("CL", 0.01),
    ("NG", 0.001),
    ("ZB", 0.03125),
    ("ZN", 0.015625),
    ("ZF", 0.0078125),
    ("ZC", 0.25),
    ("ZS", 0.25),
    ("ZW", 0.25),
    ("HG", 0.0005),
    ("SI", 0.005),
    ("PA", 0.05),
    ("PL", 0.1),
];

/// Lookup table: exact symbol match, then the first table entry contained in
/// the instrument name, then the fallback tick size.
#[derive(Debug, Clone)]
pub struct InstrumentScales {
    table: Vec<(String, f64)>,
    fallback: f64,
}

impl Default for InstrumentScales {
    fn default() -> Self {
        Self {
            table: DEFAULT_SCALES
                .iter()
                .map(|&(symbol, scale)| (symbol.to_string(), scale))
                .collect(),
            fallback: 0.01,
        }
    }
}

impl InstrumentScales {
    /// Empty table
    pub fn new(fallback: f64) -> Self {
        Self {
            table: Vec::new(),
            fallback,
        }
    }

    pub fn with_fallback(mut self, tick_size: f64) -> Self {
        self.fallback = tick_size;
        self
    }

    /// Add or replace an entry
    pub fn insert(&mut self, symbol: impl Into<String>, scale: f64) {
        let symbol = symbol.into();
        match self.table.iter_mut().find(|(s, _)| *s == symbol) {
            Some(entry) => entry.1 = scale,
            None => self.table.push((symbol, scale)),
        }
    }
}

impl ScaleProvider for InstrumentScales {
    fn scale_for(&self, instrument: &str) -> f64 {
        if let Some((_, scale)) = self.table.iter().find(|(s, _)| s == instrument) {
            return *scale;
        }
        self.table
            .iter()
            .find(|(s, _)| instrument.contains(s.as_str()))
            .map(|(_, scale)| *scale)
            .unwrap_or(self.fallback)
    }
}

// ============================================================
// DRAWING PLAN
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    Solid,
    Dash,
}

/// A chart coordinate; hosts map `position`/`timestamp` onto their own axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub position: usize,
    pub timestamp: Option<i64>,
    pub price: f64,
}

impl From<&PivotPoint> for ChartPoint {
    fn from(p: &PivotPoint) -> Self {
        Self {
            position: p.position,
            timestamp: p.timestamp,
            price: p.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub tag: String,
    pub from: ChartPoint,
    pub to: ChartPoint,
    pub style: LineStyle,
}

/// Rectangle anchored at D and extending forward in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub tag: String,
    pub start: ChartPoint,
    /// None when D carries no timestamp
    pub end_timestamp: Option<i64>,
    pub top: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub tag: String,
    pub text: String,
    pub anchor: ChartPoint,
}

/// Everything a host needs to draw one pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingPlan {
    /// `{name}_{d_position}`, prefix of every element tag
    pub id: String,
    pub segments: Vec<Segment>,
    pub marker: Marker,
    pub label: Label,
}

impl DrawingPlan {
    /// Legs XA, AB, BC, CD solid; diagonals XB, AC, BD dashed
    pub fn for_pattern(pattern: &HarmonicPattern, scale: f64) -> Self {
        let id = format!("{}_{}", pattern.kind, pattern.d.position);
        let [x, a, b, c, d] = pattern.points();

        let legs = [
            ("XA", &x, &a, LineStyle::Solid),
            ("AB", &a, &b, LineStyle::Solid),
            ("BC", &b, &c, LineStyle::Solid),
            ("CD", &c, &d, LineStyle::Solid),
            ("XB", &x, &b, LineStyle::Dash),
            ("AC", &a, &c, LineStyle::Dash),
            ("BD", &b, &d, LineStyle::Dash),
        ];
        let segments = legs
            .iter()
            .map(|&(name, from, to, style)| Segment {
                tag: format!("{id}_{name}"),
                from: from.into(),
                to: to.into(),
                style,
            })
            .collect();

        let top = d.price + MARKER_HALF_HEIGHT * scale;
        let bottom = d.price - MARKER_HALF_HEIGHT * scale;
        let marker = Marker {
            tag: format!("{id}_Rect"),
            start: ChartPoint::from(&d),
            end_timestamp: d.timestamp.map(|t| t.saturating_add(MARKER_SPAN_MS)),
            top,
            bottom,
        };

        let label = Label {
            tag: format!("{id}_Label"),
            text: pattern.label(),
            anchor: ChartPoint {
                price: top + LABEL_OFFSET * scale,
                ..ChartPoint::from(&d)
            },
        };

        Self {
            id,
            segments,
            marker,
            label,
        }
    }

    pub fn for_instrument<S: ScaleProvider + ?Sized>(
        pattern: &HarmonicPattern,
        scales: &S,
        instrument: &str,
    ) -> Self {
        Self::for_pattern(pattern, scales.scale_for(instrument))
    }
}
