//! Integration tests for YAHPD harmonic pattern detection.
//!
//! These tests drive the public engine API with synthetic zigzag series whose
//! turning points are placed exactly on known XABCD geometries.

use yahpd::prelude::*;
use yahpd::render::LineStyle;

const HOUR_MS: i64 = 3_600_000;
const START_MS: i64 = 1_700_000_000_000;

/// Host-side bar type carrying timestamps but no positions
#[derive(Debug, Clone, Copy)]
struct TestBar {
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    ts: i64,
}

impl PriceBar for TestBar {
    fn open(&self) -> f64 {
        self.o
    }

    fn high(&self) -> f64 {
        self.h
    }

    fn low(&self) -> f64 {
        self.l
    }

    fn close(&self) -> f64 {
        self.c
    }

    fn timestamp(&self) -> Option<i64> {
        Some(self.ts)
    }
}

/// Hourly bars whose highs/lows turn exactly at the given prices, `leg` bars
/// apart, starting `leg` bars in.
fn zigzag(turns: &[(f64, PivotKind)], leg: usize) -> Vec<TestBar> {
    let mid = |&(price, kind): &(f64, PivotKind)| match kind {
        PivotKind::High => price - 0.5,
        PivotKind::Low => price + 0.5,
    };
    let away = |&(price, kind): &(f64, PivotKind)| match kind {
        PivotKind::High => price - 10.0,
        PivotKind::Low => price + 10.0,
    };

    let mut points = vec![away(&turns[0])];
    points.extend(turns.iter().map(mid));
    points.push(away(&turns[turns.len() - 1]));

    let mut path = Vec::new();
    for w in points.windows(2) {
        for step in 0..leg {
            path.push(w[0] + (w[1] - w[0]) * step as f64 / leg as f64);
        }
    }
    path.push(points[points.len() - 1]);

    path.iter()
        .enumerate()
        .map(|(i, &m)| TestBar {
            o: m,
            h: m + 0.5,
            l: m - 0.5,
            c: m,
            ts: START_MS + i as i64 * HOUR_MS,
        })
        .collect()
}

fn bullish_gartley() -> Vec<TestBar> {
    zigzag(
        &[
            (100.0, PivotKind::Low),
            (200.0, PivotKind::High),
            (134.0, PivotKind::Low),
            (162.38, PivotKind::High),
            (124.9184, PivotKind::Low),
        ],
        4,
    )
}

fn bearish_gartley() -> Vec<TestBar> {
    zigzag(
        &[
            (200.0, PivotKind::High),
            (100.0, PivotKind::Low),
            (166.0, PivotKind::High),
            (137.62, PivotKind::Low),
            (175.0816, PivotKind::High),
        ],
        4,
    )
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================
// DETECTION
// ============================================================

#[test]
fn test_bullish_gartley_detected() {
    init_logger();
    let mut engine = EngineBuilder::new().strength(2).build().unwrap();
    let patterns = engine.scan(&bullish_gartley()).unwrap();

    assert_eq!(patterns.len(), 1);
    let p = &patterns[0];
    assert_eq!(p.kind, HarmonicKind::Gartley);
    assert_eq!(p.direction, Direction::Bullish);
    assert_eq!(p.label(), "Bullish Gartley");
    assert_eq!(
        [p.x.position, p.a.position, p.b.position, p.c.position, p.d.position],
        [4, 8, 12, 16, 20]
    );
    assert_eq!(p.d.timestamp, Some(START_MS + 20 * HOUR_MS));
    assert!((p.ratios.ab_xa - 0.66).abs() < 1e-9);
    assert!((p.ratios.ad_xa - 0.7508).abs() < 1e-6);
}

#[test]
fn test_bearish_gartley_detected() {
    init_logger();
    let mut engine = EngineBuilder::new().strength(2).build().unwrap();
    let patterns = engine.scan(&bearish_gartley()).unwrap();

    assert_eq!(patterns.len(), 1);
    let p = &patterns[0];
    assert_eq!(p.direction, Direction::Bearish);
    assert!(p.x.is_high());
    assert!(p.d.is_high());
    assert_eq!(p.alert_message(), "Bearish Gartley pattern detected at 175.08");
}

#[test]
fn test_bearish_only_engine_ignores_bullish_setup() {
    let mut engine = EngineBuilder::new()
        .strength(2)
        .detect_bullish(false)
        .build()
        .unwrap();
    assert!(engine.scan(&bullish_gartley()).unwrap().is_empty());
    assert_eq!(engine.scan(&[] as &[TestBar]).unwrap().len(), 0);
}

#[test]
fn test_strength_too_large_for_legs() {
    // Legs of 4 bars cannot confirm pivots needing 5 bars per side
    let mut engine = EngineBuilder::new().strength(5).build().unwrap();
    assert!(engine.scan(&bullish_gartley()).unwrap().is_empty());
    assert!(engine.pivots().highs().is_empty());
    assert!(engine.pivots().lows().is_empty());
}

#[test]
fn test_evicted_x_breaks_pattern() {
    let mut engine = EngineBuilder::new()
        .strength(2)
        .pivot_capacity(2)
        .build()
        .unwrap();
    assert!(engine.scan(&bullish_gartley()).unwrap().is_empty());
    assert_eq!(engine.pivots().lows().len(), 2);
    assert_eq!(engine.pivots().lows()[0].position, 12);

    let mut engine = EngineBuilder::new()
        .strength(2)
        .pivot_capacity(3)
        .build()
        .unwrap();
    assert_eq!(engine.scan(&bullish_gartley()).unwrap().len(), 1);
}

#[test]
fn test_narrowest_search_still_finds_adjacent_pivots() {
    let mut engine = EngineBuilder::new()
        .strength(2)
        .search_breadth(1)
        .build()
        .unwrap();
    assert_eq!(engine.scan(&bullish_gartley()).unwrap().len(), 1);
}

// ============================================================
// STREAMING & REPLAY
// ============================================================

#[test]
fn test_pattern_reported_two_bars_after_d() {
    let mut engine = EngineBuilder::new().strength(2).build().unwrap();
    let bars = bullish_gartley();

    for (i, bar) in bars.iter().enumerate() {
        let events = engine.observe(bar).unwrap();
        assert_eq!(events.position, i);
        if i == 22 {
            assert_eq!(events.patterns.len(), 1);
        } else {
            assert!(events.patterns.is_empty(), "unexpected pattern at bar {i}");
        }
    }
}

#[test]
fn test_replay_after_rewind_is_silent() {
    let log = EventLog::new();
    let mut engine = EngineBuilder::new()
        .strength(2)
        .observer(log.clone())
        .build()
        .unwrap();
    let bars = bullish_gartley();

    engine.scan(&bars).unwrap();
    engine.rewind();
    let replayed = engine.scan(&bars).unwrap();

    assert!(replayed.is_empty());
    assert_eq!(log.patterns().len(), 1);
    assert_eq!(engine.registry().len(), 1);
    assert_eq!(engine.registry().pending().count(), 0);
}

#[test]
fn test_stale_timestamp_halts_engine() {
    let mut engine = EngineBuilder::new().strength(2).build().unwrap();
    let bars = bullish_gartley();

    engine.observe(&bars[0]).unwrap();
    engine.observe(&bars[1]).unwrap();
    let err = engine.observe(&bars[1]).unwrap_err();
    assert!(matches!(err, HarmonicError::InvalidSequence { position: 2, .. }));
    assert!(engine.is_halted());
    assert!(engine.observe(&bars[2]).is_err());
    assert!(engine.scan(&bars[2..]).is_err());

    engine.rewind();
    assert_eq!(engine.scan(&bars).unwrap().len(), 1);
}

#[test]
fn test_closure_observer_sees_alert_text() {
    init_logger();
    let alerts = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = alerts.clone();
    let mut engine = EngineBuilder::new()
        .strength(2)
        .observer(AlertLogger::default())
        .observer(move |event: &EngineEvent| {
            if let EngineEvent::PatternDetected(p) = event {
                sink.lock().unwrap().push(p.alert_message());
            }
        })
        .build()
        .unwrap();

    engine.scan(&bullish_gartley()).unwrap();
    let alerts = alerts.lock().unwrap();
    assert_eq!(alerts.as_slice(), ["Bullish Gartley pattern detected at 124.92"]);
}

// ============================================================
// CONFIGURATION & OUTPUT
// ============================================================

#[test]
fn test_config_json_round_trip() {
    let config = EngineConfig {
        strength: Period::new(3).unwrap(),
        detect_bearish: false,
        pattern_filter: Some(vec![HarmonicKind::Gartley, HarmonicKind::Butterfly]),
        ..EngineConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: EngineConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    let engine = EngineBuilder::new().config(back).build().unwrap();
    assert_eq!(engine.config().strength.get(), 3);
}

#[test]
fn test_pattern_serializes() {
    let mut engine = EngineBuilder::new().strength(2).build().unwrap();
    let pattern = engine.scan(&bullish_gartley()).unwrap()[0];

    let value = serde_json::to_value(pattern).unwrap();
    assert_eq!(value["kind"], "Gartley");
    assert_eq!(value["direction"], "Bullish");
    assert_eq!(value["d"]["position"], 20);
}

#[test]
fn test_drawing_plan_for_detected_pattern() {
    let mut engine = EngineBuilder::new().strength(2).build().unwrap();
    let pattern = engine.scan(&bearish_gartley()).unwrap()[0];

    let plan = DrawingPlan::for_instrument(&pattern, &InstrumentScales::default(), "ES 03-25");
    assert_eq!(plan.id, "Gartley_20");
    assert_eq!(plan.segments.len(), 7);
    assert_eq!(plan.segments[0].style, LineStyle::Solid);
    assert_eq!(plan.segments[6].tag, "Gartley_20_BD");
    assert!((plan.marker.top - (175.0816 + 2.5)).abs() < 1e-9);
    assert_eq!(plan.label.text, "Bearish Gartley");
}

#[test]
fn test_parallel_scan_multiple_instruments() {
    let config = EngineConfig {
        strength: Period::new(2).unwrap(),
        ..EngineConfig::default()
    };
    let bull = bullish_gartley();
    let bear = bearish_gartley();
    let instruments: Vec<(&str, &[TestBar])> = vec![("ES", &bull), ("NQ", &bear)];

    let (results, errors) = scan_parallel(&config, instruments);
    assert!(errors.is_empty());
    assert_eq!(results.len(), 2);
    for result in &results {
        assert_eq!(result.patterns.len(), 1);
        let expected = if result.symbol == "ES" {
            Direction::Bullish
        } else {
            Direction::Bearish
        };
        assert_eq!(result.patterns[0].direction, expected);
    }
}
