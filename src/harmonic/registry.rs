//! Deduplicated pattern retention
//!
//! The registry is the only place a pattern becomes "detected": it owns every
//! registered pattern for the lifetime of the engine and hands observers a
//! read-only reference exactly once.

use std::collections::{HashMap, HashSet};

use super::{HarmonicKind, HarmonicPattern, PatternKey};
use crate::Direction;

#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    patterns: Vec<HarmonicPattern>,
    index: HashMap<PatternKey, usize>,
    d_positions: HashSet<usize>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn contains(&self, d_position: usize, kind: HarmonicKind, direction: Direction) -> bool {
        self.contains_key(&PatternKey {
            d_position,
            kind,
            direction,
        })
    }

    #[inline]
    pub fn contains_key(&self, key: &PatternKey) -> bool {
        self.index.contains_key(key)
    }

    /// Any pattern, of any name or direction, closing at this position
    #[inline]
    pub fn contains_d_position(&self, d_position: usize) -> bool {
        self.d_positions.contains(&d_position)
    }

    /// Store a new pattern. Returns false and changes nothing if its key is
    /// already registered.
    pub fn register(&mut self, pattern: HarmonicPattern) -> bool {
        let key = pattern.key();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.patterns.len());
        self.d_positions.insert(key.d_position);
        self.patterns.push(HarmonicPattern {
            notified: false,
            ..pattern
        });
        true
    }

    /// Hand the registered pattern to `deliver` if it has not been delivered
    /// yet, then mark it notified. Returns whether delivery happened.
    pub fn notify<F>(&mut self, key: &PatternKey, deliver: F) -> bool
    where
        F: FnOnce(&HarmonicPattern),
    {
        let Some(&i) = self.index.get(key) else {
            return false;
        };
        let pattern = &mut self.patterns[i];
        if pattern.notified {
            return false;
        }
        pattern.notified = true;
        deliver(&*pattern);
        true
    }

    pub fn get(&self, key: &PatternKey) -> Option<&HarmonicPattern> {
        self.index.get(key).map(|&i| &self.patterns[i])
    }

    /// Registered patterns in registration order
    #[inline]
    pub fn patterns(&self) -> &[HarmonicPattern] {
        &self.patterns
    }

    /// Registered patterns still waiting for delivery
    pub fn pending(&self) -> impl Iterator<Item = &HarmonicPattern> {
        self.patterns.iter().filter(|p| !p.notified)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn clear(&mut self) {
        self.patterns.clear();
        self.index.clear();
        self.d_positions.clear();
    }
}
