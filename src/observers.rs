//! Receivers of engine events
//!
//! Observers are the boundary to host-owned side effects (charting, alerts).
//! They run synchronously inside [`HarmonicEngine::observe`](crate::HarmonicEngine::observe).

use std::sync::{Arc, Mutex, PoisonError};

use log::info;

use crate::{harmonic::HarmonicPattern, pivots::PivotPoint, EngineEvent};

/// Receives every event the engine emits, in emission order
pub trait PatternObserver: Send {
    fn on_event(&mut self, event: &EngineEvent);
}

impl<F> PatternObserver for F
where
    F: FnMut(&EngineEvent) + Send,
{
    fn on_event(&mut self, event: &EngineEvent) {
        self(event)
    }
}

// ============================================================
// ALERT LOGGER
// ============================================================

/// Emits the human-readable alert line for each detected pattern via `log`
#[derive(Debug, Clone)]
pub struct AlertLogger {
    pub enabled: bool,
}

impl Default for AlertLogger {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AlertLogger {
    /// The line logged for `event`, if any
    pub fn alert_for(&self, event: &EngineEvent) -> Option<String> {
        match event {
            EngineEvent::PatternDetected(pattern) if self.enabled => Some(pattern.alert_message()),
            _ => None,
        }
    }
}

impl PatternObserver for AlertLogger {
    fn on_event(&mut self, event: &EngineEvent) {
        if let Some(alert) = self.alert_for(event) {
            info!(target: "yahpd::alert", "{alert}");
        }
    }
}

// ============================================================
// EVENT LOG
// ============================================================

/// Shared in-memory recorder. Clones share the same buffer, so a host can
/// keep one handle and give the other to the engine.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn patterns(&self) -> Vec<HarmonicPattern> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                EngineEvent::PatternDetected(p) => Some(p),
                EngineEvent::PivotConfirmed(_) => None,
            })
            .collect()
    }

    pub fn pivots(&self) -> Vec<PivotPoint> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                EngineEvent::PivotConfirmed(p) => Some(p),
                EngineEvent::PatternDetected(_) => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl PatternObserver for EventLog {
    fn on_event(&mut self, event: &EngineEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*event);
    }
}
