//! Injected progress reporting for long-running batch loops.
//!
//! Construction, corpus generation and large BFS runs emit structured events
//! through a `ProgressSink` at their batch boundaries. The production sink
//! logs via `tracing`; the default is a silent no-op; tests record events
//! in memory.

use std::sync::Mutex;

/// Running min/max/mean over a stream of observations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStats {
    count: u64,
    min: f64,
    max: f64,
    sum: f64,
}

impl RunningStats {
    pub fn record(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.sum / self.count as f64)
    }
}

/// One progress notification from a batch loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Which loop is reporting ("incidence-build", "corpus", "bfs", ...).
    pub stage: &'static str,
    /// Units processed so far.
    pub processed: usize,
    /// Total units, when known up front (0 otherwise).
    pub total: usize,
    /// Running statistics over the values the loop produces, if any.
    pub stats: Option<RunningStats>,
}

pub trait ProgressSink: Sync {
    fn report(&self, event: &ProgressEvent);
}

/// Silent sink: the default when no observer is injected.
#[derive(Debug, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn report(&self, _event: &ProgressEvent) {}
}

/// Sink that forwards events to `tracing` at info level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn report(&self, event: &ProgressEvent) {
        match event.stats {
            Some(stats) => tracing::info!(
                stage = event.stage,
                processed = event.processed,
                total = event.total,
                min = stats.min().unwrap_or(f64::NAN),
                max = stats.max().unwrap_or(f64::NAN),
                mean = stats.mean().unwrap_or(f64::NAN),
                "progress"
            ),
            None => tracing::info!(
                stage = event.stage,
                processed = event.processed,
                total = event.total,
                "progress"
            ),
        }
    }
}

/// In-memory sink for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().expect("sink poisoned").clone()
    }
}

impl ProgressSink for RecordingSink {
    fn report(&self, event: &ProgressEvent) {
        self.events.lock().expect("sink poisoned").push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        assert_eq!(stats.mean(), None);

        for v in [2.0, -1.0, 5.0] {
            stats.record(v);
        }
        assert_eq!(stats.count(), 3);
        assert_eq!(stats.min(), Some(-1.0));
        assert_eq!(stats.max(), Some(5.0));
        assert_eq!(stats.mean(), Some(2.0));
    }

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        sink.report(&ProgressEvent {
            stage: "bfs",
            processed: 100,
            total: 0,
            stats: None,
        });
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].stage, "bfs");
        assert_eq!(events[0].processed, 100);
    }
}
