//! Run state shared with the observer: stop flag, events and counters

use crate::models::RunStats;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

/// Cooperative cancellation flag. Only ever goes from false to true.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Messages a run sends to its observer. The last one is always
/// `Finished`, `Failed` or `Stopped`.
#[derive(Debug, Clone, PartialEq)]
pub enum OrganizeEvent {
    /// Human-readable line; the observer adds the timestamp
    Log(String),
    /// Completion fraction in [0, 1], never decreasing within a run
    Progress(f32),
    Stats(RunStats),
    Finished,
    Failed(String),
    Stopped,
}

impl OrganizeEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrganizeEvent::Finished | OrganizeEvent::Failed(_) | OrganizeEvent::Stopped
        )
    }
}

/// Counters of one run
#[derive(Debug, Default)]
pub struct ProgressState {
    stats: RunStats,
    fraction: f32,
    groups: HashSet<String>,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self {
            stats: RunStats {
                total,
                ..RunStats::default()
            },
            ..Self::default()
        }
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn record_processed(&mut self) {
        self.stats.processed = (self.stats.processed + 1).min(self.stats.total);
    }

    /// Count a destination folder once, however many files land in it
    pub fn record_group(&mut self, name: &str) {
        if self.groups.insert(name.to_string()) {
            self.stats.groups = self.groups.len();
        }
    }

    /// Clamp to [0, 1] and never go backwards. Returns the stored value.
    pub fn advance(&mut self, fraction: f32) -> f32 {
        if fraction.is_finite() {
            self.fraction = self.fraction.max(fraction.clamp(0.0, 1.0));
        }
        self.fraction
    }
}

/// Worker-side end of the event channel, owning the run's counters
pub struct Reporter {
    tx: UnboundedSender<OrganizeEvent>,
    state: ProgressState,
}

impl Reporter {
    pub fn new(tx: UnboundedSender<OrganizeEvent>, total: usize) -> Self {
        Self {
            tx,
            state: ProgressState::new(total),
        }
    }

    fn send(&self, event: OrganizeEvent) {
        // Observer may have gone away; the run carries on regardless
        let _ = self.tx.send(event);
    }

    pub fn log(&self, line: impl Into<String>) {
        self.send(OrganizeEvent::Log(line.into()));
    }

    /// Per-item failure: traced and shown to the user, run continues
    pub fn warn(&self, line: impl Into<String>) {
        let line = line.into();
        warn!("{}", line);
        self.send(OrganizeEvent::Log(format!("⚠️ {}", line)));
    }

    pub fn progress(&mut self, fraction: f32) {
        let value = self.state.advance(fraction);
        self.send(OrganizeEvent::Progress(value));
    }

    pub fn processed(&mut self) {
        self.state.record_processed();
    }

    pub fn group(&mut self, name: &str) {
        self.state.record_group(name);
    }

    pub fn stats(&self) {
        self.send(OrganizeEvent::Stats(self.state.stats()));
    }

    pub fn finished(&self) {
        self.send(OrganizeEvent::Finished);
    }

    pub fn failed(&self, message: impl Into<String>) {
        self.send(OrganizeEvent::Failed(message.into()));
    }

    pub fn stopped(&self) {
        self.send(OrganizeEvent::Stopped);
    }
}
