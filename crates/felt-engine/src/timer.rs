use super::event::CountdownKind;
use std::time::Duration;
use tokio::time::Instant;

/// Deadline set for one table's countdown kinds.
///
/// At most one deadline per kind: arming again replaces the previous one,
/// which is the implicit-cancellation rule countdowns follow. A handful of
/// kinds means a small vector beats any fancier wheel.
#[derive(Debug, Default)]
pub struct Timers {
    deadlines: Vec<(CountdownKind, Instant)>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn arm(&mut self, kind: CountdownKind, duration: Duration) {
        self.clear(kind);
        self.deadlines.push((kind, Instant::now() + duration));
    }
    pub fn clear(&mut self, kind: CountdownKind) {
        self.deadlines.retain(|(k, _)| *k != kind);
    }
    pub fn clear_all(&mut self) {
        self.deadlines.clear();
    }
    pub fn is_armed(&self, kind: CountdownKind) -> bool {
        self.deadlines.iter().any(|(k, _)| *k == kind)
    }
    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.iter().map(|(_, at)| *at).min()
    }
    /// Removes and returns every kind whose deadline has passed.
    pub fn take_expired(&mut self) -> Vec<CountdownKind> {
        let now = Instant::now();
        let (due, pending) = self
            .deadlines
            .drain(..)
            .partition::<Vec<_>, _>(|(_, at)| *at <= now);
        self.deadlines = pending;
        due.into_iter().map(|(k, _)| k).collect()
    }
}
