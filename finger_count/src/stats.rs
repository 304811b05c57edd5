//! Session statistics shown in the overlay panel.
//!
//! Counters only ever grow.  The histogram keeps gestures in the order they
//! were first seen, and [`SessionStats::most_common`] breaks ties in favor of
//! the earliest entry.

use std::time::{Duration, Instant};

use crate::frame::FrameSummary;
use crate::gesture::Gesture;

#[derive(Clone, Debug)]
pub struct SessionStats {
    started:        Instant,
    histogram:      Vec<(Gesture, u64)>,
    total_gestures: u64,
    current_count:  Option<u32>,
}

impl SessionStats {
    pub fn new(started: Instant) -> Self {
        SessionStats {
            started,
            histogram:      Vec::new(),
            total_gestures: 0,
            current_count:  None,
        }
    }

    /// Fold in one frame.  Returns `true` if the displayed count changed,
    /// which is the only case where anything is recorded.
    pub fn record(&mut self, summary: &FrameSummary) -> bool {
        if self.current_count == Some(summary.total_count) {
            return false;
        }
        self.current_count = Some(summary.total_count);

        if let Some(gesture) = summary.gesture {
            match self.histogram.iter_mut().find(|(g, _)| *g == gesture) {
                Some((_, n)) => *n += 1,
                None         => self.histogram.push((gesture, 1)),
            }
            self.total_gestures += 1;
        }
        true
    }

    pub fn started(&self)        -> Instant { self.started }
    pub fn total_gestures(&self) -> u64 { self.total_gestures }
    pub fn current_count(&self)  -> Option<u32> { self.current_count }

    /// Histogram entries in first-seen order.
    pub fn histogram(&self) -> &[(Gesture, u64)] {
        &self.histogram
    }

    pub fn occurrences(&self, gesture: Gesture) -> u64 {
        self.histogram
            .iter()
            .find(|(g, _)| *g == gesture)
            .map_or(0, |(_, n)| *n)
    }

    /// Highest count wins; on a tie the gesture seen first wins.
    pub fn most_common(&self) -> Option<(Gesture, u64)> {
        let mut best: Option<(Gesture, u64)> = None;
        for &(gesture, n) in &self.histogram {
            match best {
                Some((_, top)) if top >= n => {}
                _ => best = Some((gesture, n)),
            }
        }
        best
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    /// Runtime as `H:MM:SS`, whole seconds.
    pub fn runtime_label(&self, now: Instant) -> String {
        format_runtime(self.elapsed(now))
    }
}

pub fn format_runtime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
