//! Session state: everything that persists across frames.
//!
//! `Session` bundles the announcement policy and the statistics so the run
//! loop can feed it one frame at a time.  Both are touched only on frames
//! where the aggregate count changes.

use std::time::{Duration, Instant};

use crate::announce::{Announcement, AnnouncementState};
use crate::frame::{summarize_frame, FrameSummary};
use crate::landmark::HandObservation;
use crate::stats::SessionStats;

/// What one frame produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameOutcome {
    pub summary:      FrameSummary,
    /// The displayed count changed on this frame.
    pub changed:      bool,
    /// Text to hand to the speech worker, if the policy allowed it.
    pub announcement: Option<Announcement>,
}

#[derive(Clone, Debug)]
pub struct Session {
    announce: AnnouncementState,
    stats:    SessionStats,
}

impl Session {
    pub fn new(started: Instant) -> Self {
        Session {
            announce: AnnouncementState::default(),
            stats:    SessionStats::new(started),
        }
    }

    pub fn with_cooldown(started: Instant, cooldown: Duration) -> Self {
        Session {
            announce: AnnouncementState::new(cooldown),
            stats:    SessionStats::new(started),
        }
    }

    /// Classify the frame's hands and update the session.
    pub fn observe(&mut self, hands: &[HandObservation], now: Instant, speech_busy: bool) -> FrameOutcome {
        self.apply(summarize_frame(hands), now, speech_busy)
    }

    /// Update the session from an already-aggregated frame.
    pub fn apply(&mut self, summary: FrameSummary, now: Instant, speech_busy: bool) -> FrameOutcome {
        let changed = self.stats.record(&summary);
        let announcement = if changed {
            self.announce.offer(summary.total_count, now, speech_busy)
        } else {
            None
        };
        FrameOutcome { summary, changed, announcement }
    }

    pub fn stats(&self) -> &SessionStats { &self.stats }
    pub fn announcements(&self) -> &AnnouncementState { &self.announce }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
