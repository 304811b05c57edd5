//! Debounced announcement policy.
//!
//! A new count is announced only when all three guards pass:
//!
//! 1. it differs from the last count that was announced,
//! 2. at least [`ANNOUNCE_COOLDOWN`] has passed since the last announcement,
//! 3. no earlier announcement is still being spoken.
//!
//! When a guard fails nothing changes; the count is simply not spoken.
//! When all pass, the state is updated *before* the text is handed to the
//! speech worker, so a second call in the same instant cannot fire again.

use std::time::{Duration, Instant};

/// Minimum spacing between two spoken announcements.
pub const ANNOUNCE_COOLDOWN: Duration = Duration::from_millis(1500);

/// Something to say.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Announcement {
    pub count: u32,
    pub text:  String,
}

/// "0 fingers", "1 finger", "N fingers".
pub fn announcement_text(count: u32) -> String {
    match count {
        1 => "1 finger".to_string(),
        n => format!("{} fingers", n),
    }
}

#[derive(Clone, Debug)]
pub struct AnnouncementState {
    last_count: Option<u32>,
    last_at:    Option<Instant>,
    cooldown:   Duration,
}

impl Default for AnnouncementState {
    fn default() -> Self {
        AnnouncementState::new(ANNOUNCE_COOLDOWN)
    }
}

impl AnnouncementState {
    pub fn new(cooldown: Duration) -> Self {
        AnnouncementState { last_count: None, last_at: None, cooldown }
    }

    pub fn last_count(&self) -> Option<u32> { self.last_count }
    pub fn last_at(&self)    -> Option<Instant> { self.last_at }
    pub fn cooldown(&self)   -> Duration { self.cooldown }

    fn cooled_down(&self, now: Instant) -> bool {
        match self.last_at {
            None       => true,
            Some(last) => now.saturating_duration_since(last) >= self.cooldown,
        }
    }

    /// Offer a count.  Returns the announcement to dispatch if every guard
    /// passes; `speech_busy` reports whether an utterance is still in flight.
    pub fn offer(&mut self, count: u32, now: Instant, speech_busy: bool) -> Option<Announcement> {
        if self.last_count == Some(count) { return None; }
        if !self.cooled_down(now)         { return None; }
        if speech_busy                    { return None; }

        self.last_count = Some(count);
        self.last_at    = Some(now);
        Some(Announcement { count, text: announcement_text(count) })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    #[test]
    fn text_grammar() {
        assert_eq!(announcement_text(0), "0 fingers");
        assert_eq!(announcement_text(1), "1 finger");
        assert_eq!(announcement_text(2), "2 fingers");
        assert_eq!(announcement_text(10), "10 fingers");
    }

    #[test]
    fn first_offer_always_fires() {
        let mut s = AnnouncementState::default();
        let a = s.offer(0, Instant::now(), false).unwrap();
        assert_eq!(a.text, "0 fingers");
        assert_eq!(s.last_count(), Some(0));
    }

    #[test]
    fn same_count_never_repeats() {
        let t0 = Instant::now();
        let mut s = AnnouncementState::default();
        assert!(s.offer(3, t0, false).is_some());
        assert!(s.offer(3, t0 + ms(5_000), false).is_none());
        assert!(s.offer(3, t0 + ms(60_000), false).is_none());
    }

    #[test]
    fn cooldown_blocks_then_releases() {
        let t0 = Instant::now();
        let mut s = AnnouncementState::default();
        assert!(s.offer(1, t0, false).is_some());
        assert!(s.offer(2, t0 + ms(1_499), false).is_none());
        let a = s.offer(2, t0 + ms(1_500), false).unwrap();
        assert_eq!(a.count, 2);
        assert_eq!(s.last_at(), Some(t0 + ms(1_500)));
    }

    #[test]
    fn busy_speech_drops_without_state_change() {
        let t0 = Instant::now();
        let mut s = AnnouncementState::default();
        assert!(s.offer(1, t0, false).is_some());
        assert!(s.offer(4, t0 + ms(2_000), true).is_none());
        assert_eq!(s.last_count(), Some(1));
        assert_eq!(s.last_at(), Some(t0));
        // once the worker is free the same count goes through
        assert!(s.offer(4, t0 + ms(2_001), false).is_some());
    }

    #[test]
    fn busy_on_first_offer_keeps_sentinel() {
        let mut s = AnnouncementState::default();
        assert!(s.offer(2, Instant::now(), true).is_none());
        assert_eq!(s.last_count(), None);
        assert_eq!(s.last_at(), None);
    }

    #[test]
    fn custom_cooldown() {
        let t0 = Instant::now();
        let mut s = AnnouncementState::new(ms(100));
        assert_eq!(s.cooldown(), ms(100));
        assert!(s.offer(1, t0, false).is_some());
        assert!(s.offer(2, t0 + ms(100), false).is_some());
    }
}
