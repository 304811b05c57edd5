//! Frame aggregation: every hand in a frame → one total and one gesture.

use crate::fingers::{classify_fingers, FingerFlags};
use crate::gesture::{classify_gesture, Gesture};
use crate::landmark::{HandObservation, Handedness};

/// Classification of one hand, kept for the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandReading {
    pub handedness: Handedness,
    pub flags:      FingerFlags,
}

impl HandReading {
    pub fn count(&self) -> u32 {
        self.flags.count()
    }
}

/// Result of classifying a whole frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Extended fingers summed over every detected hand.
    pub total_count: u32,
    /// Gesture of the primary (first detected) hand; `None` with no hands.
    pub gesture:     Option<Gesture>,
    /// Per-hand readings in detection order.
    pub hands:       Vec<HandReading>,
}

impl FrameSummary {
    pub fn primary(&self) -> Option<&HandReading> {
        self.hands.first()
    }
}

/// Classify every hand and aggregate.  Pure: no state carried between frames.
pub fn summarize_frame(hands: &[HandObservation]) -> FrameSummary {
    let readings: Vec<HandReading> = hands
        .iter()
        .map(|hand| HandReading {
            handedness: hand.handedness,
            flags:      classify_fingers(hand),
        })
        .collect();

    FrameSummary {
        total_count: readings.iter().map(HandReading::count).sum(),
        gesture:     readings.first().map(|primary| classify_gesture(primary.flags)),
        hands:       readings,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose;

    #[test]
    fn no_hands_is_zero_without_gesture() {
        let summary = summarize_frame(&[]);
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.gesture, None);
        assert!(summary.primary().is_none());
    }

    #[test]
    fn single_right_peace_sign() {
        let peace = FingerFlags::new(false, true, true, false, false);
        let hand = pose::render(peace, Handedness::Right, 0.5, 0.95);
        let summary = summarize_frame(&[hand]);
        assert_eq!(summary.hands[0].flags, peace);
        assert_eq!(summary.total_count, 2);
        assert_eq!(summary.gesture, Some(Gesture::PeaceSign));
    }

    #[test]
    fn counts_sum_across_hands_and_gesture_follows_first() {
        let first  = pose::render(FingerFlags::new(false, true, false, false, false), Handedness::Left, 0.3, 0.9);
        let second = pose::render(FingerFlags::ALL, Handedness::Right, 0.7, 0.9);
        let summary = summarize_frame(&[first, second]);
        assert_eq!(summary.total_count, 6);
        assert_eq!(summary.gesture, Some(Gesture::Pointing));
        assert_eq!(summary.primary().map(|h| h.handedness), Some(Handedness::Left));
    }

    #[test]
    fn two_fists_still_label_fist() {
        let a = pose::render(FingerFlags::NONE, Handedness::Left,  0.3, 0.9);
        let b = pose::render(FingerFlags::NONE, Handedness::Right, 0.7, 0.9);
        let summary = summarize_frame(&[a, b]);
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.gesture, Some(Gesture::Fist));
    }
}
