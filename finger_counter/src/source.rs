//! Landmark sources: where the per-frame hand observations come from.
//!
//! The run loop only sees [`LandmarkSource`].  It does not care whether the
//! hands were found by the external detector process or dialled in from the
//! keyboard.

use std::sync::mpsc::Receiver;

use finger_count::{pose, FingerFlags, HandObservation, Handedness};

use crate::capture::VideoFrame;
use crate::detector::DetectorError;

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can find hands in a frame.
pub trait LandmarkSource {
    /// Hands in detection order.  An empty vec means "no hands", not an error.
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<HandObservation>, DetectorError>;

    fn describe(&self) -> String;
}

// ════════════════════════════════════════════════════════════════════════════
// Simulation input
// ════════════════════════════════════════════════════════════════════════════

/// Pose keys, as sent by the overlay window in simulation mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    /// `0`–`5`: hold up that many fingers, counting from the index finger
    /// and adding the thumb last.
    Count(u32),
    RockOn,       // R
    ThumbOnly,    // T
    SecondHand,   // H  (toggle)
    HideHands,    // N  (toggle)
}

/// What the simulated hands currently look like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimPose {
    pub primary:     FingerFlags,
    pub second_hand: bool,
    pub hidden:      bool,
}

impl Default for SimPose {
    fn default() -> Self {
        SimPose { primary: FingerFlags::NONE, second_hand: false, hidden: true }
    }
}

/// Finger pattern for a plain count: index, middle, ring, pinky, then thumb.
pub fn counting_pattern(count: u32) -> FingerFlags {
    match count {
        0 => FingerFlags::NONE,
        1 => FingerFlags::new(false, true,  false, false, false),
        2 => FingerFlags::new(false, true,  true,  false, false),
        3 => FingerFlags::new(false, true,  true,  true,  false),
        4 => FingerFlags::new(false, true,  true,  true,  true ),
        _ => FingerFlags::ALL,
    }
}

impl SimPose {
    pub fn apply(&mut self, key: SimKey) {
        match key {
            SimKey::Count(n)   => { self.primary = counting_pattern(n); self.hidden = false; }
            SimKey::RockOn     => {
                self.primary = FingerFlags::new(true, true, false, false, true);
                self.hidden  = false;
            }
            SimKey::ThumbOnly  => {
                self.primary = FingerFlags::new(true, false, false, false, false);
                self.hidden  = false;
            }
            SimKey::SecondHand => self.second_hand = !self.second_hand,
            SimKey::HideHands  => self.hidden = !self.hidden,
        }
    }

    /// Hands as the detector would report them, primary first.
    ///
    /// The second hand, when shown, is a left hand with all fingers up.
    pub fn hands(&self) -> Vec<HandObservation> {
        if self.hidden {
            return Vec::new();
        }
        let mut hands = vec![pose::render(self.primary, Handedness::Right, 0.62, 0.97)];
        if self.second_hand {
            hands.push(pose::render(FingerFlags::ALL, Handedness::Left, 0.30, 0.93));
        }
        hands
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source driven by [`SimKey`]s from the overlay window.
pub struct SimLandmarkSource {
    rx:   Receiver<SimKey>,
    pose: SimPose,
}

impl SimLandmarkSource {
    pub fn new(rx: Receiver<SimKey>) -> Self {
        SimLandmarkSource { rx, pose: SimPose::default() }
    }

    pub fn pose(&self) -> SimPose {
        self.pose
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn detect(&mut self, _frame: &VideoFrame) -> Result<Vec<HandObservation>, DetectorError> {
        for key in self.rx.try_iter() {
            self.pose.apply(key);
        }
        Ok(self.pose.hands())
    }

    fn describe(&self) -> String {
        "keyboard simulation".to_string()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use finger_count::{summarize_frame, Gesture};
    use std::sync::mpsc;

    fn blank() -> VideoFrame {
        VideoFrame::filled(4, 4, 0)
    }

    #[test]
    fn counting_pattern_has_that_many_fingers() {
        for n in 0..=5 {
            assert_eq!(counting_pattern(n).count(), n);
        }
        assert_eq!(counting_pattern(9), FingerFlags::ALL);
    }

    #[test]
    fn starts_with_no_hands() {
        let (_tx, rx) = mpsc::channel();
        let mut src = SimLandmarkSource::new(rx);
        assert!(src.detect(&blank()).unwrap().is_empty());
    }

    #[test]
    fn keys_become_gestures() {
        let (tx, rx) = mpsc::channel();
        let mut src = SimLandmarkSource::new(rx);

        let cases = [
            (SimKey::Count(0),  Gesture::Fist),
            (SimKey::Count(1),  Gesture::Pointing),
            (SimKey::Count(2),  Gesture::PeaceSign),
            (SimKey::Count(3),  Gesture::Fingers(3)),
            (SimKey::Count(4),  Gesture::Fingers(4)),
            (SimKey::Count(5),  Gesture::OpenPalm),
            (SimKey::RockOn,    Gesture::RockOn),
            (SimKey::ThumbOnly, Gesture::Fingers(1)),
        ];
        for (key, gesture) in cases {
            tx.send(key).unwrap();
            let hands = src.detect(&blank()).unwrap();
            assert_eq!(summarize_frame(&hands).gesture, Some(gesture), "{:?}", key);
        }
    }

    #[test]
    fn second_hand_adds_five_and_keeps_primary_gesture() {
        let (tx, rx) = mpsc::channel();
        let mut src = SimLandmarkSource::new(rx);
        tx.send(SimKey::Count(2)).unwrap();
        tx.send(SimKey::SecondHand).unwrap();

        let summary = summarize_frame(&src.detect(&blank()).unwrap());
        assert_eq!(summary.total_count, 7);
        assert_eq!(summary.gesture, Some(Gesture::PeaceSign));
        assert_eq!(summary.hands[1].handedness, Handedness::Left);
    }

    #[test]
    fn hide_toggles_visibility_and_keeps_pose() {
        let (tx, rx) = mpsc::channel();
        let mut src = SimLandmarkSource::new(rx);
        tx.send(SimKey::Count(3)).unwrap();
        tx.send(SimKey::HideHands).unwrap();
        assert!(src.detect(&blank()).unwrap().is_empty());

        tx.send(SimKey::HideHands).unwrap();
        let hands = src.detect(&blank()).unwrap();
        assert_eq!(summarize_frame(&hands).total_count, 3);
        assert_eq!(src.pose().primary, counting_pattern(3));
    }
}
