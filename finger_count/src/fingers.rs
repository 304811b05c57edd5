//! Finger-state classifier: one hand's landmarks → five "extended" flags.
//!
//! * **Thumb**: lateral test.  Right hand: tip x > MCP x.  Left hand: tip
//!   x < MCP x.
//! * **Index / middle / ring / pinky**: vertical test.  Extended when the
//!   tip sits strictly above (smaller y than) the PIP joint.
//!
//! No angles and no x-axis reasoning for the four fingers, so a hand held
//! sideways reads wrong.  That is a known limitation of the rule, not a bug.

use crate::landmark::{
    HandObservation, Handedness,
    INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP, PINKY_TIP,
    RING_PIP, RING_TIP, THUMB_MCP, THUMB_TIP,
};

// ════════════════════════════════════════════════════════════════════════════
// Finger
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb, Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky,
    ];

    /// (tip, reference joint) landmark indices used by the classifier.
    pub fn joints(self) -> (usize, usize) {
        match self {
            Finger::Thumb  => (THUMB_TIP,  THUMB_MCP),
            Finger::Index  => (INDEX_TIP,  INDEX_PIP),
            Finger::Middle => (MIDDLE_TIP, MIDDLE_PIP),
            Finger::Ring   => (RING_TIP,   RING_PIP),
            Finger::Pinky  => (PINKY_TIP,  PINKY_PIP),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Finger::Thumb  => "thumb",
            Finger::Index  => "index",
            Finger::Middle => "middle",
            Finger::Ring   => "ring",
            Finger::Pinky  => "pinky",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerFlags
// ════════════════════════════════════════════════════════════════════════════

/// Which of the five fingers are extended, ordered thumb → pinky.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FingerFlags {
    pub thumb:  bool,
    pub index:  bool,
    pub middle: bool,
    pub ring:   bool,
    pub pinky:  bool,
}

impl FingerFlags {
    pub const NONE: FingerFlags = FingerFlags::new(false, false, false, false, false);
    pub const ALL:  FingerFlags = FingerFlags::new(true,  true,  true,  true,  true);

    pub const fn new(thumb: bool, index: bool, middle: bool, ring: bool, pinky: bool) -> Self {
        FingerFlags { thumb, index, middle, ring, pinky }
    }

    pub const fn to_array(self) -> [bool; 5] {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
    }

    /// Decode the low five bits, bit 0 = thumb … bit 4 = pinky.
    pub const fn from_bits(bits: u8) -> Self {
        FingerFlags::new(
            bits & 0b00001 != 0,
            bits & 0b00010 != 0,
            bits & 0b00100 != 0,
            bits & 0b01000 != 0,
            bits & 0b10000 != 0,
        )
    }

    pub fn is_up(self, finger: Finger) -> bool {
        match finger {
            Finger::Thumb  => self.thumb,
            Finger::Index  => self.index,
            Finger::Middle => self.middle,
            Finger::Ring   => self.ring,
            Finger::Pinky  => self.pinky,
        }
    }

    pub fn set(&mut self, finger: Finger, up: bool) {
        match finger {
            Finger::Thumb  => self.thumb  = up,
            Finger::Index  => self.index  = up,
            Finger::Middle => self.middle = up,
            Finger::Ring   => self.ring   = up,
            Finger::Pinky  => self.pinky  = up,
        }
    }

    /// Number of extended fingers, 0–5.
    pub fn count(self) -> u32 {
        self.to_array().iter().filter(|&&up| up).count() as u32
    }

    /// All 32 flag combinations in bit order.
    pub fn all_patterns() -> impl Iterator<Item = FingerFlags> {
        (0u8..32).map(FingerFlags::from_bits)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Classifier
// ════════════════════════════════════════════════════════════════════════════

/// Classify a single hand.  Total: every observation yields five flags.
pub fn classify_fingers(hand: &HandObservation) -> FingerFlags {
    let mut flags = FingerFlags::NONE;
    for finger in Finger::ALL {
        flags.set(finger, is_extended(hand, finger));
    }
    flags
}

fn is_extended(hand: &HandObservation, finger: Finger) -> bool {
    let (tip, reference) = finger.joints();
    let tip = hand.point(tip);
    let reference = hand.point(reference);

    match finger {
        Finger::Thumb => match hand.handedness {
            Handedness::Right => tip.x > reference.x,
            Handedness::Left  => tip.x < reference.x,
        },
        // y = 0 is the top of the frame
        _ => tip.y < reference.y,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{Landmark, LANDMARK_COUNT};
    use proptest::prelude::*;

    fn flat_hand(handedness: Handedness) -> HandObservation {
        HandObservation::new(
            [Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT],
            handedness,
            1.0,
        )
    }

    #[test]
    fn tip_above_pip_is_extended() {
        let mut hand = flat_hand(Handedness::Right);
        hand.landmarks[INDEX_TIP].y = 0.3;
        hand.landmarks[INDEX_PIP].y = 0.4;
        assert!(classify_fingers(&hand).index);
    }

    #[test]
    fn tip_level_with_pip_is_not_extended() {
        let hand = flat_hand(Handedness::Right);
        let flags = classify_fingers(&hand);
        assert_eq!(flags, FingerFlags::NONE);
    }

    #[test]
    fn right_thumb_extends_to_the_right() {
        let mut hand = flat_hand(Handedness::Right);
        hand.landmarks[THUMB_TIP].x = 0.7;
        hand.landmarks[THUMB_MCP].x = 0.6;
        assert!(classify_fingers(&hand).thumb);
        assert!(!classify_fingers(&hand.with_handedness(Handedness::Left)).thumb);
    }

    #[test]
    fn left_thumb_extends_to_the_left() {
        let mut hand = flat_hand(Handedness::Left);
        hand.landmarks[THUMB_TIP].x = 0.2;
        hand.landmarks[THUMB_MCP].x = 0.3;
        assert!(classify_fingers(&hand).thumb);
    }

    #[test]
    fn thumb_ignores_y() {
        let mut hand = flat_hand(Handedness::Right);
        hand.landmarks[THUMB_TIP].y = 0.0;
        hand.landmarks[THUMB_MCP].y = 1.0;
        assert!(!classify_fingers(&hand).thumb);
    }

    #[test]
    fn peace_sign_geometry() {
        // index and middle tips above their PIPs, everything else below
        let mut hand = flat_hand(Handedness::Right);
        for (tip, pip, up) in [
            (INDEX_TIP,  INDEX_PIP,  true),
            (MIDDLE_TIP, MIDDLE_PIP, true),
            (RING_TIP,   RING_PIP,   false),
            (PINKY_TIP,  PINKY_PIP,  false),
        ] {
            hand.landmarks[pip].y = 0.5;
            hand.landmarks[tip].y = if up { 0.35 } else { 0.6 };
        }
        hand.landmarks[THUMB_MCP].x = 0.5;
        hand.landmarks[THUMB_TIP].x = 0.45;

        let flags = classify_fingers(&hand);
        assert_eq!(flags, FingerFlags::new(false, true, true, false, false));
        assert_eq!(flags.count(), 2);
    }

    #[test]
    fn bits_cover_every_pattern_once() {
        let patterns: Vec<_> = FingerFlags::all_patterns().collect();
        assert_eq!(patterns.len(), 32);
        for (i, a) in patterns.iter().enumerate() {
            for b in &patterns[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn to_array_and_count() {
        let f = FingerFlags::new(true, false, true, false, true);
        assert_eq!(f.to_array(), [true, false, true, false, true]);
        assert_eq!(f.count(), 3);
        assert_eq!(FingerFlags::ALL.count(), 5);
    }

    fn arb_hand() -> impl Strategy<Value = HandObservation> {
        prop::collection::vec((0.0f32..=1.0, 0.0f32..=1.0), LANDMARK_COUNT).prop_map(|pts| {
            let points: Vec<Landmark> = pts
                .into_iter()
                .map(|(x, y)| Landmark::new(x, y, 0.0))
                .collect();
            HandObservation::from_points(&points, Handedness::Right, 1.0).unwrap()
        })
    }

    proptest! {
        #[test]
        fn thumb_flips_with_handedness(hand in arb_hand()) {
            let tip = hand.point(THUMB_TIP).x;
            let mcp = hand.point(THUMB_MCP).x;
            prop_assume!(tip != mcp);

            let right = classify_fingers(&hand);
            let left  = classify_fingers(&hand.with_handedness(Handedness::Left));
            prop_assert_ne!(right.thumb, left.thumb);
            // the other four fingers do not care about handedness
            prop_assert_eq!(right.index,  left.index);
            prop_assert_eq!(right.middle, left.middle);
            prop_assert_eq!(right.ring,   left.ring);
            prop_assert_eq!(right.pinky,  left.pinky);
        }
    }
}
