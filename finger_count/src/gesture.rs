//! Gesture classifier: five finger flags → one named gesture.
//!
//! The rules are an ordered, first-match table.  A later rule is only
//! consulted when every earlier one failed, and the table ends with a
//! count-based fallback, so the mapping is total.
//!
//! | Order | Condition | Label |
//! |---|---|---|
//! | 1 | count == 0 | Fist |
//! | 2 | count == 5 | Open Palm |
//! | 3 | count == 2, only index + middle | Peace Sign |
//! | 4 | count == 1, only index | Pointing |
//! | 5 | count == 3, only thumb + index + pinky | Rock On |
//! | 6 | count == 4, pinky down | Four Fingers |
//! | — | otherwise | "{count} Fingers" |

use std::fmt;

use crate::fingers::FingerFlags;

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gesture {
    Fist,
    OpenPalm,
    PeaceSign,
    Pointing,
    RockOn,
    FourFingers,
    /// Fallback: no named rule matched, label is just the count.
    Fingers(u32),
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gesture::Fist        => f.write_str("Fist"),
            Gesture::OpenPalm    => f.write_str("Open Palm"),
            Gesture::PeaceSign   => f.write_str("Peace Sign"),
            Gesture::Pointing    => f.write_str("Pointing"),
            Gesture::RockOn      => f.write_str("Rock On"),
            Gesture::FourFingers => f.write_str("Four Fingers"),
            Gesture::Fingers(n)  => write!(f, "{} Fingers", n),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Rule table
// ════════════════════════════════════════════════════════════════════════════

/// One row of the ordered rule table.
#[derive(Clone, Copy)]
pub struct GestureRule {
    pub gesture: Gesture,
    pub matches: fn(FingerFlags) -> bool,
}

impl fmt::Debug for GestureRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureRule").field("gesture", &self.gesture).finish()
    }
}

pub const GESTURE_RULES: [GestureRule; 6] = [
    GestureRule { gesture: Gesture::Fist,        matches: is_fist        },
    GestureRule { gesture: Gesture::OpenPalm,    matches: is_open_palm   },
    GestureRule { gesture: Gesture::PeaceSign,   matches: is_peace_sign  },
    GestureRule { gesture: Gesture::Pointing,    matches: is_pointing    },
    GestureRule { gesture: Gesture::RockOn,      matches: is_rock_on     },
    GestureRule { gesture: Gesture::FourFingers, matches: is_four_fingers },
];

fn is_fist(f: FingerFlags) -> bool {
    f.count() == 0
}

fn is_open_palm(f: FingerFlags) -> bool {
    f.count() == 5
}

fn is_peace_sign(f: FingerFlags) -> bool {
    f.count() == 2 && f.index && f.middle && !f.thumb && !f.ring && !f.pinky
}

fn is_pointing(f: FingerFlags) -> bool {
    f.count() == 1 && f.index && !f.middle && !f.ring && !f.pinky
}

fn is_rock_on(f: FingerFlags) -> bool {
    f.count() == 3 && f.thumb && f.index && f.pinky && !f.middle && !f.ring
}

fn is_four_fingers(f: FingerFlags) -> bool {
    f.count() == 4 && !f.pinky
}

/// First matching rule wins; otherwise "{count} Fingers".
pub fn classify_gesture(flags: FingerFlags) -> Gesture {
    GESTURE_RULES
        .iter()
        .find(|rule| (rule.matches)(flags))
        .map(|rule| rule.gesture)
        .unwrap_or(Gesture::Fingers(flags.count()))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
