//! Synthetic hand poses.
//!
//! [`render`] lays out 21 landmarks for a given set of finger flags so that
//! [`classify_fingers`](crate::classify_fingers) reads the same flags back.
//! Used by the keyboard simulation source and by tests.
//!
//! The hand is drawn upright, palm toward the camera, wrist at the bottom.
//! `center_x` positions the palm horizontally in normalized coordinates.

use crate::fingers::{Finger, FingerFlags};
use crate::landmark::{HandObservation, Handedness, Landmark, LANDMARK_COUNT, WRIST};

const WRIST_Y:  f32 = 0.82;
const MCP_Y:    f32 = 0.62;
const PIP_Y:    f32 = 0.52;

// extended finger: joints keep climbing
const UP_DIP_Y: f32 = 0.45;
const UP_TIP_Y: f32 = 0.39;
// curled finger: tip folds back below the PIP
const DN_DIP_Y: f32 = 0.57;
const DN_TIP_Y: f32 = 0.60;

/// Horizontal offsets of index/middle/ring/pinky from the palm center,
/// before the handedness sign is applied.
const FINGER_DX: [f32; 4] = [0.045, 0.015, -0.015, -0.045];

/// Build a hand whose classification is exactly `flags`.
pub fn render(flags: FingerFlags, handedness: Handedness, center_x: f32, confidence: f32) -> HandObservation {
    // thumb sits on the side it extends toward
    let side = match handedness {
        Handedness::Right =>  1.0,
        Handedness::Left  => -1.0,
    };
    let mut pts = [Landmark::default(); LANDMARK_COUNT];

    pts[WRIST] = Landmark::new(center_x, WRIST_Y, 0.0);

    // thumb: CMC, MCP, IP, TIP (indices 1..=4)
    let thumb_base = center_x + side * 0.06;
    pts[1] = Landmark::new(thumb_base,               0.76, -0.01);
    pts[2] = Landmark::new(thumb_base + side * 0.03, 0.70, -0.02);
    if flags.thumb {
        pts[3] = Landmark::new(thumb_base + side * 0.06, 0.65, -0.03);
        pts[4] = Landmark::new(thumb_base + side * 0.09, 0.61, -0.03);
    } else {
        pts[3] = Landmark::new(thumb_base + side * 0.01, 0.66, -0.03);
        pts[4] = Landmark::new(thumb_base - side * 0.02, 0.64, -0.03);
    }

    // four fingers: MCP, PIP, DIP, TIP starting at index 5
    for (i, finger) in [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky].iter().enumerate() {
        let x = center_x + side * FINGER_DX[i];
        let base = 5 + i * 4;
        let (dip_y, tip_y) = if flags.is_up(*finger) {
            (UP_DIP_Y, UP_TIP_Y)
        } else {
            (DN_DIP_Y, DN_TIP_Y)
        };
        pts[base]     = Landmark::new(x, MCP_Y, 0.0);
        pts[base + 1] = Landmark::new(x, PIP_Y, -0.01);
        pts[base + 2] = Landmark::new(x, dip_y, -0.02);
        pts[base + 3] = Landmark::new(x, tip_y, -0.02);
    }

    HandObservation::new(pts, handedness, confidence)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
