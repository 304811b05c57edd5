//! Hand landmarks as delivered by the external hand-landmark model.
//!
//! Coordinates are normalized to the frame: `x` grows to the right, `y`
//! grows downward (top of the image is 0).  `z` is carried through but
//! never consulted.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of points in one hand observation.
pub const LANDMARK_COUNT: usize = 21;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices (21-point hand model)
// ════════════════════════════════════════════════════════════════════════════

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// Bone segments of the hand skeleton, as (from, to) landmark pairs.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC), (THUMB_CMC, THUMB_MCP), (THUMB_MCP, THUMB_IP), (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP), (INDEX_MCP, INDEX_PIP), (INDEX_PIP, INDEX_DIP), (INDEX_DIP, INDEX_TIP),
    (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (MIDDLE_MCP, RING_MCP), (RING_MCP, RING_PIP), (RING_PIP, RING_DIP), (RING_DIP, RING_TIP),
    (RING_MCP, PINKY_MCP), (PINKY_MCP, PINKY_PIP), (PINKY_PIP, PINKY_DIP), (PINKY_DIP, PINKY_TIP),
    (WRIST, PINKY_MCP),
];

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

/// Contract violations at the landmark-source boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LandmarkError {
    #[error("expected 21 landmarks, got {0}")]
    WrongCount(usize),

    #[error("unknown handedness label {0:?}")]
    UnknownHandedness(String),
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// A single normalized landmark point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Handedness
// ════════════════════════════════════════════════════════════════════════════

/// Which hand the model believes it saw.
///
/// The label refers to the mirrored frame the model was given, which is
/// why the thumb rule flips its inequality per hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn label(self) -> &'static str {
        match self {
            Handedness::Left  => "Left",
            Handedness::Right => "Right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Handedness {
    type Err = LandmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left"  => Ok(Handedness::Left),
            "right" => Ok(Handedness::Right),
            _       => Err(LandmarkError::UnknownHandedness(s.to_string())),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandObservation
// ════════════════════════════════════════════════════════════════════════════

/// One detected hand in one frame.  Built fresh every frame, never stored.
#[derive(Clone, Debug, PartialEq)]
pub struct HandObservation {
    pub landmarks:  [Landmark; LANDMARK_COUNT],
    pub handedness: Handedness,
    pub confidence: f32,
}

impl HandObservation {
    pub fn new(
        landmarks:  [Landmark; LANDMARK_COUNT],
        handedness: Handedness,
        confidence: f32,
    ) -> Self {
        HandObservation { landmarks, handedness, confidence }
    }

    /// Build from a point list of unknown length.
    ///
    /// Anything other than exactly [`LANDMARK_COUNT`] points is rejected here
    /// so that the classifiers downstream can index without checks.
    pub fn from_points(
        points:     &[Landmark],
        handedness: Handedness,
        confidence: f32,
    ) -> Result<Self, LandmarkError> {
        let landmarks: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| LandmarkError::WrongCount(points.len()))?;
        Ok(HandObservation { landmarks, handedness, confidence })
    }

    pub fn point(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }

    /// Same coordinates, opposite handedness label.
    pub fn with_handedness(&self, handedness: Handedness) -> Self {
        HandObservation { handedness, ..self.clone() }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_accepts_exactly_21() {
        let pts = vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        let hand = HandObservation::from_points(&pts, Handedness::Right, 0.9).unwrap();
        assert_eq!(hand.landmarks.len(), 21);
        assert_eq!(hand.handedness, Handedness::Right);
    }

    #[test]
    fn from_points_rejects_short_and_long() {
        let short = vec![Landmark::default(); 20];
        let long  = vec![Landmark::default(); 22];
        assert_eq!(
            HandObservation::from_points(&short, Handedness::Left, 1.0),
            Err(LandmarkError::WrongCount(20)),
        );
        assert_eq!(
            HandObservation::from_points(&long, Handedness::Left, 1.0),
            Err(LandmarkError::WrongCount(22)),
        );
    }

    #[test]
    fn handedness_parses_model_labels() {
        assert_eq!("Left".parse::<Handedness>().unwrap(),  Handedness::Left);
        assert_eq!("right".parse::<Handedness>().unwrap(), Handedness::Right);
        assert!(matches!(
            "Both".parse::<Handedness>(),
            Err(LandmarkError::UnknownHandedness(_))
        ));
    }

    #[test]
    fn connections_stay_in_range() {
        for &(a, b) in HAND_CONNECTIONS.iter() {
            assert!(a < LANDMARK_COUNT && b < LANDMARK_COUNT);
        }
    }
}
