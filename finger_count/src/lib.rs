//! # finger_count
//!
//! Finger-state and gesture classification over 21-point hand landmarks,
//! plus the per-session bookkeeping that sits on top of it: a debounced
//! announcement policy and a gesture histogram.
//!
//! Nothing in this crate touches a camera, a window, or a speaker.  Every
//! update takes an explicit `now: Instant`, so the whole pipeline can be
//! driven from tests without hardware.
//!
//! ## Pipeline
//!
//! | Stage | Input | Output |
//! |---|---|---|
//! | [`classify_fingers`] | one [`HandObservation`] | [`FingerFlags`] |
//! | [`classify_gesture`] | [`FingerFlags`] | [`Gesture`] |
//! | [`summarize_frame`] | all hands in a frame | [`FrameSummary`] |
//! | [`Session::observe`] | [`FrameSummary`] + `now` | [`FrameOutcome`] |
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::Instant;
//! use finger_count::{pose, FingerFlags, Handedness, Session, Gesture};
//!
//! let peace = FingerFlags::new(false, true, true, false, false);
//! let hand  = pose::render(peace, Handedness::Right, 0.5, 0.99);
//!
//! let mut session = Session::new(Instant::now());
//! let outcome = session.observe(&[hand], Instant::now(), false);
//!
//! assert_eq!(outcome.summary.total_count, 2);
//! assert_eq!(outcome.summary.gesture, Some(Gesture::PeaceSign));
//! assert_eq!(outcome.announcement.unwrap().text, "2 fingers");
//! ```

pub mod landmark;
pub mod fingers;
pub mod gesture;
pub mod frame;
pub mod announce;
pub mod stats;
pub mod session;
pub mod pose;

pub use landmark::{HandObservation, Handedness, Landmark, LandmarkError, LANDMARK_COUNT};
pub use fingers::{classify_fingers, Finger, FingerFlags};
pub use gesture::{classify_gesture, Gesture, GestureRule, GESTURE_RULES};
pub use frame::{summarize_frame, FrameSummary, HandReading};
pub use announce::{announcement_text, Announcement, AnnouncementState, ANNOUNCE_COOLDOWN};
pub use stats::SessionStats;
pub use session::{FrameOutcome, Session};
