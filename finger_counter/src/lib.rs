//! # finger_counter
//!
//! Live finger counter: webcam frames in, hand landmarks from an external
//! detector, finger count and gesture on screen, spoken count changes.
//! The classification itself lives in the `finger_count` crate.
//!
//! ## Per-frame flow
//!
//! | Step | Module |
//! |---|---|
//! | grab and mirror a frame | [`capture`] |
//! | find hands | [`source`] / [`detector`] |
//! | classify, aggregate, debounce, count | `finger_count::Session` |
//! | speak a changed count | [`speech`] |
//! | draw count, gesture, stats, skeleton | [`overlay`] |
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: a generated backdrop and keyboard-driven hands.
//! * `camera`: **Hardware mode**: OpenCV webcam capture plus the detector subprocess.
//!
//! ### Keys
//!
//! | Key | Effect |
//! |---|---|
//! | `0`–`5` | show that many fingers (simulation) |
//! | `R` | rock-on hand (simulation) |
//! | `T` | thumb only (simulation) |
//! | `H` | toggle a second, open hand (simulation) |
//! | `N` | hide / show the hands (simulation) |
//! | `Q` / `Escape` | quit |

pub mod capture;
pub mod source;
pub mod detector;
pub mod speech;
pub mod overlay;
pub mod app;
pub mod check;
