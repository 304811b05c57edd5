//! `--check`: verify the setup before opening a window.
//!
//! Each check prints a numbered heading and a ✓ / ✗ line.  Checks that do
//! not apply to this build are shown with `–` and never fail the run.

use finger_count::{classify_fingers, classify_gesture, pose, FingerFlags, Gesture, Handedness};

use crate::app::AppConfig;
use crate::speech::find_speech_program;

/// Result of one check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Pass(String),
    Fail(String),
    Skip(String),
}

impl Outcome {
    fn mark(&self) -> &'static str {
        match self {
            Outcome::Pass(_) => "✓",
            Outcome::Fail(_) => "✗",
            Outcome::Skip(_) => "–",
        }
    }

    fn detail(&self) -> &str {
        match self {
            Outcome::Pass(s) | Outcome::Fail(s) | Outcome::Skip(s) => s,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Check {
    pub title:   &'static str,
    pub outcome: Outcome,
}

// ════════════════════════════════════════════════════════════════════════════
// Individual checks
// ════════════════════════════════════════════════════════════════════════════

/// Render every finger pattern for both hands and read it back.
pub fn classifier_self_test() -> Outcome {
    let mut failures = Vec::new();
    for flags in FingerFlags::all_patterns() {
        for hand in [Handedness::Left, Handedness::Right] {
            let got = classify_fingers(&pose::render(flags, hand, 0.5, 1.0));
            if got != flags {
                failures.push(format!("{:?} {} read as {:?}", flags.to_array(), hand, got.to_array()));
            }
        }
    }
    if classify_gesture(FingerFlags::NONE) != Gesture::Fist
        || classify_gesture(FingerFlags::ALL) != Gesture::OpenPalm
    {
        failures.push("gesture table does not start with Fist / Open Palm".to_string());
    }

    match failures.first() {
        None        => Outcome::Pass("32 finger patterns classified for both hands".to_string()),
        Some(first) => Outcome::Fail(format!("{} mismatches, first: {}", failures.len(), first)),
    }
}

pub fn speech_check(cfg: &AppConfig) -> Outcome {
    if cfg.speech.mute {
        return Outcome::Skip("speech muted".to_string());
    }
    match find_speech_program() {
        Some((program, path)) => Outcome::Pass(format!("{} at {}", program.binary(), path.display())),
        None => Outcome::Fail("no espeak-ng, espeak or say on PATH".to_string()),
    }
}

#[cfg(feature = "camera")]
pub fn camera_check(cfg: &AppConfig) -> Outcome {
    use crate::capture::{FrameSource, Webcam};

    if cfg.simulate {
        return Outcome::Skip("simulation requested".to_string());
    }
    match Webcam::open(cfg.camera_index, cfg.width, cfg.height) {
        Ok(mut cam) => {
            let outcome = match cam.grab() {
                Ok(f)  => Outcome::Pass(format!("camera {} delivers {}x{}", cfg.camera_index, f.width, f.height)),
                Err(e) => Outcome::Fail(e.to_string()),
            };
            cam.release();
            outcome
        }
        Err(e) => Outcome::Fail(e.to_string()),
    }
}

#[cfg(not(feature = "camera"))]
pub fn camera_check(_cfg: &AppConfig) -> Outcome {
    Outcome::Skip("camera support not compiled (build with --features camera)".to_string())
}

#[cfg(feature = "camera")]
pub fn detector_check(cfg: &AppConfig) -> Outcome {
    use crate::detector::MediaPipeDetector;

    if cfg.simulate {
        return Outcome::Skip("simulation requested".to_string());
    }
    match MediaPipeDetector::start(cfg.detector.clone()) {
        Ok(_)  => Outcome::Pass(format!("`{}` signalled READY", cfg.detector.command.join(" "))),
        Err(e) => Outcome::Fail(e.to_string()),
    }
}

#[cfg(not(feature = "camera"))]
pub fn detector_check(_cfg: &AppConfig) -> Outcome {
    Outcome::Skip("hands come from the keyboard simulation".to_string())
}

// ════════════════════════════════════════════════════════════════════════════
// Runner
// ════════════════════════════════════════════════════════════════════════════

pub fn run_checks(cfg: &AppConfig) -> Vec<Check> {
    vec![
        Check { title: "Finger classifier",  outcome: classifier_self_test() },
        Check { title: "Speech program",     outcome: speech_check(cfg) },
        Check { title: "Camera",             outcome: camera_check(cfg) },
        Check { title: "Hand detector",      outcome: detector_check(cfg) },
    ]
}

/// Print the report and return the process exit code.
pub fn report(checks: &[Check]) -> i32 {
    println!("{}", "=".repeat(60));
    println!("Finger Counter - Setup Verification");
    println!("{}", "=".repeat(60));

    for (i, check) in checks.iter().enumerate() {
        println!();
        println!("{}. {}...", i + 1, check.title);
        println!("   {} {}", check.outcome.mark(), check.outcome.detail());
    }

    println!();
    println!("{}", "=".repeat(60));
    let code = exit_code(checks);
    if code == 0 {
        println!("✓ ALL CHECKS PASSED");
    } else {
        println!("✗ SOME CHECKS FAILED");
    }
    code
}

pub fn exit_code(checks: &[Check]) -> i32 {
    if checks.iter().any(|c| matches!(c.outcome, Outcome::Fail(_))) { 1 } else { 0 }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn check(outcome: Outcome) -> Check {
        Check { title: "t", outcome }
    }

    #[test]
    fn classifier_passes() {
        assert!(matches!(classifier_self_test(), Outcome::Pass(_)));
    }

    #[test]
    fn skips_do_not_fail() {
        let checks = [check(Outcome::Pass("a".into())), check(Outcome::Skip("b".into()))];
        assert_eq!(exit_code(&checks), 0);
    }

    #[test]
    fn any_failure_fails() {
        let checks = [check(Outcome::Pass("a".into())), check(Outcome::Fail("b".into()))];
        assert_eq!(exit_code(&checks), 1);
    }

    #[test]
    fn muted_speech_is_skipped() {
        let mut cfg = AppConfig::default();
        cfg.speech.mute = true;
        assert!(matches!(speech_check(&cfg), Outcome::Skip(_)));
    }

    #[test]
    fn marks() {
        assert_eq!(Outcome::Pass(String::new()).mark(), "✓");
        assert_eq!(Outcome::Fail(String::new()).mark(), "✗");
        assert_eq!(Outcome::Skip("x".into()).detail(), "x");
    }
}
