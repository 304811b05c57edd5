//! Top-level application: configuration, per-frame state, and the run loop.
//!
//! `AppState` owns the [`Session`] and the [`Speaker`].  The frame source,
//! landmark source and [`Screen`] live in `Resources`, whose `Drop` is the
//! single cleanup path for every way out of the loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use finger_count::{
    announcement_text, FrameOutcome, FrameSummary, HandObservation, Session, ANNOUNCE_COOLDOWN,
};
use log::{debug, error, info, warn};

use crate::capture::{Backdrop, FrameSource};
use crate::detector::DetectorConfig;
use crate::overlay::{Overlay, Scene, Screen};
use crate::source::{LandmarkSource, SimKey, SimLandmarkSource};
use crate::speech::{open_speech_engine, SpeechConfig, Speaker};

const SIM_LEGEND: &str = "0-5 count  R rock on  T thumb  H second hand  N hide hands  Q quit";
const CAM_LEGEND: &str = "Q quit";

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub camera_index: i32,
    pub width:        u32,
    pub height:       u32,
    /// Use the keyboard simulation even when camera support is compiled in.
    pub simulate:     bool,
    pub detector:     DetectorConfig,
    pub speech:       SpeechConfig,
    pub cooldown:     Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            camera_index: 0,
            width:        1280,
            height:       720,
            simulate:     false,
            detector:     DetectorConfig::default(),
            speech:       SpeechConfig::default(),
            cooldown:     ANNOUNCE_COOLDOWN,
        }
    }
}

impl AppConfig {
    /// Whether this run uses simulated frames and hands.
    pub fn simulated(&self) -> bool {
        self.simulate || !cfg!(feature = "camera")
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    session: Session,
    speaker: Speaker,

    // ── last frame, kept for the overlay ─────────────────────────────────
    summary: FrameSummary,
    hands:   Vec<HandObservation>,
}

impl AppState {
    pub fn new(speaker: Speaker, cooldown: Duration, started: Instant) -> Self {
        AppState {
            session: Session::with_cooldown(started, cooldown),
            speaker,
            summary: FrameSummary::default(),
            hands:   Vec::new(),
        }
    }

    /// Fold one frame's hands into the session and speak if allowed.
    pub fn process_frame(&mut self, hands: Vec<HandObservation>, now: Instant) -> FrameOutcome {
        let outcome = self.session.observe(&hands, now, self.speaker.is_busy());

        if outcome.changed {
            match outcome.summary.gesture {
                Some(g) => info!("Fingers: {}  gesture: {}", outcome.summary.total_count, g),
                None    => info!("Fingers: {}  (no hands)", outcome.summary.total_count),
            }
        }
        if let Some(announcement) = &outcome.announcement {
            if !self.speaker.dispatch(announcement.text.clone()) {
                debug!("Speaker busy, dropped {:?}", announcement.text);
            }
        }

        self.summary = outcome.summary.clone();
        self.hands   = hands;
        outcome
    }

    /// Statistics panel text.
    pub fn stats_lines(&self, now: Instant) -> Vec<String> {
        let stats = self.session.stats();
        let mut lines = vec![
            format!("Runtime: {}", stats.runtime_label(now)),
            format!("Total Gestures: {}", stats.total_gestures()),
            match stats.current_count() {
                Some(n) => format!("Current: {}", announcement_text(n)),
                None    => "Current: N/A".to_string(),
            },
        ];
        if let Some((gesture, n)) = stats.most_common() {
            lines.push(format!("Most Common: {} ({}x)", gesture, n));
        }
        lines
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn summary(&self) -> &FrameSummary       { &self.summary }
    pub fn hands(&self)   -> &[HandObservation]  { &self.hands }
    pub fn session(&self) -> &Session            { &self.session }
}

// ════════════════════════════════════════════════════════════════════════════
// Resources: released on every exit path
// ════════════════════════════════════════════════════════════════════════════

struct Resources {
    frames:    Box<dyn FrameSource>,
    landmarks: Box<dyn LandmarkSource>,
    screen:    Box<dyn Screen>,
}

impl Drop for Resources {
    fn drop(&mut self) {
        info!("Releasing {} and {}", self.frames.describe(), self.landmarks.describe());
        self.frames.release();
        // window and detector process go with their own Drop
        info!("Cleanup complete");
    }
}

fn open_sources(
    cfg:    &AppConfig,
    sim_rx: Receiver<SimKey>,
) -> Result<(Box<dyn FrameSource>, Box<dyn LandmarkSource>)> {
    if cfg.simulated() {
        let frames = Backdrop::new(cfg.width as usize, cfg.height as usize);
        return Ok((Box::new(frames), Box::new(SimLandmarkSource::new(sim_rx))));
    }
    open_hardware(cfg)
}

#[cfg(feature = "camera")]
fn open_hardware(cfg: &AppConfig) -> Result<(Box<dyn FrameSource>, Box<dyn LandmarkSource>)> {
    use crate::capture::Webcam;
    use crate::detector::MediaPipeDetector;

    let camera = Webcam::open(cfg.camera_index, cfg.width, cfg.height)
        .context("could not open webcam")?;
    let detector = MediaPipeDetector::start(cfg.detector.clone())
        .context("could not start the hand detector")?;
    Ok((Box::new(camera), Box::new(detector)))
}

#[cfg(not(feature = "camera"))]
fn open_hardware(_cfg: &AppConfig) -> Result<(Box<dyn FrameSource>, Box<dyn LandmarkSource>)> {
    anyhow::bail!("camera support not compiled in; rebuild with --features camera")
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Why the frame loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoopExit {
    WindowClosed,
    QuitRequested,
    Interrupted,
    /// The frame source stopped delivering.
    ReadFailed,
    /// Detection or presentation failed; logged as a loop error.
    Failed,
}

/// Run the full application.
///
/// Startup failures (camera, detector, window) are returned as errors.
/// Once the loop is running, every way out (quit key, closed window, frame
/// read failure, loop error, Ctrl-C) releases resources and returns `Ok`.
pub fn run(cfg: AppConfig) -> Result<()> {
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&interrupted);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .context("could not install Ctrl-C handler")?;
    }

    let simulated = cfg.simulated();
    let (sim_tx, sim_rx) = mpsc::channel::<SimKey>();
    let (frames, landmarks) = open_sources(&cfg, sim_rx)?;
    let overlay = Overlay::open(simulated.then_some(sim_tx))
        .context("could not create the display window")?;

    let res = Resources { frames, landmarks, screen: Box::new(overlay) };
    info!("Frames from {}, hands from {}", res.frames.describe(), res.landmarks.describe());

    let speaker = Speaker::new(open_speech_engine(cfg.speech));
    let mut app = AppState::new(speaker, cfg.cooldown, Instant::now());

    let legend = if simulated { SIM_LEGEND } else { CAM_LEGEND };
    let exit = drive(res, &mut app, &interrupted, legend);
    debug!("Loop ended: {:?}", exit);

    let stats = app.session().stats();
    info!(
        "Session over after {}: {} gestures",
        stats.runtime_label(Instant::now()),
        stats.total_gestures(),
    );
    Ok(())
}

/// Run the loop to its end, then release `res`.
///
/// An error raised after Ctrl-C is reported as the interrupt: the detector
/// child may have seen the same SIGINT and gone away mid-frame.
fn drive(mut res: Resources, app: &mut AppState, interrupted: &AtomicBool, legend: &str) -> LoopExit {
    let exit = match run_loop(&mut res, app, interrupted, legend) {
        Ok(exit) => exit,
        Err(e) if interrupted.load(Ordering::SeqCst) => {
            debug!("Loop error after interrupt: {:#}", e);
            info!("Interrupted by user");
            LoopExit::Interrupted
        }
        Err(e) => {
            error!("Error in main loop: {:?}", e);
            LoopExit::Failed
        }
    };
    drop(res);
    exit
}

fn run_loop(
    res:         &mut Resources,
    app:         &mut AppState,
    interrupted: &AtomicBool,
    legend:      &str,
) -> Result<LoopExit> {
    while res.screen.is_open() {
        if interrupted.load(Ordering::SeqCst) {
            info!("Interrupted by user");
            return Ok(LoopExit::Interrupted);
        }
        if !res.screen.poll_input() {
            info!("Quit requested");
            return Ok(LoopExit::QuitRequested);
        }

        let mut frame = match res.frames.grab() {
            Ok(f)  => f,
            Err(e) => {
                warn!("Failed to read frame: {}", e);
                return Ok(LoopExit::ReadFailed);
            }
        };
        frame.mirror();

        let hands = res.landmarks.detect(&frame).context("hand detection failed")?;
        let now = Instant::now();
        app.process_frame(hands, now);

        let stats = app.stats_lines(now);
        let scene = Scene {
            summary: app.summary(),
            hands:   app.hands(),
            stats:   &stats,
            legend:  Some(legend),
        };
        res.screen.render(&frame, &scene).context("could not present frame")?;
    }
    Ok(LoopExit::WindowClosed)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureError, VideoFrame};
    use crate::detector::DetectorError;
    use crate::speech::{NullSpeech, SpeechEngine, SpeechError};
    use finger_count::{pose, FingerFlags, Handedness};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl SpeechEngine for Recorder {
        fn say(&mut self, text: &str) -> Result<(), SpeechError> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
        fn describe(&self) -> String { "recorder".to_string() }
    }

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    fn hand(flags: FingerFlags) -> HandObservation {
        pose::render(flags, Handedness::Right, 0.5, 0.9)
    }

    const PEACE: FingerFlags = FingerFlags::new(false, true, true, false, false);

    // ── loop fixtures ─────────────────────────────────────────────────────

    /// Delivers frames until `fail_at` grabs have been made.
    struct FlakyCamera {
        grabs:    usize,
        fail_at:  usize,
        releases: Arc<AtomicUsize>,
    }

    impl FrameSource for FlakyCamera {
        fn grab(&mut self) -> Result<VideoFrame, CaptureError> {
            self.grabs += 1;
            if self.grabs >= self.fail_at {
                return Err(CaptureError::Read("device unplugged".to_string()));
            }
            Ok(VideoFrame::filled(8, 6, 0xFF101010))
        }
        fn describe(&self) -> String { "flaky camera".to_string() }
        fn release(&mut self) { self.releases.fetch_add(1, Ordering::SeqCst); }
    }

    struct OneHand(FingerFlags);

    impl LandmarkSource for OneHand {
        fn detect(&mut self, _frame: &VideoFrame) -> Result<Vec<HandObservation>, DetectorError> {
            Ok(vec![hand(self.0)])
        }
        fn describe(&self) -> String { "one hand".to_string() }
    }

    /// Fails every frame; optionally sets the interrupt flag first, the way
    /// a detector killed by the terminal's SIGINT looks to the loop.
    struct DeadDetector(Option<Arc<AtomicBool>>);

    impl LandmarkSource for DeadDetector {
        fn detect(&mut self, _frame: &VideoFrame) -> Result<Vec<HandObservation>, DetectorError> {
            if let Some(flag) = &self.0 {
                flag.store(true, Ordering::SeqCst);
            }
            Err(DetectorError::Closed)
        }
        fn describe(&self) -> String { "dead detector".to_string() }
    }

    struct FakeScreen {
        open:     bool,
        polls:    usize,
        quit_at:  Option<usize>,
        rendered: Arc<AtomicUsize>,
    }

    impl Screen for FakeScreen {
        fn is_open(&self) -> bool { self.open }
        fn poll_input(&mut self) -> bool {
            self.polls += 1;
            self.quit_at != Some(self.polls)
        }
        fn render(&mut self, _frame: &VideoFrame, _scene: &Scene<'_>) -> Result<(), minifb::Error> {
            self.rendered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Rig {
        releases: Arc<AtomicUsize>,
        rendered: Arc<AtomicUsize>,
    }

    impl Rig {
        fn new() -> Self {
            Rig { releases: Arc::new(AtomicUsize::new(0)), rendered: Arc::new(AtomicUsize::new(0)) }
        }

        fn resources(
            &self,
            fail_at:     usize,
            landmarks:   Box<dyn LandmarkSource>,
            screen_open: bool,
            quit_at:     Option<usize>,
        ) -> Resources {
            Resources {
                frames: Box::new(FlakyCamera { grabs: 0, fail_at, releases: Arc::clone(&self.releases) }),
                landmarks,
                screen: Box::new(FakeScreen {
                    open: screen_open,
                    polls: 0,
                    quit_at,
                    rendered: Arc::clone(&self.rendered),
                }),
            }
        }

        fn releases(&self) -> usize { self.releases.load(Ordering::SeqCst) }
        fn rendered(&self) -> usize { self.rendered.load(Ordering::SeqCst) }
    }

    fn quiet_app() -> AppState {
        AppState::new(Speaker::new(Box::new(NullSpeech)), ANNOUNCE_COOLDOWN, Instant::now())
    }

    #[test]
    fn default_config_values() {
        let cfg = AppConfig::default();
        assert_eq!((cfg.width, cfg.height), (1280, 720));
        assert_eq!(cfg.cooldown, ms(1500));
        assert_eq!(cfg.speech.rate, 150);
        assert_eq!(cfg.detector.max_hands, 2);
    }

    #[test]
    fn stats_lines_before_any_frame() {
        let t0 = Instant::now();
        let app = AppState::new(Speaker::new(Box::new(NullSpeech)), ANNOUNCE_COOLDOWN, t0);
        assert_eq!(app.stats_lines(t0), vec![
            "Runtime: 0:00:00".to_string(),
            "Total Gestures: 0".to_string(),
            "Current: N/A".to_string(),
        ]);
    }

    #[test]
    fn stats_lines_after_a_gesture() {
        let t0 = Instant::now();
        let mut app = AppState::new(Speaker::new(Box::new(NullSpeech)), ANNOUNCE_COOLDOWN, t0);
        app.process_frame(vec![hand(PEACE)], t0);
        assert_eq!(app.stats_lines(t0 + ms(65_000)), vec![
            "Runtime: 0:01:05".to_string(),
            "Total Gestures: 1".to_string(),
            "Current: 2 fingers".to_string(),
            "Most Common: Peace Sign (1x)".to_string(),
        ]);
    }

    #[test]
    fn announcements_reach_the_speaker() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let t0 = Instant::now();
        let mut app = AppState::new(Speaker::new(Box::new(Recorder(Arc::clone(&log)))), ANNOUNCE_COOLDOWN, t0);

        app.process_frame(vec![hand(PEACE)], t0);
        app.speaker.wait();
        // inside the cooldown: counted, not spoken
        app.process_frame(vec![hand(FingerFlags::ALL)], t0 + ms(500));
        app.speaker.wait();
        app.process_frame(Vec::new(), t0 + ms(2_000));
        app.speaker.wait();

        assert_eq!(*log.lock().unwrap(), vec!["2 fingers", "0 fingers"]);
        assert_eq!(app.session().stats().total_gestures(), 2);
    }

    #[test]
    fn last_frame_is_kept_for_rendering() {
        let t0 = Instant::now();
        let mut app = AppState::new(Speaker::new(Box::new(NullSpeech)), ANNOUNCE_COOLDOWN, t0);
        let outcome = app.process_frame(vec![hand(PEACE), hand(FingerFlags::ALL)], t0);
        assert_eq!(outcome.summary.total_count, 7);
        assert_eq!(app.summary(), &outcome.summary);
        assert_eq!(app.hands().len(), 2);

        app.process_frame(Vec::new(), t0 + ms(10));
        assert!(app.hands().is_empty());
        assert_eq!(app.summary().gesture, None);
    }

    #[test]
    fn frame_read_failure_ends_the_session_and_releases_once() {
        let rig = Rig::new();
        let mut app = quiet_app();
        let flag = AtomicBool::new(false);
        let res = rig.resources(3, Box::new(OneHand(PEACE)), true, None);

        assert_eq!(drive(res, &mut app, &flag, CAM_LEGEND), LoopExit::ReadFailed);
        assert_eq!(rig.rendered(), 2);
        assert_eq!(rig.releases(), 1);
        assert_eq!(app.session().stats().total_gestures(), 1);
    }

    #[test]
    fn quit_key_stops_the_loop() {
        let rig = Rig::new();
        let mut app = quiet_app();
        let flag = AtomicBool::new(false);
        let res = rig.resources(usize::MAX, Box::new(OneHand(PEACE)), true, Some(4));

        assert_eq!(drive(res, &mut app, &flag, SIM_LEGEND), LoopExit::QuitRequested);
        assert_eq!(rig.rendered(), 3);
        assert_eq!(rig.releases(), 1);
    }

    #[test]
    fn closed_window_ends_without_grabbing() {
        let rig = Rig::new();
        let mut app = quiet_app();
        let flag = AtomicBool::new(false);
        let res = rig.resources(1, Box::new(OneHand(PEACE)), false, None);

        assert_eq!(drive(res, &mut app, &flag, CAM_LEGEND), LoopExit::WindowClosed);
        assert_eq!(rig.rendered(), 0);
        assert_eq!(rig.releases(), 1);
    }

    #[test]
    fn interrupt_flag_stops_before_the_next_frame() {
        let rig = Rig::new();
        let mut app = quiet_app();
        let flag = AtomicBool::new(true);
        let res = rig.resources(usize::MAX, Box::new(OneHand(PEACE)), true, None);

        assert_eq!(drive(res, &mut app, &flag, CAM_LEGEND), LoopExit::Interrupted);
        assert_eq!(rig.rendered(), 0);
        assert_eq!(rig.releases(), 1);
    }

    #[test]
    fn detector_lost_to_ctrl_c_is_an_interrupt() {
        let rig = Rig::new();
        let mut app = quiet_app();
        let flag = Arc::new(AtomicBool::new(false));
        let res = rig.resources(usize::MAX, Box::new(DeadDetector(Some(Arc::clone(&flag)))), true, None);

        assert_eq!(drive(res, &mut app, &flag, CAM_LEGEND), LoopExit::Interrupted);
        assert_eq!(rig.releases(), 1);
    }

    #[test]
    fn detector_failure_is_a_loop_error_with_cleanup() {
        let rig = Rig::new();
        let mut app = quiet_app();
        let flag = AtomicBool::new(false);
        let res = rig.resources(usize::MAX, Box::new(DeadDetector(None)), true, None);

        assert_eq!(drive(res, &mut app, &flag, CAM_LEGEND), LoopExit::Failed);
        assert!(!flag.load(Ordering::SeqCst));
        assert_eq!(rig.rendered(), 0);
        assert_eq!(rig.releases(), 1);
    }
}
