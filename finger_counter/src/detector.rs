//! External hand-landmark detector, run as a subprocess.
//!
//! # Protocol
//!
//! | Direction | Content |
//! |---|---|
//! | child → us, once | the line `READY` |
//! | us → child, per frame | `u32` LE width, height, channels (= 3), then RGB bytes |
//! | child → us, per frame | one JSON line: `{"hands":[...],"error":null}` |
//!
//! Each hand is `{"handedness":"Left"|"Right","score":f,"landmarks":[{"x","y","z"}; 21]}`.
//! Coordinates are normalized to the frame that was sent.
//!
//! The child is started once and killed when the detector is dropped.

use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use finger_count::{HandObservation, Handedness, Landmark};
use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::capture::VideoFrame;
use crate::source::LandmarkSource;

/// Channels per pixel in the frame payload.
pub const FRAME_CHANNELS: u32 = 3;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("empty detector command")]
    NoCommand,

    #[error("failed to start detector {command:?}: {source}")]
    Spawn { command: String, source: io::Error },

    #[error("detector did not signal READY, got {0:?}")]
    Handshake(String),

    #[error("detector closed its output")]
    Closed,

    #[error("detector I/O: {0}")]
    Io(#[from] io::Error),

    #[error("unparseable detector reply {line:?}: {source}")]
    Json { line: String, source: serde_json::Error },
}

// ════════════════════════════════════════════════════════════════════════════
// Wire format
// ════════════════════════════════════════════════════════════════════════════

#[derive(Deserialize, Debug)]
struct PointJson {
    x: f32,
    y: f32,
    #[serde(default)]
    z: f32,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    handedness: String,
    score:      f32,
    landmarks:  Vec<PointJson>,
}

#[derive(Deserialize, Debug)]
struct ReplyJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Write one frame request: the 12-byte header then the RGB payload.
pub fn write_frame<W: Write>(out: &mut W, frame: &VideoFrame) -> io::Result<()> {
    out.write_all(&(frame.width  as u32).to_le_bytes())?;
    out.write_all(&(frame.height as u32).to_le_bytes())?;
    out.write_all(&FRAME_CHANNELS.to_le_bytes())?;
    out.write_all(&frame.to_rgb_bytes())?;
    out.flush()
}

/// Turn one reply line into hands.
///
/// Hands under `min_confidence`, with an unknown handedness label, or
/// without exactly 21 points are skipped with a warning.  At most
/// `max_hands` are kept, in the order the detector listed them.  A reply
/// carrying an `error` yields no hands.
pub fn parse_detection(
    line:           &str,
    min_confidence: f32,
    max_hands:      usize,
) -> Result<Vec<HandObservation>, DetectorError> {
    let reply: ReplyJson = serde_json::from_str(line.trim()).map_err(|source| DetectorError::Json {
        line: line.trim().to_string(),
        source,
    })?;

    if let Some(err) = reply.error {
        warn!("Detector error: {}", err);
        return Ok(Vec::new());
    }

    let mut hands = Vec::new();
    for hand in reply.hands {
        if hands.len() == max_hands { break; }
        if hand.score < min_confidence {
            debug!("Dropping {} hand, score {:.2}", hand.handedness, hand.score);
            continue;
        }
        let handedness: Handedness = match hand.handedness.parse() {
            Ok(h)  => h,
            Err(e) => { warn!("Skipping hand: {}", e); continue; }
        };
        let points: Vec<Landmark> = hand.landmarks
            .iter()
            .map(|p| Landmark::new(p.x, p.y, p.z))
            .collect();
        match HandObservation::from_points(&points, handedness, hand.score) {
            Ok(obs) => hands.push(obs),
            Err(e)  => warn!("Skipping {} hand: {}", handedness, e),
        }
    }
    Ok(hands)
}

// ════════════════════════════════════════════════════════════════════════════
// MediaPipeDetector
// ════════════════════════════════════════════════════════════════════════════

/// Settings for starting the detector.
#[derive(Clone, Debug)]
pub struct DetectorConfig {
    /// Program followed by its arguments.
    pub command:        Vec<String>,
    pub min_confidence: f32,
    pub max_hands:      usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            command:        vec!["python3".to_string(), "hand_detect.py".to_string()],
            min_confidence: 0.5,
            max_hands:      2,
        }
    }
}

pub struct MediaPipeDetector {
    child:  Child,
    stdin:  ChildStdin,
    stdout: BufReader<ChildStdout>,
    config: DetectorConfig,
}

impl MediaPipeDetector {
    /// Spawn the detector and wait for its `READY` line.
    pub fn start(config: DetectorConfig) -> Result<Self, DetectorError> {
        let (program, args) = config.command.split_first().ok_or(DetectorError::NoCommand)?;
        let command = config.command.join(" ");
        info!("Starting hand detector: {}", command);

        let mut cmd = Command::new(program);
        // Own process group: a terminal Ctrl-C reaches only us, and the
        // child is stopped from Drop after the loop winds down.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        let mut child = cmd
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| DetectorError::Spawn { command: command.clone(), source })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(i), Some(o)) => (i, BufReader::new(o)),
            _ => {
                let _ = child.kill();
                return Err(DetectorError::Closed);
            }
        };

        let mut detector = MediaPipeDetector { child, stdin, stdout, config };
        let line = detector.read_line()?;
        if line.trim() != "READY" {
            return Err(DetectorError::Handshake(line.trim().to_string()));
        }
        info!("Hand detector ready");
        Ok(detector)
    }

    fn read_line(&mut self) -> Result<String, DetectorError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(DetectorError::Closed);
        }
        Ok(line)
    }
}

impl LandmarkSource for MediaPipeDetector {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<HandObservation>, DetectorError> {
        write_frame(&mut self.stdin, frame)?;
        let line = self.read_line()?;
        parse_detection(&line, self.config.min_confidence, self.config.max_hands)
    }

    fn describe(&self) -> String {
        format!("detector `{}`", self.config.command.join(" "))
    }
}

impl Drop for MediaPipeDetector {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
