//! Video frames and where they come from.
//!
//! Two [`FrameSource`]s exist:
//!
//! * [`Backdrop`]: a generated gradient the size of the requested capture;
//!   used in simulation mode where no camera is attached.
//! * `Webcam`: OpenCV `VideoCapture` (feature `camera`).
//!
//! Frames are packed `0xAARRGGBB`, the layout `minifb` draws directly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("could not open camera {index}: {reason}")]
    Open { index: i32, reason: String },

    #[error("failed to grab frame: {0}")]
    Read(String),

    #[error("frame buffer has {got} bytes, expected {expected}")]
    Format { expected: usize, got: usize },
}

// ════════════════════════════════════════════════════════════════════════════
// VideoFrame
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFrame {
    pub width:  usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl VideoFrame {
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        VideoFrame { width, height, pixels: vec![color; width * height] }
    }

    /// Pack a tightly-strided BGR byte buffer (the OpenCV default layout).
    pub fn from_bgr(width: usize, height: usize, bytes: &[u8]) -> Result<Self, CaptureError> {
        let expected = width * height * 3;
        if bytes.len() != expected {
            return Err(CaptureError::Format { expected, got: bytes.len() });
        }
        let pixels = bytes
            .chunks_exact(3)
            .map(|bgr| pack_rgb(bgr[2], bgr[1], bgr[0]))
            .collect();
        Ok(VideoFrame { width, height, pixels })
    }

    /// Flip left ↔ right in place, so the user sees a mirror.
    pub fn mirror(&mut self) {
        if self.width == 0 { return; }
        for row in self.pixels.chunks_exact_mut(self.width) {
            row.reverse();
        }
    }

    /// Interleaved RGB bytes, row-major.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for &p in &self.pixels {
            out.push(((p >> 16) & 0xFF) as u8);
            out.push(((p >>  8) & 0xFF) as u8);
            out.push(( p        & 0xFF) as u8);
        }
        out
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }
}

pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    0xFF000000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSource
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can hand the run loop one frame at a time.
pub trait FrameSource {
    /// Block until the next frame is available.
    fn grab(&mut self) -> Result<VideoFrame, CaptureError>;

    /// Human-readable name for logs.
    fn describe(&self) -> String;

    /// Give the device back.  Called exactly once, from cleanup.
    fn release(&mut self) {}
}

// ── Backdrop ──────────────────────────────────────────────────────────────

/// Static vertical gradient standing in for the camera.
pub struct Backdrop {
    frame: VideoFrame,
}

impl Backdrop {
    pub fn new(width: usize, height: usize) -> Self {
        let mut frame = VideoFrame::filled(width, height, 0xFF000000);
        for y in 0..height {
            let t = y as f32 / height.max(1) as f32;
            let color = pack_rgb(
                (26.0 + 20.0 * t) as u8,
                (26.0 + 12.0 * t) as u8,
                (46.0 + 40.0 * t) as u8,
            );
            frame.pixels[y * width..(y + 1) * width].fill(color);
        }
        Backdrop { frame }
    }
}

impl FrameSource for Backdrop {
    fn grab(&mut self) -> Result<VideoFrame, CaptureError> {
        Ok(self.frame.clone())
    }

    fn describe(&self) -> String {
        format!("simulated backdrop {}x{}", self.frame.width, self.frame.height)
    }
}

// ── Webcam (feature = "camera") ───────────────────────────────────────────

#[cfg(feature = "camera")]
pub use webcam::Webcam;

#[cfg(feature = "camera")]
mod webcam {
    use super::{CaptureError, FrameSource, VideoFrame};
    use log::{info, warn};
    use opencv::{core::Mat, prelude::*, videoio};

    pub struct Webcam {
        cap:   videoio::VideoCapture,
        mat:   Mat,
        index: i32,
    }

    impl Webcam {
        /// Open device `index` and ask for `width`×`height`.  The driver may
        /// pick something else; frames report their real size.
        pub fn open(index: i32, width: u32, height: u32) -> Result<Self, CaptureError> {
            let open_err = |reason: String| CaptureError::Open { index, reason };

            let mut cap = videoio::VideoCapture::new(index, videoio::CAP_ANY)
                .map_err(|e| open_err(e.to_string()))?;
            if !cap.is_opened().map_err(|e| open_err(e.to_string()))? {
                return Err(open_err("device not available".to_string()));
            }

            if let Err(e) = cap.set(videoio::CAP_PROP_FRAME_WIDTH, width as f64) {
                warn!("camera {}: cannot request width {}: {}", index, width, e);
            }
            if let Err(e) = cap.set(videoio::CAP_PROP_FRAME_HEIGHT, height as f64) {
                warn!("camera {}: cannot request height {}: {}", index, height, e);
            }
            info!("Camera {} opened, requested {}x{}", index, width, height);

            Ok(Webcam { cap, mat: Mat::default(), index })
        }
    }

    impl FrameSource for Webcam {
        fn grab(&mut self) -> Result<VideoFrame, CaptureError> {
            let ok = self.cap
                .read(&mut self.mat)
                .map_err(|e| CaptureError::Read(e.to_string()))?;
            if !ok || self.mat.empty() {
                return Err(CaptureError::Read("camera returned no frame".to_string()));
            }

            let width  = self.mat.cols() as usize;
            let height = self.mat.rows() as usize;
            let bytes  = self.mat
                .data_bytes()
                .map_err(|e| CaptureError::Read(e.to_string()))?;
            VideoFrame::from_bgr(width, height, bytes)
        }

        fn describe(&self) -> String {
            format!("camera {}", self.index)
        }

        fn release(&mut self) {
            if let Err(e) = self.cap.release() {
                warn!("camera {}: release failed: {}", self.index, e);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
