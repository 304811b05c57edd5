//! Software-rendered overlay window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ ┌──────────────────────┐             ▓▓                          │
//! │ │ Runtime: 0:01:23     │             ▓▓   big count              │
//! │ │ Total Gestures: 14   │                                         │
//! │ │ Current: 2 fingers   │       [ Peace Sign ]                    │
//! │ │ Most Common: ...     │                                         │
//! │ └──────────────────────┘          (hand skeleton)                │
//! │                                                                  │
//! │ key legend                                                       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All drawing goes into a [`Canvas`]; the window only presents it.

use std::sync::mpsc::Sender;

use finger_count::landmark::HAND_CONNECTIONS;
use finger_count::{FrameSummary, HandObservation};
use log::debug;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::capture::VideoFrame;
use crate::source::SimKey;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:        usize = 1280;
pub const WIN_H:        usize = 720;
pub const WINDOW_TITLE: &str  = "Finger Counter";

const PANEL_X:      isize = 10;
const PANEL_Y:      isize = 10;
const PANEL_W:      usize = 440;
const PANEL_H:      usize = 140;
const PANEL_SCALE:  usize = 3;
const PANEL_LINE:   isize = 30;
const COUNT_SCALE:  usize = 16;
const COUNT_Y:      isize = 40;
const LABEL_SCALE:  usize = 4;
const LABEL_Y:      isize = 150;
const LEGEND_SCALE: usize = 2;
const DOT_RADIUS:   isize = 4;

const BLACK:        u32 = 0xFF000000;
const WHITE:        u32 = 0xFFFFFFFF;
const LEGEND_COLOR: u32 = 0xFFAAAAAA;
const BONE_COLOR:   u32 = 0xFF00DC00;
const JOINT_COLOR:  u32 = 0xFFFF3030;
const PANEL_ALPHA:  f32 = 0.7;

/// Color of the big count, by number of fingers.
pub fn count_color(count: u32) -> u32 {
    match count {
        0 => 0xFF323232, // dark gray
        1 => 0xFFFFFF00, // yellow
        2 => 0xFF00FF00, // green
        3 => 0xFF00A5FF, // azure
        4 => 0xFFFFA500, // orange
        _ => 0xFFFF00FF, // magenta
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

/// ARGB pixel buffer with clipped drawing primitives.
pub struct Canvas {
    pub width:  usize,
    pub height: usize,
    pub buf:    Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { width, height, buf: vec![BLACK; width * height] }
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.buf[y * self.width + x]
    }

    pub fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    /// Clip a rectangle to the canvas; `None` if nothing is left.
    fn clip(&self, x: isize, y: isize, w: usize, h: usize) -> Option<(usize, usize, usize, usize)> {
        let x0 = x.max(0) as usize;
        let y0 = y.max(0) as usize;
        let x1 = (x + w as isize).clamp(0, self.width  as isize) as usize;
        let y1 = (y + h as isize).clamp(0, self.height as isize) as usize;
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    pub fn fill_rect(&mut self, x: isize, y: isize, w: usize, h: usize, color: u32) {
        if let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) {
            for row in y0..y1 {
                self.buf[row * self.width + x0..row * self.width + x1].fill(color);
            }
        }
    }

    /// Cover a rectangle with `color` at opacity `alpha`.
    pub fn shade_rect(&mut self, x: isize, y: isize, w: usize, h: usize, color: u32, alpha: f32) {
        if let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) {
            for row in y0..y1 {
                for px in &mut self.buf[row * self.width + x0..row * self.width + x1] {
                    *px = blend(*px, color, alpha);
                }
            }
        }
    }

    /// Bresenham line, `thickness` pixels square.
    pub fn draw_line(&mut self, from: (isize, isize), to: (isize, isize), thickness: usize, color: u32) {
        let (mut x, mut y) = from;
        let dx =  (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        let half = (thickness / 2) as isize;

        loop {
            self.fill_rect(x - half, y - half, thickness.max(1), thickness.max(1), color);
            if x == to.0 && y == to.1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    pub fn fill_disc(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Text in the 3×5 font, each font pixel drawn `scale`×`scale`.
    pub fn draw_text(&mut self, text: &str, x: isize, y: isize, scale: usize, color: u32) {
        let s = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            for (row, &bits) in glyph(ch).iter().enumerate() {
                for col in 0..3 {
                    if bits & (0b100 >> col) != 0 {
                        self.fill_rect(cx + (col * s) as isize, y + (row * s) as isize, s, s, color);
                    }
                }
            }
            cx += (4 * s) as isize;
            if cx >= self.width as isize { break; }
        }
    }

    /// Fill with `frame`, nearest-neighbour scaled to the canvas size.
    pub fn blit_scaled(&mut self, frame: &VideoFrame) {
        if frame.width == 0 || frame.height == 0 {
            self.buf.fill(BLACK);
            return;
        }
        for y in 0..self.height {
            let sy = y * frame.height / self.height;
            let src = &frame.pixels[sy * frame.width..(sy + 1) * frame.width];
            let dst = &mut self.buf[y * self.width..(y + 1) * self.width];
            for (x, px) in dst.iter_mut().enumerate() {
                *px = src[x * frame.width / self.width];
            }
        }
    }
}

/// Width in pixels of `text` at `scale`, without the trailing gap.
pub fn text_width(text: &str, scale: usize) -> usize {
    let n = text.chars().count();
    if n == 0 { 0 } else { (n * 4 - 1) * scale.max(1) }
}

pub fn text_height(scale: usize) -> usize {
    5 * scale.max(1)
}

// ════════════════════════════════════════════════════════════════════════════
// Scene
// ════════════════════════════════════════════════════════════════════════════

/// Everything drawn on top of one video frame.
pub struct Scene<'a> {
    pub summary: &'a FrameSummary,
    pub hands:   &'a [HandObservation],
    /// Statistics panel lines, top to bottom.
    pub stats:   &'a [String],
    pub legend:  Option<&'a str>,
}

/// Draw `frame` and the overlay for `scene` into `canvas`.
pub fn compose(canvas: &mut Canvas, frame: &VideoFrame, scene: &Scene<'_>) {
    canvas.blit_scaled(frame);

    for hand in scene.hands {
        draw_skeleton(canvas, hand);
    }

    draw_stats_panel(canvas, scene.stats);
    draw_count(canvas, scene.summary.total_count);
    if let Some(gesture) = scene.summary.gesture {
        draw_gesture_label(canvas, &gesture.to_string());
    }

    if let Some(legend) = scene.legend {
        let y = canvas.height as isize - (text_height(LEGEND_SCALE) as isize + 12);
        canvas.draw_text(legend, 12, y, LEGEND_SCALE, LEGEND_COLOR);
    }
}

/// Landmarks may lie outside the frame; lines are only walked this far past
/// the canvas edge.
const SKELETON_MARGIN: f32 = 64.0;

/// Normalized landmark coordinates to canvas pixels, clamped to
/// [`SKELETON_MARGIN`] around the canvas.  NaN lands on the origin.
pub fn project(x: f32, y: f32, width: usize, height: usize) -> (isize, isize) {
    let axis = |v: f32, len: usize| {
        let len = len as f32;
        let px = if v.is_nan() { 0.0 } else { v * len };
        px.clamp(-SKELETON_MARGIN, len + SKELETON_MARGIN) as isize
    };
    (axis(x, width), axis(y, height))
}

fn draw_skeleton(canvas: &mut Canvas, hand: &HandObservation) {
    let (w, h) = (canvas.width, canvas.height);
    let at = |i: usize| {
        let p = hand.point(i);
        project(p.x, p.y, w, h)
    };
    for &(a, b) in HAND_CONNECTIONS.iter() {
        canvas.draw_line(at(a), at(b), 3, BONE_COLOR);
    }
    for i in 0..hand.landmarks.len() {
        let (x, y) = at(i);
        canvas.fill_disc(x, y, DOT_RADIUS, JOINT_COLOR);
    }
}

fn draw_stats_panel(canvas: &mut Canvas, lines: &[String]) {
    canvas.shade_rect(PANEL_X, PANEL_Y, PANEL_W, PANEL_H, BLACK, PANEL_ALPHA);
    for (i, line) in lines.iter().enumerate() {
        let y = PANEL_Y + 14 + i as isize * PANEL_LINE;
        canvas.draw_text(line, PANEL_X + 12, y, PANEL_SCALE, WHITE);
    }
}

fn draw_count(canvas: &mut Canvas, count: u32) {
    let text = count.to_string();
    let x = (canvas.width as isize - text_width(&text, COUNT_SCALE) as isize) / 2;
    canvas.draw_text(&text, x + 4, COUNT_Y + 4, COUNT_SCALE, BLACK);
    canvas.draw_text(&text, x, COUNT_Y, COUNT_SCALE, count_color(count));
}

fn draw_gesture_label(canvas: &mut Canvas, label: &str) {
    let w = text_width(label, LABEL_SCALE) as isize;
    let h = text_height(LABEL_SCALE) as isize;
    let x = (canvas.width as isize - w) / 2;
    let y = COUNT_Y + text_height(COUNT_SCALE) as isize + LABEL_Y - 120;
    canvas.shade_rect(x - 12, y - 10, (w + 24) as usize, (h + 20) as usize, BLACK, PANEL_ALPHA);
    canvas.draw_text(label, x, y, LABEL_SCALE, WHITE);
}

// ════════════════════════════════════════════════════════════════════════════
// Overlay window
// ════════════════════════════════════════════════════════════════════════════

/// Where composed frames go.  The run loop only talks to this.
pub trait Screen {
    fn is_open(&self) -> bool;

    /// Poll the keyboard.  Returns `false` when the user asked to quit.
    fn poll_input(&mut self) -> bool;

    /// Compose and show one frame.
    fn render(&mut self, frame: &VideoFrame, scene: &Scene<'_>) -> Result<(), minifb::Error>;
}

pub struct Overlay {
    window: Window,
    canvas: Canvas,
    sim_tx: Option<Sender<SimKey>>,
}

impl Overlay {
    /// Open the window.  `sim_tx` receives pose keys in simulation mode.
    pub fn open(sim_tx: Option<Sender<SimKey>>) -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            WINDOW_TITLE,
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;
        window.set_target_fps(60);

        Ok(Overlay { window, canvas: Canvas::new(WIN_W, WIN_H), sim_tx })
    }
}

impl Screen for Overlay {
    fn is_open(&self) -> bool { self.window.is_open() }

    fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        if pressed(Key::Q) || pressed(Key::Escape) {
            return false;
        }

        let Some(tx) = &self.sim_tx else { return true; };
        const POSE_KEYS: [(Key, SimKey); 10] = [
            (Key::Key0, SimKey::Count(0)),
            (Key::Key1, SimKey::Count(1)),
            (Key::Key2, SimKey::Count(2)),
            (Key::Key3, SimKey::Count(3)),
            (Key::Key4, SimKey::Count(4)),
            (Key::Key5, SimKey::Count(5)),
            (Key::R,    SimKey::RockOn),
            (Key::T,    SimKey::ThumbOnly),
            (Key::H,    SimKey::SecondHand),
            (Key::N,    SimKey::HideHands),
        ];
        for (key, sim) in POSE_KEYS {
            if pressed(key) {
                forward_pose_key(tx, sim);
            }
        }
        true
    }

    fn render(&mut self, frame: &VideoFrame, scene: &Scene<'_>) -> Result<(), minifb::Error> {
        compose(&mut self.canvas, frame, scene);
        self.window.update_with_buffer(&self.canvas.buf, WIN_W, WIN_H)
    }
}

/// Hand a pose key to the simulation source.  Returns `false` once the
/// source is gone.
fn forward_pose_key(tx: &Sender<SimKey>, key: SimKey) -> bool {
    match tx.send(key) {
        Ok(()) => true,
        Err(e) => {
            debug!("Simulation source gone, dropped {:?}: {}", e.0, e);
            false
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b011, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b110],
        '6' => [0b011, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b110],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000],
    }
}

/// Mix `over` onto `base`; `t` = 0.0 keeps `base`, 1.0 gives `over`.
fn blend(base: u32, over: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |shift: u32| {
        let a = ((base >> shift) & 0xFF) as f32;
        let b = ((over >> shift) & 0xFF) as f32;
        ((a * (1.0 - t) + b * t).round() as u32) << shift
    };
    0xFF000000 | mix(16) | mix(8) | mix(0)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
