//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  hand skeleton(s)                 CC bars   │
//! │    · threshold ring around the thumb        │
//! │    · gold tip lines = latched "extended"    │
//! │                                             │
//! │  status bar                                 │
//! │  key legend                                 │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The window doubles as the simulation input device: mouse position and
//! the finger keys are forwarded to the sim hand source.

use minifb::{Key, MouseMode, Window, WindowOptions};
use std::sync::mpsc::Sender;

use gesture_map::{Finger, HandFrame, HandLandmark};

use crate::app::AppState;
use crate::source::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

/// Extra rows below the video area for status + legend.
const FOOTER_H: usize = 56;

const BG_COLOR: u32 = 0xFF1A1A2E;
const FRAME_BORDER: u32 = 0xFF0F3460;
const TEXT_BG: u32 = 0xFF0F3460;
const DOT_COLOR: u32 = 0xFFC8C8C8;
const THUMB_COLOR: u32 = 0xFF4FC3F7;
const EXTENDED_COLOR: u32 = 0xFFFFD700; // gold
const CURLED_COLOR: u32 = 0xFF666688;
const LINE_COLOR: u32 = 0xFF4FC3F7;
const RING_COLOR: u32 = 0xFF333355;
const BAR_COLOR: u32 = 0xFF7FD18C;

const BAR_W: usize = 14;
const BAR_GAP: usize = 6;
const BAR_H: usize = 100;

pub struct Visualizer {
    window: Window,
    buf: Vec<u32>,
    sim_tx: Sender<SimInput>,

    win_w: usize,
    win_h: usize,
    video_w: usize,
    video_h: usize,

    finger_down: [bool; 4],
    last_mouse: (f32, f32),
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>, width: u32, height: u32) -> Result<Self, String> {
        let video_w = width as usize;
        let video_h = height as usize;
        let win_w = video_w;
        let win_h = video_h + FOOTER_H;

        let mut window = Window::new(
            "Inner Voice — Hand Gesture Control",
            win_w,
            win_h,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; win_w * win_h],
            sim_tx,
            win_w,
            win_h,
            video_w,
            video_h,
            finger_down: [false; 4],
            last_mouse: (-1.0, -1.0),
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Poll window input and forward it as [`SimInput`].
    /// Returns false when the session should end.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() {
            return false;
        }
        if self.window.is_key_down(Key::Q) || self.window.is_key_down(Key::Escape) {
            return false;
        }

        // Finger keys: edge-detect so the source sees down/up transitions.
        const FINGER_KEYS: [(Key, Finger); 4] = [
            (Key::I, Finger::Index),
            (Key::M, Finger::Middle),
            (Key::R, Finger::Ring),
            (Key::P, Finger::Pinky),
        ];
        for (key, finger) in FINGER_KEYS {
            let down = self.window.is_key_down(key);
            if down != self.finger_down[finger.index()] {
                self.finger_down[finger.index()] = down;
                let input = if down {
                    SimInput::FingerDown(finger)
                } else {
                    SimInput::FingerUp(finger)
                };
                let _ = self.sim_tx.send(input);
            }
        }

        // Mouse places the simulated thumb, normalized to the video area.
        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            let x = (mx / self.video_w as f32).clamp(0.0, 1.0);
            let y = (my / self.video_h as f32).clamp(0.0, 1.0);
            if (x, y) != self.last_mouse {
                self.last_mouse = (x, y);
                let _ = self.sim_tx.send(SimInput::MouseMove { x, y });
            }
        }

        true
    }

    /// Render one frame of application state.
    pub fn render(&mut self, app: &AppState) {
        self.buf.fill(BG_COLOR);
        self.draw_border(0, 0, self.video_w, self.video_h, FRAME_BORDER);

        if let Some(frame) = app.last_frame() {
            let hands: Vec<_> = frame.hands.clone();
            for (slot, hand) in hands.iter().enumerate() {
                self.draw_hand(app, frame, slot, hand);
            }
        }

        self.draw_cc_bars(app);

        // ── Status bar ────────────────────────────────────────────────────
        let status_y = self.video_h + 6;
        self.fill_rect(0, self.video_h, self.win_w, FOOTER_H, TEXT_BG);
        self.draw_label(&app.status, 10, status_y, 0xFFEEEEEE);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label(
            "I/M/R/P=extend finger  mouse=move hand  Q=quit",
            10,
            self.win_h - 14,
            0xFF888888,
        );

        let w = self.win_w;
        let h = self.win_h;
        self.window.update_with_buffer(&self.buf, w, h).ok();
    }

    // ── Hand skeleton ─────────────────────────────────────────────────────

    fn draw_hand(
        &mut self,
        app: &AppState,
        frame: &HandFrame,
        slot: usize,
        hand: &gesture_map::TrackedHand,
    ) {
        let px = |lm: gesture_map::Landmark| {
            let (x, y) = lm.to_pixels(frame.width, frame.height);
            (x as isize, y as isize)
        };

        let thumb = hand.get(HandLandmark::ThumbTip);
        let (tx, ty) = px(thumb);

        // Threshold ring: distances beyond this circle latch "extended".
        self.draw_circle(tx, ty, app.threshold() as isize, RING_COLOR);

        // Thumb-to-tip lines, gold when latched.
        for finger in Finger::ALL {
            let (fx, fy) = px(hand.get(finger.tip()));
            let color = if app.finger_extended(slot, finger) {
                EXTENDED_COLOR
            } else {
                CURLED_COLOR
            };
            self.draw_line(tx, ty, fx, fy, color);
        }

        // Pinch line drawn on top, thicker.
        let (ix, iy) = px(hand.get(HandLandmark::IndexTip));
        self.draw_line(tx, ty, ix, iy, LINE_COLOR);
        self.draw_line(tx, ty + 1, ix, iy + 1, LINE_COLOR);

        // Landmark dots.
        for lm in hand.landmarks {
            let (x, y) = px(lm);
            self.fill_dot(x, y, 2, DOT_COLOR);
        }
        self.fill_dot(tx, ty, 4, THUMB_COLOR);
    }

    // ── CC bars ───────────────────────────────────────────────────────────

    fn draw_cc_bars(&mut self, app: &AppState) {
        let (finger_controls, line_control) = app.controls();
        let mut controls = finger_controls.to_vec();
        controls.push(line_control);

        let total_w = controls.len() * (BAR_W + BAR_GAP);
        let x0 = self.video_w.saturating_sub(total_w + 10);
        let y0 = 20usize;

        for (i, control) in controls.iter().enumerate() {
            let x = x0 + i * (BAR_W + BAR_GAP);
            let value = app.cc_value(*control) as usize;
            let fill = value * BAR_H / 127;

            self.draw_border(x, y0, BAR_W, BAR_H, FRAME_BORDER);
            self.fill_rect(x, y0 + BAR_H - fill, BAR_W, fill, BAR_COLOR);
            self.draw_label(&format!("{}", control), x + 4, y0 + BAR_H + 6, 0xFF888888);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.win_w && (y as usize) < self.win_h {
            self.buf[y as usize * self.win_w + x as usize] = color;
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.win_h) {
            for col in x..(x + w).min(self.win_w) {
                self.buf[row * self.win_w + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for col in x..(x + w).min(self.win_w) {
            self.set_pixel(col as isize, y as isize, color);
            self.set_pixel(col as isize, (y + h - 1) as isize, color);
        }
        for row in y..(y + h).min(self.win_h) {
            self.set_pixel(x as isize, row as isize, color);
            self.set_pixel((x + w - 1) as isize, row as isize, color);
        }
    }

    fn fill_dot(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    fn draw_line(&mut self, x0: isize, y0: isize, x1: isize, y1: isize, color: u32) {
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn draw_circle(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        // Midpoint circle, outline only.
        let (mut x, mut y) = (r, 0isize);
        let mut err = 1 - r;
        while x >= y {
            for &(px, py) in &[
                (cx + x, cy + y),
                (cx - x, cy + y),
                (cx + x, cy - y),
                (cx - x, cy - y),
                (cx + y, cy + x),
                (cx - y, cy + x),
                (cx + y, cy - x),
                (cx - y, cy - x),
            ] {
                self.set_pixel(px, py, color);
            }
            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    /// Minimal bitmap font — 3×5 characters for status/label rendering.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.set_pixel((cx + col) as isize, (y + row) as isize, color);
                    }
                }
            }
            cx += 4; // 3 wide + 1 gap
            if cx + 4 > self.win_w {
                break;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}
