//! Hand landmark types.
//!
//! The skeleton follows the common 21-point hand model: one wrist point and
//! four joints per digit, indexed 0–20.  Landmarks arrive normalized to the
//! frame (x, y ∈ [0, 1]) and are converted to pixel space for distance
//! measurements.

// ════════════════════════════════════════════════════════════════════════════
// HandLandmark — the 21 skeleton indices
// ════════════════════════════════════════════════════════════════════════════

/// Landmark indices of the 21-point hand skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandLandmark {
    pub const COUNT: usize = 21;

    pub fn from_index(index: usize) -> Option<Self> {
        use HandLandmark::*;
        const ALL: [HandLandmark; HandLandmark::COUNT] = [
            Wrist, ThumbCmc, ThumbMcp, ThumbIp, ThumbTip, IndexMcp, IndexPip, IndexDip, IndexTip,
            MiddleMcp, MiddlePip, MiddleDip, MiddleTip, RingMcp, RingPip, RingDip, RingTip,
            PinkyMcp, PinkyPip, PinkyDip, PinkyTip,
        ];
        ALL.get(index).copied()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Finger — the four digits measured against the thumb
// ════════════════════════════════════════════════════════════════════════════

/// The four fingers whose tip-to-thumb spread is mapped to signals.
/// The discriminant doubles as the CC control number and the note offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Finger {
    Index = 0,
    Middle = 1,
    Ring = 2,
    Pinky = 3,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    /// Tip landmark of this finger.
    pub fn tip(self) -> HandLandmark {
        match self {
            Finger::Index => HandLandmark::IndexTip,
            Finger::Middle => HandLandmark::MiddleTip,
            Finger::Ring => HandLandmark::RingTip,
            Finger::Pinky => HandLandmark::PinkyTip,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark / TrackedHand / HandFrame
// ════════════════════════════════════════════════════════════════════════════

/// A single landmark, normalized to the frame (x, y ∈ [0, 1]).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Pixel-space position within a frame of the given dimensions.
    pub fn to_pixels(self, width: u32, height: u32) -> (f32, f32) {
        (self.x * width as f32, self.y * height as f32)
    }
}

/// One detected hand in the current frame: the full 21-landmark skeleton.
/// Lifetime is a single frame; no identity continuity across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedHand {
    pub landmarks: [Landmark; HandLandmark::COUNT],
}

impl TrackedHand {
    pub fn new(landmarks: [Landmark; HandLandmark::COUNT]) -> Self {
        Self { landmarks }
    }

    pub fn get(&self, id: HandLandmark) -> Landmark {
        self.landmarks[id as usize]
    }

    pub fn set(&mut self, id: HandLandmark, lm: Landmark) {
        self.landmarks[id as usize] = lm;
    }
}

impl Default for TrackedHand {
    fn default() -> Self {
        Self {
            landmarks: [Landmark::default(); HandLandmark::COUNT],
        }
    }
}

/// Everything an estimator delivers for one frame: the detected hands and
/// the pixel dimensions needed to de-normalize their landmarks.
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    pub hands: Vec<TrackedHand>,
    pub width: u32,
    pub height: u32,
}

impl HandFrame {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            hands: Vec::new(),
            width,
            height,
        }
    }
}

/// Euclidean distance between two normalized landmarks, in pixels.
pub fn pixel_distance(a: Landmark, b: Landmark, width: u32, height: u32) -> f32 {
    let (ax, ay) = a.to_pixels(width, height);
    let (bx, by) = b.to_pixels(width, height);
    ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
