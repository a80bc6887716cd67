//! # gesture_map
//!
//! Pure mapping core: per-frame hand landmarks in, control signals out.
//!
//! A [`HandFrame`] carries zero or more 21-landmark [`TrackedHand`]s plus the
//! frame's pixel dimensions.  [`GestureMapper::tick`] measures thumb-to-tip
//! distances for each hand and turns them into [`ControlSignal`]s:
//!
//! | Measurement | Continuous | Edge-triggered |
//! |---|---|---|
//! | Thumb tip ↔ index/middle/ring/pinky tip | CC 0–3 + OSC float | Note on/off at the spread threshold |
//! | Thumb tip ↔ index tip ("line" pinch) | CC 4 + OSC float | — |
//!
//! The only state that outlives a frame is [`DigitState`]: a latched boolean
//! per (hand slot, finger) that flips exactly when its distance crosses the
//! threshold.  Frames with no hands leave it untouched, so a gesture held
//! when tracking drops out stays latched until tracking returns.
//!
//! No transport, window, or estimator code lives here — the crate is fully
//! exercisable from plain unit tests.

pub mod hand;
pub mod mapper;
pub mod scale;

pub use hand::{pixel_distance, Finger, HandFrame, HandLandmark, Landmark, TrackedHand};
pub use mapper::{ControlSignal, DigitState, GestureMapper, MapperConfig, OscChannel, Transition};
pub use scale::{ScaleRange, ScaleRangeError};
