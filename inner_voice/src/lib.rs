//! # inner_voice
//!
//! Hand-gesture control surface for audio software.  Tracked hand landmarks
//! stream in from a source; the [`gesture_map`] core turns each frame's
//! thumb-to-fingertip spreads into control signals; the app forwards them to
//! a MIDI output port and an OSC/UDP target while a small window shows the
//! hand skeleton, the latched finger states, and the live CC values.
//!
//! ## Signal mapping
//!
//! | Measurement | MIDI | OSC |
//! |---|---|---|
//! | Thumb↔index/middle/ring/pinky tip distance | CC 0–3 every frame; Note on/off at the spread threshold | `/distances/` float every frame |
//! | Thumb↔index pinch ("line") | CC 4 every frame | `/line/` float every frame |
//!
//! ## Frame sources
//!
//! * (default) **Simulation**: the mouse places the hand, holding
//!   `I`/`M`/`R`/`P` extends the corresponding finger past the threshold.
//! * `--replay <file.csv>`: recorded landmark frames replayed at the
//!   configured fps — the whole pipeline runs headless from a file.
//! * `leap` feature: frames from a real LeapMotion controller via LeapC.
//!
//! ### Window keys
//!
//! | Key | Action |
//! |---|---|
//! | `I` / `M` / `R` / `P` (hold) | Extend index / middle / ring / pinky (sim) |
//! | mouse | Move the simulated hand |
//! | `Q` or `Escape` | Quit |

pub mod app;
pub mod config;
pub mod midi;
pub mod osc;
pub mod replay;
pub mod source;
pub mod visualizer;
