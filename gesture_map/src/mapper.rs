//! The per-frame mapping tick and its latched finger state.

use std::collections::HashMap;

use crate::hand::{pixel_distance, Finger, HandFrame, HandLandmark};
use crate::scale::ScaleRange;

// ════════════════════════════════════════════════════════════════════════════
// ControlSignal — what a tick produces
// ════════════════════════════════════════════════════════════════════════════

/// Logical OSC destination.  The transport layer maps these to the
/// configured address strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscChannel {
    /// One message per finger distance, every frame.
    Distances,
    /// The thumb–index pinch distance, every frame.
    Line,
}

/// A single outbound control message.  Produced transiently by
/// [`GestureMapper::tick`] and dispatched immediately — never buffered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlSignal {
    ControlChange { control: u8, value: u8 },
    NoteOn { note: u8 },
    NoteOff { note: u8 },
    Osc { channel: OscChannel, value: f32 },
}

// ════════════════════════════════════════════════════════════════════════════
// DigitState — the only cross-frame state
// ════════════════════════════════════════════════════════════════════════════

/// Direction of an edge-triggered state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Distance crossed the threshold upward — finger now "extended".
    Rose,
    /// Distance crossed the threshold downward — finger no longer extended.
    Fell,
}

/// Latched per-finger booleans, keyed by (hand slot, finger).
///
/// Keying includes the hand slot so two tracked hands never alias one
/// latch.  Entries are created on first sight and live for the session;
/// hands absent from a frame leave their entries untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DigitState {
    extended: HashMap<(usize, Finger), bool>,
}

impl DigitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one distance against the threshold and flip the latch on a
    /// crossing.  Absent keys count as "not extended".
    pub fn update(
        &mut self,
        hand: usize,
        finger: Finger,
        distance: f32,
        threshold: f32,
    ) -> Option<Transition> {
        let entry = self.extended.entry((hand, finger)).or_insert(false);
        if distance >= threshold && !*entry {
            *entry = true;
            Some(Transition::Rose)
        } else if distance < threshold && *entry {
            *entry = false;
            Some(Transition::Fell)
        } else {
            None
        }
    }

    pub fn is_extended(&self, hand: usize, finger: Finger) -> bool {
        self.extended.get(&(hand, finger)).copied().unwrap_or(false)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MapperConfig
// ════════════════════════════════════════════════════════════════════════════

/// Tunables for the mapping tick.  Validated ranges are constructed by the
/// caller (typically from the config file), so a degenerate range can never
/// reach the per-frame path.
#[derive(Debug, Clone, PartialEq)]
pub struct MapperConfig {
    /// Pixel distance at which a finger counts as extended.
    pub threshold: f32,
    /// Scaling of the four finger distances into CC values.
    pub finger_scale: ScaleRange,
    /// Scaling of the thumb–index pinch distance into its CC value.
    pub line_scale: ScaleRange,
    /// CC control numbers for the four finger distances, index→pinky.
    pub finger_controls: [u8; 4],
    /// CC control number for the pinch distance.
    pub line_control: u8,
    /// Note for Finger::Index; the other fingers follow consecutively.
    pub base_note: u8,
}

impl Default for MapperConfig {
    fn default() -> Self {
        MapperConfig {
            threshold: 200.0,
            finger_scale: ScaleRange::midi(0.0, 1000.0).unwrap(),
            line_scale: ScaleRange::midi(0.0, 300.0).unwrap(),
            finger_controls: [0, 1, 2, 3],
            line_control: 4,
            base_note: 36,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureMapper
// ════════════════════════════════════════════════════════════════════════════

/// Owns the [`DigitState`] for one session and turns each [`HandFrame`]
/// into outbound signals.
#[derive(Debug, Clone)]
pub struct GestureMapper {
    cfg: MapperConfig,
    state: DigitState,
}

impl GestureMapper {
    pub fn new(cfg: MapperConfig) -> Self {
        Self {
            cfg,
            state: DigitState::new(),
        }
    }

    pub fn state(&self) -> &DigitState {
        &self.state
    }

    pub fn config(&self) -> &MapperConfig {
        &self.cfg
    }

    /// Process one frame.  Per hand: measure the four thumb-to-tip spreads,
    /// emit note on/off on threshold crossings, then one OSC float and one
    /// CC per distance, then the pinch-line OSC/CC pair.
    ///
    /// A frame with no hands produces no signals and leaves the latched
    /// state exactly as it was.
    pub fn tick(&mut self, frame: &HandFrame) -> Vec<ControlSignal> {
        let mut out = Vec::new();

        for (slot, hand) in frame.hands.iter().enumerate() {
            let thumb = hand.get(HandLandmark::ThumbTip);
            let mut distances = [0.0f32; 4];

            for finger in Finger::ALL {
                let tip = hand.get(finger.tip());
                let d = pixel_distance(thumb, tip, frame.width, frame.height);
                distances[finger.index()] = d;

                let note = self.cfg.base_note + finger.index() as u8;
                match self.state.update(slot, finger, d, self.cfg.threshold) {
                    Some(Transition::Rose) => out.push(ControlSignal::NoteOn { note }),
                    Some(Transition::Fell) => out.push(ControlSignal::NoteOff { note }),
                    None => {}
                }
            }

            for d in distances {
                out.push(ControlSignal::Osc {
                    channel: OscChannel::Distances,
                    value: d,
                });
            }

            for finger in Finger::ALL {
                out.push(ControlSignal::ControlChange {
                    control: self.cfg.finger_controls[finger.index()],
                    value: self.cfg.finger_scale.scaled(distances[finger.index()]),
                });
            }

            // The "line" pinch is the thumb–index pair measured above.
            let line = distances[Finger::Index.index()];
            out.push(ControlSignal::Osc {
                channel: OscChannel::Line,
                value: line,
            });
            out.push(ControlSignal::ControlChange {
                control: self.cfg.line_control,
                value: self.cfg.line_scale.scaled(line),
            });
        }

        out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::{Landmark, TrackedHand};

    const W: u32 = 1000;
    const H: u32 = 1000;

    /// Hand whose thumb tip sits at the origin and whose four finger tips
    /// all sit `spread_px` to the right of it.
    fn hand_with_spread(spread_px: f32) -> TrackedHand {
        let mut hand = TrackedHand::default();
        hand.set(HandLandmark::ThumbTip, Landmark::new(0.0, 0.0));
        for finger in Finger::ALL {
            hand.set(finger.tip(), Landmark::new(spread_px / W as f32, 0.0));
        }
        hand
    }

    fn frame_with_spread(spread_px: f32) -> HandFrame {
        HandFrame {
            hands: vec![hand_with_spread(spread_px)],
            width: W,
            height: H,
        }
    }

    fn notes_on(signals: &[ControlSignal]) -> Vec<u8> {
        signals
            .iter()
            .filter_map(|s| match s {
                ControlSignal::NoteOn { note } => Some(*note),
                _ => None,
            })
            .collect()
    }

    fn notes_off(signals: &[ControlSignal]) -> Vec<u8> {
        signals
            .iter()
            .filter_map(|s| match s {
                ControlSignal::NoteOff { note } => Some(*note),
                _ => None,
            })
            .collect()
    }

    // ── DigitState edges ─────────────────────────────────────────────────

    #[test]
    fn transition_sequence_50_250_250_50() {
        let mut st = DigitState::new();
        let th = 200.0;
        assert_eq!(st.update(0, Finger::Index, 50.0, th), None);
        assert_eq!(st.update(0, Finger::Index, 250.0, th), Some(Transition::Rose));
        assert_eq!(st.update(0, Finger::Index, 250.0, th), None);
        assert_eq!(st.update(0, Finger::Index, 50.0, th), Some(Transition::Fell));
    }

    #[test]
    fn repeated_update_is_idempotent() {
        let mut st = DigitState::new();
        assert_eq!(st.update(0, Finger::Ring, 300.0, 200.0), Some(Transition::Rose));
        assert_eq!(st.update(0, Finger::Ring, 300.0, 200.0), None);
        assert_eq!(st.update(0, Finger::Ring, 300.0, 200.0), None);
        assert!(st.is_extended(0, Finger::Ring));
    }

    #[test]
    fn exactly_at_threshold_counts_as_extended() {
        let mut st = DigitState::new();
        assert_eq!(st.update(0, Finger::Pinky, 200.0, 200.0), Some(Transition::Rose));
    }

    #[test]
    fn hands_do_not_alias_each_others_latches() {
        let mut st = DigitState::new();
        assert_eq!(st.update(0, Finger::Index, 300.0, 200.0), Some(Transition::Rose));
        // Same finger on a different hand slot must rise independently.
        assert_eq!(st.update(1, Finger::Index, 300.0, 200.0), Some(Transition::Rose));
        assert_eq!(st.update(0, Finger::Index, 50.0, 200.0), Some(Transition::Fell));
        assert!(st.is_extended(1, Finger::Index));
    }

    // ── Tick-level behavior ──────────────────────────────────────────────

    #[test]
    fn held_spread_emits_note_ons_only_on_the_first_frame() {
        let mut mapper = GestureMapper::new(MapperConfig::default());
        let frame = frame_with_spread(300.0);
        // All four fingers rise together on the first tick...
        assert_eq!(notes_on(&mapper.tick(&frame)).len(), 4);
        // ...and the held repeats emit nothing new.
        for _ in 0..2 {
            assert!(notes_on(&mapper.tick(&frame)).is_empty());
        }
    }

    #[test]
    fn single_extended_finger_emits_exactly_one_note_on() {
        let mut mapper = GestureMapper::new(MapperConfig::default());
        // Only the index tip crosses the threshold; the rest stay close.
        let mut hand = hand_with_spread(50.0);
        hand.set(Finger::Index.tip(), Landmark::new(0.3, 0.0));
        let frame = HandFrame {
            hands: vec![hand],
            width: W,
            height: H,
        };
        let mut ons = Vec::new();
        for _ in 0..3 {
            ons.extend(notes_on(&mapper.tick(&frame)));
        }
        assert_eq!(ons, vec![36]);
    }

    #[test]
    fn spread_and_close_emits_on_then_off() {
        let mut mapper = GestureMapper::new(MapperConfig::default());
        let open = mapper.tick(&frame_with_spread(300.0));
        // All four fingers rise together: notes 36–39.
        assert_eq!(notes_on(&open), vec![36, 37, 38, 39]);
        let closed = mapper.tick(&frame_with_spread(50.0));
        assert_eq!(notes_off(&closed), vec![36, 37, 38, 39]);
        assert!(notes_on(&closed).is_empty());
    }

    #[test]
    fn no_hand_frame_leaves_state_latched() {
        let mut mapper = GestureMapper::new(MapperConfig::default());
        mapper.tick(&frame_with_spread(300.0));
        let before = mapper.state().clone();

        let signals = mapper.tick(&HandFrame::empty(W, H));
        assert!(signals.is_empty());
        assert_eq!(mapper.state(), &before);

        // When the gesture reappears unchanged, no duplicate note fires.
        let again = mapper.tick(&frame_with_spread(300.0));
        assert!(notes_on(&again).is_empty());
    }

    #[test]
    fn continuous_signals_every_frame() {
        let mut mapper = GestureMapper::new(MapperConfig::default());
        let frame = frame_with_spread(50.0);
        for _ in 0..2 {
            let signals = mapper.tick(&frame);
            let osc_distances = signals
                .iter()
                .filter(|s| matches!(s, ControlSignal::Osc { channel: OscChannel::Distances, .. }))
                .count();
            let ccs = signals
                .iter()
                .filter(|s| matches!(s, ControlSignal::ControlChange { .. }))
                .count();
            let osc_line = signals
                .iter()
                .filter(|s| matches!(s, ControlSignal::Osc { channel: OscChannel::Line, .. }))
                .count();
            assert_eq!(osc_distances, 4);
            assert_eq!(ccs, 5); // four fingers + the pinch line
            assert_eq!(osc_line, 1);
        }
    }

    #[test]
    fn cc_values_follow_the_configured_scale() {
        let mut mapper = GestureMapper::new(MapperConfig::default());
        let signals = mapper.tick(&frame_with_spread(500.0));
        let cc0 = signals.iter().find_map(|s| match s {
            ControlSignal::ControlChange { control: 0, value } => Some(*value),
            _ => None,
        });
        // 500 px over 0..1000 → 64 (nearest rounding).
        assert_eq!(cc0, Some(64));

        let line = signals.iter().find_map(|s| match s {
            ControlSignal::ControlChange { control: 4, value } => Some(*value),
            _ => None,
        });
        // 500 px saturates the 0..300 pinch range.
        assert_eq!(line, Some(127));
    }

    #[test]
    fn line_value_matches_index_distance() {
        let mut mapper = GestureMapper::new(MapperConfig::default());
        let signals = mapper.tick(&frame_with_spread(120.0));
        let line = signals.iter().find_map(|s| match s {
            ControlSignal::Osc { channel: OscChannel::Line, value } => Some(*value),
            _ => None,
        });
        assert!((line.unwrap() - 120.0).abs() < 1e-3);
    }

    #[test]
    fn two_hands_produce_two_signal_groups() {
        let mut mapper = GestureMapper::new(MapperConfig::default());
        let frame = HandFrame {
            hands: vec![hand_with_spread(300.0), hand_with_spread(50.0)],
            width: W,
            height: H,
        };
        let signals = mapper.tick(&frame);
        // Only the first hand's fingers rise.
        assert_eq!(notes_on(&signals).len(), 4);
        // Both hands contribute continuous output.
        let ccs = signals
            .iter()
            .filter(|s| matches!(s, ControlSignal::ControlChange { .. }))
            .count();
        assert_eq!(ccs, 10);
    }
}
