//! Hand-frame sources — simulation, and LeapMotion hardware.
//!
//! The public interface is a stream of [`HandFrame`]s delivered over a
//! `mpsc` channel.  Consumers don't need to know whether frames came from
//! real hardware, the keyboard/mouse simulator, or a replay file.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use gesture_map::{Finger, HandFrame, HandLandmark, Landmark, TrackedHand};

// ════════════════════════════════════════════════════════════════════════════
// HandSource trait — unified interface for hw, sim and replay
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`HandFrame`]s over a channel.
pub trait HandSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<HandFrame>);
}

/// Spawn a hand source on its own thread and return the receiving end.
pub fn spawn_hand_source<S: HandSource>(source: S) -> Receiver<HandFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource — keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Normalized cursor position — places the simulated thumb tip.
    MouseMove { x: f32, y: f32 },
    /// Finger key pressed — extend that finger past the threshold.
    FingerDown(Finger),
    /// Finger key released — curl it back under the threshold.
    FingerUp(Finger),
}

/// Hand source driven by [`SimInput`] events from the visualizer's window.
///
/// The thumb tip follows the mouse; each held finger key places that
/// finger's tip well past the spread threshold, a released key well under
/// it.  The rest of the skeleton is interpolated so the drawn hand looks
/// plausible.
pub struct SimHandSource {
    pub rx: Receiver<SimInput>,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

/// Tip distance from the thumb for an extended / curled sim finger, px.
const SIM_EXTENDED_PX: f32 = 320.0;
const SIM_CURLED_PX: f32 = 80.0;

/// Fan angles for index→pinky, degrees from +x with y pointing down
/// (negative = upward on screen).
const SIM_FAN_DEG: [f32; 4] = [-65.0, -85.0, -105.0, -125.0];

impl HandSource for SimHandSource {
    fn run(self: Box<Self>, tx: Sender<HandFrame>) {
        let period = Duration::from_millis((1000 / self.fps.max(1)) as u64);
        let mut thumb = Landmark::new(0.5, 0.6);
        let mut extended = [false; 4];

        loop {
            // Drain pending window input.
            loop {
                match self.rx.try_recv() {
                    Ok(SimInput::MouseMove { x, y }) => {
                        thumb = Landmark::new(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0));
                    }
                    Ok(SimInput::FingerDown(f)) => extended[f.index()] = true,
                    Ok(SimInput::FingerUp(f)) => extended[f.index()] = false,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }

            let hand = synth_hand(thumb, extended, self.width, self.height);
            let frame = HandFrame {
                hands: vec![hand],
                width: self.width,
                height: self.height,
            };
            if tx.send(frame).is_err() {
                return;
            }
            thread::sleep(period);
        }
    }
}

/// Build a plausible 21-landmark hand around a thumb-tip position.
fn synth_hand(thumb: Landmark, extended: [bool; 4], width: u32, height: u32) -> TrackedHand {
    let mut hand = TrackedHand::default();
    let (tx_px, ty_px) = thumb.to_pixels(width, height);

    let norm = |x_px: f32, y_px: f32| {
        Landmark::new(
            (x_px / width as f32).clamp(0.0, 1.0),
            (y_px / height as f32).clamp(0.0, 1.0),
        )
    };

    // Wrist sits below and slightly left of the thumb.
    let (wx, wy) = (tx_px - 40.0, ty_px + 120.0);
    hand.set(HandLandmark::Wrist, norm(wx, wy));

    // Thumb chain interpolated wrist → tip.
    for (i, t) in [(1usize, 0.35f32), (2, 0.6), (3, 0.85)] {
        let lm = norm(wx + (tx_px - wx) * t, wy + (ty_px - wy) * t);
        hand.landmarks[i] = lm;
    }
    hand.set(HandLandmark::ThumbTip, thumb);

    for finger in Finger::ALL {
        let deg = SIM_FAN_DEG[finger.index()];
        let (dx, dy) = (deg.to_radians().cos(), deg.to_radians().sin());
        let dist = if extended[finger.index()] {
            SIM_EXTENDED_PX
        } else {
            SIM_CURLED_PX
        };
        // Joints along the ray from the thumb tip outward.
        let base = finger.tip() as usize - 3;
        for (j, t) in [(0usize, 0.35f32), (1, 0.6), (2, 0.82), (3, 1.0)] {
            let lm = norm(tx_px + dx * dist * t, ty_px + dy * dist * t);
            hand.landmarks[base + j] = lm;
        }
    }

    hand
}

// ════════════════════════════════════════════════════════════════════════════
// LeapHandSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Hand source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Each digit's bone joints are projected onto the frame plane and
/// normalized against a fixed interaction box, producing the same
/// 21-landmark skeleton the simulator emits.
#[cfg(feature = "leap")]
pub struct LeapHandSource {
    pub width: u32,
    pub height: u32,
}

#[cfg(feature = "leap")]
impl HandSource for LeapHandSource {
    fn run(self: Box<Self>, tx: Sender<HandFrame>) {
        use leaprs::*;

        // Interaction box, mm: x spans ±250 around the device,
        // y spans 80–450 above it.  Leap y points up; image y points down.
        const X_HALF_MM: f32 = 250.0;
        const Y_MIN_MM: f32 = 80.0;
        const Y_MAX_MM: f32 = 450.0;

        let norm = |x_mm: f32, y_mm: f32| {
            Landmark::new(
                ((x_mm + X_HALF_MM) / (2.0 * X_HALF_MM)).clamp(0.0, 1.0),
                (1.0 - (y_mm - Y_MIN_MM) / (Y_MAX_MM - Y_MIN_MM)).clamp(0.0, 1.0),
            )
        };

        let mut connection = Connection::create(ConnectionConfig::default())
            .expect("Failed to open LeapC connection");
        connection.open().expect("Failed to open LeapMotion device");

        loop {
            let msg = match connection.poll(100) {
                Ok(m) => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let mut hands = Vec::new();

                for hand in frame.hands() {
                    let mut tracked = TrackedHand::default();
                    let palm = hand.palm().position();
                    tracked.set(HandLandmark::Wrist, norm(palm.x, palm.y));

                    for (d, digit) in hand.digits().into_iter().enumerate().take(5) {
                        let joints = [
                            digit.metacarpal().next_joint(),
                            digit.proximal().next_joint(),
                            digit.intermediate().next_joint(),
                            digit.distal().next_joint(),
                        ];
                        // Landmark ids 1–4 for the thumb, 4d+1..4d+4 beyond.
                        for (j, joint) in joints.iter().enumerate() {
                            tracked.landmarks[4 * d + 1 + j] = norm(joint.x, joint.y);
                        }
                    }
                    hands.push(tracked);
                }

                let out = HandFrame {
                    hands,
                    width: self.width,
                    height: self.height,
                };
                if tx.send(out).is_err() {
                    return;
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_map::pixel_distance;

    #[test]
    fn curled_sim_fingers_stay_under_default_threshold() {
        let hand = synth_hand(Landmark::new(0.5, 0.6), [false; 4], 640, 480);
        let thumb = hand.get(HandLandmark::ThumbTip);
        for f in Finger::ALL {
            let d = pixel_distance(thumb, hand.get(f.tip()), 640, 480);
            assert!(d < 200.0, "{:?} at {} px", f, d);
        }
    }

    #[test]
    fn extended_sim_finger_crosses_default_threshold() {
        let hand = synth_hand(Landmark::new(0.5, 0.6), [true, false, false, false], 640, 480);
        let thumb = hand.get(HandLandmark::ThumbTip);
        let d = pixel_distance(thumb, hand.get(Finger::Index.tip()), 640, 480);
        assert!(d >= 200.0, "index at {} px", d);
    }

    #[test]
    fn sim_source_delivers_frames_and_honors_input() {
        let (in_tx, in_rx) = mpsc::channel();
        let rx = spawn_hand_source(SimHandSource {
            rx: in_rx,
            width: 640,
            height: 480,
            fps: 120,
        });

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first.hands.len(), 1);
        assert_eq!((first.width, first.height), (640, 480));

        in_tx.send(SimInput::FingerDown(Finger::Pinky)).unwrap();
        // Give the source a tick to pick the event up.
        let mut crossed = false;
        for _ in 0..20 {
            let f = rx.recv_timeout(Duration::from_secs(2)).unwrap();
            let hand = f.hands[0];
            let d = pixel_distance(
                hand.get(HandLandmark::ThumbTip),
                hand.get(Finger::Pinky.tip()),
                f.width,
                f.height,
            );
            if d >= 200.0 {
                crossed = true;
                break;
            }
        }
        assert!(crossed);
    }
}
