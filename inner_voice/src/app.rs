//! Top-level application state and the main loop.
//!
//! `AppState` owns the `GestureMapper` and both outbound transports; each
//! incoming `HandFrame` is ticked through the mapper and the resulting
//! signals are dispatched immediately.  `run()` wires a frame source to the
//! state and drives the visualizer at ~60 fps.

use std::path::PathBuf;
use std::sync::mpsc::{self, TryRecvError};

use anyhow::{anyhow, Result};
use gesture_map::{ControlSignal, Finger, GestureMapper, HandFrame, OscChannel};

use crate::config::Config;
use crate::midi::{open_midi_output, MidiOut};
use crate::osc::OscSender;
use crate::replay::ReplayHandSource;
use crate::source::{spawn_hand_source, SimHandSource, SimInput};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// SourceSelect
// ════════════════════════════════════════════════════════════════════════════

/// Which frame source the session runs on.
pub enum SourceSelect {
    /// Keyboard + mouse simulation (default build).
    Sim,
    /// Replay a recorded landmark CSV.
    Replay(PathBuf),
    /// Real LeapMotion hardware.
    #[cfg(feature = "leap")]
    Leap,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    mapper: GestureMapper,
    midi: Box<dyn MidiOut>,
    osc: Option<OscSender>,

    midi_channel: u8,
    velocity: u8,
    distances_path: String,
    line_path: String,

    // ── display state ────────────────────────────────────────────────────
    last_frame: Option<HandFrame>,
    cc_values: [u8; 128],
    signals_sent: u64,
    pub status: String,

    osc_warned: bool,
}

impl AppState {
    /// Build the state from config: validates the mapping ranges (fatal on a
    /// degenerate range) and opens both transports, degrading each to a
    /// warned no-op when unavailable.
    pub fn new(cfg: &Config) -> Result<Self> {
        let mapper_cfg = cfg.mapping.mapper_config()?;
        let midi = open_midi_output(&cfg.midi.port_hint);
        let osc = match OscSender::new(&cfg.osc.addr) {
            Ok(s) => Some(s),
            Err(e) => {
                eprintln!("[osc] {} unreachable: {} — OSC disabled", cfg.osc.addr, e);
                None
            }
        };
        Ok(Self::with_outputs(cfg, GestureMapper::new(mapper_cfg), midi, osc))
    }

    /// Assemble the state around explicit outputs — used by tests to inject
    /// recording fakes.
    pub fn with_outputs(
        cfg: &Config,
        mapper: GestureMapper,
        midi: Box<dyn MidiOut>,
        osc: Option<OscSender>,
    ) -> Self {
        AppState {
            mapper,
            midi,
            osc,
            midi_channel: cfg.midi.channel,
            velocity: cfg.midi.velocity,
            distances_path: cfg.osc.distances_path.clone(),
            line_path: cfg.osc.line_path.clone(),
            last_frame: None,
            cc_values: [0; 128],
            signals_sent: 0,
            status: "Waiting for hand frames".to_string(),
            osc_warned: false,
        }
    }

    /// Tick one frame through the mapper and send everything it produced.
    pub fn handle_frame(&mut self, frame: HandFrame) {
        let signals = self.mapper.tick(&frame);
        for signal in &signals {
            self.dispatch(*signal);
        }
        self.signals_sent += signals.len() as u64;

        self.status = if frame.hands.is_empty() {
            format!("No hands — state latched  (sent {})", self.signals_sent)
        } else {
            let line = signals.iter().find_map(|s| match s {
                ControlSignal::Osc {
                    channel: OscChannel::Line,
                    value,
                } => Some(*value),
                _ => None,
            });
            format!(
                "hands={}  line={:.0}px  sent={}",
                frame.hands.len(),
                line.unwrap_or(0.0),
                self.signals_sent
            )
        };
        self.last_frame = Some(frame);
    }

    fn dispatch(&mut self, signal: ControlSignal) {
        match signal {
            ControlSignal::ControlChange { control, value } => {
                self.midi.control_change(self.midi_channel, control, value);
                self.cc_values[control as usize] = value;
            }
            ControlSignal::NoteOn { note } => {
                self.midi.note_on(self.midi_channel, note, self.velocity);
            }
            ControlSignal::NoteOff { note } => {
                self.midi.note_off(self.midi_channel, note);
            }
            ControlSignal::Osc { channel, value } => {
                let path = match channel {
                    OscChannel::Distances => &self.distances_path,
                    OscChannel::Line => &self.line_path,
                };
                if let Some(osc) = &self.osc {
                    if let Err(e) = osc.send_float(path, value) {
                        if !self.osc_warned {
                            eprintln!("[osc] send failed: {} (further errors muted)", e);
                            self.osc_warned = true;
                        }
                    }
                }
            }
        }
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn last_frame(&self) -> Option<&HandFrame> {
        self.last_frame.as_ref()
    }

    pub fn cc_value(&self, control: u8) -> u8 {
        self.cc_values[control as usize]
    }

    pub fn finger_extended(&self, hand: usize, finger: Finger) -> bool {
        self.mapper.state().is_extended(hand, finger)
    }

    pub fn threshold(&self) -> f32 {
        self.mapper.config().threshold
    }

    pub fn controls(&self) -> ([u8; 4], u8) {
        let cfg = self.mapper.config();
        (cfg.finger_controls, cfg.line_control)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run a full session: open the window, spawn the selected frame source,
/// and loop capture → map → emit → render until quit or end of replay.
///
/// All resources (MIDI connection, OSC socket, window) are owned by values
/// in this scope, so every exit path releases them.
pub fn run(cfg: Config, source: SourceSelect) -> Result<()> {
    // ── Sim input channel (window → sim source) ──────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    let mut vis =
        Visualizer::new(sim_tx, cfg.frame.width, cfg.frame.height).map_err(|e| anyhow!(e))?;

    let frame_rx = match source {
        SourceSelect::Sim => spawn_hand_source(SimHandSource {
            rx: sim_rx,
            width: cfg.frame.width,
            height: cfg.frame.height,
            fps: cfg.frame.fps,
        }),
        SourceSelect::Replay(path) => spawn_hand_source(ReplayHandSource {
            path,
            width: cfg.frame.width,
            height: cfg.frame.height,
            fps: cfg.frame.fps,
        }),
        #[cfg(feature = "leap")]
        SourceSelect::Leap => spawn_hand_source(crate::source::LeapHandSource {
            width: cfg.frame.width,
            height: cfg.frame.height,
        }),
    };

    let mut app = AppState::new(&cfg)?;

    // ── Main loop ─────────────────────────────────────────────────────────
    let mut source_done = false;
    while vis.is_open() {
        if !vis.poll_input() {
            break;
        }

        // Drain the frame channel, keeping only the newest frame — mapping
        // always runs against the freshest landmarks.
        let mut latest: Option<HandFrame> = None;
        loop {
            match frame_rx.try_recv() {
                Ok(frame) => latest = Some(frame),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    source_done = true;
                    break;
                }
            }
        }

        if let Some(frame) = latest {
            app.handle_frame(frame);
        }

        vis.render(&app);

        if source_done {
            eprintln!("[app] frame source ended — exiting");
            break;
        }
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
