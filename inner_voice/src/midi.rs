//! Real-time MIDI output.
//!
//! `MidiOut` abstracts over the midir backend and a null fallback, so the
//! rest of the app (and its tests) never touch a real port directly.

// ════════════════════════════════════════════════════════════════════════════
// MidiOut — abstraction over midir / null (for testing)
// ════════════════════════════════════════════════════════════════════════════

pub trait MidiOut: Send {
    fn control_change(&mut self, channel: u8, control: u8, value: u8);
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
}

// ── raw message bytes ─────────────────────────────────────────────────────

pub fn cc_bytes(channel: u8, control: u8, value: u8) -> [u8; 3] {
    [0xB0 | (channel & 0x0F), control & 0x7F, value & 0x7F]
}

pub fn note_on_bytes(channel: u8, note: u8, velocity: u8) -> [u8; 3] {
    [0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
}

pub fn note_off_bytes(channel: u8, note: u8) -> [u8; 3] {
    [0x80 | (channel & 0x0F), note & 0x7F, 0]
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn control_change(&mut self, channel: u8, control: u8, value: u8) {
        let _ = self.conn.send(&cc_bytes(channel, control, value));
    }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = self.conn.send(&note_on_bytes(channel, note, velocity));
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        let _ = self.conn.send(&note_off_bytes(channel, note));
    }
}

// ── null backend (used when no MIDI port is available) ────────────────────

pub struct NullOut;
impl MidiOut for NullOut {
    fn control_change(&mut self, _ch: u8, _c: u8, _v: u8) {}
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8) {}
    fn note_off(&mut self, _ch: u8, _n: u8) {}
}

// ════════════════════════════════════════════════════════════════════════════
// open_midi_output — enumerate ports and pick by name hint
// ════════════════════════════════════════════════════════════════════════════

/// Open the output port whose name contains `port_hint` (case-insensitive),
/// falling back to the first available port, and to `NullOut` with a warning
/// when no port can be opened at all.
pub fn open_midi_output(port_hint: &str) -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("inner_voice") {
        Ok(m) => m,
        Err(e) => {
            eprintln!("[midi] init error: {} — using null output", e);
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        eprintln!("[midi] No MIDI output ports found — using null output.");
        eprintln!("[midi] Create a virtual port in your host, e.g.:");
        eprintln!("       • macOS: IAC Driver bus, or a Max 'to Max' port");
        eprintln!("       • Linux: `fluidsynth` or an ALSA virtual port");
        eprintln!("       • Windows: loopMIDI");
        return Box::new(NullOut);
    }

    let hint = port_hint.to_lowercase();
    let port_idx = ports
        .iter()
        .enumerate()
        .find(|(_, p)| {
            midi_out
                .port_name(p)
                .map(|n| n.to_lowercase().contains(&hint))
                .unwrap_or(false)
        })
        .map(|(i, _)| i)
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out
        .port_name(port)
        .unwrap_or_else(|_| "Unknown".to_string());
    eprintln!("[midi] Opening MIDI port: {}", name);

    match midi_out.connect(port, "inner-voice-out") {
        Ok(conn) => Box::new(MidirOut { conn }),
        Err(e) => {
            eprintln!("[midi] Failed to connect: {} — using null output", e);
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
