//! TOML configuration.
//!
//! Every field has a default, so an absent or partial `config.toml` still
//! yields a working setup.  Scale ranges are validated here, at load time —
//! a degenerate range (`min >= max`) aborts startup instead of surfacing as
//! a per-frame division by zero.

use anyhow::{ensure, Context, Result};
use gesture_map::{MapperConfig, ScaleRange};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub midi: MidiConfig,
    #[serde(default)]
    pub osc: OscConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(default)]
    pub frame: FrameConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MidiConfig {
    /// Substring matched against available output port names (e.g. "to Max").
    #[serde(default = "default_port_hint")]
    pub port_hint: String,
    #[serde(default)]
    pub channel: u8,
    #[serde(default = "default_velocity")]
    pub velocity: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OscConfig {
    /// UDP target, host:port.
    #[serde(default = "default_osc_addr")]
    pub addr: String,
    #[serde(default = "default_distances_path")]
    pub distances_path: String,
    #[serde(default = "default_line_path")]
    pub line_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MappingConfig {
    /// Pixel distance at which a finger counts as extended.
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    /// Input span of the finger-distance CCs.
    #[serde(default = "default_finger_min")]
    pub finger_min: f32,
    #[serde(default = "default_finger_max")]
    pub finger_max: f32,
    /// Input span of the pinch-line CC.
    #[serde(default = "default_line_min")]
    pub line_min: f32,
    #[serde(default = "default_line_max")]
    pub line_max: f32,
    /// CC numbers for the four finger distances, index→pinky.
    #[serde(default = "default_finger_controls")]
    pub finger_controls: [u8; 4],
    #[serde(default = "default_line_control")]
    pub line_control: u8,
    /// Note for the index finger; middle/ring/pinky follow consecutively.
    #[serde(default = "default_base_note")]
    pub base_note: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FrameConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_port_hint() -> String { "to Max".to_string() }
fn default_velocity() -> u8 { 100 }
fn default_osc_addr() -> String { "127.0.0.1:7400".to_string() }
fn default_distances_path() -> String { "/distances/".to_string() }
fn default_line_path() -> String { "/line/".to_string() }
fn default_threshold() -> f32 { 200.0 }
fn default_finger_min() -> f32 { 0.0 }
fn default_finger_max() -> f32 { 1000.0 }
fn default_line_min() -> f32 { 0.0 }
fn default_line_max() -> f32 { 300.0 }
fn default_finger_controls() -> [u8; 4] { [0, 1, 2, 3] }
fn default_line_control() -> u8 { 4 }
fn default_base_note() -> u8 { 36 }
fn default_width() -> u32 { 640 }
fn default_height() -> u32 { 480 }
fn default_fps() -> u32 { 30 }

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            port_hint: default_port_hint(),
            channel: 0,
            velocity: default_velocity(),
        }
    }
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            addr: default_osc_addr(),
            distances_path: default_distances_path(),
            line_path: default_line_path(),
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            finger_min: default_finger_min(),
            finger_max: default_finger_max(),
            line_min: default_line_min(),
            line_max: default_line_max(),
            finger_controls: default_finger_controls(),
            line_control: default_line_control(),
            base_note: default_base_note(),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.as_ref().display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.as_ref().display()))?;
        Ok(config)
    }

    /// Load the config file, falling back to defaults if it is absent.
    /// A present-but-malformed file is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            eprintln!(
                "[config] {} not found — using defaults",
                path.as_ref().display()
            );
            Ok(Config::default())
        }
    }
}

impl MappingConfig {
    /// Build the validated mapper configuration.  Fails on degenerate scale
    /// ranges and on controller or note numbers outside the 7-bit MIDI space.
    pub fn mapper_config(&self) -> Result<MapperConfig> {
        let finger_scale = ScaleRange::midi(self.finger_min, self.finger_max)
            .context("mapping.finger_min/finger_max")?;
        let line_scale =
            ScaleRange::midi(self.line_min, self.line_max).context("mapping.line_min/line_max")?;
        for &control in &self.finger_controls {
            ensure!(
                control <= 127,
                "mapping.finger_controls: controller {} exceeds 127",
                control
            );
        }
        ensure!(
            self.line_control <= 127,
            "mapping.line_control: controller {} exceeds 127",
            self.line_control
        );
        // The pinky plays base_note + 3, which must also stay within 0-127.
        ensure!(
            self.base_note <= 124,
            "mapping.base_note: {} leaves no room for the pinky note (max 124)",
            self.base_note
        );
        Ok(MapperConfig {
            threshold: self.threshold,
            finger_scale,
            line_scale,
            finger_controls: self.finger_controls,
            line_control: self.line_control,
            base_note: self.base_note,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.midi.port_hint, "to Max");
        assert_eq!(cfg.midi.channel, 0);
        assert_eq!(cfg.osc.addr, "127.0.0.1:7400");
        assert_eq!(cfg.mapping.threshold, 200.0);
        assert_eq!(cfg.frame.width, 640);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [mapping]
            threshold = 150.0
            line_max = 250.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.mapping.threshold, 150.0);
        assert_eq!(cfg.mapping.line_max, 250.0);
        assert_eq!(cfg.mapping.finger_max, 1000.0);
        assert_eq!(cfg.osc.line_path, "/line/");
    }

    #[test]
    fn mapper_config_carries_values_through() {
        let cfg = MappingConfig::default();
        let mc = cfg.mapper_config().unwrap();
        assert_eq!(mc.threshold, 200.0);
        assert_eq!(mc.finger_controls, [0, 1, 2, 3]);
        assert_eq!(mc.finger_scale.scaled(1000.0), 127);
        assert_eq!(mc.line_scale.scaled(300.0), 127);
    }

    #[test]
    fn degenerate_scale_range_is_fatal_at_load() {
        let cfg: Config = toml::from_str(
            r#"
            [mapping]
            finger_min = 500.0
            finger_max = 500.0
            "#,
        )
        .unwrap();
        assert!(cfg.mapping.mapper_config().is_err());
    }

    #[test]
    fn out_of_range_finger_controller_is_fatal_at_load() {
        let cfg: Config = toml::from_str(
            r#"
            [mapping]
            finger_controls = [200, 1, 2, 3]
            "#,
        )
        .unwrap();
        let err = cfg.mapping.mapper_config().unwrap_err();
        assert!(err.to_string().contains("finger_controls"));
    }

    #[test]
    fn out_of_range_line_controller_is_fatal_at_load() {
        let cfg: Config = toml::from_str(
            r#"
            [mapping]
            line_control = 128
            "#,
        )
        .unwrap();
        let err = cfg.mapping.mapper_config().unwrap_err();
        assert!(err.to_string().contains("line_control"));
    }

    #[test]
    fn base_note_must_leave_room_for_all_four_fingers() {
        let cfg: Config = toml::from_str(
            r#"
            [mapping]
            base_note = 125
            "#,
        )
        .unwrap();
        assert!(cfg.mapping.mapper_config().is_err());

        let cfg: Config = toml::from_str(
            r#"
            [mapping]
            base_note = 124
            "#,
        )
        .unwrap();
        assert_eq!(cfg.mapping.mapper_config().unwrap().base_note, 124);
    }

    #[test]
    fn boundary_controller_numbers_are_accepted() {
        let cfg: Config = toml::from_str(
            r#"
            [mapping]
            finger_controls = [124, 125, 126, 127]
            line_control = 127
            "#,
        )
        .unwrap();
        let mc = cfg.mapping.mapper_config().unwrap();
        assert_eq!(mc.finger_controls, [124, 125, 126, 127]);
        assert_eq!(mc.line_control, 127);
    }
}
