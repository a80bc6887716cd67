//! inner_voice — interactive entry point.

use anyhow::Result;
use inner_voice::app::{run, SourceSelect};
use inner_voice::config::Config;
use std::path::PathBuf;

const CONFIG_PATH: &str = "config.toml";

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Inner Voice — Hand Gesture MIDI/OSC Controller        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard + mouse simulation  (use --features leap for hardware)");
    println!();

    if let Err(e) = main_inner() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn main_inner() -> Result<()> {
    let (config_path, source) = parse_args()?;
    let cfg = Config::load_or_default(&config_path)?;

    println!("  MIDI:  port ~ \"{}\"  channel {}", cfg.midi.port_hint, cfg.midi.channel);
    println!("  OSC:   {}  ({} / {})", cfg.osc.addr, cfg.osc.distances_path, cfg.osc.line_path);
    println!(
        "  Map:   threshold {} px  CC {:?}+{}  notes from {}",
        cfg.mapping.threshold, cfg.mapping.finger_controls, cfg.mapping.line_control,
        cfg.mapping.base_note
    );
    println!();
    println!("  Opening visualizer window…");
    println!();

    run(cfg, source)
}

fn parse_args() -> Result<(PathBuf, SourceSelect)> {
    let mut config_path = PathBuf::from(CONFIG_PATH);
    let mut source = default_source();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let p = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config needs a path"))?;
                config_path = PathBuf::from(p);
            }
            "--replay" => {
                let p = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--replay needs a CSV path"))?;
                source = SourceSelect::Replay(PathBuf::from(p));
            }
            "--help" | "-h" => {
                println!("Usage: inner_voice [--config FILE] [--replay FILE.csv]");
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument: {}", other),
        }
    }

    Ok((config_path, source))
}

#[cfg(feature = "leap")]
fn default_source() -> SourceSelect {
    SourceSelect::Leap
}

#[cfg(not(feature = "leap"))]
fn default_source() -> SourceSelect {
    SourceSelect::Sim
}
