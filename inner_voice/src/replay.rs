//! CSV landmark replay.
//!
//! Recorded sessions are flat CSVs with a `frame,hand,landmark,x,y` header,
//! one row per landmark.  Replaying one through the normal source channel
//! exercises the whole pipeline with no camera, estimator, or window input.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use gesture_map::{HandFrame, HandLandmark, Landmark, TrackedHand};

use crate::source::HandSource;

/// Hands per frame accepted from a replay file.
const MAX_HANDS: usize = 4;

/// Highest frame index accepted from a replay file.  Gap filling materializes
/// one `HandFrame` per index up to the largest one seen, so a stray huge
/// frame number would otherwise balloon the frame vector.
const MAX_FRAME_INDEX: usize = 1_000_000;

/// Parse a recorded landmark CSV into per-frame hand sets.
///
/// Frame indices may be sparse; gaps are filled by repeating the previous
/// frame, so playback timing stays uniform.
pub fn load_frames_from_reader<R: Read>(reader: R, width: u32, height: u32) -> Result<Vec<HandFrame>> {
    let mut csv = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let mut frames: BTreeMap<usize, BTreeMap<usize, TrackedHand>> = BTreeMap::new();

    for (row_idx, result) in csv.records().enumerate() {
        let record = result.with_context(|| format!("invalid row {}", row_idx + 1))?;
        if record.len() < 5 {
            bail!("row {} has {} columns, expected 5", row_idx + 1, record.len());
        }

        let frame: usize = record[0]
            .parse()
            .with_context(|| format!("bad frame index in row {}", row_idx + 1))?;
        let hand: usize = record[1]
            .parse()
            .with_context(|| format!("bad hand index in row {}", row_idx + 1))?;
        let landmark: usize = record[2]
            .parse()
            .with_context(|| format!("bad landmark index in row {}", row_idx + 1))?;
        let x: f32 = record[3].parse()?;
        let y: f32 = record[4].parse()?;

        if hand >= MAX_HANDS {
            bail!("hand {} out of range in row {}", hand, row_idx + 1);
        }
        if frame > MAX_FRAME_INDEX {
            bail!(
                "frame index {} in row {} exceeds the {} limit",
                frame,
                row_idx + 1,
                MAX_FRAME_INDEX
            );
        }
        if HandLandmark::from_index(landmark).is_none() {
            bail!("landmark {} out of range in row {}", landmark, row_idx + 1);
        }

        let tracked = frames
            .entry(frame)
            .or_default()
            .entry(hand)
            .or_insert_with(TrackedHand::default);
        tracked.landmarks[landmark] = Landmark::new(x, y);
    }

    if frames.is_empty() {
        bail!("replay file contains no landmark rows");
    }

    let max_frame = *frames.keys().max().unwrap_or(&0);
    let mut out = Vec::with_capacity(max_frame + 1);
    let mut last = HandFrame::empty(width, height);
    for idx in 0..=max_frame {
        if let Some(hands) = frames.get(&idx) {
            last = HandFrame {
                hands: hands.values().copied().collect(),
                width,
                height,
            };
        }
        out.push(last.clone());
    }

    Ok(out)
}

pub fn load_frames_from_path<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<Vec<HandFrame>> {
    let file = std::fs::File::open(&path)
        .with_context(|| format!("failed to open {}", path.as_ref().display()))?;
    load_frames_from_reader(file, width, height)
}

// ════════════════════════════════════════════════════════════════════════════
// ReplayHandSource
// ════════════════════════════════════════════════════════════════════════════

/// Hand source that replays a recorded CSV at a fixed frame rate, then
/// closes its channel.
pub struct ReplayHandSource {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl HandSource for ReplayHandSource {
    fn run(self: Box<Self>, tx: Sender<HandFrame>) {
        let frames = match load_frames_from_path(&self.path, self.width, self.height) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("[replay] {:#}", e);
                return;
            }
        };

        eprintln!(
            "[replay] {} frames from {} at {} fps",
            frames.len(),
            self.path.display(),
            self.fps
        );

        let period = Duration::from_millis((1000 / self.fps.max(1)) as u64);
        for frame in frames {
            if tx.send(frame).is_err() {
                return;
            }
            thread::sleep(period);
        }
        // Dropping tx ends the session once the recording runs out.
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
