//! Clamp-and-rescale from a measured range into a MIDI value range.

use std::error::Error;
use std::fmt;

/// A validated input→output scaling range.
///
/// Construction rejects `in_min >= in_max`, so the per-frame path can never
/// divide by zero; a bad range is a configuration error, not a runtime one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRange {
    in_min: f32,
    in_max: f32,
    out_min: u8,
    out_max: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRangeError {
    pub in_min: f32,
    pub in_max: f32,
}

impl fmt::Display for ScaleRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid scale range: in_min ({}) must be below in_max ({})",
            self.in_min, self.in_max
        )
    }
}

impl Error for ScaleRangeError {}

impl ScaleRange {
    pub fn new(in_min: f32, in_max: f32, out_min: u8, out_max: u8) -> Result<Self, ScaleRangeError> {
        if in_min >= in_max {
            return Err(ScaleRangeError { in_min, in_max });
        }
        Ok(Self {
            in_min,
            in_max,
            out_min,
            out_max,
        })
    }

    /// Full MIDI output range 0–127 over the given input span.
    pub fn midi(in_min: f32, in_max: f32) -> Result<Self, ScaleRangeError> {
        Self::new(in_min, in_max, 0, 127)
    }

    /// Clamp `value` into the input span, then rescale linearly into the
    /// output span, rounding to the nearest integer.
    pub fn scaled(&self, value: f32) -> u8 {
        let clamped = value.clamp(self.in_min, self.in_max);
        let t = (clamped - self.in_min) / (self.in_max - self.in_min);
        let out = self.out_min as f32 + t * (self.out_max as f32 - self.out_min as f32);
        out.round() as u8
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturates_at_out_min() {
        let r = ScaleRange::midi(100.0, 800.0).unwrap();
        assert_eq!(r.scaled(100.0), 0);
        assert_eq!(r.scaled(-50.0), 0);
        assert_eq!(r.scaled(0.0), 0);
    }

    #[test]
    fn saturates_at_out_max() {
        let r = ScaleRange::midi(100.0, 800.0).unwrap();
        assert_eq!(r.scaled(800.0), 127);
        assert_eq!(r.scaled(5000.0), 127);
    }

    #[test]
    fn endpoints_of_standard_range() {
        let r = ScaleRange::midi(0.0, 1000.0).unwrap();
        assert_eq!(r.scaled(0.0), 0);
        assert_eq!(r.scaled(1000.0), 127);
    }

    #[test]
    fn midpoint_rounds_to_nearest() {
        // 500/1000 · 127 = 63.5 → rounds up to 64.
        let r = ScaleRange::midi(0.0, 1000.0).unwrap();
        assert_eq!(r.scaled(500.0), 64);
    }

    #[test]
    fn monotonic_non_decreasing() {
        let r = ScaleRange::midi(0.0, 300.0).unwrap();
        let mut prev = r.scaled(-10.0);
        let mut v = -10.0f32;
        while v <= 310.0 {
            let cur = r.scaled(v);
            assert!(cur >= prev, "not monotonic at {}", v);
            prev = cur;
            v += 0.5;
        }
    }

    #[test]
    fn degenerate_range_rejected() {
        assert!(ScaleRange::midi(300.0, 300.0).is_err());
        assert!(ScaleRange::midi(300.0, 200.0).is_err());
        let err = ScaleRange::midi(1.0, 1.0).unwrap_err();
        assert!(err.to_string().contains("in_min"));
    }

    #[test]
    fn custom_output_span() {
        let r = ScaleRange::new(0.0, 10.0, 20, 40).unwrap();
        assert_eq!(r.scaled(0.0), 20);
        assert_eq!(r.scaled(5.0), 30);
        assert_eq!(r.scaled(10.0), 40);
    }
}
