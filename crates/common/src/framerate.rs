//! Frame rate utilities for mapping cue timestamps onto animation frames.
//!
//! Host applications describe their frame rate as a rational pair
//! (`fps / fps_base`, e.g. `30 / 1.001` for NTSC). Everything downstream
//! works with the already-resolved float rate.

use serde::{Deserialize, Serialize};

use crate::error::{LipsyncError, LipsyncResult};

/// A rational frame rate as stored in host render settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameRate {
    /// Integer frames per second.
    pub fps: u32,

    /// Divisor applied to `fps` (1.0 for integer rates, 1.001 for NTSC).
    pub base: f64,
}

impl FrameRate {
    /// Create a frame rate, rejecting a zero rate or a non-positive base.
    pub fn new(fps: u32, base: f64) -> LipsyncResult<Self> {
        if fps == 0 {
            return Err(LipsyncError::config("frame rate must be greater than zero"));
        }
        if !base.is_finite() || base <= 0.0 {
            return Err(LipsyncError::config(format!(
                "frame rate base must be a positive number, got {base}"
            )));
        }
        Ok(Self { fps, base })
    }

    /// Resolved frames per second.
    pub fn as_f64(&self) -> f64 {
        self.fps as f64 / self.base
    }

    /// Convert seconds to the frame containing that instant.
    pub fn secs_to_frame(&self, secs: f64) -> i64 {
        secs_to_frame(secs, self.as_f64())
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self { fps: 24, base: 1.0 }
    }
}

/// Floor `secs * fps` to an integer frame index.
pub fn secs_to_frame(secs: f64, fps: f64) -> i64 {
    (secs * fps).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_rate() {
        let rate = FrameRate::new(24, 1.0).unwrap();
        assert_eq!(rate.as_f64(), 24.0);
        assert_eq!(rate.secs_to_frame(1.0), 24);
    }

    #[test]
    fn test_ntsc_rate() {
        let rate = FrameRate::new(30, 1.001).unwrap();
        assert!((rate.as_f64() - 29.97003).abs() < 1e-5);
        // 1 second of NTSC is not quite 30 frames
        assert_eq!(rate.secs_to_frame(1.0), 29);
    }

    #[test]
    fn test_secs_to_frame_floors() {
        assert_eq!(secs_to_frame(0.99, 10.0), 9);
        assert_eq!(secs_to_frame(0.0, 24.0), 0);
        assert_eq!(secs_to_frame(0.05, 24.0), 1);
    }

    #[test]
    fn test_rejects_invalid_rates() {
        assert!(FrameRate::new(0, 1.0).is_err());
        assert!(FrameRate::new(24, 0.0).is_err());
        assert!(FrameRate::new(24, -1.0).is_err());
        assert!(FrameRate::new(24, f64::NAN).is_err());
    }
}
