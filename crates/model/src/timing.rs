//! Timing configuration for a compilation run.

use lipsyncer_common::config::TimingDefaults;
use lipsyncer_common::framerate::FrameRate;

/// Resolved timing for one compilation run.
///
/// Constructed through [`TimingConfig::new`] so that `fps` is always finite
/// and positive and `frame_step` is at least 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    fps: f64,
    frame_step: u32,
    blend_frames: u32,
}

/// Rejected timing values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimingError {
    #[error("fps must be a positive finite number, got {fps}")]
    InvalidFps { fps: f64 },

    #[error("frame rate {fps}/{base} is invalid")]
    InvalidFrameRate { fps: u32, base: f64 },

    #[error("frame_step must be at least 1")]
    ZeroFrameStep,
}

impl TimingConfig {
    pub fn new(fps: f64, frame_step: u32, blend_frames: u32) -> Result<Self, TimingError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(TimingError::InvalidFps { fps });
        }
        if frame_step == 0 {
            return Err(TimingError::ZeroFrameStep);
        }
        Ok(Self {
            fps,
            frame_step,
            blend_frames,
        })
    }

    /// Build from a rational host frame rate.
    pub fn from_frame_rate(
        rate: FrameRate,
        frame_step: u32,
        blend_frames: u32,
    ) -> Result<Self, TimingError> {
        Self::new(rate.as_f64(), frame_step, blend_frames)
    }

    /// Build from configured defaults.
    pub fn from_defaults(defaults: &TimingDefaults) -> Result<Self, TimingError> {
        let rate = defaults
            .frame_rate()
            .map_err(|_| TimingError::InvalidFrameRate {
                fps: defaults.fps,
                base: defaults.fps_base,
            })?;
        Self::from_frame_rate(rate, defaults.frame_step, defaults.blend_frames)
    }

    /// Resolved frames per second.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Distance between emitted frames within one cue.
    pub fn frame_step(&self) -> u32 {
        self.frame_step
    }

    /// Length of the cross-fade at the start of each cue.
    pub fn blend_frames(&self) -> u32 {
        self.blend_frames
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fps: 24.0,
            frame_step: 1,
            blend_frames: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = TimingConfig::new(24.0, 2, 4).unwrap();
        assert_eq!(config.fps(), 24.0);
        assert_eq!(config.frame_step(), 2);
        assert_eq!(config.blend_frames(), 4);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(
            TimingConfig::new(0.0, 1, 0),
            Err(TimingError::InvalidFps { fps: 0.0 })
        );
        assert!(TimingConfig::new(f64::INFINITY, 1, 0).is_err());
        assert_eq!(
            TimingConfig::new(24.0, 0, 0),
            Err(TimingError::ZeroFrameStep)
        );
    }

    #[test]
    fn test_from_frame_rate() {
        let rate = FrameRate::new(30, 1.001).unwrap();
        let config = TimingConfig::from_frame_rate(rate, 1, 0).unwrap();
        assert!((config.fps() - 30.0 / 1.001).abs() < 1e-12);
    }

    #[test]
    fn test_from_defaults() {
        let config = TimingConfig::from_defaults(&TimingDefaults::default()).unwrap();
        assert_eq!(config, TimingConfig::default());

        let bad = TimingDefaults {
            fps_base: 0.0,
            ..TimingDefaults::default()
        };
        assert!(matches!(
            TimingConfig::from_defaults(&bad),
            Err(TimingError::InvalidFrameRate { fps: 24, .. })
        ));
    }
}
