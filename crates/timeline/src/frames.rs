//! Cue-to-frame range mapping.

use std::iter::StepBy;
use std::ops::RangeInclusive;

use lipsyncer_common::framerate::secs_to_frame;
use lipsyncer_model::cue::Cue;

/// Inclusive frame range covered by one cue.
///
/// `end < start` is allowed and yields no frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpan {
    pub start: i64,
    pub end: i64,
}

impl FrameSpan {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Floor both cue timestamps onto the frame grid.
    pub fn of_cue(cue: &Cue, fps: f64) -> Self {
        Self {
            start: secs_to_frame(cue.start, fps),
            end: secs_to_frame(cue.end, fps),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// `start, start + step, ...` up to and including `end`.
    pub fn frames(&self, step: u32) -> StepBy<RangeInclusive<i64>> {
        (self.start..=self.end).step_by(step.max(1) as usize)
    }

    /// Number of frames [`FrameSpan::frames`] yields.
    pub fn frame_count(&self, step: u32) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.end.abs_diff(self.start) / step.max(1) as u64 + 1) as usize
        }
    }
}
