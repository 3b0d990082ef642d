//! The cue timeline compiler.
//!
//! # Algorithm
//!
//! Cues are visited in input order while carrying the position of the last
//! cue that resolved to a viseme:
//!
//! 1. **Lookup:** resolve the cue label; unmapped labels are skipped and
//!    leave the carried position untouched.
//! 2. **Span:** floor `start * fps` and `end * fps` onto frame indices.
//! 3. **Enumerate:** walk `start, start + step, ...` through `end` inclusive.
//! 4. **Blend:** inside the first `blend_frames` frames of the cue, mix the
//!    carried position into the cue's own with `t = (f - start) / blend_frames`.
//! 5. **Carry:** the cue's position becomes the carried position.
//!
//! Blending only looks backwards, so the compiler is a single pass over the
//! cues with constant extra state. [`SampleStream`] exposes it as a lazy
//! iterator; [`TimelineCompiler::compile`] collects it.

use std::collections::BTreeSet;
use std::iter::StepBy;
use std::ops::RangeInclusive;

use lipsyncer_model::cue::Cue;
use lipsyncer_model::sample::Sample;
use lipsyncer_model::timing::TimingConfig;
use lipsyncer_model::viseme::{Vector3, VisemeLookup};

use crate::frames::FrameSpan;

/// Compiles cue lists with a fixed timing configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineCompiler {
    config: TimingConfig,
}

/// Counters gathered while a stream is consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileStats {
    /// Cues whose label resolved to a viseme.
    pub cues_compiled: usize,

    /// Cues dropped because their label is not in the table.
    pub cues_skipped: usize,

    /// Samples emitted so far.
    pub samples: usize,

    /// Distinct labels that had no viseme.
    pub unmapped_labels: BTreeSet<String>,
}

impl TimelineCompiler {
    pub fn new(config: TimingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Lazily compile `cues` against `visemes`.
    pub fn stream<'a, I, L>(&self, cues: I, visemes: &'a L) -> SampleStream<'a, I::IntoIter, L>
    where
        I: IntoIterator<Item = &'a Cue>,
        L: VisemeLookup + ?Sized,
    {
        SampleStream {
            cues: cues.into_iter(),
            visemes,
            config: self.config,
            previous: None,
            current: None,
            stats: CompileStats::default(),
        }
    }

    /// Compile every cue into a sample vector.
    pub fn compile<L>(&self, cues: &[Cue], visemes: &L) -> Vec<Sample>
    where
        L: VisemeLookup + ?Sized,
    {
        self.compile_with_stats(cues, visemes).0
    }

    /// Compile every cue, also returning the run's counters.
    pub fn compile_with_stats<L>(&self, cues: &[Cue], visemes: &L) -> (Vec<Sample>, CompileStats)
    where
        L: VisemeLookup + ?Sized,
    {
        let mut stream = self.stream(cues, visemes);
        let samples: Vec<Sample> = stream.by_ref().collect();
        let stats = stream.into_stats();

        tracing::debug!(
            cues = cues.len(),
            compiled = stats.cues_compiled,
            skipped = stats.cues_skipped,
            samples = samples.len(),
            "compiled cue timeline"
        );

        (samples, stats)
    }
}

/// Compile `cues` with `config` in one call.
pub fn compile<L>(cues: &[Cue], visemes: &L, config: TimingConfig) -> Vec<Sample>
where
    L: VisemeLookup + ?Sized,
{
    TimelineCompiler::new(config).compile(cues, visemes)
}

/// Lazy sample producer over a cue iterator.
pub struct SampleStream<'a, I, L: ?Sized> {
    cues: I,
    visemes: &'a L,
    config: TimingConfig,
    /// Position of the last cue that resolved to a viseme.
    previous: Option<Vector3>,
    current: Option<ActiveCue>,
    stats: CompileStats,
}

/// The cue whose frames are being emitted.
struct ActiveCue {
    span: FrameSpan,
    position: Vector3,
    blend_from: Option<Vector3>,
    frames: StepBy<RangeInclusive<i64>>,
}

impl ActiveCue {
    fn position_at(&self, frame: i64, blend_frames: u32) -> Vector3 {
        match self.blend_from {
            // `frame >= span.start`, so the offset cannot overflow even for
            // spans pinned at `i64::MAX`.
            Some(from) if blend_frames > 0 && frame - self.span.start < blend_frames as i64 => {
                let t = (frame - self.span.start) as f64 / blend_frames as f64;
                Vector3::blend(&from, &self.position, t)
            }
            _ => self.position,
        }
    }
}

impl<'a, I, L> SampleStream<'a, I, L>
where
    L: ?Sized,
{
    /// Counters for everything consumed so far.
    pub fn stats(&self) -> &CompileStats {
        &self.stats
    }

    pub fn into_stats(self) -> CompileStats {
        self.stats
    }
}

impl<'a, I, L> Iterator for SampleStream<'a, I, L>
where
    I: Iterator<Item = &'a Cue>,
    L: VisemeLookup + ?Sized,
{
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        loop {
            if let Some(active) = self.current.as_mut() {
                if let Some(frame) = active.frames.next() {
                    let position = active.position_at(frame, self.config.blend_frames());
                    self.stats.samples += 1;
                    return Some(Sample::new(frame, position));
                }
            }

            // Carry the finished cue's position even when it emitted nothing.
            if let Some(done) = self.current.take() {
                self.previous = Some(done.position);
            }

            let cue = self.cues.next()?;
            let Some(position) = self.visemes.position(&cue.label) else {
                self.stats.cues_skipped += 1;
                // Only clone the label the first time it is seen.
                if !self.stats.unmapped_labels.contains(&cue.label) {
                    self.stats.unmapped_labels.insert(cue.label.clone());
                }
                continue;
            };

            let span = FrameSpan::of_cue(cue, self.config.fps());
            self.stats.cues_compiled += 1;
            self.current = Some(ActiveCue {
                span,
                position,
                blend_from: self.previous,
                frames: span.frames(self.config.frame_step()),
            });
        }
    }
}
