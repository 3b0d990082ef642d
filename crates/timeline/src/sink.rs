//! Keyframe sinks: where compiled samples end up.
//!
//! The compiler knows nothing about animation storage. A host adapter
//! implements [`KeyframeSink`] and [`drive`] feeds it a sample stream.

use std::collections::BTreeMap;

use lipsyncer_common::error::LipsyncResult;
use lipsyncer_model::sample::Sample;
use lipsyncer_model::viseme::Vector3;

/// Receives samples in stream order.
pub trait KeyframeSink {
    /// Record one keyframe.
    fn insert_keyframe(&mut self, sample: &Sample) -> LipsyncResult<()>;

    /// Called once after the last sample.
    fn finish(&mut self) -> LipsyncResult<()> {
        Ok(())
    }
}

impl KeyframeSink for Vec<Sample> {
    fn insert_keyframe(&mut self, sample: &Sample) -> LipsyncResult<()> {
        self.push(*sample);
        Ok(())
    }
}

/// Per-frame keyframe storage. Writing a frame twice keeps the later value,
/// the way an animation curve replaces an existing key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyframeTrack {
    keys: BTreeMap<i64, Vector3>,
    overwritten: usize,
}

impl KeyframeTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Position keyed at `frame`.
    pub fn get(&self, frame: i64) -> Option<Vector3> {
        self.keys.get(&frame).copied()
    }

    /// How many inserts replaced an existing key.
    pub fn overwritten(&self) -> usize {
        self.overwritten
    }

    /// Keys in frame order.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.keys
            .iter()
            .map(|(&frame, &position)| Sample::new(frame, position))
    }
}

impl KeyframeSink for KeyframeTrack {
    fn insert_keyframe(&mut self, sample: &Sample) -> LipsyncResult<()> {
        if self.keys.insert(sample.frame, sample.position).is_some() {
            self.overwritten += 1;
        }
        Ok(())
    }
}

/// Feed every sample into `sink`, then finish it. Returns the number of
/// keyframes inserted.
pub fn drive<I, S>(samples: I, sink: &mut S) -> LipsyncResult<usize>
where
    I: IntoIterator<Item = Sample>,
    S: KeyframeSink + ?Sized,
{
    let mut count = 0;
    for sample in samples {
        sink.insert_keyframe(&sample)?;
        count += 1;
    }
    sink.finish()?;
    tracing::debug!(count, "inserted keyframes");
    Ok(count)
}
