//! Lipsyncer Timeline — the cue-to-keyframe compiler
//!
//! Turns an ordered cue list and a viseme table into frame samples:
//! - **Frame spans:** Map each cue's seconds onto an inclusive frame range
//! - **Compiler:** Stream samples cue by cue, cross-fading at boundaries
//! - **Sinks:** Hand samples to whatever records keyframes
//! - **Export:** Write sample streams as JSON lines or CSV
//!
//! Compilation is pure computation — no I/O, no shared state. Only the
//! export writers touch the filesystem.

pub mod compiler;
pub mod export;
pub mod frames;
pub mod sink;

pub use compiler::{compile, CompileStats, SampleStream, TimelineCompiler};
pub use frames::FrameSpan;
pub use sink::{drive, KeyframeSink, KeyframeTrack};
