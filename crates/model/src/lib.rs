//! Lipsyncer Model
//!
//! Defines the data contracts shared by the cue parser and the timeline
//! compiler:
//! - **Cues:** Labeled time intervals decoded from a phoneme detector's output
//! - **Visemes:** Named 3D target positions, editable and saved as presets
//! - **Timing:** Resolved frame rate, keyframe step, and blend window
//! - **Samples:** Discrete `(frame, position)` output pairs
//!
//! All times are in seconds; all frame indices are integers on the host
//! timeline.

pub mod cue;
pub mod preview;
pub mod sample;
pub mod timing;
pub mod viseme;

pub use cue::*;
pub use preview::*;
pub use sample::*;
pub use timing::*;
pub use viseme::*;
