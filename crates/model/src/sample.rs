//! Animation samples emitted by the timeline compiler.

use serde::{Deserialize, Serialize};

use crate::viseme::Vector3;

/// One keyframe: the target position at a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub frame: i64,
    pub position: Vector3,
}

impl Sample {
    pub fn new(frame: i64, position: Vector3) -> Self {
        Self { frame, position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_json_shape() {
        let sample = Sample::new(12, Vector3::new(0.25, 0.0, -1.0));
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(json, r#"{"frame":12,"position":[0.25,0.0,-1.0]}"#);
    }
}
