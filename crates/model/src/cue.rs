//! Cue documents produced by an upstream phoneme/viseme detector.
//!
//! The accepted document shape is Rhubarb Lip Sync's JSON export:
//!
//! ```json
//! {
//!   "metadata": { "soundFile": "hello.wav", "duration": 1.47 },
//!   "mouthCues": [
//!     { "start": 0.00, "end": 0.05, "value": "X" },
//!     { "start": 0.05, "end": 0.27, "value": "D" }
//!   ]
//! }
//! ```
//!
//! Cues are kept in document order. Nothing here sorts, merges, or
//! deduplicates them; overlapping cues simply produce overlapping samples
//! and the keyframe sink keeps whichever it receives last.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level key holding the cue list.
pub const CUE_LIST_KEY: &str = "mouthCues";

/// Duration assumed for a cue without an `end` timestamp.
pub const DEFAULT_CUE_DURATION_SECS: f64 = 0.1;

/// A labeled time interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCue")]
pub struct Cue {
    /// Viseme/phoneme label (Rhubarb shape letter such as `"A"` or `"X"`).
    #[serde(rename = "value")]
    pub label: String,

    /// Start time in seconds.
    pub start: f64,

    /// End time in seconds.
    pub end: f64,
}

/// Wire form of a cue, where `end` may be omitted.
#[derive(Deserialize)]
struct RawCue {
    value: String,
    start: f64,
    #[serde(default)]
    end: Option<f64>,
}

impl From<RawCue> for Cue {
    fn from(raw: RawCue) -> Self {
        let end = raw.end.unwrap_or(raw.start + DEFAULT_CUE_DURATION_SECS);
        Self {
            label: raw.value,
            start: raw.start,
            end,
        }
    }
}

impl Cue {
    /// Create a cue with an explicit end.
    pub fn new(label: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }

    /// Create a cue whose end falls back to `start + 0.1`.
    pub fn open_ended(label: impl Into<String>, start: f64) -> Self {
        Self::new(label, start, start + DEFAULT_CUE_DURATION_SECS)
    }

    /// Length of the interval in seconds (negative for malformed cues).
    pub fn duration_secs(&self) -> f64 {
        self.end - self.start
    }
}

/// Optional document metadata emitted alongside the cue list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CueMetadata {
    /// Audio file the cues were detected from.
    #[serde(default)]
    pub sound_file: Option<String>,

    /// Audio duration in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
}

/// A decoded cue document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CueMetadata>,

    #[serde(rename = "mouthCues")]
    pub cues: Vec<Cue>,
}

/// Structural problems with a cue document.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("cue document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cue document must be a JSON object")]
    NotAnObject,

    #[error("invalid cue document: missing `{key}` list")]
    MissingCueList { key: &'static str },

    #[error("invalid cue document: `{key}` must be a list")]
    CueListNotArray { key: &'static str },

    #[error("invalid cue at index {index}: {source}")]
    InvalidCue {
        index: usize,
        source: serde_json::Error,
    },
}

/// Errors that can occur when loading a cue file from disk.
#[derive(Debug, thiserror::Error)]
pub enum CueLoadError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Format error in {path}: {source}")]
    Format { path: PathBuf, source: FormatError },
}

impl CueDocument {
    /// Decode a document that has already been parsed as JSON.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, FormatError> {
        let object = value.as_object().ok_or(FormatError::NotAnObject)?;

        let list = object
            .get(CUE_LIST_KEY)
            .ok_or(FormatError::MissingCueList { key: CUE_LIST_KEY })?
            .as_array()
            .ok_or(FormatError::CueListNotArray { key: CUE_LIST_KEY })?;

        let cues = list
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Cue::deserialize(item).map_err(|source| FormatError::InvalidCue { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Metadata is informational; a malformed block is dropped.
        let metadata = object
            .get("metadata")
            .and_then(|m| CueMetadata::deserialize(m).ok());

        Ok(Self { metadata, cues })
    }

    /// Parse and decode a JSON string.
    pub fn parse(json: &str) -> Result<Self, FormatError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Read and decode a cue file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CueLoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CueLoadError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content).map_err(|e| CueLoadError::Format {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Distinct labels in sorted order.
    pub fn labels(&self) -> BTreeSet<&str> {
        self.cues.iter().map(|c| c.label.as_str()).collect()
    }

    /// Number of cues per label, sorted by label.
    pub fn label_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for cue in &self.cues {
            *counts.entry(cue.label.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Latest cue end time, or the metadata duration if larger.
    pub fn duration_secs(&self) -> f64 {
        let cue_end = self.cues.iter().map(|c| c.end).fold(0.0, f64::max);
        let meta = self
            .metadata
            .as_ref()
            .and_then(|m| m.duration)
            .unwrap_or(0.0);
        cue_end.max(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RHUBARB: &str = r#"{
        "metadata": { "soundFile": "hello.wav", "duration": 0.62 },
        "mouthCues": [
            { "start": 0.00, "end": 0.05, "value": "X" },
            { "start": 0.05, "end": 0.27, "value": "D" },
            { "start": 0.27, "end": 0.31, "value": "C" },
            { "start": 0.31, "end": 0.62, "value": "X" }
        ]
    }"#;

    #[test]
    fn test_parse_rhubarb_document() {
        let doc = CueDocument::parse(RHUBARB).unwrap();
        assert_eq!(doc.cues.len(), 4);
        assert_eq!(doc.cues[1], Cue::new("D", 0.05, 0.27));

        let meta = doc.metadata.unwrap();
        assert_eq!(meta.sound_file.as_deref(), Some("hello.wav"));
        assert_eq!(meta.duration, Some(0.62));
    }

    #[test]
    fn test_missing_end_defaults_to_tenth_of_second() {
        let doc = CueDocument::parse(r#"{"mouthCues":[{"start":1.5,"value":"A"}]}"#).unwrap();
        assert_eq!(doc.cues[0].label, "A");
        assert!((doc.cues[0].end - 1.6).abs() < 1e-12);
    }

    #[test]
    fn test_missing_cue_list_is_format_error() {
        let err = CueDocument::parse(r#"{"cues":[]}"#).unwrap_err();
        assert!(matches!(
            err,
            FormatError::MissingCueList { key: "mouthCues" }
        ));
    }

    #[test]
    fn test_non_object_and_non_list_are_rejected() {
        assert!(matches!(
            CueDocument::parse("[]").unwrap_err(),
            FormatError::NotAnObject
        ));
        assert!(matches!(
            CueDocument::parse(r#"{"mouthCues": 3}"#).unwrap_err(),
            FormatError::CueListNotArray { .. }
        ));
        assert!(matches!(
            CueDocument::parse("{").unwrap_err(),
            FormatError::Json(_)
        ));
    }

    #[test]
    fn test_cue_without_label_or_start_is_rejected() {
        let err = CueDocument::parse(r#"{"mouthCues":[{"start":0.0,"value":"A"},{"start":1.0}]}"#)
            .unwrap_err();
        assert!(matches!(err, FormatError::InvalidCue { index: 1, .. }));

        let err = CueDocument::parse(r#"{"mouthCues":[{"value":"A"}]}"#).unwrap_err();
        assert!(matches!(err, FormatError::InvalidCue { index: 0, .. }));
    }

    #[test]
    fn test_order_is_preserved() {
        let doc = CueDocument::parse(
            r#"{"mouthCues":[{"start":2.0,"value":"B"},{"start":0.0,"value":"A"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.cues[0].label, "B");
        assert_eq!(doc.cues[1].label, "A");
    }

    #[test]
    fn test_malformed_metadata_is_ignored() {
        let doc = CueDocument::parse(r#"{"metadata":"oops","mouthCues":[]}"#).unwrap();
        assert!(doc.metadata.is_none());
        assert!(doc.cues.is_empty());
    }

    #[test]
    fn test_labels_and_counts() {
        let doc = CueDocument::parse(RHUBARB).unwrap();
        let labels: Vec<_> = doc.labels().into_iter().collect();
        assert_eq!(labels, vec!["C", "D", "X"]);
        assert_eq!(doc.label_counts()["X"], 2);
    }

    #[test]
    fn test_document_duration() {
        let doc = CueDocument::parse(RHUBARB).unwrap();
        assert!((doc.duration_secs() - 0.62).abs() < 1e-12);
    }

    #[test]
    fn test_serialized_cue_uses_value_key() {
        let json = serde_json::to_string(&Cue::new("E", 0.5, 0.75)).unwrap();
        assert!(json.contains("\"value\":\"E\""));
        assert!(json.contains("\"end\":0.75"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CueDocument::load("/nonexistent/lipsyncer/cues.json").unwrap_err();
        assert!(matches!(err, CueLoadError::IoError { .. }));
    }

    proptest! {
        #[test]
        fn open_ended_cues_span_default_duration(start in 0.0f64..3600.0) {
            let json = format!(r#"{{"mouthCues":[{{"start":{start},"value":"A"}}]}}"#);
            let doc = CueDocument::parse(&json).unwrap();
            let cue = &doc.cues[0];
            prop_assert!((cue.start - start).abs() < 1e-9);
            prop_assert_eq!(cue.end, cue.start + DEFAULT_CUE_DURATION_SECS);
        }
    }
}
