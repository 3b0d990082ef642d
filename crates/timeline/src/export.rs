//! Sample export in JSON-lines and CSV formats.
//!
//! JSON-lines files open with a `# {...}` header comment describing how the
//! samples were produced, followed by one sample object per line:
//!
//! ```text
//! # {"schema_version":"1.0","generated_at":"...","target":"mouth_ctrl",...}
//! {"frame":0,"position":[0.0,0.0,0.0]}
//! {"frame":1,"position":[0.0,-0.02,0.0]}
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use lipsyncer_common::error::{LipsyncError, LipsyncResult};
use lipsyncer_model::sample::Sample;
use lipsyncer_model::timing::TimingConfig;
use serde::{Deserialize, Serialize};

use crate::sink::KeyframeSink;

/// Schema version written into export headers.
pub const EXPORT_SCHEMA_VERSION: &str = "1.0";

/// Metadata written at the top of a JSON-lines export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportHeader {
    pub schema_version: String,

    /// Wall-clock time of export (RFC 3339).
    pub generated_at: String,

    /// Animation target the keyframes are meant for.
    pub target: String,

    /// Cue file the samples were compiled from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    pub fps: f64,
    pub frame_step: u32,
    pub blend_frames: u32,
}

impl ExportHeader {
    pub fn new(target: impl Into<String>, config: &TimingConfig) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            target: target.into(),
            source: None,
            fps: config.fps(),
            frame_step: config.frame_step(),
            blend_frames: config.blend_frames(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// On-disk sample format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    JsonLines,
    Csv,
}

impl ExportFormat {
    /// Pick a format from the file extension; anything but `.csv` is JSON lines.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::JsonLines,
        }
    }
}

/// Streaming sample writer usable as a [`KeyframeSink`].
pub struct SampleWriter<W: Write> {
    writer: W,
    format: ExportFormat,
    written: usize,
}

impl<W: Write> SampleWriter<W> {
    /// Wrap `writer` and emit the format's header.
    pub fn new(mut writer: W, format: ExportFormat, header: &ExportHeader) -> LipsyncResult<Self> {
        match format {
            ExportFormat::JsonLines => {
                writeln!(writer, "# {}", serde_json::to_string(header)?)?;
            }
            ExportFormat::Csv => {
                writeln!(writer, "frame,x,y,z")?;
            }
        }
        Ok(Self {
            writer,
            format,
            written: 0,
        })
    }

    /// Samples written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl SampleWriter<BufWriter<File>> {
    /// Create (or truncate) `path`, choosing the format by extension.
    pub fn create(path: &Path, header: &ExportHeader) -> LipsyncResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path).map_err(|e| {
            LipsyncError::export(format!("cannot create {}: {e}", path.display()))
        })?;
        Self::new(BufWriter::new(file), ExportFormat::from_path(path), header)
    }
}

impl<W: Write> KeyframeSink for SampleWriter<W> {
    fn insert_keyframe(&mut self, sample: &Sample) -> LipsyncResult<()> {
        match self.format {
            ExportFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, sample)?;
                self.writer.write_all(b"\n")?;
            }
            ExportFormat::Csv => {
                let p = sample.position;
                writeln!(self.writer, "{},{},{},{}", sample.frame, p.x, p.y, p.z)?;
            }
        }
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> LipsyncResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Render samples as JSON lines with a header comment.
pub fn generate_jsonl(samples: &[Sample], header: &ExportHeader) -> LipsyncResult<String> {
    render(samples, ExportFormat::JsonLines, header)
}

/// Render samples as CSV.
pub fn generate_csv(samples: &[Sample], header: &ExportHeader) -> LipsyncResult<String> {
    render(samples, ExportFormat::Csv, header)
}

fn render(samples: &[Sample], format: ExportFormat, header: &ExportHeader) -> LipsyncResult<String> {
    let mut writer = SampleWriter::new(Vec::new(), format, header)?;
    crate::sink::drive(samples.iter().copied(), &mut writer)?;
    String::from_utf8(writer.into_inner()).map_err(|e| LipsyncError::export(e.to_string()))
}

/// Save samples to a file; the format follows the extension.
pub fn save_samples(samples: &[Sample], header: &ExportHeader, path: &Path) -> LipsyncResult<()> {
    let mut writer = SampleWriter::create(path, header)?;
    crate::sink::drive(samples.iter().copied(), &mut writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lipsyncer_model::viseme::Vector3;

    fn header() -> ExportHeader {
        ExportHeader::new("mouth_ctrl", &TimingConfig::new(24.0, 1, 2).unwrap())
    }

    fn samples() -> Vec<Sample> {
        vec![
            Sample::new(0, Vector3::new(0.0, 0.0, 0.0)),
            Sample::new(1, Vector3::new(0.5, -0.25, 0.0)),
        ]
    }

    #[test]
    fn test_jsonl_generation() {
        let out = generate_jsonl(&samples(), &header().with_source("hello.json")).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("# {"));
        assert!(lines[0].contains("\"target\":\"mouth_ctrl\""));
        assert!(lines[0].contains("\"source\":\"hello.json\""));
        assert!(lines[0].contains("\"blend_frames\":2"));
        assert_eq!(lines[2], r#"{"frame":1,"position":[0.5,-0.25,0.0]}"#);

        let parsed: Sample = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed, samples()[0]);
    }

    #[test]
    fn test_header_parses_back() {
        let out = generate_jsonl(&[], &header()).unwrap();
        let json = out.trim_end().strip_prefix("# ").unwrap();
        let parsed: ExportHeader = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(parsed.fps, 24.0);
        assert!(parsed.source.is_none());
    }

    #[test]
    fn test_csv_generation() {
        let out = generate_csv(&samples(), &header()).unwrap();
        assert_eq!(out, "frame,x,y,z\n0,0,0,0\n1,0.5,-0.25,0\n");
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ExportFormat::from_path(Path::new("keys.CSV")),
            ExportFormat::Csv
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("keys.jsonl")),
            ExportFormat::JsonLines
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("keys")),
            ExportFormat::JsonLines
        );
    }

    #[test]
    fn test_save_samples_writes_file() {
        let dir = std::env::temp_dir().join("lipsyncer_test_export");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("keys.csv");

        save_samples(&samples(), &header(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("frame,x,y,z\n"));
        assert_eq!(content.lines().count(), 3);

        std::fs::remove_dir_all(&dir).ok();
    }
}
