//! Compile cue files into keyframe exports.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use lipsyncer_common::config::{AppConfig, TimingDefaults};
use lipsyncer_model::cue::CueDocument;
use lipsyncer_model::timing::TimingConfig;
use lipsyncer_model::viseme::VisemeTable;
use lipsyncer_timeline::compiler::{CompileStats, TimelineCompiler};
use lipsyncer_timeline::export::{ExportHeader, SampleWriter};
use lipsyncer_timeline::sink::{drive, KeyframeTrack};

#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Cue JSON files (Rhubarb `-f json` output)
    #[arg(required = true)]
    pub cues: Vec<PathBuf>,

    /// Viseme preset mapping labels to positions
    #[arg(short, long)]
    pub preset: PathBuf,

    /// Render frame rate (overrides config)
    #[arg(long)]
    pub fps: Option<u32>,

    /// Frame rate divisor, e.g. 1.001 for NTSC (overrides config)
    #[arg(long)]
    pub fps_base: Option<f64>,

    /// Insert a keyframe every N frames (overrides config)
    #[arg(long)]
    pub frame_step: Option<u32>,

    /// Cross-fade over the first N frames of each cue (overrides config)
    #[arg(long)]
    pub blend_frames: Option<u32>,

    /// Bone the keyframes drive (overrides config)
    #[arg(long)]
    pub target: Option<String>,

    /// Output file (.jsonl or .csv); only valid with a single cue file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Collapse frames keyed more than once, keeping the later key
    #[arg(long)]
    pub merge: bool,
}

/// Outcome of compiling one cue file.
struct CompileReport {
    input: PathBuf,
    output: PathBuf,
    inserted: usize,
    overwritten: usize,
    stats: CompileStats,
}

pub async fn run(args: CompileArgs, config: &AppConfig) -> anyhow::Result<()> {
    if args.output.is_some() && args.cues.len() > 1 {
        anyhow::bail!("--output can only be used with a single cue file");
    }

    let jobs = plan_outputs(&args.cues, args.output.as_deref())?;
    let timing = resolve_timing(&args, &config.timing)?;
    let target = args
        .target
        .clone()
        .unwrap_or_else(|| config.target_bone.clone());

    let preset = resolve_preset(&args.preset, &config.presets_dir);
    let visemes = VisemeTable::load_preset(&preset)
        .map_err(|e| anyhow::anyhow!("Failed to load preset: {e}"))?;
    println!(
        "Compiling {} cue file(s) with {} visemes ({:.3} fps, step {}, blend {})",
        args.cues.len(),
        visemes.len(),
        timing.fps(),
        timing.frame_step(),
        timing.blend_frames()
    );

    let visemes = Arc::new(visemes);
    let compiler = TimelineCompiler::new(timing);

    let mut handles = Vec::with_capacity(jobs.len());
    for (input, output) in jobs {
        let visemes = Arc::clone(&visemes);
        let target = target.clone();
        let merge = args.merge;
        handles.push(tokio::task::spawn_blocking(move || {
            compile_file(input, output, &compiler, &visemes, &target, merge)
        }));
    }

    let mut failures = 0;
    for handle in handles {
        match handle.await? {
            Ok(report) => print_report(&report),
            Err(e) => {
                tracing::error!("{e:#}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} cue file(s) failed to compile");
    }
    println!("\nCompilation complete.");
    Ok(())
}

fn compile_file(
    input: PathBuf,
    output: PathBuf,
    compiler: &TimelineCompiler,
    visemes: &VisemeTable,
    target: &str,
    merge: bool,
) -> anyhow::Result<CompileReport> {
    let doc = CueDocument::load(&input)
        .map_err(|e| anyhow::anyhow!("Failed to load cues: {e}"))?;
    tracing::debug!(input = %input.display(), cues = doc.cues.len(), "loaded cue file");

    let header =
        ExportHeader::new(target, compiler.config()).with_source(input.display().to_string());
    let mut writer = SampleWriter::create(&output, &header)
        .map_err(|e| anyhow::anyhow!("Failed to open output: {e}"))?;

    let mut stream = compiler.stream(&doc.cues, visemes);
    let (inserted, overwritten) = if merge {
        let mut track = KeyframeTrack::new();
        drive(stream.by_ref(), &mut track)?;
        drive(track.samples(), &mut writer)?;
        (track.len(), track.overwritten())
    } else {
        (drive(stream.by_ref(), &mut writer)?, 0)
    };
    let stats = stream.into_stats();

    if !stats.unmapped_labels.is_empty() {
        tracing::warn!(
            input = %input.display(),
            labels = ?stats.unmapped_labels,
            skipped = stats.cues_skipped,
            "skipped cues with no matching viseme"
        );
    }

    Ok(CompileReport {
        input,
        output,
        inserted,
        overwritten,
        stats,
    })
}

fn print_report(report: &CompileReport) {
    println!("  {}", report.input.display());
    println!(
        "    Cues: {} compiled, {} skipped",
        report.stats.cues_compiled, report.stats.cues_skipped
    );
    if report.overwritten > 0 {
        println!("    Merged {} overlapping keyframes", report.overwritten);
    }
    println!("    Inserted {} keyframes", report.inserted);
    println!("    Output: {}", report.output.display());
}

/// Pair every input with its output path, refusing inputs that would write
/// the same file.
fn plan_outputs(
    inputs: &[PathBuf],
    output: Option<&Path>,
) -> anyhow::Result<Vec<(PathBuf, PathBuf)>> {
    let mut seen = HashSet::new();
    let mut jobs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let target = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_path(input));
        if !seen.insert(target.clone()) {
            anyhow::bail!(
                "{} would overwrite {}, which another input already writes",
                input.display(),
                target.display()
            );
        }
        jobs.push((input.clone(), target));
    }
    Ok(jobs)
}

/// Apply CLI overrides on top of configured timing defaults.
fn resolve_timing(args: &CompileArgs, defaults: &TimingDefaults) -> anyhow::Result<TimingConfig> {
    let merged = TimingDefaults {
        fps: args.fps.unwrap_or(defaults.fps),
        fps_base: args.fps_base.unwrap_or(defaults.fps_base),
        frame_step: args.frame_step.unwrap_or(defaults.frame_step),
        blend_frames: args.blend_frames.unwrap_or(defaults.blend_frames),
    };
    TimingConfig::from_defaults(&merged).map_err(|e| anyhow::anyhow!("Invalid timing: {e}"))
}

/// Fall back to the presets directory for relative paths that don't exist.
fn resolve_preset(preset: &Path, presets_dir: &Path) -> PathBuf {
    if preset.is_relative() && !preset.exists() {
        let candidate = presets_dir.join(preset);
        if candidate.exists() {
            return candidate;
        }
    }
    preset.to_path_buf()
}

/// `<dir>/<stem>_keys.jsonl` next to the cue file.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cues".to_string());
    input.with_file_name(format!("{stem}_keys.jsonl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CompileArgs {
        CompileArgs {
            cues: vec![PathBuf::from("hello.json")],
            preset: PathBuf::from("preset.json"),
            fps: None,
            fps_base: None,
            frame_step: None,
            blend_frames: None,
            target: None,
            output: None,
            merge: false,
        }
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/tmp/audio/hello_rhubarb.txt")),
            PathBuf::from("/tmp/audio/hello_rhubarb_keys.jsonl")
        );
    }

    #[test]
    fn test_plan_outputs_rejects_colliding_outputs() {
        let jobs = plan_outputs(
            &[PathBuf::from("/x/hello.json"), PathBuf::from("/x/world.json")],
            None,
        )
        .unwrap();
        assert_eq!(jobs[1].1, PathBuf::from("/x/world_keys.jsonl"));

        let same_stem = [PathBuf::from("/x/hello.json"), PathBuf::from("/x/hello.txt")];
        assert!(plan_outputs(&same_stem, None).is_err());

        let repeated = [PathBuf::from("/x/hello.json"), PathBuf::from("/x/hello.json")];
        assert!(plan_outputs(&repeated, None).is_err());
    }

    #[test]
    fn test_plan_outputs_uses_explicit_output() {
        let jobs = plan_outputs(&[PathBuf::from("hello.json")], Some(Path::new("out.csv"))).unwrap();
        assert_eq!(jobs, vec![(PathBuf::from("hello.json"), PathBuf::from("out.csv"))]);
    }

    #[test]
    fn test_resolve_preset_prefers_existing_path() {
        let dir = std::env::temp_dir().join("lipsyncer_test_presets_dir");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("jaw.json"), "[]").unwrap();

        assert_eq!(
            resolve_preset(Path::new("jaw.json"), &dir),
            dir.join("jaw.json")
        );
        assert_eq!(
            resolve_preset(Path::new("missing.json"), &dir),
            PathBuf::from("missing.json")
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut args = args();
        args.fps = Some(30);
        args.fps_base = Some(1.001);
        args.blend_frames = Some(0);

        let timing = resolve_timing(&args, &TimingDefaults::default()).unwrap();
        assert!((timing.fps() - 30.0 / 1.001).abs() < 1e-12);
        assert_eq!(timing.frame_step(), 1);
        assert_eq!(timing.blend_frames(), 0);
    }

    #[test]
    fn test_invalid_timing_is_rejected() {
        let mut args = args();
        args.frame_step = Some(0);
        assert!(resolve_timing(&args, &TimingDefaults::default()).is_err());
    }
}
