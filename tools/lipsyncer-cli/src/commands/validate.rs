//! Validate a cue file.

use std::path::PathBuf;

use lipsyncer_model::cue::CueDocument;
use lipsyncer_model::viseme::VisemeTable;

pub fn run(path: PathBuf, preset: Option<PathBuf>) -> anyhow::Result<()> {
    println!("Validating cues at: {}", path.display());

    let doc =
        CueDocument::load(&path).map_err(|e| anyhow::anyhow!("Failed to load cues: {e}"))?;

    if let Some(sound_file) = doc.metadata.as_ref().and_then(|m| m.sound_file.as_deref()) {
        println!("  Sound file: {sound_file}");
    }
    println!("  Cues: {}", doc.cues.len());
    println!("  Duration: {:.2}s", doc.duration_secs());

    let mut issues = vec![];

    for (index, pair) in doc.cues.windows(2).enumerate() {
        if pair[1].start < pair[0].start {
            issues.push(format!(
                "cue {} starts before cue {} ({:.3}s < {:.3}s)",
                index + 1,
                index,
                pair[1].start,
                pair[0].start
            ));
        }
    }
    for (index, cue) in doc.cues.iter().enumerate() {
        if cue.end < cue.start {
            issues.push(format!(
                "cue {index} ('{}') ends before it starts; it will produce no keyframes",
                cue.label
            ));
        }
    }

    if let Some(preset) = preset {
        let visemes = VisemeTable::load_preset(&preset)
            .map_err(|e| anyhow::anyhow!("Failed to load preset: {e}"))?;
        let unmapped: Vec<_> = doc
            .labels()
            .into_iter()
            .filter(|label| !visemes.contains(label))
            .collect();
        if unmapped.is_empty() {
            println!("  Preset: all labels mapped");
        } else {
            issues.push(format!(
                "labels without a viseme in {}: {}",
                preset.display(),
                unmapped.join(", ")
            ));
        }
    }

    if issues.is_empty() {
        println!("\nCue file is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!(
            "\n{} issue(s) found. Affected cues will be skipped or overlap.",
            issues.len()
        );
    }

    Ok(())
}
