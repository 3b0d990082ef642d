//! List the labels used in a cue file.

use std::path::PathBuf;

use lipsyncer_model::cue::CueDocument;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let doc =
        CueDocument::load(&path).map_err(|e| anyhow::anyhow!("Failed to load cues: {e}"))?;

    let counts = doc.label_counts();
    println!("Labels in {}:", path.display());
    for (label, count) in &counts {
        println!("  {label}: {count} cue(s)");
    }
    println!();
    println!("{} distinct label(s), {} cue(s)", counts.len(), doc.cues.len());

    Ok(())
}
