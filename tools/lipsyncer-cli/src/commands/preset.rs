//! Create and edit viseme presets.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use lipsyncer_model::cue::CueDocument;
use lipsyncer_model::preview::PreviewSelection;
use lipsyncer_model::viseme::{Vector3, VisemeDefinition, VisemeTable};

#[derive(Subcommand, Debug)]
pub enum PresetAction {
    /// Add an entry for every cue label missing from the preset
    Init {
        /// Path to the cue JSON file
        cues: PathBuf,

        /// Preset file to create or extend
        #[arg(short, long)]
        preset: PathBuf,
    },

    /// Add a viseme, or move an existing one
    Add {
        /// Preset file
        preset: PathBuf,

        /// Viseme name (defaults to V<n>)
        #[arg(long)]
        name: Option<String>,

        /// Target position as x,y,z
        #[arg(long, value_parser = parse_position, allow_hyphen_values = true)]
        position: Option<Vector3>,
    },

    /// Remove a viseme by name
    Remove {
        /// Preset file
        preset: PathBuf,

        /// Viseme name
        name: String,
    },

    /// Print the preset table
    Show {
        /// Preset file
        preset: PathBuf,

        /// Viseme to preview on the target
        #[arg(long)]
        preview: Option<String>,
    },
}

pub fn run(action: PresetAction) -> anyhow::Result<()> {
    match action {
        PresetAction::Init { cues, preset } => init(&cues, &preset),
        PresetAction::Add {
            preset,
            name,
            position,
        } => add(&preset, name, position),
        PresetAction::Remove { preset, name } => remove(&preset, &name),
        PresetAction::Show { preset, preview } => show(&preset, preview.as_deref()),
    }
}

fn init(cues: &Path, preset: &Path) -> anyhow::Result<()> {
    let doc = CueDocument::load(cues).map_err(|e| anyhow::anyhow!("Failed to load cues: {e}"))?;
    let mut table = load_or_new(preset)?;

    let labels = doc.labels();
    let added = table.import_labels(&labels);
    save(&table, preset)?;

    println!(
        "Found {} label(s), added {added} new viseme(s) to {}",
        labels.len(),
        preset.display()
    );
    Ok(())
}

fn add(preset: &Path, name: Option<String>, position: Option<Vector3>) -> anyhow::Result<()> {
    let mut table = load_or_new(preset)?;
    let position = position.unwrap_or_default();

    match name {
        Some(name) if table.contains(&name) => {
            table.set_position(&name, position);
            println!("Updated {name}");
        }
        Some(name) => {
            table.push(VisemeDefinition::new(name.clone(), position));
            println!("Added {name}");
        }
        None => {
            // The generated name may already exist; address the new entry by index.
            let index = table.add_placeholder();
            table.set_position_at(index, position);
            println!("Added {}", table.entries()[index].name);
        }
    }

    save(&table, preset)
}

fn remove(preset: &Path, name: &str) -> anyhow::Result<()> {
    let mut table = VisemeTable::load_preset(preset)
        .map_err(|e| anyhow::anyhow!("Failed to load preset: {e}"))?;

    let index = table
        .index_of(name)
        .ok_or_else(|| anyhow::anyhow!("No viseme named '{name}' in {}", preset.display()))?;
    table.remove(index);
    save(&table, preset)?;

    println!("Removed {name}");
    Ok(())
}

fn show(preset: &Path, preview: Option<&str>) -> anyhow::Result<()> {
    let table = VisemeTable::load_preset(preset)
        .map_err(|e| anyhow::anyhow!("Failed to load preset: {e}"))?;

    let mut selection = PreviewSelection::new();
    if let Some(name) = preview {
        let position = selection
            .select_named(&table, name)
            .ok_or_else(|| anyhow::anyhow!("No viseme named '{name}' to preview"))?;
        println!(
            "Previewing {name}: target at ({}, {}, {})",
            position.x, position.y, position.z
        );
        println!();
    }

    println!("Preset: {} ({} visemes)", preset.display(), table.len());
    for (index, viseme) in table.entries().iter().enumerate() {
        let marker = if selection.is_previewing(index) {
            "*"
        } else {
            " "
        };
        let p = viseme.position;
        println!(
            "  {marker} {:<8} ({:>8.4}, {:>8.4}, {:>8.4})",
            viseme.name, p.x, p.y, p.z
        );
    }
    Ok(())
}

fn load_or_new(path: &Path) -> anyhow::Result<VisemeTable> {
    if path.exists() {
        VisemeTable::load_preset(path).map_err(|e| anyhow::anyhow!("Failed to load preset: {e}"))
    } else {
        tracing::info!("Creating new preset at {}", path.display());
        Ok(VisemeTable::new())
    }
}

fn save(table: &VisemeTable, path: &Path) -> anyhow::Result<()> {
    table
        .save_preset(path)
        .map_err(|e| anyhow::anyhow!("Failed to save preset: {e}"))
}

/// Parse `x,y,z`.
fn parse_position(raw: &str) -> Result<Vector3, String> {
    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid position '{raw}': {e}"))?;

    match parts.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(format!("position must have 3 components, got {}", parts.len())),
    }
}
