//! Viseme definitions and the name → position table.
//!
//! A viseme table is an ordered list of named target positions. It is
//! edited interactively (labels imported from a cue document, placeholder
//! entries added, entries removed) and persisted as a preset file:
//!
//! ```json
//! [
//!   { "name": "A", "position": [0.0, 0.0, 0.0] },
//!   { "name": "B", "position": [0.0, -0.02, 0.0] }
//! ]
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A 3D position. Serialized as a `[x, y, z]` array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Cross-fade from `from` to `to`: `from * (1 - t) + to * t` per component.
    ///
    /// `t` is not clamped. At `t = 0` the result is exactly `from`.
    pub fn blend(from: &Vector3, to: &Vector3, t: f64) -> Vector3 {
        Vector3 {
            x: from.x * (1.0 - t) + to.x * t,
            y: from.y * (1.0 - t) + to.y * t,
            z: from.z * (1.0 - t) + to.z * t,
        }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Vector3> for [f64; 3] {
    fn from(v: Vector3) -> Self {
        v.to_array()
    }
}

/// A named target position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisemeDefinition {
    /// Label matched against cue labels.
    #[serde(default)]
    pub name: String,

    /// Target position for the animated bone.
    #[serde(default)]
    pub position: Vector3,
}

impl VisemeDefinition {
    pub fn new(name: impl Into<String>, position: Vector3) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// Anything that can resolve a cue label to a target position.
pub trait VisemeLookup {
    fn position(&self, label: &str) -> Option<Vector3>;
}

impl VisemeLookup for HashMap<String, Vector3> {
    fn position(&self, label: &str) -> Option<Vector3> {
        self.get(label).copied()
    }
}

impl VisemeLookup for BTreeMap<String, Vector3> {
    fn position(&self, label: &str) -> Option<Vector3> {
        self.get(label).copied()
    }
}

/// Ordered viseme table. On duplicate names the first entry wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisemeTable {
    entries: Vec<VisemeDefinition>,
}

impl VisemeLookup for VisemeTable {
    fn position(&self, label: &str) -> Option<Vector3> {
        self.get(label).map(|v| v.position)
    }
}

impl FromIterator<VisemeDefinition> for VisemeTable {
    fn from_iter<I: IntoIterator<Item = VisemeDefinition>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl VisemeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[VisemeDefinition] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry with the given name.
    pub fn get(&self, name: &str) -> Option<&VisemeDefinition> {
        self.entries.iter().find(|v| v.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Index of the first entry with the given name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|v| v.name == name)
    }

    pub fn push(&mut self, definition: VisemeDefinition) {
        self.entries.push(definition);
    }

    /// Update the position of the first entry named `name`.
    pub fn set_position(&mut self, name: &str, position: Vector3) -> bool {
        match self.entries.iter_mut().find(|v| v.name == name) {
            Some(entry) => {
                entry.position = position;
                true
            }
            None => false,
        }
    }

    /// Update the position of the entry at `index`.
    pub fn set_position_at(&mut self, index: usize, position: Vector3) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.position = position;
                true
            }
            None => false,
        }
    }

    /// Append a zero-position entry for every label not already present.
    ///
    /// New entries are added in sorted label order. Returns how many were
    /// added.
    pub fn import_labels<I, S>(&mut self, labels: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sorted: BTreeSet<String> = labels
            .into_iter()
            .map(|l| l.as_ref().to_string())
            .collect();

        let mut added = 0;
        for label in sorted {
            if !self.contains(&label) {
                self.entries.push(VisemeDefinition::new(label, Vector3::ZERO));
                added += 1;
            }
        }
        added
    }

    /// Append an empty entry named `V{n}`, `n` being the new table length.
    /// Returns the index of the new entry.
    pub fn add_placeholder(&mut self) -> usize {
        let name = format!("V{}", self.entries.len() + 1);
        self.entries.push(VisemeDefinition::new(name, Vector3::ZERO));
        self.entries.len() - 1
    }

    /// Remove the entry at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<VisemeDefinition> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Serialize as a pretty-printed preset JSON array.
    pub fn to_preset_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries)
    }

    /// Decode a preset JSON array.
    ///
    /// Entries missing a name get an empty name; entries missing a position
    /// sit at the origin.
    pub fn from_preset_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<VisemeDefinition> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    /// Load a preset file.
    pub fn load_preset(path: impl AsRef<Path>) -> Result<Self, PresetError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| PresetError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_preset_json(&json).map_err(|e| PresetError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write the table to a preset file, creating parent directories.
    pub fn save_preset(&self, path: impl AsRef<Path>) -> Result<(), PresetError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PresetError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = self.to_preset_json().map_err(|e| PresetError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| PresetError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Errors that can occur when reading or writing preset files.
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}
