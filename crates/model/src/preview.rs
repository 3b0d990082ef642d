//! Single-entry preview selection over a viseme table.
//!
//! At most one table entry can be previewed at a time. Turning one on turns
//! every other entry off and yields the position the host should pose the
//! target with.

use crate::viseme::{Vector3, VisemeTable};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewSelection {
    active: Option<usize>,
}

impl PreviewSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the previewed entry.
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_previewing(&self, index: usize) -> bool {
        self.active == Some(index)
    }

    /// Toggle preview for `index`.
    ///
    /// Enabling returns the entry's position, or `None` (and changes
    /// nothing) when the index is out of range. Disabling only clears the
    /// selection if `index` is the active entry, and always returns `None`.
    pub fn set(&mut self, table: &VisemeTable, index: usize, enabled: bool) -> Option<Vector3> {
        if !enabled {
            if self.active == Some(index) {
                self.active = None;
            }
            return None;
        }

        let position = table.entries().get(index)?.position;
        self.active = Some(index);
        Some(position)
    }

    /// Enable preview for the first entry named `name`.
    pub fn select_named(&mut self, table: &VisemeTable, name: &str) -> Option<Vector3> {
        let index = table.index_of(name)?;
        self.set(table, index, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viseme::VisemeDefinition;

    fn table() -> VisemeTable {
        [
            VisemeDefinition::new("A", Vector3::new(0.0, 0.0, 0.0)),
            VisemeDefinition::new("B", Vector3::new(0.0, -0.02, 0.0)),
            VisemeDefinition::new("C", Vector3::new(0.01, -0.04, 0.0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_enabling_one_disables_others() {
        let table = table();
        let mut preview = PreviewSelection::new();

        assert_eq!(
            preview.set(&table, 1, true),
            Some(Vector3::new(0.0, -0.02, 0.0))
        );
        assert!(preview.is_previewing(1));

        preview.set(&table, 2, true);
        assert!(!preview.is_previewing(1));
        assert_eq!(preview.active(), Some(2));
    }

    #[test]
    fn test_disabling_inactive_entry_keeps_selection() {
        let table = table();
        let mut preview = PreviewSelection::new();
        preview.set(&table, 0, true);

        assert_eq!(preview.set(&table, 2, false), None);
        assert_eq!(preview.active(), Some(0));

        preview.set(&table, 0, false);
        assert_eq!(preview.active(), None);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let table = table();
        let mut preview = PreviewSelection::new();
        preview.set(&table, 0, true);
        assert_eq!(preview.set(&table, 7, true), None);
        assert_eq!(preview.active(), Some(0));
    }

    #[test]
    fn test_select_named() {
        let table = table();
        let mut preview = PreviewSelection::new();
        assert_eq!(
            preview.select_named(&table, "C"),
            Some(Vector3::new(0.01, -0.04, 0.0))
        );
        assert_eq!(preview.select_named(&table, "missing"), None);
        assert_eq!(preview.active(), Some(2));
    }
}
