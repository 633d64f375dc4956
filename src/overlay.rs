//! Selection and the block editor overlay.
//!
//! Selecting a block opens an editor on a snapshot of its content. Edits go
//! to a draft until saved; saving writes the draft through the store and
//! closes the overlay.

use tracing::debug;

use crate::model::{BlockId, BlockPatch};
use crate::store::BlockStore;

/// State of the editor overlay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorOverlay {
    selected: Option<BlockId>,
    /// Content of the block when it was selected.
    original: String,
    /// Current contents of the editor.
    pub draft: String,
}

impl EditorOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the overlay for `id`. Returns `false` if the block does not exist.
    pub fn select(&mut self, store: &BlockStore, id: BlockId) -> bool {
        let Some(block) = store.get(id) else {
            return false;
        };
        self.selected = Some(id);
        self.original = block.content.clone();
        self.draft = block.content.clone();
        debug!(block_id = %id, "block selected");
        true
    }

    pub fn selected(&self) -> Option<BlockId> {
        self.selected
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    /// Returns true if the draft differs from the selected content.
    pub fn is_modified(&self) -> bool {
        self.is_open() && self.draft != self.original
    }

    /// Write the draft into the block and close. Returns whether a block
    /// was updated; a block removed since selection is left alone.
    pub fn save(&mut self, store: &mut BlockStore) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        let draft = std::mem::take(&mut self.draft);
        let saved = store.update(id, BlockPatch::new().content(draft));
        self.close();
        saved
    }

    /// Close without saving.
    pub fn close(&mut self) {
        self.selected = None;
        self.original.clear();
        self.draft.clear();
    }

    /// Drop the selection if it points at `id`.
    pub fn forget(&mut self, id: BlockId) {
        if self.selected == Some(id) {
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlacementConfig;

    fn store() -> BlockStore {
        BlockStore::with_seed(PlacementConfig::default(), 11)
    }

    #[test]
    fn test_select_unknown_block() {
        let mut overlay = EditorOverlay::new();
        assert!(!overlay.select(&store(), BlockId(3)));
        assert!(!overlay.is_open());
    }

    #[test]
    fn test_edit_and_save() {
        let mut s = store();
        let id = s.create(BlockPatch::new().content("a = 1"));
        let mut overlay = EditorOverlay::new();
        assert!(overlay.select(&s, id));
        assert!(!overlay.is_modified());
        overlay.draft.push_str("\nb = 2");
        assert!(overlay.is_modified());
        assert!(overlay.save(&mut s));
        assert_eq!(s.get(id).unwrap().content, "a = 1\nb = 2");
        assert!(!overlay.is_open());
    }

    #[test]
    fn test_close_discards_draft() {
        let mut s = store();
        let id = s.create(BlockPatch::new().content("x"));
        let mut overlay = EditorOverlay::new();
        overlay.select(&s, id);
        overlay.draft = "y".into();
        overlay.close();
        assert!(!overlay.save(&mut s));
        assert_eq!(s.get(id).unwrap().content, "x");
    }

    #[test]
    fn test_save_after_remove_is_noop() {
        let mut s = store();
        let id = s.create(BlockPatch::new());
        let mut overlay = EditorOverlay::new();
        overlay.select(&s, id);
        overlay.draft = "late".into();
        s.remove(id);
        assert!(!overlay.save(&mut s));
        assert!(s.is_empty());
    }
}
