//! Palette templates and the component search index.
//!
//! The palette lists a small static catalog of block templates next to the
//! live blocks of the document. Searching filters both with a
//! case-insensitive substring match: live blocks by their type, templates by
//! their label.
//!
//! # Usage
//!
//! ```rust,ignore
//! use blockcanvas::catalog::search;
//!
//! let results = search(&store, "html");
//! for line in results.render_lines() {
//!     println!("{line}");
//! }
//! ```

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::model::{BlockId, BlockKind, Language};
use crate::store::{BlockStore, ComponentSummary};

/// Shown in place of an empty result list.
pub const NO_MATCHES: &str = "No matching components found";

/// A predefined palette entry that spawns a new block when dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockTemplate {
    /// Catalog identity. Lives in its own namespace, never a live block id.
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub label: String,
    /// Language the template advertises.
    pub language: Language,
}

impl BlockTemplate {
    pub fn matches_query(&self, query: &str) -> bool {
        query.is_empty() || self.label.to_lowercase().contains(&query.to_lowercase())
    }
}

fn template(id: u32, kind: BlockKind, label: &str, language: Language) -> BlockTemplate {
    BlockTemplate {
        id,
        kind,
        label: label.to_string(),
        language,
    }
}

/// The static template catalog, built once on first access.
pub fn templates() -> &'static [BlockTemplate] {
    static TEMPLATES: Lazy<Vec<BlockTemplate>> = Lazy::new(|| {
        vec![
            template(1001, BlockKind::Code, "JavaScript Code Block", Language::JavaScript),
            template(1002, BlockKind::Code, "Python Code Block", Language::Python),
            template(1003, BlockKind::Html, "HTML Block", Language::Html),
            template(1004, BlockKind::Css, "CSS Block", Language::Css),
        ]
    });
    &TEMPLATES
}

/// Look up a template by catalog id.
pub fn find_template(id: u32) -> Option<&'static BlockTemplate> {
    templates().iter().find(|t| t.id == id)
}

fn component_matches(component: &ComponentSummary, query: &str) -> bool {
    query.is_empty() || component.kind.as_str().to_lowercase().contains(&query.to_lowercase())
}

// ────────────────────────────────────────────────────────────────────────────
// Search
// ────────────────────────────────────────────────────────────────────────────

/// One row of the palette list.
#[derive(Debug, Clone, PartialEq)]
pub enum PaletteItem {
    Live(ComponentSummary),
    Template(&'static BlockTemplate),
}

impl PaletteItem {
    /// Label for templates, the type name for live blocks.
    pub fn text(&self) -> &str {
        match self {
            PaletteItem::Live(c) => c.kind.as_str(),
            PaletteItem::Template(t) => &t.label,
        }
    }

    pub fn kind(&self) -> &BlockKind {
        match self {
            PaletteItem::Live(c) => &c.kind,
            PaletteItem::Template(t) => &t.kind,
        }
    }

    pub fn live_id(&self) -> Option<BlockId> {
        match self {
            PaletteItem::Live(c) => Some(c.id),
            PaletteItem::Template(_) => None,
        }
    }
}

/// Filtered palette contents: live matches first, then templates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub items: Vec<PaletteItem>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Display lines; a single [`NO_MATCHES`] line when nothing matched.
    pub fn render_lines(&self) -> Vec<String> {
        if self.items.is_empty() {
            return vec![NO_MATCHES.to_string()];
        }
        self.items.iter().map(|i| i.text().to_string()).collect()
    }
}

/// Filter live components and templates by `term`.
pub fn search(store: &BlockStore, term: &str) -> SearchResults {
    let query = term.to_lowercase();
    let live = store
        .components()
        .iter()
        .filter(|c| component_matches(c, &query))
        .cloned()
        .map(PaletteItem::Live);
    let templates = templates()
        .iter()
        .filter(|t| t.matches_query(&query))
        .map(PaletteItem::Template);
    SearchResults {
        items: live.chain(templates).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlacementConfig;
    use crate::model::BlockPatch;

    #[test]
    fn test_catalog_ids_unique() {
        let mut seen = std::collections::HashSet::new();
        for t in templates() {
            assert!(seen.insert(t.id), "Duplicate template id: {}", t.id);
        }
        assert_eq!(templates().len(), 4);
    }

    #[test]
    fn test_find_template() {
        assert_eq!(find_template(1003).unwrap().kind, BlockKind::Html);
        assert!(find_template(42).is_none());
    }

    #[test]
    fn test_empty_term_lists_everything() {
        let mut store = BlockStore::with_seed(PlacementConfig::default(), 3);
        store.create(BlockPatch::new());
        let results = search(&store, "");
        assert_eq!(results.len(), 1 + templates().len());
        assert!(matches!(results.items[0], PaletteItem::Live(_)));
    }

    #[test]
    fn test_template_match_is_case_insensitive() {
        let store = BlockStore::default();
        let results = search(&store, "PyThOn");
        assert_eq!(results.render_lines(), vec!["Python Code Block".to_string()]);
    }

    #[test]
    fn test_no_matches_line() {
        let store = BlockStore::default();
        let results = search(&store, "fortran");
        assert!(results.is_empty());
        assert_eq!(results.render_lines(), vec![NO_MATCHES.to_string()]);
    }
}
