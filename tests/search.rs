use blockcanvas::catalog::{NO_MATCHES, PaletteItem, search, templates};
use blockcanvas::config::PlacementConfig;
use blockcanvas::model::{BlockKind, BlockPatch};
use blockcanvas::store::BlockStore;

#[test]
fn test_html_term_finds_template_and_live_blocks() {
    let mut store = BlockStore::with_seed(PlacementConfig::default(), 4);
    let html = store.create(BlockPatch::new().kind("html"));
    store.create(BlockPatch::new().kind("css"));

    for term in ["html", "HTML", "HtMl"] {
        let results = search(&store, term);
        assert!(
            results.items.iter().any(|i| i.live_id() == Some(html)),
            "live html block missing for {term}"
        );
        assert!(
            results
                .items
                .iter()
                .any(|i| matches!(i, PaletteItem::Template(t) if t.label == "HTML Block")),
            "HTML template missing for {term}"
        );
        assert!(results.items.iter().all(|i| *i.kind() == BlockKind::Html));
    }
}

#[test]
fn test_code_term_matches_live_types_and_template_labels() {
    let mut store = BlockStore::with_seed(PlacementConfig::default(), 4);
    store.create(BlockPatch::new());
    let results = search(&store, "code");
    // One live block plus both "... Code Block" templates.
    assert_eq!(results.len(), 3);
    assert_eq!(results.items[0].text(), "code");
}

#[test]
fn test_empty_result_renders_indicator() {
    let store = BlockStore::default();
    let results = search(&store, "cobol");
    assert!(results.is_empty());
    assert_eq!(results.render_lines(), vec![NO_MATCHES.to_string()]);
}

#[test]
fn test_empty_term_lists_all_templates() {
    let store = BlockStore::default();
    assert_eq!(search(&store, "").len(), templates().len());
}
