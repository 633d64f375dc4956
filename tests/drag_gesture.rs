use blockcanvas::catalog::find_template;
use blockcanvas::config::PlacementConfig;
use blockcanvas::drag::{DragEngine, DragOutcome, DragState};
use blockcanvas::model::{BlockKind, BlockPatch, Point};
use blockcanvas::store::BlockStore;

fn store() -> BlockStore {
    BlockStore::with_seed(PlacementConfig::default(), 77)
}

#[test]
fn test_live_drag_tracks_pointer_delta() {
    let mut s = store();
    let id = s.create(BlockPatch::new().position(100.0, 50.0));
    let mut engine = DragEngine::new();
    engine.begin_block(&s, id, Point::new(10.0, 10.0)).unwrap();

    let moves = [(12.0, 15.0), (20.4, 9.6), (35.5, -4.5), (60.0, 90.0)];
    for (px, py) in moves {
        let applied = engine
            .pointer_move(&mut s, Point::new(px, py), true)
            .expect("move applied");
        let expected = Point::new(
            (100.0 + (px - 10.0) + 0.5_f64).floor(),
            (50.0 + (py - 10.0) + 0.5_f64).floor(),
        );
        assert_eq!(applied, expected);
        assert_eq!(s.get(id).unwrap().position(), expected);
    }
    assert_eq!(engine.release(&mut s, true), DragOutcome::Dropped { id });
    assert_eq!(s.get(id).unwrap().position(), Point::new(150.0, 130.0));
    assert_eq!(engine.state(), &DragState::Idle);
}

#[test]
fn test_release_outside_keeps_last_live_position() {
    let mut s = store();
    let id = s.create(BlockPatch::new().position(0.0, 0.0));
    let mut engine = DragEngine::new();
    engine.begin_block(&s, id, Point::new(0.0, 0.0)).unwrap();
    engine.pointer_move(&mut s, Point::new(30.0, 40.0), true);
    // Pointer leaves the canvas; no further moves apply.
    assert!(engine.pointer_move(&mut s, Point::new(900.0, 900.0), false).is_none());
    assert_eq!(engine.release(&mut s, false), DragOutcome::Cancelled);
    assert_eq!(s.get(id).unwrap().position(), Point::new(30.0, 40.0));
}

#[test]
fn test_template_drop_creates_one_block_at_default_position() {
    let mut s = BlockStore::with_seed(PlacementConfig { max_x: 100.0, max_y: 100.0 }, 1);
    let mut engine = DragEngine::new();
    let tpl = find_template(1003).unwrap();
    engine.begin_template(tpl, Point::new(5000.0, 5000.0)).unwrap();
    engine.pointer_move(&mut s, Point::new(6000.0, 6000.0), true);

    let outcome = engine.release(&mut s, true);
    let DragOutcome::Created { id, template_id } = outcome else {
        panic!("expected a created block, got {outcome:?}");
    };
    assert_eq!(template_id, 1003);
    assert_eq!(s.len(), 1);
    let block = s.get(id).unwrap();
    assert_eq!(block.kind, BlockKind::Html);
    // Store default placement, not the drop point.
    assert!((0.0..100.0).contains(&block.x));
    assert!((0.0..100.0).contains(&block.y));
}

#[test]
fn test_template_drop_outside_creates_nothing() {
    let mut s = store();
    let mut engine = DragEngine::new();
    engine
        .begin_template(find_template(1001).unwrap(), Point::default())
        .unwrap();
    assert_eq!(engine.release(&mut s, false), DragOutcome::Cancelled);
    assert!(s.is_empty());
}

#[test]
fn test_block_deleted_mid_drag() {
    let mut s = store();
    let id = s.create(BlockPatch::new().position(0.0, 0.0));
    let mut engine = DragEngine::new();
    engine.begin_block(&s, id, Point::default()).unwrap();
    s.remove(id);
    assert!(engine.pointer_move(&mut s, Point::new(5.0, 5.0), true).is_none());
    assert!(s.is_empty());
    assert_eq!(engine.release(&mut s, true), DragOutcome::Cancelled);
    assert!(s.is_empty());
    assert!(!engine.is_dragging());
}

#[test]
fn test_new_gesture_after_previous_ends() {
    let mut s = store();
    let a = s.create(BlockPatch::new().position(0.0, 0.0));
    let b = s.create(BlockPatch::new().position(0.0, 0.0));
    let mut engine = DragEngine::new();
    engine.begin_block(&s, a, Point::default()).unwrap();
    engine.release(&mut s, true);
    engine.begin_block(&s, b, Point::default()).unwrap();
    assert_eq!(engine.dragged_block(), Some(b));
}
