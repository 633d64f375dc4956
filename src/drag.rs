//! Pointer-driven drag protocol.
//!
//! A gesture goes `Idle -> Dragging -> (dropped | cancelled) -> Idle`. Only
//! one gesture is active at a time. Dragging an existing block is live: every
//! pointer move over the canvas moves the block right away, and nothing is
//! rolled back when the gesture ends outside the canvas. Dragging a palette
//! template moves nothing; dropping it on the canvas creates one new block of
//! the template's type at the store's default (random) position.

use tracing::{debug, trace};

use crate::catalog::BlockTemplate;
use crate::error::DragError;
use crate::model::{BlockId, BlockPatch, Point};
use crate::store::BlockStore;

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSource {
    /// An existing block and its position when the gesture began.
    Block { id: BlockId, origin: Point },
    /// A palette template. Templates have no position of their own.
    Template(&'static BlockTemplate),
}

/// Current gesture state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: DragSource,
        /// Pointer position at pointer-down.
        pointer_origin: Point,
    },
}

/// How a gesture ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// An existing block was released over the canvas. The live moves already
    /// placed it; nothing else happens.
    Dropped { id: BlockId },
    /// A template was released over the canvas and spawned a block.
    Created { id: BlockId, template_id: u32 },
    /// Released outside the canvas or aborted. No store mutation.
    Cancelled,
}

/// Round half up, so `-2.5` becomes `-2.0` and `2.5` becomes `3.0`.
pub fn round_canvas_unit(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// State machine for one pointer.
#[derive(Debug, Clone, Default)]
pub struct DragEngine {
    state: DragState,
}

impl DragEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Id of the block being dragged, if the gesture moves an existing block.
    pub fn dragged_block(&self) -> Option<BlockId> {
        match &self.state {
            DragState::Dragging {
                source: DragSource::Block { id, .. },
                ..
            } => Some(*id),
            _ => None,
        }
    }

    /// Pointer-down on an existing block.
    pub fn begin_block(
        &mut self,
        store: &BlockStore,
        id: BlockId,
        pointer: Point,
    ) -> Result<(), DragError> {
        if self.is_dragging() {
            return Err(DragError::GestureInProgress);
        }
        let block = store.get(id).ok_or(DragError::UnknownBlock(id))?;
        let origin = block.position();
        debug!(block_id = %id, x = origin.x, y = origin.y, "drag started");
        self.state = DragState::Dragging {
            source: DragSource::Block { id, origin },
            pointer_origin: pointer,
        };
        Ok(())
    }

    /// Pointer-down on a palette template.
    pub fn begin_template(
        &mut self,
        template: &'static BlockTemplate,
        pointer: Point,
    ) -> Result<(), DragError> {
        if self.is_dragging() {
            return Err(DragError::GestureInProgress);
        }
        debug!(template_id = template.id, kind = %template.kind, "template drag started");
        self.state = DragState::Dragging {
            source: DragSource::Template(template),
            pointer_origin: pointer,
        };
        Ok(())
    }

    /// Pointer-move. Returns the position applied to the store, if any.
    ///
    /// The candidate is `origin + (pointer - pointer_origin)` rounded to whole
    /// canvas units. Moves outside the canvas and template drags apply nothing.
    pub fn pointer_move(
        &mut self,
        store: &mut BlockStore,
        pointer: Point,
        over_canvas: bool,
    ) -> Option<Point> {
        let DragState::Dragging {
            source: DragSource::Block { id, origin },
            pointer_origin,
        } = &self.state
        else {
            return None;
        };
        if !over_canvas {
            return None;
        }
        let candidate = Point::new(
            round_canvas_unit(origin.x + (pointer.x - pointer_origin.x)),
            round_canvas_unit(origin.y + (pointer.y - pointer_origin.y)),
        );
        // The block may have been deleted mid-gesture.
        if !store.move_block(*id, candidate.x, candidate.y) {
            return None;
        }
        trace!(block_id = %id, x = candidate.x, y = candidate.y, "live move");
        Some(candidate)
    }

    /// Pointer-up. Ends the gesture and returns to idle.
    pub fn release(&mut self, store: &mut BlockStore, over_canvas: bool) -> DragOutcome {
        let state = std::mem::take(&mut self.state);
        let DragState::Dragging { source, .. } = state else {
            return DragOutcome::Cancelled;
        };
        if !over_canvas {
            debug!("drag cancelled: released outside canvas");
            return DragOutcome::Cancelled;
        }
        match source {
            DragSource::Block { id, .. } if !store.contains(id) => {
                debug!(block_id = %id, "drag cancelled: block removed mid-gesture");
                DragOutcome::Cancelled
            }
            DragSource::Block { id, .. } => {
                debug!(block_id = %id, "drag dropped");
                DragOutcome::Dropped { id }
            }
            DragSource::Template(template) => {
                // Drop point is deliberately ignored; placement is the store default.
                let id = store.create(BlockPatch::new().kind(template.kind.clone()));
                debug!(block_id = %id, template_id = template.id, "template dropped");
                DragOutcome::Created {
                    id,
                    template_id: template.id,
                }
            }
        }
    }

    /// Abort the gesture without touching the store.
    pub fn abort(&mut self) -> DragOutcome {
        if self.is_dragging() {
            debug!("drag aborted");
        }
        self.state = DragState::Idle;
        DragOutcome::Cancelled
    }
}
