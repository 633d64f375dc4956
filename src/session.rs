//! A canvas session: the owned document plus the components acting on it.
//!
//! All document mutations happen on the thread that owns the session.
//! Execution requests are spawned onto a [`JoinSet`] owned by the session;
//! [`CanvasSession::apply_ready`] and [`CanvasSession::next_completion`]
//! apply their completions one at a time, in arrival order. A completion for
//! a block deleted in the meantime is dropped. A request whose task panics
//! is reported like a transport failure, so it always ends up in the
//! affected blocks' output.
//!
//! ```rust,ignore
//! let mut session = CanvasSession::new(&CanvasConfig::default())?;
//! let id = session.add_block("code");
//! session.store_mut().set_content(id, "console.log(1)");
//! session.dispatch_execute(id);
//! session.next_completion().await;
//! ```

use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::catalog::{self, BlockTemplate, SearchResults};
use crate::config::{CanvasConfig, PlacementConfig};
use crate::drag::{DragEngine, DragOutcome};
use crate::error::{DragError, TransportError};
use crate::execution::{
    Completion, Dispatch, ExecutionCoordinator, ExecutionTransport, HttpTransport, Reconciliation,
    send,
};
use crate::model::{BlockId, BlockKind, BlockPatch, Point};
use crate::overlay::EditorOverlay;
use crate::store::BlockStore;

/// The complete state of one canvas session.
pub struct CanvasSession {
    store: BlockStore,
    drag: DragEngine,
    overlay: EditorOverlay,
    coordinator: ExecutionCoordinator,
    /// Dispatched requests whose completions have not been applied yet.
    tasks: JoinSet<Completion>,
}

impl CanvasSession {
    /// Session talking to the HTTP execution service from `config`.
    pub fn new(config: &CanvasConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.service.clone())?;
        Ok(Self::with_store(
            BlockStore::new(config.placement),
            Arc::new(transport),
        ))
    }

    /// Session over an arbitrary transport.
    pub fn with_transport(
        placement: PlacementConfig,
        transport: Arc<dyn ExecutionTransport>,
    ) -> Self {
        Self::with_store(BlockStore::new(placement), transport)
    }

    /// Session over an existing (possibly seeded) store.
    pub fn with_store(store: BlockStore, transport: Arc<dyn ExecutionTransport>) -> Self {
        Self {
            store,
            drag: DragEngine::new(),
            overlay: EditorOverlay::new(),
            coordinator: ExecutionCoordinator::new(transport),
            tasks: JoinSet::new(),
        }
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut BlockStore {
        &mut self.store
    }

    pub fn drag(&self) -> &DragEngine {
        &self.drag
    }

    pub fn overlay(&self) -> &EditorOverlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut EditorOverlay {
        &mut self.overlay
    }

    // ────────────────────────────────────────────────────────────────────
    // Document actions
    // ────────────────────────────────────────────────────────────────────

    /// Toolbar/palette "add block": a new block of `kind` at the default position.
    pub fn add_block(&mut self, kind: impl Into<BlockKind>) -> BlockId {
        self.store.create(BlockPatch::new().kind(kind))
    }

    /// Delete a block, closing the editor and ending any drag on that block.
    pub fn remove_block(&mut self, id: BlockId) -> bool {
        self.overlay.forget(id);
        if self.drag.dragged_block() == Some(id) {
            self.drag.abort();
        }
        self.store.remove(id)
    }

    pub fn select(&mut self, id: BlockId) -> bool {
        self.overlay.select(&self.store, id)
    }

    /// Save the editor draft into the selected block.
    pub fn save_edit(&mut self) -> bool {
        self.overlay.save(&mut self.store)
    }

    pub fn search(&self, term: &str) -> SearchResults {
        catalog::search(&self.store, term)
    }

    // ────────────────────────────────────────────────────────────────────
    // Drag gestures
    // ────────────────────────────────────────────────────────────────────

    pub fn begin_block_drag(&mut self, id: BlockId, pointer: Point) -> Result<(), DragError> {
        self.drag.begin_block(&self.store, id, pointer)
    }

    pub fn begin_template_drag(
        &mut self,
        template: &'static BlockTemplate,
        pointer: Point,
    ) -> Result<(), DragError> {
        self.drag.begin_template(template, pointer)
    }

    pub fn pointer_move(&mut self, pointer: Point, over_canvas: bool) -> Option<Point> {
        self.drag.pointer_move(&mut self.store, pointer, over_canvas)
    }

    pub fn release(&mut self, over_canvas: bool) -> DragOutcome {
        self.drag.release(&mut self.store, over_canvas)
    }

    pub fn abort_drag(&mut self) -> DragOutcome {
        self.drag.abort()
    }

    // ────────────────────────────────────────────────────────────────────
    // Execution
    // ────────────────────────────────────────────────────────────────────

    /// Start executing one block. Returns `false` if there was nothing to send.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch_execute(&mut self, id: BlockId) -> bool {
        match self.coordinator.prepare_execute(&self.store, id) {
            Some(dispatch) => {
                info!(block_id = %id, "dispatching execution");
                self.spawn(dispatch);
                true
            }
            None => {
                debug!(block_id = %id, "nothing to execute");
                false
            }
        }
    }

    /// Start executing every block in one batch request.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch_execute_all(&mut self) -> bool {
        match self.coordinator.prepare_execute_all(&self.store) {
            Some(dispatch) => {
                info!(blocks = self.store.len(), "dispatching batch execution");
                self.spawn(dispatch);
                true
            }
            None => false,
        }
    }

    fn spawn(&mut self, dispatch: Dispatch) {
        let transport = self.coordinator.transport();
        let fallback = dispatch.clone();
        self.tasks.spawn(async move {
            // Run the call in its own task so a panicking transport still
            // yields a completion for the blocks involved.
            let call = tokio::spawn(async move { send(transport.as_ref(), dispatch).await });
            match call.await {
                Ok(completion) => completion,
                Err(err) => fallback.into_failure(task_failure(err)),
            }
        });
    }

    /// Number of dispatched requests whose results have not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Apply every completion that has already arrived, without waiting.
    pub fn apply_ready(&mut self) -> Vec<Reconciliation> {
        let mut applied = Vec::new();
        while let Some(joined) = self.tasks.try_join_next() {
            applied.push(self.reconcile(joined));
        }
        applied
    }

    /// Wait for the next completion and apply it. `None` if nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Reconciliation> {
        let joined = self.tasks.join_next().await?;
        Some(self.reconcile(joined))
    }

    /// Wait until every in-flight request has been applied.
    pub async fn settle(&mut self) -> Vec<Reconciliation> {
        let mut applied = Vec::new();
        while let Some(summary) = self.next_completion().await {
            applied.push(summary);
        }
        applied
    }

    fn reconcile(&mut self, joined: Result<Completion, JoinError>) -> Reconciliation {
        match joined {
            Ok(completion) => self.apply(completion),
            Err(err) => {
                // The outer task never panics, so it was cancelled by a runtime shutdown.
                warn!(error = %err, "execution task ended without a completion");
                Reconciliation::default()
            }
        }
    }

    fn apply(&mut self, completion: Completion) -> Reconciliation {
        self.coordinator.apply(&mut self.store, completion)
    }
}

fn task_failure(err: JoinError) -> TransportError {
    if err.is_panic() {
        TransportError::Network("execution task panicked".to_string())
    } else {
        TransportError::Network("execution task was cancelled".to_string())
    }
}
