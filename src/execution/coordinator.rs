//! Execution coordinator.
//!
//! Work is split in three steps so the store is never borrowed across a
//! network call:
//!
//! 1. [`ExecutionCoordinator::prepare_execute`] / [`ExecutionCoordinator::prepare_execute_all`]
//!    read the store and produce a [`Dispatch`].
//! 2. [`send`] performs the call and turns the outcome into a [`Completion`].
//! 3. [`ExecutionCoordinator::apply`] writes the completion back, skipping
//!    blocks that were removed in the meantime.
//!
//! Completions are independent of each other and may be applied in any
//! order. Transport failures never escape: they become text in the affected
//! blocks' output.

use std::sync::Arc;

use tracing::{info, warn};

use super::{
    BatchEntry, BatchRequest, BatchResponse, ExecuteRequest, ExecuteResponse, ExecutionTransport,
};
use crate::error::TransportError;
use crate::model::{BlockId, BlockOutput};
use crate::store::BlockStore;

/// Prefix of the output written when a single-execute call fails in transport.
pub const SINGLE_FAILURE_PREFIX: &str = "Error executing code: ";
/// Prefix of the output written to every block when a batch call fails in transport.
pub const BATCH_FAILURE_PREFIX: &str = "Error executing all blocks: ";

/// Identifies one batch dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchToken(pub u64);

/// A request ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Single {
        id: BlockId,
        request: ExecuteRequest,
    },
    Batch {
        token: BatchToken,
        /// Blocks that were part of the request, in document order.
        ids: Vec<BlockId>,
        request: BatchRequest,
    },
}

impl Dispatch {
    /// The completion reported when the request could not run to the end.
    pub fn into_failure(self, error: TransportError) -> Completion {
        match self {
            Dispatch::Single { id, .. } => Completion::Single {
                id,
                result: Err(error),
            },
            Dispatch::Batch { token, ids, .. } => Completion::Batch {
                token,
                ids,
                result: Err(error),
            },
        }
    }
}

/// The outcome of a dispatch, waiting to be applied to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Single {
        id: BlockId,
        result: Result<ExecuteResponse, TransportError>,
    },
    Batch {
        token: BatchToken,
        ids: Vec<BlockId>,
        result: Result<BatchResponse, TransportError>,
    },
}

/// What applying a completion changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Blocks whose output was written.
    pub updated: Vec<BlockId>,
    /// Blocks whose plot was inserted or replaced.
    pub plotted: Vec<BlockId>,
    /// Results dropped because the block no longer exists.
    pub discarded: Vec<BlockId>,
}

/// Perform the network call for a dispatch.
pub async fn send(transport: &dyn ExecutionTransport, dispatch: Dispatch) -> Completion {
    match dispatch {
        Dispatch::Single { id, request } => {
            let result = transport.execute(&request).await;
            Completion::Single { id, result }
        }
        Dispatch::Batch {
            token,
            ids,
            request,
        } => {
            let result = transport.execute_all(&request).await;
            Completion::Batch { token, ids, result }
        }
    }
}

/// Builds requests from the store and reconciles their results.
#[derive(Clone)]
pub struct ExecutionCoordinator {
    transport: Arc<dyn ExecutionTransport>,
    next_batch: u64,
}

impl std::fmt::Debug for ExecutionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionCoordinator")
            .field("next_batch", &self.next_batch)
            .finish_non_exhaustive()
    }
}

impl ExecutionCoordinator {
    pub fn new(transport: Arc<dyn ExecutionTransport>) -> Self {
        Self {
            transport,
            next_batch: 1,
        }
    }

    pub fn transport(&self) -> Arc<dyn ExecutionTransport> {
        Arc::clone(&self.transport)
    }

    // ────────────────────────────────────────────────────────────────────
    // Request building
    // ────────────────────────────────────────────────────────────────────

    /// Request for one block. `None` if the block is missing or not code.
    pub fn prepare_execute(&self, store: &BlockStore, id: BlockId) -> Option<Dispatch> {
        let block = store.get(id)?;
        if !block.kind.is_executable() {
            return None;
        }
        Some(Dispatch::Single {
            id,
            request: ExecuteRequest {
                code: block.content.clone(),
                language: block.language,
                block_id: id,
            },
        })
    }

    /// Request covering every block, whatever its type. `None` if the store is empty.
    pub fn prepare_execute_all(&mut self, store: &BlockStore) -> Option<Dispatch> {
        if store.is_empty() {
            return None;
        }
        let code_blocks: Vec<BatchEntry> = store
            .blocks()
            .map(|b| BatchEntry {
                block_id: b.id,
                code: b.content.clone(),
                language: b.language,
            })
            .collect();
        let ids = code_blocks.iter().map(|e| e.block_id).collect();
        let token = BatchToken(self.next_batch);
        self.next_batch += 1;
        Some(Dispatch::Batch {
            token,
            ids,
            request: BatchRequest { code_blocks },
        })
    }

    // ────────────────────────────────────────────────────────────────────
    // Reconciliation
    // ────────────────────────────────────────────────────────────────────

    /// Write a completion back into the store.
    pub fn apply(&self, store: &mut BlockStore, completion: Completion) -> Reconciliation {
        match completion {
            Completion::Single { id, result } => apply_single(store, id, result),
            Completion::Batch { token, ids, result } => apply_batch(store, token, &ids, result),
        }
    }

    // ────────────────────────────────────────────────────────────────────
    // One-shot helpers
    // ────────────────────────────────────────────────────────────────────

    /// Prepare, send and apply a single execution.
    ///
    /// Holds the store for the whole call; use the three-step API (or
    /// [`CanvasSession`](crate::session::CanvasSession)) when other edits must
    /// proceed while the request is in flight.
    pub async fn execute(&self, store: &mut BlockStore, id: BlockId) -> Reconciliation {
        let Some(dispatch) = self.prepare_execute(store, id) else {
            return Reconciliation::default();
        };
        let completion = send(self.transport.as_ref(), dispatch).await;
        self.apply(store, completion)
    }

    /// Prepare, send and apply a batch execution.
    pub async fn execute_all(&mut self, store: &mut BlockStore) -> Reconciliation {
        let Some(dispatch) = self.prepare_execute_all(store) else {
            return Reconciliation::default();
        };
        let completion = send(self.transport.as_ref(), dispatch).await;
        self.apply(store, completion)
    }
}

fn apply_single(
    store: &mut BlockStore,
    id: BlockId,
    result: Result<ExecuteResponse, TransportError>,
) -> Reconciliation {
    let mut summary = Reconciliation::default();
    if !store.contains(id) {
        warn!(block_id = %id, "discarding execution result for removed block");
        summary.discarded.push(id);
        return summary;
    }

    match result {
        Err(err) => {
            warn!(block_id = %id, error = %err, "execution request failed");
            store.set_output(id, format!("{SINGLE_FAILURE_PREFIX}{err}"));
        }
        Ok(response) => {
            if let Some(error) = response.execution_error() {
                info!(block_id = %id, "execution reported an error");
                store.set_output(id, error.to_string());
            } else {
                if let Some(plot) = response.plot_payload() {
                    store.set_plot(id, plot);
                    summary.plotted.push(id);
                }
                info!(block_id = %id, "execution succeeded");
                store.set_output(id, response.output.unwrap_or_default());
            }
        }
    }
    summary.updated.push(id);
    summary
}

fn apply_batch(
    store: &mut BlockStore,
    token: BatchToken,
    ids: &[BlockId],
    result: Result<BatchResponse, TransportError>,
) -> Reconciliation {
    let mut summary = Reconciliation::default();
    match result {
        Err(err) => {
            warn!(batch = token.0, error = %err, "batch execution request failed");
            let message = BlockOutput::Text(format!("{BATCH_FAILURE_PREFIX}{err}"));
            for &id in ids {
                if store.set_output(id, message.clone()) {
                    summary.updated.push(id);
                } else {
                    summary.discarded.push(id);
                }
            }
        }
        Ok(BatchResponse(entries)) => {
            for (key, entry) in entries {
                let Ok(id) = key.parse::<BlockId>() else {
                    warn!(batch = token.0, key = %key, "skipping batch entry with invalid block id");
                    continue;
                };
                if store.set_output(id, entry.into_output()) {
                    summary.updated.push(id);
                } else {
                    summary.discarded.push(id);
                }
            }
            info!(
                batch = token.0,
                updated = summary.updated.len(),
                discarded = summary.discarded.len(),
                "batch execution applied"
            );
        }
    }
    summary
}
