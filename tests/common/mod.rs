#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use blockcanvas::TransportError;
use blockcanvas::execution::{
    BatchRequest, BatchResponse, BlockResult, ExecuteRequest, ExecuteResponse, ExecutionTransport,
};
use blockcanvas::model::{BlockId, BlockOutput};
use tokio::sync::oneshot;

/// Scripted stand-in for the execution service.
///
/// Unscripted single executions answer `{"output": "ran <code>"}`; an
/// unscripted batch answers `{}`.
#[derive(Default)]
pub struct FakeTransport {
    single: Mutex<HashMap<BlockId, Result<ExecuteResponse, TransportError>>>,
    batch: Mutex<Option<Result<BatchResponse, TransportError>>>,
    gates: Mutex<HashMap<BlockId, oneshot::Receiver<()>>>,
    pub requests: Mutex<Vec<ExecuteRequest>>,
    pub batches: Mutex<Vec<BatchRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, id: BlockId, result: Result<ExecuteResponse, TransportError>) {
        self.single.lock().unwrap().insert(id, result);
    }

    pub fn respond_batch(&self, result: Result<BatchResponse, TransportError>) {
        *self.batch.lock().unwrap() = Some(result);
    }

    /// Hold the response for `id` until the returned sender fires.
    pub fn gate(&self, id: BlockId) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(id, rx);
        tx
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ExecutionTransport for FakeTransport {
    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let gate = self.gates.lock().unwrap().remove(&request.block_id);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let scripted = self.single.lock().unwrap().remove(&request.block_id);
        scripted.unwrap_or_else(|| {
            Ok(ExecuteResponse {
                output: Some(BlockOutput::Text(format!("ran {}", request.code))),
                ..ExecuteResponse::default()
            })
        })
    }

    async fn execute_all(&self, request: &BatchRequest) -> Result<BatchResponse, TransportError> {
        self.batches.lock().unwrap().push(request.clone());
        let scripted = self.batch.lock().unwrap().take();
        scripted.unwrap_or_else(|| Ok(BatchResponse::default()))
    }
}

pub fn output(text: &str) -> ExecuteResponse {
    ExecuteResponse {
        output: Some(BlockOutput::text(text)),
        ..ExecuteResponse::default()
    }
}

pub fn ok_entry(text: &str) -> BlockResult {
    BlockResult {
        output: Some(BlockOutput::text(text)),
        error: None,
    }
}

pub fn err_entry(text: &str) -> BlockResult {
    BlockResult {
        output: None,
        error: Some(text.to_string()),
    }
}

/// Transport whose calls panic instead of answering.
pub struct PanickingTransport;

#[async_trait]
impl ExecutionTransport for PanickingTransport {
    async fn execute(&self, _request: &ExecuteRequest) -> Result<ExecuteResponse, TransportError> {
        panic!("transport blew up");
    }

    async fn execute_all(&self, _request: &BatchRequest) -> Result<BatchResponse, TransportError> {
        panic!("transport blew up");
    }
}
